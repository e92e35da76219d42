use log::debug;

use super::{field::Sentence, locate, SentenceType};
use crate::{
    constants::{GSV_SATELLITES_PER_SENTENCE, MAX_SATELLITES},
    error::Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SatelliteInfo {
    pub id: u16,
    /// Degrees
    pub elevation: u8,
    /// Degrees from true north
    pub azimuth: u16,
    /// dB-Hz, 0 when not tracked
    pub snr: u8,
}

/// Satellites in view of one constellation, collected from a whole GSV
/// group. At most [`MAX_SATELLITES`] are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SatellitesInView {
    pub count: u8,
    pub satellites: [SatelliteInfo; MAX_SATELLITES],
}

impl SatellitesInView {
    /// The populated slots
    pub fn visible(&self) -> &[SatelliteInfo] {
        &self.satellites[..usize::from(self.count).min(MAX_SATELLITES)]
    }
}

const NUM_SENTENCES: usize = 1;
const SEQUENCE: usize = 2;
const IN_VIEW: usize = 3;
const FIRST_SATELLITE: usize = 4;
const FIELDS_PER_SATELLITE: usize = 4;

/// Decodes the GSV group whose first sentence starts `sentence`.
///
/// The continuation sentences are looked up after the first one, so
/// `sentence` has to extend over the whole group, as returned by
/// [`locate`](super::locate). Only `$GPGSV` and `$BDGSV` are accepted.
pub fn decode_gsv(sentence: &[u8]) -> Result<SatellitesInView> {
    let first = Sentence::new(sentence, "GSV", b"GSV")?;
    let kind = match first.talker()? {
        b"GP" => SentenceType::GpGsv,
        b"BD" => SentenceType::BdGsv,
        _ => return Err(first.invalid("talker").into()),
    };

    let declared = usize::from(first.integer::<u8>(NUM_SENTENCES, "number of messages")?);
    let in_view = usize::from(first.integer::<u8>(IN_VIEW, "satellites in view")?);
    let per = GSV_SATELLITES_PER_SENTENCE;
    if declared == 0 || in_view < (declared - 1) * per || in_view > declared * per {
        return Err(first.invalid("satellites in view").into());
    }

    let count = in_view.min(MAX_SATELLITES);
    let sentences = count.div_ceil(per);
    let mut view = SatellitesInView {
        // `count` is at most MAX_SATELLITES
        count: count as u8,
        ..Default::default()
    };

    for k in 0..sentences {
        let data = locate(first.data(), kind, k + 1).ok_or_else(|| {
            debug!("GSV group: sentence {} of {} missing", k + 1, sentences);
            first.invalid("continuation")
        })?;
        let s = Sentence::new(data, "GSV", b"GSV")?;
        if s.integer::<usize>(NUM_SENTENCES, "number of messages")? < sentences {
            return Err(s.invalid("number of messages").into());
        }
        if s.integer::<usize>(SEQUENCE, "sequence number")? != k + 1 {
            return Err(s.invalid("sequence number").into());
        }
        if s.integer::<usize>(IN_VIEW, "satellites in view")? < count {
            return Err(s.invalid("satellites in view").into());
        }

        let slots = (k * per..count).take(per);
        for (group, slot) in slots.enumerate() {
            let base = FIRST_SATELLITE + group * FIELDS_PER_SATELLITE;
            view.satellites[slot] = SatelliteInfo {
                id: s.integer(base, "satellite id")?,
                elevation: s.integer(base + 1, "elevation")?,
                azimuth: s.integer(base + 2, "azimuth")?,
                snr: s.optional_integer(base + 3, "snr")?,
            };
        }
    }

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ProtocolError};

    const GPGSV: &[u8] = b"$GPGSV,2,1,08,01,40,083,46,02,17,308,,12,07,344,39,14,22,228,45*75\r\n\
$GPGSV,2,2,08,15,25,045,,17,60,300,41,19,05,120,,22,33,270,38*70\r\n";

    #[test]
    fn test_decode_gsv_two_sentences() {
        let view = decode_gsv(GPGSV).unwrap();
        assert_eq!(view.count, 8);
        assert_eq!(view.visible().len(), 8);
        assert_eq!(
            view.satellites[0],
            SatelliteInfo {
                id: 1,
                elevation: 40,
                azimuth: 83,
                snr: 46
            }
        );
        assert_eq!(view.satellites[1].snr, 0);
        assert_eq!(view.satellites[4].id, 15);
        assert_eq!(view.satellites[4].snr, 0);
        assert_eq!(view.satellites[7].id, 22);
        assert_eq!(view.satellites[7].snr, 38);
        assert_eq!(view.satellites[8], SatelliteInfo::default());
    }

    #[test]
    fn test_decode_gsv_partial_last_sentence() {
        let data = b"$BDGSV,2,1,05,201,45,120,30,202,30,200,,203,10,010,20,204,80,300,40*00\r\n\
$BDGSV,2,2,05,205,20,090,*00\r\n";
        let view = decode_gsv(data).unwrap();
        assert_eq!(view.count, 5);
        assert_eq!(view.satellites[4].id, 205);
        assert_eq!(view.satellites[4].snr, 0);
    }

    #[test]
    fn test_decode_gsv_clamps_to_capacity() {
        let data = b"$GPGSV,4,1,13,01,1,1,1,02,2,2,2,03,3,3,3,04,4,4,4*00\r\n\
$GPGSV,4,2,13,05,5,5,5,06,6,6,6,07,7,7,7,08,8,8,8*00\r\n\
$GPGSV,4,3,13,09,9,9,9,10,10,10,10,11,11,11,11,12,12,12,12*00\r\n";
        let view = decode_gsv(data).unwrap();
        assert_eq!(view.count, 12);
        assert_eq!(view.satellites[11].id, 12);
    }

    #[test]
    fn test_decode_gsv_inconsistent_continuation() {
        let data = b"$GPGSV,2,1,08,01,40,083,46,02,17,308,,12,07,344,39,14,22,228,45*75\r\n\
$GPGSV,2,3,08,15,25,045,,17,60,300,41,19,05,120,,22,33,270,38*70\r\n";
        assert!(matches!(
            decode_gsv(data),
            Err(Error::Protocol(ProtocolError::InvalidField {
                field: "sequence number",
                ..
            }))
        ));
    }

    #[test]
    fn test_decode_gsv_missing_continuation() {
        let data = b"$GPGSV,2,1,08,01,40,083,46,02,17,308,,12,07,344,39,14,22,228,45*75\r\n";
        assert!(decode_gsv(data).is_err());
    }

    #[test]
    fn test_decode_gsv_rejects_talker_and_count() {
        assert!(decode_gsv(b"$GLGSV,1,1,01,65,10,100,20*00").is_err());
        // 9 satellites cannot fit two sentences
        assert!(decode_gsv(b"$GPGSV,2,1,09,01,1,1,1*00").is_err());
    }
}
