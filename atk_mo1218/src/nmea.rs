//! NMEA-0183 text output of the receiver.
//!
//! Sentences are decoded in place: [`locate`] finds a sentence inside a
//! captured burst and each decoder borrows it for the duration of the call.
//! Numeric fields become scaled integers, see [`field::text_to_fixed_point`]
//! and [`field::rescale`]; no floating point is involved.

use crate::constants::{NMEA_ADDRESS_LEN, NMEA_SYNC_CHAR};

pub mod field;

mod common;
mod gga;
mod gll;
mod gsa;
mod gsv;
mod rmc;
mod vtg;
mod zda;

pub use common::{
    Latitude, LatitudeIndicator, Longitude, LongitudeIndicator, PositionMode, Status, UtcDate,
    UtcTime,
};
pub use gga::{decode_gga, FixQuality, Gga};
pub use gll::{decode_gll, Gll};
pub use gsa::{decode_gsa, FixType, Gsa, OperationMode};
pub use gsv::{decode_gsv, SatelliteInfo, SatellitesInView};
pub use rmc::{decode_rmc, Rmc};
pub use vtg::{decode_vtg, Vtg};
pub use zda::{decode_zda, Zda};

/// Sentence addresses emitted by the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SentenceType {
    GnGga,
    GnGll,
    GnGsa,
    GpGsa,
    BdGsa,
    GpGsv,
    BdGsv,
    GnRmc,
    GnVtg,
    GnZda,
}

impl SentenceType {
    /// Talker and sentence identifier, without the leading `$`
    pub const fn address(self) -> &'static [u8; NMEA_ADDRESS_LEN] {
        match self {
            SentenceType::GnGga => b"GNGGA",
            SentenceType::GnGll => b"GNGLL",
            SentenceType::GnGsa => b"GNGSA",
            SentenceType::GpGsa => b"GPGSA",
            SentenceType::BdGsa => b"BDGSA",
            SentenceType::GpGsv => b"GPGSV",
            SentenceType::BdGsv => b"BDGSV",
            SentenceType::GnRmc => b"GNRMC",
            SentenceType::GnVtg => b"GNVTG",
            SentenceType::GnZda => b"GNZDA",
        }
    }
}

/// Finds the `occurrence`-th sentence of type `sentence` in `buf`.
///
/// Occurrences count from 1, and 0 is treated as 1. The returned slice starts
/// at the `$` of the sentence and runs to the end of `buf` (or to the first
/// NUL byte), so continuation sentences that follow stay reachable.
pub fn locate(buf: &[u8], sentence: SentenceType, occurrence: usize) -> Option<&[u8]> {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let buf = &buf[..end];
    let address = sentence.address();
    let mut remaining = occurrence.max(1);

    for (pos, &b) in buf.iter().enumerate() {
        if b == NMEA_SYNC_CHAR && buf[pos + 1..].starts_with(address) {
            remaining -= 1;
            if remaining == 0 {
                return Some(&buf[pos..]);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const BURST: &[u8] = b"$GNGGA,1*00\r\n$GPGSV,2,1,08*00\r\n$GNGSA,A*00\r\n$GPGSV,2,2,08*00\r\n";

    #[test]
    fn test_locate_first_occurrence() {
        let found = locate(BURST, SentenceType::GpGsv, 1).unwrap();
        assert!(found.starts_with(b"$GPGSV,2,1"));
        assert_eq!(locate(BURST, SentenceType::GpGsv, 0), Some(found));
    }

    #[test]
    fn test_locate_nth_occurrence() {
        let found = locate(BURST, SentenceType::GpGsv, 2).unwrap();
        assert!(found.starts_with(b"$GPGSV,2,2"));
        assert_eq!(locate(BURST, SentenceType::GpGsv, 3), None);
    }

    #[test]
    fn test_locate_not_found() {
        assert_eq!(locate(BURST, SentenceType::GnRmc, 1), None);
        assert_eq!(locate(b"", SentenceType::GnRmc, 1), None);
        // address cut short by the end of the buffer
        assert_eq!(locate(b"$GNRM", SentenceType::GnRmc, 1), None);
    }

    #[test]
    fn test_locate_stops_at_nul() {
        let buf = b"$GNGGA,1*00\r\n\0$GNRMC,1*00\r\n";
        assert_eq!(locate(buf, SentenceType::GnRmc, 1), None);
        assert!(locate(buf, SentenceType::GnGga, 1).is_some());
    }
}
