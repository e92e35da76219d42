use super::{
    common::{self, PositionMode},
    field::Sentence,
};
use crate::error::Result;

/// Course over ground and ground speed, all values with one decimal digit.
///
/// True course and both speeds must be reported with exactly one decimal
/// digit; the magnetic course is rescaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vtg {
    /// Degrees from true north
    pub course_true: u16,
    /// Degrees from magnetic north, 0 when not reported
    pub course_magnetic: u16,
    pub speed_knots: u16,
    pub speed_kph: u16,
    pub mode: PositionMode,
}

pub fn decode_vtg(sentence: &[u8]) -> Result<Vtg> {
    let s = Sentence::new(sentence, "VTG", b"VTG")?;
    Ok(Vtg {
        course_true: s.exact(1, "course true", 1)?,
        course_magnetic: s.optional_scaled(3, "course magnetic", 1)?,
        speed_knots: s.exact(5, "speed knots", 1)?,
        speed_kph: s.exact(7, "speed kph", 1)?,
        mode: common::mode(&s, 9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ProtocolError};

    #[test]
    fn test_decode_vtg() {
        assert_eq!(
            decode_vtg(b"$GNVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*28\r\n"),
            Ok(Vtg {
                course_true: 547,
                course_magnetic: 344,
                speed_knots: 55,
                speed_kph: 102,
                mode: PositionMode::Autonomous,
            })
        );
    }

    #[test]
    fn test_decode_vtg_requires_one_decimal() {
        for (sentence, field) in [
            (&b"$GNVTG,54.78,T,,M,005.5,N,010.2,K,D*00"[..], "course true"),
            (b"$GNVTG,054.7,T,,M,5,N,010.2,K,D*00", "speed knots"),
            (b"$GNVTG,054.7,T,,M,005.5,N,10.25,K,D*00", "speed kph"),
        ] {
            assert_eq!(
                decode_vtg(sentence),
                Err(Error::Protocol(ProtocolError::InvalidField {
                    message: "VTG",
                    field
                }))
            );
        }
    }

    #[test]
    fn test_decode_vtg_magnetic_course_rescaled() {
        let vtg = decode_vtg(b"$GNVTG,054.7,T,34.45,M,005.5,N,010.2,K,D*00").unwrap();
        assert_eq!(vtg.course_magnetic, 344);
        assert_eq!(vtg.mode, PositionMode::Differential);

        let vtg = decode_vtg(b"$GNVTG,054.7,T,,M,005.5,N,010.2,K,D*00").unwrap();
        assert_eq!(vtg.course_magnetic, 0);
    }

    #[test]
    fn test_decode_vtg_missing_speed() {
        assert_eq!(
            decode_vtg(b"$GNVTG,054.7,T,,M,,N,,K,N*00"),
            Err(Error::Protocol(ProtocolError::InvalidField {
                message: "VTG",
                field: "speed knots"
            }))
        );
    }
}
