use super::{
    common::{self, UtcDate, UtcTime},
    field::Sentence,
};
use crate::error::Result;

/// Time and date with the local zone offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Zda {
    pub utc_time: UtcTime,
    pub utc_date: UtcDate,
    /// -13..=13
    pub local_zone_hour: i8,
    pub local_zone_minute: u8,
}

pub fn decode_zda(sentence: &[u8]) -> Result<Zda> {
    let s = Sentence::new(sentence, "ZDA", b"ZDA")?;
    let utc_time = common::time(&s, 1)?;
    let day = s.integer(2, "day")?;
    let month = s.integer(3, "month")?;
    let year = s.integer(4, "year")?;
    let local_zone_hour: i8 = s.integer(5, "local zone hour")?;
    if !(-13..=13).contains(&local_zone_hour) {
        return Err(s.invalid("local zone hour").into());
    }
    Ok(Zda {
        utc_time,
        utc_date: UtcDate { year, month, day },
        local_zone_hour,
        local_zone_minute: s.integer(6, "local zone minute")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_zda() {
        let zda = decode_zda(b"$GNZDA,060237.000,30,07,2024,-05,30*4F\r\n").unwrap();
        assert_eq!(zda.utc_time.hour, 6);
        assert_eq!(zda.utc_time.second, 37);
        assert_eq!(
            zda.utc_date,
            UtcDate {
                year: 2024,
                month: 7,
                day: 30
            }
        );
        assert_eq!(zda.local_zone_hour, -5);
        assert_eq!(zda.local_zone_minute, 30);
        assert_eq!(
            zda.utc_date.and_time(&zda.utc_time).unwrap().to_string(),
            "2024-07-30 06:02:37"
        );
    }

    #[test]
    fn test_decode_zda_rejects_zone() {
        assert!(decode_zda(b"$GNZDA,060237.000,30,07,2024,14,00*00").is_err());
        assert!(decode_zda(b"$GNZDA,060237.000,30,07,2024,,*00").is_err());
    }
}
