use super::{
    common::{self, Latitude, Longitude, PositionMode, Status, UtcDate, UtcTime},
    field::Sentence,
};
use crate::error::Result;

/// Recommended minimum navigation information.
///
/// Speed is in knots and course in degrees, both with one decimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rmc {
    pub utc_time: UtcTime,
    pub utc_date: UtcDate,
    pub status: Status,
    pub latitude: Latitude,
    pub longitude: Longitude,
    pub speed_over_ground: u16,
    /// 0 when the receiver leaves it empty
    pub course_over_ground: u16,
    pub mode: PositionMode,
}

pub fn decode_rmc(sentence: &[u8]) -> Result<Rmc> {
    let s = Sentence::new(sentence, "RMC", b"RMC")?;
    Ok(Rmc {
        utc_time: common::time(&s, 1)?,
        status: common::status(&s, 2)?,
        latitude: common::latitude(&s, 3)?,
        longitude: common::longitude(&s, 5)?,
        speed_over_ground: s.scaled(7, "speed over ground", 1)?,
        course_over_ground: s.optional_scaled(8, "course over ground", 1)?,
        utc_date: common::date(&s, 9)?,
        mode: common::mode(&s, 12)?,
    })
}
