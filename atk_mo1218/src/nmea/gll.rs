use super::{
    common::{self, Latitude, Longitude, Status, UtcTime},
    field::Sentence,
};
use crate::error::Result;

/// Geographic position, latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gll {
    pub latitude: Latitude,
    pub longitude: Longitude,
    pub utc_time: UtcTime,
    pub status: Status,
}

pub fn decode_gll(sentence: &[u8]) -> Result<Gll> {
    let s = Sentence::new(sentence, "GLL", b"GLL")?;
    Ok(Gll {
        latitude: common::latitude(&s, 1)?,
        longitude: common::longitude(&s, 3)?,
        utc_time: common::time(&s, 5)?,
        status: common::status(&s, 6)?,
    })
}
