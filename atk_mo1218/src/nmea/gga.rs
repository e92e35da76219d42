use super::{
    common::{self, Latitude, Longitude, UtcTime},
    field::Sentence,
};
use crate::error::Result;

/// Fix quality of GGA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FixQuality {
    #[default]
    Unavailable,
    /// Standard positioning service
    Sps,
    Differential,
}

/// Global positioning system fix data.
///
/// `hdop` and `altitude` carry one decimal digit, altitude is metres above
/// mean sea level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gga {
    pub utc_time: UtcTime,
    pub latitude: Latitude,
    pub longitude: Longitude,
    pub quality: FixQuality,
    pub satellites_used: u8,
    pub hdop: u16,
    pub altitude: i32,
    /// 0 when no differential station is in use
    pub dgps_station_id: u16,
}

pub fn decode_gga(sentence: &[u8]) -> Result<Gga> {
    let s = Sentence::new(sentence, "GGA", b"GGA")?;
    let quality = match s.integer::<u8>(6, "quality")? {
        0 => FixQuality::Unavailable,
        1 => FixQuality::Sps,
        2 => FixQuality::Differential,
        _ => return Err(s.invalid("quality").into()),
    };
    Ok(Gga {
        utc_time: common::time(&s, 1)?,
        latitude: common::latitude(&s, 2)?,
        longitude: common::longitude(&s, 4)?,
        quality,
        satellites_used: s.integer(7, "satellites used")?,
        hdop: s.scaled(8, "hdop", 1)?,
        altitude: s.scaled(9, "altitude", 1)?,
        dgps_station_id: s.optional_integer(14, "dgps station id")?,
    })
}
