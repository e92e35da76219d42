use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::field::Sentence;
use crate::error::{DateTimeError, ProtocolError};

type FieldResult<T> = core::result::Result<T, ProtocolError>;

/// Time of day as reported by the receiver, `HHMMSS.sss`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtcTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
}

impl UtcTime {
    pub fn to_naive_time(&self) -> Result<NaiveTime, DateTimeError> {
        NaiveTime::from_hms_milli_opt(
            self.hour.into(),
            self.minute.into(),
            self.second.into(),
            self.millisecond.into(),
        )
        .ok_or(DateTimeError::InvalidTime)
    }
}

/// Calendar date as reported by the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtcDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl UtcDate {
    pub fn to_naive_date(&self) -> Result<NaiveDate, DateTimeError> {
        NaiveDate::from_ymd_opt(self.year.into(), self.month.into(), self.day.into())
            .ok_or(DateTimeError::InvalidDate)
    }

    pub fn and_time(&self, time: &UtcTime) -> Result<NaiveDateTime, DateTimeError> {
        Ok(self.to_naive_date()?.and_time(time.to_naive_time()?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LatitudeIndicator {
    #[default]
    North,
    South,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LongitudeIndicator {
    #[default]
    East,
    West,
}

/// Latitude in degrees scaled by 100000
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Latitude {
    pub indicator: LatitudeIndicator,
    pub degree: u32,
}

impl Latitude {
    /// Signed decimal degrees, south negative
    pub fn degrees(&self) -> f64 {
        let degrees = f64::from(self.degree) / 100_000.0;
        match self.indicator {
            LatitudeIndicator::North => degrees,
            LatitudeIndicator::South => -degrees,
        }
    }
}

/// Longitude in degrees scaled by 100000
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Longitude {
    pub indicator: LongitudeIndicator,
    pub degree: u32,
}

impl Longitude {
    /// Signed decimal degrees, west negative
    pub fn degrees(&self) -> f64 {
        let degrees = f64::from(self.degree) / 100_000.0;
        match self.indicator {
            LongitudeIndicator::East => degrees,
            LongitudeIndicator::West => -degrees,
        }
    }
}

/// Data validity flag of RMC and GLL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    #[default]
    Invalid,
    Valid,
}

/// Mode indicator trailing RMC and VTG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PositionMode {
    #[default]
    NotValid,
    Autonomous,
    Differential,
    Estimated,
}

/// Scale of NMEA minutes after rescaling a `DDMM.mmmm` field to 5 digits
const DEGREE_SPLIT: i64 = 10_000_000;
const DEGREE_SCALE: i64 = 100_000;

/// `DDMM.mmmm` (or `DDDMM.mmmm`) to degrees ×100000
fn degree(s: &Sentence<'_>, index: usize, name: &'static str) -> FieldResult<u32> {
    let n = s.number(index, name)?.rescaled(5);
    let degree = (n / DEGREE_SPLIT) * DEGREE_SCALE + (n % DEGREE_SPLIT) / 60;
    u32::try_from(degree).map_err(|_| s.invalid(name))
}

pub(crate) fn time(s: &Sentence<'_>, index: usize) -> FieldResult<UtcTime> {
    let n = s.number(index, "utc time")?;
    if n.shift != 3 || n.value < 0 {
        return Err(s.invalid("utc time"));
    }
    let n = n.value;
    // every component is taken modulo 100 or 1000, the casts cannot truncate
    Ok(UtcTime {
        hour: ((n / 10_000_000) % 100) as u8,
        minute: ((n / 100_000) % 100) as u8,
        second: ((n / 1000) % 100) as u8,
        millisecond: (n % 1000) as u16,
    })
}

/// `DDMMYY`, years map to 2000..=2099
pub(crate) fn date(s: &Sentence<'_>, index: usize) -> FieldResult<UtcDate> {
    let n: u32 = s.integer(index, "utc date")?;
    Ok(UtcDate {
        year: (n % 100) as u16 + 2000,
        month: ((n / 100) % 100) as u8,
        day: ((n / 10_000) % 100) as u8,
    })
}

/// Latitude value at `index`, hemisphere at `index + 1`
pub(crate) fn latitude(s: &Sentence<'_>, index: usize) -> FieldResult<Latitude> {
    let degree = degree(s, index, "latitude")?;
    let indicator = match s.letter(index + 1, "n/s indicator")? {
        b'N' => LatitudeIndicator::North,
        b'S' => LatitudeIndicator::South,
        _ => return Err(s.invalid("n/s indicator")),
    };
    Ok(Latitude { indicator, degree })
}

/// Longitude value at `index`, hemisphere at `index + 1`
pub(crate) fn longitude(s: &Sentence<'_>, index: usize) -> FieldResult<Longitude> {
    let degree = degree(s, index, "longitude")?;
    let indicator = match s.letter(index + 1, "e/w indicator")? {
        b'E' => LongitudeIndicator::East,
        b'W' => LongitudeIndicator::West,
        _ => return Err(s.invalid("e/w indicator")),
    };
    Ok(Longitude { indicator, degree })
}

pub(crate) fn status(s: &Sentence<'_>, index: usize) -> FieldResult<Status> {
    match s.letter(index, "status")? {
        b'A' => Ok(Status::Valid),
        b'V' => Ok(Status::Invalid),
        _ => Err(s.invalid("status")),
    }
}

pub(crate) fn mode(s: &Sentence<'_>, index: usize) -> FieldResult<PositionMode> {
    match s.letter(index, "mode")? {
        b'N' => Ok(PositionMode::NotValid),
        b'A' => Ok(PositionMode::Autonomous),
        b'D' => Ok(PositionMode::Differential),
        b'E' => Ok(PositionMode::Estimated),
        _ => Err(s.invalid("mode")),
    }
}
