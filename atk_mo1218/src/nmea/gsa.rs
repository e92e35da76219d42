use super::field::Sentence;
use crate::{constants::MAX_SATELLITES, error::Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperationMode {
    /// Forced to 2D or 3D
    Manual,
    /// Switches between 2D and 3D on its own
    #[default]
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FixType {
    #[default]
    NotAvailable,
    Fix2D,
    Fix3D,
}

/// DOP and active satellites; the receiver sends it as GNGSA, GPGSA and
/// BDGSA. Dilution values carry one decimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gsa {
    pub mode: OperationMode,
    pub fix_type: FixType,
    /// Satellites used in the solution, unused channels are 0
    pub satellite_ids: [u16; MAX_SATELLITES],
    pub pdop: u16,
    pub hdop: u16,
    pub vdop: u16,
}

const FIRST_ID_FIELD: usize = 3;

pub fn decode_gsa(sentence: &[u8]) -> Result<Gsa> {
    let s = Sentence::new(sentence, "GSA", b"GSA")?;
    let mode = match s.letter(1, "mode")? {
        b'M' => OperationMode::Manual,
        b'A' => OperationMode::Automatic,
        _ => return Err(s.invalid("mode").into()),
    };
    let fix_type = match s.integer::<u8>(2, "fix type")? {
        1 => FixType::NotAvailable,
        2 => FixType::Fix2D,
        3 => FixType::Fix3D,
        _ => return Err(s.invalid("fix type").into()),
    };

    let mut satellite_ids = [0; MAX_SATELLITES];
    for (i, id) in satellite_ids.iter_mut().enumerate() {
        *id = s.optional_integer(FIRST_ID_FIELD + i, "satellite id")?;
    }

    let dop = FIRST_ID_FIELD + MAX_SATELLITES;
    Ok(Gsa {
        mode,
        fix_type,
        satellite_ids,
        pdop: s.scaled(dop, "pdop", 1)?,
        hdop: s.scaled(dop + 1, "hdop", 1)?,
        vdop: s.scaled(dop + 2, "vdop", 1)?,
    })
}
