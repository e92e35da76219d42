//! Navigation filter commands: DOP and elevation masks, datum, GPS
//! ephemeris, position pinning and 1PPS cable delay.

use super::{check_range, code_enum, Payload, PayloadReader, SaveTarget};
use crate::{
    device::{Device, Response},
    error::Result,
    transport::{Delay, Transport},
};

const MID_DOP_MASK: u8 = 0x2a;
const MID_ELEVATION_CNR_MASK: u8 = 0x2b;
const MID_QUERY_DATUM: u8 = 0x2d;
const MID_QUERY_DOP_MASK: u8 = 0x2e;
const MID_QUERY_ELEVATION_CNR_MASK: u8 = 0x2f;
const MID_QUERY_GPS_EPHEMERIS: u8 = 0x30;
const MID_POSITION_PINNING: u8 = 0x39;
const MID_QUERY_POSITION_PINNING: u8 = 0x3a;
const MID_POSITION_PINNING_PARAMETERS: u8 = 0x3b;
const MID_SET_GPS_EPHEMERIS: u8 = 0x41;
const MID_CABLE_DELAY: u8 = 0x45;
const MID_QUERY_CABLE_DELAY: u8 = 0x46;

const MID_DATUM_RESPONSE: u8 = 0xae;
const MID_DOP_MASK_RESPONSE: u8 = 0xaf;
const MID_ELEVATION_CNR_MASK_RESPONSE: u8 = 0xb0;
const MID_GPS_EPHEMERIS_RESPONSE: u8 = 0xb1;
const MID_POSITION_PINNING_RESPONSE: u8 = 0xb4;
const MID_CABLE_DELAY_RESPONSE: u8 = 0xbb;

/// Highest GPS satellite number; 0 asks for every satellite
pub const MAX_GPS_SV: u8 = 32;
pub const EPHEMERIS_SUBFRAME_LEN: usize = 28;

/// Cable delay limits, in units of 0.01 ns
pub const CABLE_DELAY_RANGE: core::ops::RangeInclusive<i32> = -500_000..=500_000;

const DOP_VALUE_RANGE: core::ops::RangeInclusive<u16> = 5..=300;
const ELEVATION_MASK_RANGE: core::ops::RangeInclusive<u8> = 3..=85;
const CNR_MASK_RANGE: core::ops::RangeInclusive<u8> = 0..=40;

code_enum! {
    pub enum DopMode {
        Disable = 0,
        Auto = 1,
        PdopOnly = 2,
        HdopOnly = 3,
        GdopOnly = 4,
    }
}

code_enum! {
    pub enum ElevationCnrMode {
        Disable = 0,
        Both = 1,
        ElevationOnly = 2,
        CnrOnly = 3,
    }
}

code_enum! {
    pub enum PositionPinning {
        Default = 0,
        Enable = 1,
        Disable = 2,
    }
}

/// DOP limits, each scaled by 10 (5 = 0.5, 300 = 30.0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DopMask {
    pub mode: DopMode,
    pub pdop: u16,
    pub hdop: u16,
    pub gdop: u16,
}

/// Elevation in degrees, carrier to noise ratio in dB-Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElevationCnrMask {
    pub mode: ElevationCnrMode,
    pub elevation: u8,
    pub cnr: u8,
}

/// Three raw subframes of one GPS satellite broadcast ephemeris
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpsEphemeris {
    pub sv_id: u16,
    pub subframes: [[u8; EPHEMERIS_SUBFRAME_LEN]; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinningParameters {
    /// km/h
    pub pinning_speed: u16,
    /// seconds
    pub pinning_count: u16,
    /// km/h
    pub unpinning_speed: u16,
    /// seconds
    pub unpinning_count: u16,
    /// meters
    pub unpinning_distance: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionPinningStatus {
    pub status: PositionPinning,
    pub parameters: PinningParameters,
}

fn write_pinning_parameters(p: Payload, params: &PinningParameters) -> Payload {
    p.u16(params.pinning_speed)
        .u16(params.pinning_count)
        .u16(params.unpinning_speed)
        .u16(params.unpinning_count)
        .u16(params.unpinning_distance)
}

fn parse_ephemeris(payload: &[u8]) -> Result<GpsEphemeris> {
    let mut r = PayloadReader::new(
        "GpsEphemeris",
        payload,
        1,
        3 + 3 * EPHEMERIS_SUBFRAME_LEN,
    )?;
    Ok(GpsEphemeris {
        sv_id: r.u16(),
        subframes: [r.array(), r.array(), r.array()],
    })
}

impl<T: Transport, D: Delay> Device<T, D> {
    pub fn configure_dop_mask(&mut self, mask: &DopMask, save: SaveTarget) -> Result<()> {
        let what = "DOP values must be 5..=300";
        let payload = Payload::new(MID_DOP_MASK)
            .u8(mask.mode.code())
            .u16(check_range(mask.pdop, DOP_VALUE_RANGE, what)?)
            .u16(check_range(mask.hdop, DOP_VALUE_RANGE, what)?)
            .u16(check_range(mask.gdop, DOP_VALUE_RANGE, what)?)
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn configure_elevation_cnr_mask(
        &mut self,
        mask: &ElevationCnrMask,
        save: SaveTarget,
    ) -> Result<()> {
        let payload = Payload::new(MID_ELEVATION_CNR_MASK)
            .u8(mask.mode.code())
            .u8(check_range(
                mask.elevation,
                ELEVATION_MASK_RANGE,
                "elevation mask must be 3..=85",
            )?)
            .u8(check_range(mask.cnr, CNR_MASK_RANGE, "CNR mask must be 0..=40")?)
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    /// Index of the datum used for position output
    pub fn datum(&mut self) -> Result<u16> {
        self.query(
            &[MID_QUERY_DATUM],
            Response::id(MID_DATUM_RESPONSE),
            |p| Ok(PayloadReader::new("Datum", p, 1, 3)?.u16()),
        )
    }

    pub fn dop_mask(&mut self) -> Result<DopMask> {
        self.query(
            &[MID_QUERY_DOP_MASK],
            Response::id(MID_DOP_MASK_RESPONSE),
            |p| {
                let mut r = PayloadReader::new("DopMask", p, 1, 8)?;
                let mode = r.code("mode", DopMode::from_code)?;
                let (pdop, hdop, gdop) = (r.u16(), r.u16(), r.u16());
                Ok(DopMask {
                    mode,
                    pdop: r.within("pdop", pdop, DOP_VALUE_RANGE)?,
                    hdop: r.within("hdop", hdop, DOP_VALUE_RANGE)?,
                    gdop: r.within("gdop", gdop, DOP_VALUE_RANGE)?,
                })
            },
        )
    }

    pub fn elevation_cnr_mask(&mut self) -> Result<ElevationCnrMask> {
        self.query(
            &[MID_QUERY_ELEVATION_CNR_MASK],
            Response::id(MID_ELEVATION_CNR_MASK_RESPONSE),
            |p| {
                let mut r = PayloadReader::new("ElevationCnrMask", p, 1, 4)?;
                let mode = r.code("mode", ElevationCnrMode::from_code)?;
                let (elevation, cnr) = (r.u8(), r.u8());
                Ok(ElevationCnrMask {
                    mode,
                    elevation: r.within("elevation", elevation, ELEVATION_MASK_RANGE)?,
                    cnr: r.within("cnr", cnr, CNR_MASK_RANGE)?,
                })
            },
        )
    }

    /// Ephemeris of GPS satellite `sv`
    pub fn gps_ephemeris(&mut self, sv: u8) -> Result<GpsEphemeris> {
        let sv = check_range(sv, 0..=MAX_GPS_SV, "GPS satellite number must be 0..=32")?;
        self.query(
            Payload::new(MID_QUERY_GPS_EPHEMERIS).u8(sv).as_bytes(),
            Response::id(MID_GPS_EPHEMERIS_RESPONSE),
            parse_ephemeris,
        )
    }

    pub fn set_gps_ephemeris(&mut self, ephemeris: &GpsEphemeris) -> Result<()> {
        let [sf0, sf1, sf2] = &ephemeris.subframes;
        let payload = Payload::new(MID_SET_GPS_EPHEMERIS)
            .u16(ephemeris.sv_id)
            .bytes(sf0)
            .bytes(sf1)
            .bytes(sf2);
        self.command(payload.as_bytes())
    }

    pub fn configure_position_pinning(
        &mut self,
        pinning: PositionPinning,
        save: SaveTarget,
    ) -> Result<()> {
        let payload = Payload::new(MID_POSITION_PINNING)
            .u8(pinning.code())
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn position_pinning(&mut self) -> Result<PositionPinningStatus> {
        self.query(
            &[MID_QUERY_POSITION_PINNING],
            Response::id(MID_POSITION_PINNING_RESPONSE),
            |p| {
                let mut r = PayloadReader::new("PositionPinning", p, 1, 12)?;
                Ok(PositionPinningStatus {
                    status: r.code("status", PositionPinning::from_code)?,
                    parameters: PinningParameters {
                        pinning_speed: r.u16(),
                        pinning_count: r.u16(),
                        unpinning_speed: r.u16(),
                        unpinning_count: r.u16(),
                        unpinning_distance: r.u16(),
                    },
                })
            },
        )
    }

    pub fn configure_position_pinning_parameters(
        &mut self,
        params: &PinningParameters,
        save: SaveTarget,
    ) -> Result<()> {
        let payload = write_pinning_parameters(Payload::new(MID_POSITION_PINNING_PARAMETERS), params)
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    /// 1PPS cable delay in units of 0.01 ns
    pub fn configure_cable_delay(&mut self, delay: i32, save: SaveTarget) -> Result<()> {
        let delay = check_range(
            delay,
            CABLE_DELAY_RANGE,
            "cable delay must be -500000..=500000",
        )?;
        let payload = Payload::new(MID_CABLE_DELAY)
            .i32(delay)
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn cable_delay(&mut self) -> Result<i32> {
        self.query(
            &[MID_QUERY_CABLE_DELAY],
            Response::id(MID_CABLE_DELAY_RESPONSE),
            |p| Ok(PayloadReader::new("CableDelay", p, 1, 5)?.i32()),
        )
    }
}
