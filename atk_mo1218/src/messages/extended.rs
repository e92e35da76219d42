//! Commands of the sub-ID family (`0x62..=0x65`): augmentation systems,
//! boot status, extended NMEA output, interference detection, navigation
//! mode, constellation selection and 1PPS pulse width.
//!
//! Requests and responses carry the message ID and the sub-ID; the
//! acknowledgement echoes both.

use bitflags::bitflags;

use super::{check_range, code_enum, Payload, PayloadReader, SaveTarget};
use crate::{
    device::{Device, Response},
    error::{ProtocolError, Result},
    transport::{Delay, Transport},
};

const MID_SBAS_QZSS: u8 = 0x62;
const SID_SBAS: u8 = 0x01;
const SID_QUERY_SBAS: u8 = 0x02;
const SID_QZSS: u8 = 0x03;
const SID_QUERY_QZSS: u8 = 0x04;
const SID_SBAS_RESPONSE: u8 = 0x80;
const SID_QZSS_RESPONSE: u8 = 0x81;

const MID_SAEE: u8 = 0x63;
const SID_SAEE: u8 = 0x01;
const SID_QUERY_SAEE: u8 = 0x02;
const SID_SAEE_RESPONSE: u8 = 0x80;

const MID_EXTENDED: u8 = 0x64;
const SID_QUERY_BOOT_STATUS: u8 = 0x01;
const SID_EXTENDED_NMEA: u8 = 0x02;
const SID_QUERY_EXTENDED_NMEA: u8 = 0x03;
const SID_INTERFERENCE: u8 = 0x06;
const SID_QUERY_INTERFERENCE: u8 = 0x07;
const SID_NAVIGATION_MODE: u8 = 0x17;
const SID_QUERY_NAVIGATION_MODE: u8 = 0x18;
const SID_GNSS: u8 = 0x19;
const SID_QUERY_GNSS: u8 = 0x1a;
const SID_BOOT_STATUS_RESPONSE: u8 = 0x80;
const SID_EXTENDED_NMEA_RESPONSE: u8 = 0x81;
const SID_INTERFERENCE_RESPONSE: u8 = 0x83;
const SID_NAVIGATION_MODE_RESPONSE: u8 = 0x8b;
const SID_GNSS_RESPONSE: u8 = 0x8c;

const MID_PPS: u8 = 0x65;
const SID_PULSE_WIDTH: u8 = 0x01;
const SID_QUERY_PULSE_WIDTH: u8 = 0x02;
const SID_PULSE_WIDTH_RESPONSE: u8 = 0x80;

const MAX_URA_MASK: u8 = 15;
const MAX_SBAS_CHANNELS: u8 = 3;
const QZSS_CHANNEL_RANGE: core::ops::RangeInclusive<u8> = 1..=3;
/// Pulse width limits, in microseconds
pub const PULSE_WIDTH_RANGE: core::ops::RangeInclusive<u32> = 1..=100_000;

bitflags! {
    /// SBAS services the receiver may track
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SbasSubsystems: u8 {
        const WAAS = 0x01;
        const EGNOS = 0x02;
        const MSAS = 0x04;
    }
}

bitflags! {
    /// Constellation mask of the GNSS selection messages
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct GnssMask: u16 {
        const GPS = 0x0001;
        const BEIDOU = 0x0008;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SbasConfig {
    pub enable: bool,
    /// Use SBAS satellites for ranging
    pub ranging: bool,
    /// 0..=15
    pub ranging_ura_mask: u8,
    pub correction: bool,
    /// Tracking channels reserved for SBAS, 0..=3
    pub channels: u8,
    pub subsystems: SbasSubsystems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QzssConfig {
    pub enable: bool,
    /// Tracking channels reserved for QZSS, 1..=3
    pub channels: u8,
}

code_enum! {
    /// Self-assisted ephemeris extension
    pub enum Saee {
        Default = 0,
        Enable = 1,
        Disable = 2,
    }
}

code_enum! {
    pub enum BootSource {
        Flash = 0,
        /// Flash boot failed, running from ROM
        Rom = 1,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BootStatus {
    pub source: BootSource,
    pub flash_type: u8,
}

/// Output interval, in seconds, of every NMEA sentence the firmware knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtendedNmeaIntervals {
    pub gga: u8,
    pub gsa: u8,
    pub gsv: u8,
    pub gll: u8,
    pub rmc: u8,
    pub vtg: u8,
    pub zda: u8,
    pub gns: u8,
    pub gbs: u8,
    pub grs: u8,
    pub dtm: u8,
    pub gst: u8,
}

impl ExtendedNmeaIntervals {
    fn to_bytes(self) -> [u8; 12] {
        [
            self.gga, self.gsa, self.gsv, self.gll, self.rmc, self.vtg, self.zda, self.gns,
            self.gbs, self.grs, self.dtm, self.gst,
        ]
    }

    fn from_bytes(b: [u8; 12]) -> Self {
        let [gga, gsa, gsv, gll, rmc, vtg, zda, gns, gbs, grs, dtm, gst] = b;
        Self {
            gga,
            gsa,
            gsv,
            gll,
            rmc,
            vtg,
            zda,
            gns,
            gbs,
            grs,
            dtm,
            gst,
        }
    }
}

code_enum! {
    pub enum Interference {
        Unknown = 0,
        None = 1,
        Lite = 2,
        Critical = 3,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterferenceStatus {
    pub enable: bool,
    pub status: Interference,
}

code_enum! {
    /// Dynamic model of the navigation filter
    pub enum NavigationMode {
        Auto = 0,
        Pedestrian = 1,
        Car = 2,
        Marine = 3,
        Balloon = 4,
        Airborne = 5,
    }
}

/// Constellations used for the position solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GnssSelection {
    Gps,
    Beidou,
    GpsBeidou,
}

impl GnssSelection {
    fn mask(self) -> GnssMask {
        match self {
            GnssSelection::Gps => GnssMask::GPS,
            GnssSelection::Beidou => GnssMask::BEIDOU,
            GnssSelection::GpsBeidou => GnssMask::GPS | GnssMask::BEIDOU,
        }
    }

    fn from_mask(mask: GnssMask) -> Option<Self> {
        if mask.contains(GnssMask::GPS | GnssMask::BEIDOU) {
            Some(GnssSelection::GpsBeidou)
        } else if mask.contains(GnssMask::GPS) {
            Some(GnssSelection::Gps)
        } else if mask.contains(GnssMask::BEIDOU) {
            Some(GnssSelection::Beidou)
        } else {
            None
        }
    }
}

impl<T: Transport, D: Delay> Device<T, D> {
    pub fn configure_sbas(&mut self, config: &SbasConfig, save: SaveTarget) -> Result<()> {
        let payload = Payload::with_sub_id(MID_SBAS_QZSS, SID_SBAS)
            .u8(u8::from(config.enable))
            .u8(u8::from(config.ranging))
            .u8(check_range(
                config.ranging_ura_mask,
                0..=MAX_URA_MASK,
                "SBAS URA mask must be 0..=15",
            )?)
            .u8(u8::from(config.correction))
            .u8(check_range(
                config.channels,
                0..=MAX_SBAS_CHANNELS,
                "SBAS channels must be 0..=3",
            )?)
            .u8(config.subsystems.bits())
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn sbas_status(&mut self) -> Result<SbasConfig> {
        self.query(
            &[MID_SBAS_QZSS, SID_QUERY_SBAS],
            Response::sub(MID_SBAS_QZSS, SID_SBAS_RESPONSE),
            |p| {
                let mut r = PayloadReader::new("SbasStatus", p, 2, 8)?;
                Ok(SbasConfig {
                    enable: r.flag("enable")?,
                    ranging: r.flag("ranging")?,
                    ranging_ura_mask: r.bounded("ranging_ura_mask", MAX_URA_MASK)?,
                    correction: r.flag("correction")?,
                    channels: r.bounded("channels", MAX_SBAS_CHANNELS)?,
                    subsystems: r.code("subsystems", SbasSubsystems::from_bits)?,
                })
            },
        )
    }

    pub fn configure_qzss(&mut self, config: &QzssConfig, save: SaveTarget) -> Result<()> {
        let payload = Payload::with_sub_id(MID_SBAS_QZSS, SID_QZSS)
            .u8(u8::from(config.enable))
            .u8(check_range(
                config.channels,
                QZSS_CHANNEL_RANGE,
                "QZSS channels must be 1..=3",
            )?)
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn qzss_status(&mut self) -> Result<QzssConfig> {
        self.query(
            &[MID_SBAS_QZSS, SID_QUERY_QZSS],
            Response::sub(MID_SBAS_QZSS, SID_QZSS_RESPONSE),
            |p| {
                let mut r = PayloadReader::new("QzssStatus", p, 2, 4)?;
                Ok(QzssConfig {
                    enable: r.flag("enable")?,
                    channels: r.bounded("channels", *QZSS_CHANNEL_RANGE.end())?,
                })
            },
        )
    }

    pub fn configure_saee(&mut self, saee: Saee, save: SaveTarget) -> Result<()> {
        let payload = Payload::with_sub_id(MID_SAEE, SID_SAEE)
            .u8(saee.code())
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn saee(&mut self) -> Result<Saee> {
        self.query(
            &[MID_SAEE, SID_QUERY_SAEE],
            Response::sub(MID_SAEE, SID_SAEE_RESPONSE),
            |p| {
                let mut r = PayloadReader::new("SaeeStatus", p, 2, 3)?;
                Ok(r.code("enable", Saee::from_code)?)
            },
        )
    }

    pub fn boot_status(&mut self) -> Result<BootStatus> {
        self.query(
            &[MID_EXTENDED, SID_QUERY_BOOT_STATUS],
            Response::sub(MID_EXTENDED, SID_BOOT_STATUS_RESPONSE),
            |p| {
                let mut r = PayloadReader::new("BootStatus", p, 2, 4)?;
                Ok(BootStatus {
                    source: r.code("fail_over", BootSource::from_code)?,
                    flash_type: r.u8(),
                })
            },
        )
    }

    pub fn configure_extended_nmea_intervals(
        &mut self,
        intervals: &ExtendedNmeaIntervals,
        save: SaveTarget,
    ) -> Result<()> {
        let payload = Payload::with_sub_id(MID_EXTENDED, SID_EXTENDED_NMEA)
            .bytes(&intervals.to_bytes())
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn extended_nmea_intervals(&mut self) -> Result<ExtendedNmeaIntervals> {
        self.query(
            &[MID_EXTENDED, SID_QUERY_EXTENDED_NMEA],
            Response::sub(MID_EXTENDED, SID_EXTENDED_NMEA_RESPONSE),
            |p| {
                let mut r = PayloadReader::new("ExtendedNmeaIntervals", p, 2, 14)?;
                Ok(ExtendedNmeaIntervals::from_bytes(r.array()))
            },
        )
    }

    pub fn configure_interference_detection(
        &mut self,
        enable: bool,
        save: SaveTarget,
    ) -> Result<()> {
        let payload = Payload::with_sub_id(MID_EXTENDED, SID_INTERFERENCE)
            .u8(u8::from(enable))
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn interference_detection(&mut self) -> Result<InterferenceStatus> {
        self.query(
            &[MID_EXTENDED, SID_QUERY_INTERFERENCE],
            Response::sub(MID_EXTENDED, SID_INTERFERENCE_RESPONSE),
            |p| {
                let mut r = PayloadReader::new("InterferenceStatus", p, 2, 4)?;
                Ok(InterferenceStatus {
                    enable: r.flag("enable")?,
                    status: r.code("status", Interference::from_code)?,
                })
            },
        )
    }

    pub fn configure_navigation_mode(
        &mut self,
        mode: NavigationMode,
        save: SaveTarget,
    ) -> Result<()> {
        let payload = Payload::with_sub_id(MID_EXTENDED, SID_NAVIGATION_MODE)
            .u8(mode.code())
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn navigation_mode(&mut self) -> Result<NavigationMode> {
        self.query(
            &[MID_EXTENDED, SID_QUERY_NAVIGATION_MODE],
            Response::sub(MID_EXTENDED, SID_NAVIGATION_MODE_RESPONSE),
            |p| {
                let mut r = PayloadReader::new("NavigationMode", p, 2, 3)?;
                Ok(r.code("mode", NavigationMode::from_code)?)
            },
        )
    }

    pub fn configure_gnss_for_navigation(
        &mut self,
        gnss: GnssSelection,
        save: SaveTarget,
    ) -> Result<()> {
        let payload = Payload::with_sub_id(MID_EXTENDED, SID_GNSS)
            .u16(gnss.mask().bits())
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn gnss_for_navigation(&mut self) -> Result<GnssSelection> {
        self.query(
            &[MID_EXTENDED, SID_QUERY_GNSS],
            Response::sub(MID_EXTENDED, SID_GNSS_RESPONSE),
            |p| {
                let mut r = PayloadReader::new("GnssSelection", p, 2, 4)?;
                let bits = r.u16();
                GnssMask::from_bits(bits)
                    .and_then(GnssSelection::from_mask)
                    .ok_or_else(|| {
                        ProtocolError::InvalidCode {
                            message: "GnssSelection",
                            field: "gnss",
                            code: u32::from(bits),
                        }
                        .into()
                    })
            },
        )
    }

    /// 1PPS pulse width in microseconds
    pub fn configure_pps_pulse_width(&mut self, width_us: u32, save: SaveTarget) -> Result<()> {
        let width = check_range(
            width_us,
            PULSE_WIDTH_RANGE,
            "pulse width must be 1..=100000",
        )?;
        let payload = Payload::with_sub_id(MID_PPS, SID_PULSE_WIDTH)
            .u32(width)
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn pps_pulse_width(&mut self) -> Result<u32> {
        self.query(
            &[MID_PPS, SID_QUERY_PULSE_WIDTH],
            Response::sub(MID_PPS, SID_PULSE_WIDTH_RESPONSE),
            |p| Ok(PayloadReader::new("PulseWidth", p, 2, 6)?.u32()),
        )
    }
}
