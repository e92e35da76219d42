//! System commands: restart, firmware identification, serial port, output
//! selection, power mode and update rate.

use core::fmt;

use super::{check_range, code_enum, Payload, PayloadReader, SaveTarget};
use crate::{
    device::{Device, Response},
    error::Result,
    transport::{Delay, Transport},
};
use log::debug;

const MID_RESTART: u8 = 0x01;
const MID_SW_VERSION: u8 = 0x02;
const MID_SW_CRC: u8 = 0x03;
const MID_FACTORY_RESET: u8 = 0x04;
const MID_SERIAL_PORT: u8 = 0x05;
const MID_NMEA_INTERVALS: u8 = 0x08;
const MID_OUTPUT_TYPE: u8 = 0x09;
const MID_POWER_MODE: u8 = 0x0c;
const MID_POSITION_RATE: u8 = 0x0e;
const MID_QUERY_POSITION_RATE: u8 = 0x10;
const MID_NAVIGATION_INTERVAL: u8 = 0x11;
const MID_QUERY_POWER_MODE: u8 = 0x15;

const MID_SW_VERSION_RESPONSE: u8 = 0x80;
const MID_SW_CRC_RESPONSE: u8 = 0x81;
const MID_POSITION_RATE_RESPONSE: u8 = 0x86;
const MID_POWER_MODE_RESPONSE: u8 = 0xb9;

/// System code, the only software type the receiver reports on
const SOFTWARE_TYPE_SYSTEM: u8 = 1;

code_enum! {
    pub enum RestartMode {
        Hot = 1,
        Warm = 2,
        Cold = 3,
    }
}

code_enum! {
    pub enum FactoryReset {
        NoReboot = 0,
        Reboot = 1,
    }
}

code_enum! {
    /// Baud rates of the receiver UART
    pub enum BaudRate {
        B4800 = 0,
        B9600 = 1,
        B19200 = 2,
        B38400 = 3,
        B57600 = 4,
        B115200 = 5,
        B230400 = 6,
        B460800 = 7,
        B921600 = 8,
    }
}

impl BaudRate {
    pub const fn bits_per_second(self) -> u32 {
        match self {
            BaudRate::B4800 => 4800,
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115_200,
            BaudRate::B230400 => 230_400,
            BaudRate::B460800 => 460_800,
            BaudRate::B921600 => 921_600,
        }
    }
}

code_enum! {
    pub enum OutputType {
        None = 0,
        Nmea = 1,
        Binary = 2,
    }
}

code_enum! {
    pub enum PowerMode {
        Normal = 0,
        Save = 1,
    }
}

code_enum! {
    /// Position update rate, coded in Hz.
    ///
    /// Rates above 2 Hz need at least 38400 baud, above 10 Hz at least
    /// 115200 baud and above 25 Hz 921600 baud.
    pub enum PositionRate {
        Hz1 = 1,
        Hz2 = 2,
        Hz4 = 4,
        Hz5 = 5,
        Hz8 = 8,
        Hz10 = 10,
        Hz20 = 20,
        Hz25 = 25,
        Hz40 = 40,
        Hz50 = 50,
    }
}

/// Firmware identification returned by the software version query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoftwareVersion {
    pub software_type: u8,
    /// x.y.z
    pub kernel: [u8; 3],
    /// x.y.z
    pub odm: [u8; 3],
    /// Build date as (yy, mm, dd), years counted from 2000
    pub revision: [u8; 3],
}

impl fmt::Display for SoftwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [kx, ky, kz] = self.kernel;
        let [ox, oy, oz] = self.odm;
        let [yy, mm, dd] = self.revision;
        write!(
            f,
            "kernel {kx}.{ky}.{kz}, ODM {ox}.{oy}.{oz}, revision {}.{mm:02}.{dd:02}",
            2000 + u16::from(yy)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoftwareCrc {
    pub software_type: u8,
    pub crc: u16,
}

/// Output interval of each standard NMEA sentence, in seconds. 0 disables
/// the sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NmeaIntervals {
    pub gga: u8,
    pub gsa: u8,
    pub gsv: u8,
    pub gll: u8,
    pub rmc: u8,
    pub vtg: u8,
    pub zda: u8,
}

fn parse_software_version(payload: &[u8]) -> Result<SoftwareVersion> {
    let mut r = PayloadReader::new("SoftwareVersion", payload, 1, 14)?;
    let software_type = r.u8();
    let kernel: [u8; 4] = r.array();
    let odm: [u8; 4] = r.array();
    let revision: [u8; 4] = r.array();
    let tail = |v: [u8; 4]| [v[1], v[2], v[3]];
    Ok(SoftwareVersion {
        software_type,
        kernel: tail(kernel),
        odm: tail(odm),
        revision: tail(revision),
    })
}

impl<T: Transport, D: Delay> Device<T, D> {
    /// Checks that a receiver answers on the transport
    pub fn init(&mut self) -> Result<SoftwareVersion> {
        let version = self.software_version()?;
        debug!("Receiver firmware {}", version);
        Ok(version)
    }

    /// Restarts the receiver without aiding data
    pub fn restart(&mut self, mode: RestartMode) -> Result<()> {
        let payload = Payload::new(MID_RESTART)
            .u8(mode.code())
            // UTC year, month, day, hour, minute, second
            .u16(0)
            .bytes(&[0; 5])
            // latitude, longitude, altitude
            .i16(0)
            .i16(0)
            .i16(0);
        self.command(payload.as_bytes())
    }

    pub fn software_version(&mut self) -> Result<SoftwareVersion> {
        let payload = Payload::new(MID_SW_VERSION).u8(SOFTWARE_TYPE_SYSTEM);
        self.query(
            payload.as_bytes(),
            Response::id(MID_SW_VERSION_RESPONSE),
            parse_software_version,
        )
    }

    pub fn software_crc(&mut self) -> Result<SoftwareCrc> {
        let payload = Payload::new(MID_SW_CRC).u8(SOFTWARE_TYPE_SYSTEM);
        self.query(
            payload.as_bytes(),
            Response::id(MID_SW_CRC_RESPONSE),
            |p| {
                let mut r = PayloadReader::new("SoftwareCrc", p, 1, 4)?;
                Ok(SoftwareCrc {
                    software_type: r.u8(),
                    crc: r.u16(),
                })
            },
        )
    }

    pub fn factory_reset(&mut self, reset: FactoryReset) -> Result<()> {
        self.command(Payload::new(MID_FACTORY_RESET).u8(reset.code()).as_bytes())
    }

    /// Changes the receiver UART baud rate. The host side must follow on its
    /// own once the command is acknowledged.
    pub fn configure_serial_port(&mut self, baud_rate: BaudRate, save: SaveTarget) -> Result<()> {
        // COM port index, the module exposes a single port
        let payload = Payload::new(MID_SERIAL_PORT)
            .u8(0)
            .u8(baud_rate.code())
            .u8(save.code());
        self.command(payload.as_bytes())
    }

    pub fn configure_nmea_intervals(
        &mut self,
        intervals: &NmeaIntervals,
        save: SaveTarget,
    ) -> Result<()> {
        let payload = Payload::new(MID_NMEA_INTERVALS)
            .u8(intervals.gga)
            .u8(intervals.gsa)
            .u8(intervals.gsv)
            .u8(intervals.gll)
            .u8(intervals.rmc)
            .u8(intervals.vtg)
            .u8(intervals.zda)
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn configure_output_type(&mut self, output: OutputType, save: SaveTarget) -> Result<()> {
        let payload = Payload::new(MID_OUTPUT_TYPE)
            .u8(output.code())
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn configure_power_mode(&mut self, mode: PowerMode, save: SaveTarget) -> Result<()> {
        let payload = Payload::new(MID_POWER_MODE)
            .u8(mode.code())
            .u8(save.code());
        self.command(payload.as_bytes())
    }

    pub fn configure_position_rate(&mut self, rate: PositionRate, save: SaveTarget) -> Result<()> {
        let payload = Payload::new(MID_POSITION_RATE)
            .u8(rate.code())
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn position_rate(&mut self) -> Result<PositionRate> {
        self.query(
            &[MID_QUERY_POSITION_RATE],
            Response::id(MID_POSITION_RATE_RESPONSE),
            |p| {
                let mut r = PayloadReader::new("PositionRate", p, 1, 2)?;
                Ok(r.code("rate", PositionRate::from_code)?)
            },
        )
    }

    /// Output interval of the binary navigation data message, in position
    /// updates
    pub fn configure_navigation_interval(&mut self, interval: u8, save: SaveTarget) -> Result<()> {
        let interval = check_range(interval, 1..=255, "navigation interval must be 1..=255")?;
        let payload = Payload::new(MID_NAVIGATION_INTERVAL)
            .u8(interval)
            .u8(save.persistent_code()?);
        self.command(payload.as_bytes())
    }

    pub fn power_mode(&mut self) -> Result<PowerMode> {
        self.query(
            &[MID_QUERY_POWER_MODE],
            Response::id(MID_POWER_MODE_RESPONSE),
            |p| {
                let mut r = PayloadReader::new("PowerMode", p, 1, 2)?;
                Ok(r.code("mode", PowerMode::from_code)?)
            },
        )
    }
}
