//! # atk_mo1218
//!
//! Driver for the ATK-MO1218 GNSS receiver (GPS + BeiDou). The receiver is
//! configured through a SkyTraq-style binary protocol and reports fixes as
//! NMEA-0183 text; this crate speaks both.
//!
//! The driver owns nothing but a [`Transport`] (frame-oriented byte link) and
//! a [`Delay`]. With the `serial` feature `SerialTransport` talks to a
//! serial port; [`MemoryTransport`] replays scripted frames.
//!
//! Configuring the Receiver
//! ========================
//!
//! Every binary command is a method of [`Device`] that waits for the
//! acknowledgement, queries also wait for the response:
//! ```
//! # #[cfg(feature = "alloc")] {
//! use atk_mo1218::{Device, MemoryTransport, NoDelay, PositionRate, SaveTarget};
//!
//! let mut transport = MemoryTransport::new();
//! // ACK of message 0x0e
//! transport.push_frame(&[0xa0, 0xa1, 0x00, 0x02, 0x83, 0x0e, 0x8d, 0x0d, 0x0a]);
//!
//! let mut device = Device::new(transport, NoDelay);
//! device.configure_position_rate(PositionRate::Hz10, SaveTarget::Sram).unwrap();
//! # }
//! ```
//!
//! Reading Fixes
//! =============
//!
//! [`Device::update`] polls NMEA bursts until every requested part of a
//! [`FixSnapshot`] has been refreshed:
//! ```
//! # #[cfg(feature = "alloc")] {
//! use atk_mo1218::{Device, FixSnapshot, MemoryTransport, NoDelay, UpdateRequest};
//!
//! let mut transport = MemoryTransport::new();
//! transport.push_frame(b"$GNVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*28\r\n");
//!
//! let mut device = Device::new(transport, NoDelay);
//! let mut fix = FixSnapshot::default();
//! device.update(UpdateRequest::SPEED, &mut fix, 10).unwrap();
//! assert_eq!(fix.speed, 102); // 10.2 km/h
//! # }
//! ```
//!
//! Numeric values are scaled integers throughout; each field documents its
//! number of decimal digits.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;
extern crate core;
#[cfg(feature = "serde")]
extern crate serde;

pub use crate::{
    device::{Device, DeviceConfig},
    error::{DateTimeError, Error, ProtocolError, Result},
    messages::{extended::*, gnss::*, system::*, SaveTarget},
    transport::{Delay, NoDelay, Transport},
    update::{FixInfo, FixSnapshot, UpdateRequest},
};

#[cfg(feature = "std")]
pub use crate::transport::StdDelay;

#[cfg(feature = "alloc")]
pub use crate::transport::MemoryTransport;

#[cfg(feature = "serial")]
pub use crate::serial::SerialTransport;

pub mod constants;
mod device;
mod error;
pub mod frame;
pub mod messages;
pub mod nmea;
#[cfg(feature = "serial")]
mod serial;
mod transport;
mod update;
