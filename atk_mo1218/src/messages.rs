//! Binary command set of the receiver.
//!
//! Every command is a fixed-layout payload: message ID, optional sub-ID, then
//! fields of 1, 2 or 4 bytes, big-endian when wider than a byte. Values are
//! range checked before anything is sent; codes found in responses are
//! matched exhaustively and anything unknown is reported as
//! [`ProtocolError::InvalidCode`].

use crate::{
    constants::BIN_MAX_PAYLOAD_LEN,
    error::{Error, ProtocolError, Result},
};

pub mod extended;
pub mod gnss;
pub mod system;

/// Declares a field enum with its wire code
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u8)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $code),+
        }

        impl $name {
            /// Wire representation
            pub const fn code(self) -> u8 {
                self as u8
            }

            pub const fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}
pub(crate) use code_enum;

code_enum! {
    /// Where the receiver keeps a configuration change
    pub enum SaveTarget {
        /// Lost at power off
        Sram = 0,
        /// Survives power cycles
        SramAndFlash = 1,
        /// Applied without touching the stored configuration
        Temporary = 2,
    }
}

impl SaveTarget {
    /// Code for commands that only know SRAM and SRAM+Flash
    pub(crate) fn persistent_code(self) -> Result<u8> {
        match self {
            SaveTarget::Sram | SaveTarget::SramAndFlash => Ok(self.code()),
            SaveTarget::Temporary => Err(Error::InvalidArgument(
                "temporary save is not supported by this command",
            )),
        }
    }
}

/// Builder for an outgoing payload
pub(crate) struct Payload {
    buf: [u8; BIN_MAX_PAYLOAD_LEN],
    len: usize,
}

impl Payload {
    pub(crate) fn new(id: u8) -> Self {
        let mut p = Self {
            buf: [0; BIN_MAX_PAYLOAD_LEN],
            len: 0,
        };
        p.buf[0] = id;
        p.len = 1;
        p
    }

    pub(crate) fn with_sub_id(id: u8, sid: u8) -> Self {
        Self::new(id).u8(sid)
    }

    pub(crate) fn u8(self, v: u8) -> Self {
        self.bytes(&[v])
    }

    pub(crate) fn u16(self, v: u16) -> Self {
        self.bytes(&v.to_be_bytes())
    }

    pub(crate) fn i16(self, v: i16) -> Self {
        self.bytes(&v.to_be_bytes())
    }

    pub(crate) fn u32(self, v: u32) -> Self {
        self.bytes(&v.to_be_bytes())
    }

    pub(crate) fn i32(self, v: i32) -> Self {
        self.bytes(&v.to_be_bytes())
    }

    /// Layouts are static and never exceed the payload limit
    pub(crate) fn bytes(mut self, v: &[u8]) -> Self {
        self.buf[self.len..self.len + v.len()].copy_from_slice(v);
        self.len += v.len();
        self
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Sequential reader over a response payload whose length was checked up front
pub(crate) struct PayloadReader<'a> {
    message: &'static str,
    data: &'a [u8],
    pos: usize,
}

impl<'a> PayloadReader<'a> {
    /// Skips the message ID (and sub-ID, when `header_len` is 2)
    pub(crate) fn new(
        message: &'static str,
        payload: &'a [u8],
        header_len: usize,
        expect_len: usize,
    ) -> core::result::Result<Self, ProtocolError> {
        if payload.len() < expect_len {
            return Err(ProtocolError::InvalidPayloadLen {
                expect: expect_len,
                got: payload.len(),
            });
        }
        Ok(Self {
            message,
            data: payload,
            pos: header_len,
        })
    }

    pub(crate) fn u8(&mut self) -> u8 {
        let v = self.data[self.pos];
        self.pos += 1;
        v
    }

    pub(crate) fn u16(&mut self) -> u16 {
        u16::from_be_bytes([self.u8(), self.u8()])
    }

    pub(crate) fn u32(&mut self) -> u32 {
        u32::from_be_bytes([self.u8(), self.u8(), self.u8(), self.u8()])
    }

    pub(crate) fn i32(&mut self) -> i32 {
        i32::from_be_bytes([self.u8(), self.u8(), self.u8(), self.u8()])
    }

    pub(crate) fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    /// Reads a code and maps it through `from_code`
    pub(crate) fn code<T>(
        &mut self,
        field: &'static str,
        from_code: impl FnOnce(u8) -> Option<T>,
    ) -> core::result::Result<T, ProtocolError> {
        let code = self.u8();
        from_code(code).ok_or(ProtocolError::InvalidCode {
            message: self.message,
            field,
            code: u32::from(code),
        })
    }

    /// 0/1 switch
    pub(crate) fn flag(&mut self, field: &'static str) -> core::result::Result<bool, ProtocolError> {
        self.code(field, |c| match c {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        })
    }

    /// Checks a value read from the payload against the range its setter accepts
    pub(crate) fn within<T: PartialOrd + Into<u32> + Copy>(
        &self,
        field: &'static str,
        value: T,
        range: core::ops::RangeInclusive<T>,
    ) -> core::result::Result<T, ProtocolError> {
        if range.contains(&value) {
            Ok(value)
        } else {
            Err(ProtocolError::InvalidCode {
                message: self.message,
                field,
                code: value.into(),
            })
        }
    }

    /// Byte that must stay within `max`
    pub(crate) fn bounded(
        &mut self,
        field: &'static str,
        max: u8,
    ) -> core::result::Result<u8, ProtocolError> {
        self.code(field, |c| if c <= max { Some(c) } else { None })
    }
}

pub(crate) fn check_range<T: PartialOrd>(
    value: T,
    range: core::ops::RangeInclusive<T>,
    what: &'static str,
) -> Result<T> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidArgument(what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_builder_big_endian() {
        let p = Payload::with_sub_id(0x65, 0x01)
            .u32(100_000)
            .u16(0x0102)
            .i16(-2)
            .i32(-500_000)
            .u8(1);
        assert_eq!(
            p.as_bytes(),
            &[
                0x65, 0x01, 0x00, 0x01, 0x86, 0xa0, 0x01, 0x02, 0xff, 0xfe, 0xff, 0xf8, 0x5e, 0xe0,
                0x01
            ]
        );
    }

    #[test]
    fn test_reader_checks_length() {
        assert_eq!(
            PayloadReader::new("test", &[0xbb, 0x00], 1, 5).err(),
            Some(ProtocolError::InvalidPayloadLen { expect: 5, got: 2 })
        );
    }

    #[test]
    fn test_reader_fields() {
        let payload = [0x64, 0x83, 0x01, 0x03, 0x07, 0xff, 0xff, 0xff, 0xfe];
        let mut r = PayloadReader::new("test", &payload, 2, payload.len()).unwrap();
        assert_eq!(r.flag("enable"), Ok(true));
        assert_eq!(r.bounded("status", 3), Ok(3));
        assert_eq!(
            r.flag("other"),
            Err(ProtocolError::InvalidCode {
                message: "test",
                field: "other",
                code: 7
            })
        );
        assert_eq!(r.i32(), -2);
    }

    #[test]
    fn test_save_target_codes() {
        assert_eq!(SaveTarget::from_code(2), Some(SaveTarget::Temporary));
        assert_eq!(SaveTarget::from_code(3), None);
        assert_eq!(SaveTarget::SramAndFlash.persistent_code(), Ok(1));
        assert!(SaveTarget::Temporary.persistent_code().is_err());
    }

    #[test]
    fn test_check_range() {
        assert_eq!(check_range(5u16, 5..=300, "pdop"), Ok(5));
        assert_eq!(
            check_range(301u16, 5..=300, "pdop"),
            Err(Error::InvalidArgument("pdop"))
        );
    }
}
