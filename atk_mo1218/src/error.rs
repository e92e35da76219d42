use core::fmt;

/// Structural failures of binary frames, NMEA sentences and responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    InvalidStartMarker,
    InvalidEndMarker,
    InvalidPayloadLen {
        expect: usize,
        got: usize,
    },
    InvalidChecksum {
        expect: u8,
        got: u8,
    },
    FrameTooLong {
        len: usize,
    },
    /// Fewer bytes than the frame or message layout requires
    Truncated {
        need: usize,
        got: usize,
    },
    /// The receiver refused the request
    Nack {
        id: u8,
    },
    UnexpectedMessage {
        expect: u8,
        got: u8,
    },
    InvalidField {
        message: &'static str,
        field: &'static str,
    },
    /// A response carried a numeric code outside the documented set
    InvalidCode {
        message: &'static str,
        field: &'static str,
        code: u32,
    },
    MissingField {
        index: usize,
    },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidStartMarker => f.write_str("Invalid frame start marker"),
            ProtocolError::InvalidEndMarker => f.write_str("Invalid frame end marker"),
            ProtocolError::InvalidPayloadLen { expect, got } => write!(
                f,
                "Invalid payload length, expect {}, got {}",
                expect, got
            ),
            ProtocolError::InvalidChecksum { expect, got } => write!(
                f,
                "Not valid frame checksum, expect {:x}, got {:x}",
                expect, got
            ),
            ProtocolError::FrameTooLong { len } => {
                write!(f, "Frame of {} bytes exceeds the frame buffer", len)
            },
            ProtocolError::Truncated { need, got } => {
                write!(f, "Truncated data, need {} bytes, got {}", need, got)
            },
            ProtocolError::Nack { id } => write!(f, "Message {:#04x} was not acknowledged", id),
            ProtocolError::UnexpectedMessage { expect, got } => write!(
                f,
                "Unexpected message, expect {:#04x}, got {:#04x}",
                expect, got
            ),
            ProtocolError::InvalidField { message, field } => {
                write!(f, "Invalid field {} of message {}", field, message)
            },
            ProtocolError::InvalidCode {
                message,
                field,
                code,
            } => write!(
                f,
                "Unknown code {} in field {} of message {}",
                code, field, message
            ),
            ProtocolError::MissingField { index } => {
                write!(f, "Sentence has no field at index {}", index)
            },
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProtocolError {}

/// Error returned by every driver operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Caller supplied a value outside the legal set; detected before any I/O
    InvalidArgument(&'static str),
    Protocol(ProtocolError),
    /// The bounded wait ran out of ticks
    Timeout,
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(what) => write!(f, "Invalid argument: {}", what),
            Error::Protocol(e) => write!(f, "Protocol error: {}", e),
            Error::Timeout => f.write_str("Timed out waiting for the receiver"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Protocol(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeError {
    InvalidDate,
    InvalidTime,
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeError::InvalidDate => f.write_str("invalid date"),
            DateTimeError::InvalidTime => f.write_str("invalid time"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DateTimeError {}
