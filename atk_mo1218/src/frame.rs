//! Binary message envelope
//!
//! ```text
//! +------+------+----------+---------------------+----+------+------+
//! | 0xA0 | 0xA1 | len (BE) | payload (len bytes) | CS | 0x0D | 0x0A |
//! +------+------+----------+---------------------+----+------+------+
//! ```
//!
//! The first payload byte is the message ID, messages of the `0x62..=0x65`
//! family carry a sub-ID in the second byte. `CS` is the XOR of every payload
//! byte.

use crate::{
    constants::{
        BIN_END_CHAR_1, BIN_END_CHAR_2, BIN_HEADER_LEN, BIN_MAX_FRAME_LEN, BIN_MAX_PAYLOAD_LEN,
        BIN_OVERHEAD_LEN, BIN_START_CHAR_1, BIN_START_CHAR_2, BIN_START_LEN,
    },
    error::{Error, ProtocolError},
};

use checksum::{xor_checksum, XorChecksumCalc};

mod checksum;

/// Fixed-capacity buffer holding one encoded frame
#[derive(Clone)]
pub struct FrameBuf {
    buf: [u8; BIN_MAX_FRAME_LEN],
    len: usize,
}

impl FrameBuf {
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len
    }
}

impl core::fmt::Debug for FrameBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("FrameBuf").field(&self.as_bytes()).finish()
    }
}

/// Wrap `payload` into a complete wire frame
pub fn encode(payload: &[u8]) -> Result<FrameBuf, Error> {
    if payload.is_empty() {
        return Err(Error::InvalidArgument("payload must carry a message ID"));
    }
    let frame_len = BIN_OVERHEAD_LEN + payload.len();
    if frame_len > BIN_MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLong { len: frame_len }.into());
    }

    let mut buf = [0u8; BIN_MAX_FRAME_LEN];
    buf[0] = BIN_START_CHAR_1;
    buf[1] = BIN_START_CHAR_2;
    // Bounded by BIN_MAX_PAYLOAD_LEN above, fits in u16
    buf[BIN_START_LEN..BIN_HEADER_LEN].copy_from_slice(&(payload.len() as u16).to_be_bytes());
    buf[BIN_HEADER_LEN..BIN_HEADER_LEN + payload.len()].copy_from_slice(payload);

    let cs_offset = BIN_HEADER_LEN + payload.len();
    buf[cs_offset] = xor_checksum(payload);
    buf[cs_offset + 1] = BIN_END_CHAR_1;
    buf[cs_offset + 2] = BIN_END_CHAR_2;

    Ok(FrameBuf {
        buf,
        len: frame_len,
    })
}

/// Borrowed view of a validated frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRef<'a> {
    payload: &'a [u8],
}

impl<'a> FrameRef<'a> {
    pub fn message_id(&self) -> u8 {
        self.payload[0]
    }

    /// Second payload byte, meaningful for sub-ID messages only
    pub fn sub_id(&self) -> Option<u8> {
        self.payload.get(1).copied()
    }

    /// Payload including the message ID
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Payload after the message ID
    pub fn body(&self) -> &'a [u8] {
        &self.payload[1..]
    }

    /// Number of wire bytes this frame occupied
    pub fn frame_len(&self) -> usize {
        BIN_OVERHEAD_LEN + self.payload.len()
    }
}

/// Validate the frame at the start of `data`. Trailing bytes after the end
/// marker are ignored, the receiver often sends an ACK and a response back to
/// back in one capture.
pub fn decode(data: &[u8]) -> Result<FrameRef<'_>, ProtocolError> {
    if data.len() < BIN_HEADER_LEN {
        return Err(ProtocolError::Truncated {
            need: BIN_HEADER_LEN,
            got: data.len(),
        });
    }
    if data[0] != BIN_START_CHAR_1 || data[1] != BIN_START_CHAR_2 {
        return Err(ProtocolError::InvalidStartMarker);
    }

    let pack_len = usize::from(u16::from_be_bytes([data[2], data[3]]));
    if pack_len == 0 || pack_len > BIN_MAX_PAYLOAD_LEN {
        return Err(ProtocolError::InvalidPayloadLen {
            expect: BIN_MAX_PAYLOAD_LEN,
            got: pack_len,
        });
    }
    let frame_len = BIN_OVERHEAD_LEN + pack_len;
    if data.len() < frame_len {
        return Err(ProtocolError::Truncated {
            need: frame_len,
            got: data.len(),
        });
    }

    let cs_offset = BIN_HEADER_LEN + pack_len;
    if data[cs_offset + 1] != BIN_END_CHAR_1 || data[cs_offset + 2] != BIN_END_CHAR_2 {
        return Err(ProtocolError::InvalidEndMarker);
    }

    let payload = &data[BIN_HEADER_LEN..cs_offset];
    let mut calc = XorChecksumCalc::new();
    calc.update(payload);
    calc.validate_result(data[cs_offset])?;

    Ok(FrameRef { payload })
}
