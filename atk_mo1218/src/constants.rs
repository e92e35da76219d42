pub const BIN_START_CHAR_1: u8 = 0xa0;
pub const BIN_START_CHAR_2: u8 = 0xa1;
pub const BIN_END_CHAR_1: u8 = 0x0d;
pub const BIN_END_CHAR_2: u8 = 0x0a;

pub(crate) const BIN_START_LEN: usize = 2;
pub(crate) const BIN_PAYLOAD_SIZE_LEN: usize = 2;
pub(crate) const BIN_CHECKSUM_LEN: usize = 1;
pub(crate) const BIN_END_LEN: usize = 2;
pub(crate) const BIN_HEADER_LEN: usize = BIN_START_LEN + BIN_PAYLOAD_SIZE_LEN;
pub(crate) const BIN_OVERHEAD_LEN: usize = BIN_HEADER_LEN + BIN_CHECKSUM_LEN + BIN_END_LEN;

/// Largest payload (message ID included) the receiver accepts
pub const BIN_MAX_PAYLOAD_LEN: usize = 0x57;
/// Largest complete binary frame
pub const BIN_MAX_FRAME_LEN: usize = BIN_OVERHEAD_LEN + BIN_MAX_PAYLOAD_LEN;

/// ACK frame answering a plain message: [0x83, id]
pub(crate) const BIN_ACK_FRAME_LEN: usize = BIN_OVERHEAD_LEN + 2;
/// ACK frame answering a sub-ID message: [0x83, id, sid]
pub(crate) const BIN_ACK_SID_FRAME_LEN: usize = BIN_OVERHEAD_LEN + 3;

pub(crate) const DEFAULT_ACK_TIMEOUT_TICKS: u32 = 50;
pub(crate) const DEFAULT_ACK_TICK_MS: u32 = 100;
pub(crate) const DEFAULT_UPDATE_TICK_MS: u32 = 1;

pub const NMEA_SYNC_CHAR: u8 = 0x24; // '$'
pub const NMEA_END_CHAR_1: u8 = 0x0d; // '\r' (<CR>)
pub const NMEA_END_CHAR_2: u8 = 0x0a; // '\n' (<LF>)
pub(crate) const NMEA_FIELD_SEPARATOR: u8 = b',';
pub(crate) const NMEA_CHECKSUM_SEPARATOR: u8 = b'*';
pub(crate) const NMEA_ADDRESS_LEN: usize = 5; // talker (2) + sentence type (3)

/// Capacity of the satellite tables filled from GSA/GSV sentences
pub const MAX_SATELLITES: usize = 12;
pub(crate) const GSV_SATELLITES_PER_SENTENCE: usize = 4;

/// Receive buffer size of the serial transport
#[cfg(feature = "serial")]
pub(crate) const SERIAL_RX_BUF_SIZE: usize = 2048;

pub(crate) const MID_ACK: u8 = 0x83;
pub(crate) const MID_NACK: u8 = 0x84;
