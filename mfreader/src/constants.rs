// mfreader/src/constants.rs
//! Common protocol constants used across the crate

/// Command codes understood by the reader firmware.
pub mod command_code {
    /// Reset the card session (no parameters)
    pub const RESET: u8 = 1;
    /// Load key A or key B used to authenticate following operations
    pub const SET_KEY: u8 = 2;
    /// Read one 16-byte block
    pub const READ_BLOCK: u8 = 3;
    /// Write one block
    pub const WRITE_BLOCK: u8 = 4;
    /// Read the trailer of a sector
    pub const READ_SECTOR_TRAILER: u8 = 5;
    /// Write the trailer of a sector
    pub const WRITE_SECTOR_TRAILER: u8 = 6;
}

/// Codes of messages sent by the reader (first payload byte).
pub mod message_code {
    /// Response to a successfully completed command
    pub const COMMAND_OK: u8 = 1;
    /// Response to a failed command
    pub const COMMAND_FAILED: u8 = 2;
    /// Unsolicited notification: a new card entered the field
    pub const CARD_DETECTED: u8 = 3;
    /// Unsolicited notification: the card left the field
    pub const CARD_REMOVED: u8 = 4;
}

/// Tags cycle through `1..=DEFAULT_TAG_CEILING`.
pub const DEFAULT_TAG_CEILING: u16 = 10_000;

/// Default command timeout in milliseconds.
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 500;

/// Maximum length of a message body exchanged with the reader.
pub const MAX_MESSAGE_LENGTH: usize = 50;

/// Key selector byte for key A / key B in a SET_KEY payload.
pub const KEY_SELECTOR_A: u8 = 1;
/// Key selector byte for key B.
pub const KEY_SELECTOR_B: u8 = 2;

/// Length of a MIFARE Classic key.
pub const KEY_LEN: usize = 6;

/// Length of an encoded sector trailer (flags + key A + key B + GPB).
pub const SECTOR_TRAILER_LEN: usize = 17;

/// GEP framing: byte starting every frame
pub const GEP_START_BYTE: u8 = 0x0C;

/// GEP framing: end of a frame without tag
pub const GEP_END_BYTE: u8 = 0x03;

/// GEP framing: end of a frame carrying a 16-bit tag
pub const GEP_END_WITH_TAG_BYTE: u8 = 0x06;

/// Destination id used when talking to the reader (broadcast).
pub const GEP_BROADCAST_ID: u8 = 0;
