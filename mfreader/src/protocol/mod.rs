// mfreader/src/protocol/mod.rs

/// CRC-8 used by the stream framing
pub mod checksum;
/// Outbound commands
pub mod commands;
/// Stream framing
pub mod frame;
/// Inbound messages
pub mod messages;
/// Bounds-checked slicing helpers
pub mod parser;
/// Sector trailer layout
pub mod trailer;

pub use checksum::{crc8_update, frame_crc};
pub use commands::Command;
pub use frame::{Frame, FrameDecoder};
pub use messages::{Message, decode_card_detected, encode_card_detected};
pub use trailer::SectorTrailer;
