// mfreader/src/prelude.rs

pub use crate::protocol::{Command, Message, SectorTrailer};
pub use crate::reader::{CardListener, CardReader, CardReaderBuilder, ListenerId, ReaderConfig};
pub use crate::transport::{GepStreamTransport, MessageTransport, MockTransport};
pub use crate::{CardSnapshot, CardType, CommandFailure, Error, Key, KeyKind, Result, Uid};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, default_command_timeout, ms, parse_hex};
