// mfreader/src/error.rs

use thiserror::Error;

use derive_more::Display;

/// Reason a command produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CommandFailure {
    /// Another command held the channel until the deadline passed
    #[display(fmt = "channel busy")]
    Busy,
    /// The command was sent but no matching response arrived in time
    #[display(fmt = "response timed out")]
    Timeout,
    /// The transport refused to send the message
    #[display(fmt = "transport send failed")]
    Send,
    /// The reader answered with COMMAND_FAILED
    #[display(fmt = "rejected by reader")]
    Rejected,
    /// The reader answered, but the response body could not be decoded
    #[display(fmt = "malformed response")]
    Malformed,
    /// The wait was cut short because the reader was stopped
    #[display(fmt = "interrupted")]
    Interrupted,
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// A caller supplied argument is out of range; nothing was sent
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A command ended without a result
    #[error("command failed: {0}")]
    Command(CommandFailure),

    /// A byte sequence had the wrong length
    #[error("invalid packet length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Required length
        expected: usize,
        /// Length received
        actual: usize,
    },

    /// A frame CRC did not match its contents
    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch {
        /// CRC computed over the frame
        expected: u8,
        /// CRC byte received
        actual: u8,
    },

    /// A byte sequence is not a valid frame
    #[error("frame format error: {0}")]
    FrameFormat(String),

    /// A card notification carried an unknown card type code
    #[error("unknown card type code: {0}")]
    UnknownCardType(u8),

    /// An inbound message carried an unknown message code
    #[error("unknown message code: {0:#04x}")]
    UnknownMessage(u8),

    /// The transport failed
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport has not been started
    #[error("transport not started")]
    NotStarted,

    /// The transport is already running
    #[error("transport already started")]
    AlreadyStarted,

    /// I/O error from the underlying stream
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // シリアル実装は feature で有効化する
    /// Error opening or configuring a serial port
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl Error {
    /// True for every outcome the reader reports as "no result". Every
    /// [`CommandFailure`] collapses here, including a response body that
    /// failed to decode.
    pub fn is_no_result(&self) -> bool {
        matches!(self, Error::Command(_))
    }

    /// The failure cause, if this error is a failed command.
    pub fn command_failure(&self) -> Option<CommandFailure> {
        match self {
            Error::Command(f) => Some(*f),
            _ => None,
        }
    }
}

impl From<CommandFailure> for Error {
    fn from(f: CommandFailure) -> Self {
        Error::Command(f)
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
