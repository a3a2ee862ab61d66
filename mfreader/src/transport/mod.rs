// mfreader/src/transport/mod.rs

/// In-memory transport for tests
pub mod mock;
/// Serial port transport
#[cfg(feature = "serial")]
pub mod serial;
/// Framed transport over a byte stream
pub mod stream;
/// Transport trait
pub mod traits;

pub use mock::MockTransport;
pub use stream::GepStreamTransport;
pub use traits::{MessageHandler, MessageTransport};
