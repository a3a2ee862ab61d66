// mfreader/src/lib.rs

//! mfreader
//!
//! Pure Rust driver for MIFARE card readers that speak a tagged message
//! protocol. Commands are issued synchronously while card presence is
//! reported asynchronously to registered listeners.
#![warn(missing_docs)]

pub mod constants;
/// Error types
pub mod error;
/// Commonly used items
pub mod prelude;
/// Wire format: commands, messages and framing
pub mod protocol;
pub mod reader;
pub mod test_support;
/// Message transports the reader talks through
pub mod transport;
/// Card, key and UID types
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
