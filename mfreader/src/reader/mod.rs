// mfreader/src/reader/mod.rs

//! Synchronous reader API on top of a message transport.

/// Reader construction
pub mod builder;
/// Reader settings
pub mod config;
pub mod engine;
/// The `CardReader` handle
pub mod handle;
pub mod presence;

pub use builder::CardReaderBuilder;
pub use config::ReaderConfig;
pub use engine::{CorrelationEngine, Reply};
pub use handle::CardReader;
pub use presence::{CardListener, ListenerId, PresenceTracker};
