// mfreader/src/transport/traits.rs

use std::sync::Arc;

use crate::Result;

/// Callback invoked for every inbound message, from the transport's own
/// delivery context. The tag is `None` for untagged messages.
pub type MessageHandler = Arc<dyn Fn(Option<u16>, &[u8]) + Send + Sync>;

/// Transport trait abstracts the tagged message channel away from the
/// reader logic.
///
/// Implementations must tolerate `send` being called from several threads
/// and must deliver inbound messages asynchronously to the handler given
/// to `start`.
pub trait MessageTransport: Send + Sync {
    /// Open the channel and begin delivering inbound messages to `handler`.
    fn start(&self, handler: MessageHandler) -> Result<()>;

    /// Close the channel. No messages are delivered once this returns.
    fn stop(&self) -> Result<()>;

    /// Send a message carrying `tag`.
    fn send(&self, tag: u16, payload: &[u8]) -> Result<()>;

    /// Whether `start` has been called without a matching `stop`.
    fn is_running(&self) -> bool;
}
