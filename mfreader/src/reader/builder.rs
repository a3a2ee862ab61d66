// mfreader/src/reader/builder.rs

use std::sync::Arc;
use std::time::Duration;

use crate::reader::config::ReaderConfig;
use crate::reader::handle::CardReader;
use crate::transport::MessageTransport;
use crate::{Error, Result};

/// Helper to construct a CardReader with optional configuration.
#[derive(Default)]
pub struct CardReaderBuilder {
    transport: Option<Arc<dyn MessageTransport>>,
    config: ReaderConfig,
}

impl CardReaderBuilder {
    /// Builder with default configuration and no transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide the transport the reader talks through (e.g. MockTransport)
    pub fn with_transport(mut self, transport: Arc<dyn MessageTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Command timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Largest tag before wrapping back to 1.
    pub fn tag_ceiling(mut self, ceiling: u16) -> Self {
        self.config.tag_ceiling = ceiling;
        self
    }

    /// Longest outbound message accepted.
    pub fn max_message_len(mut self, len: usize) -> Self {
        self.config.max_message_len = len;
        self
    }

    /// Consume the builder and return a reader that is not started yet.
    pub fn build(self) -> Result<CardReader> {
        self.config.validate()?;
        match self.transport {
            Some(t) => Ok(CardReader::with_config(t, self.config)),
            None => Err(Error::InvalidArgument("no transport configured".into())),
        }
    }
}
