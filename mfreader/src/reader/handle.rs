// mfreader/src/reader/handle.rs

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use crate::protocol::{Command, Message, SectorTrailer};
use crate::reader::config::ReaderConfig;
use crate::reader::engine::{CorrelationEngine, Reply};
use crate::reader::presence::{CardListener, ListenerId, PresenceTracker};
use crate::transport::{MessageHandler, MessageTransport};
use crate::types::{CardSnapshot, CardType, KeyKind};
use crate::{CommandFailure, Error, Result};

struct Shared {
    transport: Arc<dyn MessageTransport>,
    engine: CorrelationEngine,
    presence: PresenceTracker,
    timeout: Mutex<Duration>,
    max_message_len: usize,
}

/// Synchronous handle to a card reader.
///
/// Cloning is cheap; every clone drives the same reader. Command methods
/// block the calling thread for at most the configured timeout and may be
/// called from any number of threads; commands are executed one at a time.
#[derive(Clone)]
pub struct CardReader {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for CardReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardReader")
            .field("card", &self.card())
            .field("timeout", &self.timeout())
            .finish()
    }
}

impl CardReader {
    /// Create a reader over `transport` with default settings.
    pub fn new(transport: Arc<dyn MessageTransport>) -> Self {
        Self::with_config(transport, ReaderConfig::default())
    }

    pub(crate) fn with_config(transport: Arc<dyn MessageTransport>, config: ReaderConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                transport,
                engine: CorrelationEngine::new(config.tag_ceiling),
                presence: PresenceTracker::new(),
                timeout: Mutex::new(config.timeout),
                max_message_len: config.max_message_len,
            }),
        }
    }

    /// Start the underlying transport and begin processing inbound messages.
    pub fn start(&self) -> Result<()> {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let handler: MessageHandler = Arc::new(move |tag: Option<u16>, payload: &[u8]| {
            if let Some(shared) = weak.upgrade() {
                CardReader { shared }.handle_message(tag, payload);
            }
        });
        self.shared.engine.open();
        self.shared.transport.start(handler)
    }

    /// Stop the transport. Commands waiting for the channel or for a
    /// response return `Interrupted`.
    pub fn stop(&self) -> Result<()> {
        self.shared.engine.close();
        self.shared.transport.stop()
    }

    /// Whether the transport is running.
    pub fn is_running(&self) -> bool {
        self.shared.transport.is_running()
    }

    /// Current command timeout.
    pub fn timeout(&self) -> Duration {
        *self.shared.timeout.lock()
    }

    /// Change the timeout used by commands started from now on.
    pub fn set_timeout(&self, timeout: Duration) {
        *self.shared.timeout.lock() = timeout;
    }

    /// Register a listener for card presence changes.
    pub fn add_card_listener<L>(&self, listener: L) -> ListenerId
    where
        L: CardListener + 'static,
    {
        self.shared.presence.add_listener(Arc::new(listener))
    }

    /// Returns false when `id` was not registered.
    pub fn remove_card_listener(&self, id: ListenerId) -> bool {
        self.shared.presence.remove_listener(id)
    }

    /// Type of the present card.
    pub fn card_type(&self) -> Option<CardType> {
        self.shared.presence.card_type()
    }

    /// Block count of the present card, 0 without a card.
    pub fn block_count(&self) -> u8 {
        self.shared.presence.block_count()
    }

    /// UID of the present card. The returned vector is a copy.
    pub fn card_uid(&self) -> Option<Vec<u8>> {
        self.shared.presence.uid()
    }

    /// Type, block count and UID of the present card, read atomically.
    pub fn card(&self) -> Option<CardSnapshot> {
        self.shared.presence.card()
    }

    /// Whether a card is on the reader.
    pub fn is_card_present(&self) -> bool {
        self.shared.presence.is_present()
    }

    /// Reset the card session.
    pub fn reset_card(&self) -> Result<()> {
        self.execute(&Command::reset()).map(|_| ())
    }

    /// Load key A. The key must be 6 bytes long.
    pub fn set_key_a(&self, key: &[u8]) -> Result<()> {
        self.set_key(KeyKind::A, key)
    }

    /// Load key B. The key must be 6 bytes long.
    pub fn set_key_b(&self, key: &[u8]) -> Result<()> {
        self.set_key(KeyKind::B, key)
    }

    /// Load the key selected by `kind`.
    pub fn set_key(&self, kind: KeyKind, key: &[u8]) -> Result<()> {
        self.execute(&Command::set_key(kind, key)?).map(|_| ())
    }

    /// Read block `block` (0..=255) and return its contents.
    pub fn read_block(&self, block: u32) -> Result<Vec<u8>> {
        self.execute(&Command::read_block(block)?)
    }

    /// Write `data` to block `block` (0..=255).
    pub fn write_block(&self, block: u32, data: &[u8]) -> Result<()> {
        self.execute(&Command::write_block(block, data)?).map(|_| ())
    }

    /// Read the trailer of `sector`. A response that is not exactly 17
    /// bytes long fails with [`CommandFailure::Malformed`].
    pub fn read_sector_trailer(&self, sector: u32) -> Result<SectorTrailer> {
        let body = self.execute(&Command::read_sector_trailer(sector)?)?;
        SectorTrailer::decode(&body).map_err(|e| {
            log::warn!("sector {} trailer response {:02x?}: {}", sector, body, e);
            Error::from(CommandFailure::Malformed)
        })
    }

    /// Write the trailer of `sector` (0..=255).
    pub fn write_sector_trailer(&self, sector: u32, trailer: &SectorTrailer) -> Result<()> {
        self.execute(&Command::write_sector_trailer(sector, trailer)?)
            .map(|_| ())
    }

    /// Execute an arbitrary command and return the response body.
    pub fn execute(&self, command: &Command) -> Result<Vec<u8>> {
        let message = command.encode();
        if message.len() > self.shared.max_message_len {
            return Err(Error::InvalidArgument(format!(
                "message of {} bytes exceeds the limit of {}",
                message.len(),
                self.shared.max_message_len
            )));
        }
        self.shared
            .engine
            .execute(&*self.shared.transport, &message, self.timeout())
    }

    /// Entry point for every inbound message.
    fn handle_message(&self, tag: Option<u16>, payload: &[u8]) {
        log::trace!("message in: tag={:?} payload={:02x?}", tag, payload);
        let message = match Message::parse(payload) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("ignoring inbound message {:02x?}: {}", payload, e);
                return;
            }
        };

        let mut dispatch = |listeners: &[Arc<dyn CardListener>], present: bool| {
            for listener in listeners {
                listener.card_changed(self, present);
            }
        };

        match message {
            Message::CommandOk(body) => {
                self.shared.engine.complete(tag, Reply::Ok(body.to_vec()));
            }
            Message::CommandFailed => {
                self.shared.engine.complete(tag, Reply::Failed);
            }
            Message::CardDetected(body) => {
                self.shared.presence.handle_card_detected(body, &mut dispatch)
            }
            Message::CardRemoved => self.shared.presence.handle_card_removed(&mut dispatch),
        }
    }
}
