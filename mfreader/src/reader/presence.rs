// mfreader/src/reader/presence.rs

//! Card presence state machine and listener registry.
//!
//! State and listeners share one lock. Transitions are applied under the
//! lock, the listener set is copied, and callbacks run after the lock is
//! released.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::protocol::decode_card_detected;
use crate::reader::CardReader;
use crate::types::{CardSnapshot, CardType};

/// Receives card presence changes.
pub trait CardListener: Send + Sync {
    /// Invoked when presence of a card changed.
    fn card_changed(&self, reader: &CardReader, card_present: bool);
}

impl<F> CardListener for F
where
    F: Fn(&CardReader, bool) + Send + Sync,
{
    fn card_changed(&self, reader: &CardReader, card_present: bool) {
        self(reader, card_present)
    }
}

/// Handle returned on registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Listener set copied out of the registry for one dispatch.
pub type ListenerSnapshot = Vec<Arc<dyn CardListener>>;

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(ListenerId, Arc<dyn CardListener>)>,
}

impl ListenerRegistry {
    fn register(&mut self, listener: Arc<dyn CardListener>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push((id, listener));
        id
    }

    fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    fn snapshot(&self) -> ListenerSnapshot {
        self.entries.iter().map(|(_, l)| l.clone()).collect()
    }
}

#[derive(Default)]
struct PresenceState {
    card: Option<CardSnapshot>,
    listeners: ListenerRegistry,
}

/// Tracks the card on the reader and who to tell when it changes.
#[derive(Default)]
pub struct PresenceTracker {
    state: Mutex<PresenceState>,
}

impl PresenceTracker {
    /// Empty tracker without card or listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; the returned id unregisters it.
    pub fn add_listener(&self, listener: Arc<dyn CardListener>) -> ListenerId {
        self.state.lock().listeners.register(listener)
    }

    /// Returns false when `id` was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.state.lock().listeners.unregister(id)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.entries.len()
    }

    /// Snapshot of the present card.
    pub fn card(&self) -> Option<CardSnapshot> {
        self.state.lock().card.clone()
    }

    /// Type of the present card.
    pub fn card_type(&self) -> Option<CardType> {
        self.state.lock().card.as_ref().map(|c| c.card_type)
    }

    /// Number of blocks of the present card, 0 without a card.
    pub fn block_count(&self) -> u8 {
        self.state.lock().card.as_ref().map_or(0, |c| c.block_count)
    }

    /// Copy of the present card's UID.
    pub fn uid(&self) -> Option<Vec<u8>> {
        self.state.lock().card.as_ref().map(|c| c.uid.to_vec())
    }

    /// Whether a card is present.
    pub fn is_present(&self) -> bool {
        self.state.lock().card.is_some()
    }

    /// Handle a CARD_DETECTED body (`type, block_count, uid...`).
    ///
    /// A present card is always reported removed first. Bodies too short to
    /// carry type and block count are ignored without touching the state;
    /// an unknown type code leaves the reader without a card.
    pub fn handle_card_detected(
        &self,
        body: &[u8],
        dispatch: &mut dyn FnMut(&[Arc<dyn CardListener>], bool),
    ) {
        if body.len() < 2 {
            log::warn!("ignoring truncated card notification {:02x?}", body);
            return;
        }

        self.handle_card_removed(dispatch);

        let listeners = {
            let mut state = self.state.lock();
            let card = match decode_card_detected(body) {
                Ok(card) => card,
                Err(e) => {
                    log::warn!("ignoring card notification {:02x?}: {}", body, e);
                    return;
                }
            };
            log::debug!(
                "card detected: {} uid={} blocks={}",
                card.card_type,
                card.uid.to_hex(),
                card.block_count
            );
            state.card = Some(card);
            state.listeners.snapshot()
        };

        dispatch(&listeners, true);
    }

    /// Handle a CARD_REMOVED notification. No-op without a card.
    pub fn handle_card_removed(&self, dispatch: &mut dyn FnMut(&[Arc<dyn CardListener>], bool)) {
        let listeners = {
            let mut state = self.state.lock();
            match state.card.take() {
                Some(card) => log::debug!("card removed: uid={}", card.uid.to_hex()),
                None => return,
            }
            state.listeners.snapshot()
        };

        dispatch(&listeners, false);
    }
}
