// mfreader/src/transport/mock.rs

use parking_lot::Mutex;

use crate::transport::traits::{MessageHandler, MessageTransport};
use crate::{Error, Result};

/// Produces the reply for a sent `(tag, payload)`; `None` means the
/// simulated reader stays silent.
pub type Responder = Box<dyn FnMut(u16, &[u8]) -> Option<Vec<u8>> + Send>;

#[derive(Default)]
struct MockState {
    handler: Option<MessageHandler>,
    running: bool,
    sent: Vec<(u16, Vec<u8>)>,
    /// Testing hook: number of send calls that should fail
    send_failures: usize,
    responder: Option<Responder>,
}

/// Mock transport for unit tests. It records sent messages, can fail sends
/// on demand, and lets tests inject inbound messages with `deliver`.
#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    /// Stopped mock without responder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many subsequent send calls should fail (for tests).
    pub fn set_send_failures(&self, n: usize) {
        self.state.lock().send_failures = n;
    }

    /// Install a responder that answers sent commands. Replies are
    /// delivered with the command's tag.
    pub fn set_responder(&self, responder: Responder) {
        self.state.lock().responder = Some(responder);
    }

    /// Remove the responder; sends go unanswered.
    pub fn clear_responder(&self) {
        self.state.lock().responder = None;
    }

    /// Snapshot of every `(tag, payload)` sent so far.
    pub fn sent(&self) -> Vec<(u16, Vec<u8>)> {
        self.state.lock().sent.clone()
    }

    /// Remove and return the most recent send.
    pub fn pop_sent(&self) -> Option<(u16, Vec<u8>)> {
        self.state.lock().sent.pop()
    }

    /// Tag of the most recent send.
    pub fn last_tag(&self) -> Option<u16> {
        self.state.lock().sent.last().map(|(tag, _)| *tag)
    }

    /// Deliver an inbound message to the registered handler, as the real
    /// transport would from its receive context. Dropped when stopped.
    pub fn deliver(&self, tag: Option<u16>, payload: &[u8]) {
        let handler = {
            let state = self.state.lock();
            if !state.running {
                log::trace!("mock transport stopped, dropping message {:?}", payload);
                return;
            }
            state.handler.clone()
        };
        if let Some(handler) = handler {
            handler(tag, payload);
        }
    }
}

impl MessageTransport for MockTransport {
    fn start(&self, handler: MessageHandler) -> Result<()> {
        let mut state = self.state.lock();
        if state.running {
            return Err(Error::AlreadyStarted);
        }
        state.handler = Some(handler);
        state.running = true;
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.running = false;
        state.handler = None;
        Ok(())
    }

    fn send(&self, tag: u16, payload: &[u8]) -> Result<()> {
        let reply = {
            let mut state = self.state.lock();
            if !state.running {
                return Err(Error::NotStarted);
            }
            if state.send_failures > 0 {
                state.send_failures -= 1;
                return Err(Error::Transport("simulated send failure".into()));
            }
            state.sent.push((tag, payload.to_vec()));
            state.responder.as_mut().and_then(|r| r(tag, payload))
        };

        // Reply outside the state lock so the handler may call back in.
        if let Some(reply) = reply {
            self.deliver(Some(tag), &reply);
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.state.lock().running
    }
}
