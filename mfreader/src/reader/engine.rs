// mfreader/src/reader/engine.rs

//! Correlates tagged responses with the single command in flight.
//!
//! At most one command occupies the slot at a time. Callers queue on a
//! condition variable until the slot is free, fill it with a fresh tag,
//! send, and wait for the matching response. Every wait is bounded by a
//! deadline fixed when the call starts.

use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::error::CommandFailure;
use crate::transport::MessageTransport;
use crate::utils::Deadline;
use crate::Result;

/// Response delivered for the command in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// COMMAND_OK with its (possibly empty) body
    Ok(Vec<u8>),
    /// COMMAND_FAILED
    Failed,
}

#[derive(Debug)]
struct EngineState {
    /// Tag of the command in flight; None when the slot is free
    slot: Option<u16>,
    reply: Option<Reply>,
    tag_counter: u16,
    closed: bool,
}

impl EngineState {
    fn next_tag(&mut self, ceiling: u16) -> u16 {
        self.tag_counter = if self.tag_counter >= ceiling {
            1
        } else {
            self.tag_counter + 1
        };
        self.tag_counter
    }

    fn release(&mut self) {
        self.slot = None;
        self.reply = None;
    }
}

/// Single-slot command correlator shared by all callers of a reader.
pub struct CorrelationEngine {
    state: Mutex<EngineState>,
    cond: Condvar,
    tag_ceiling: u16,
}

impl CorrelationEngine {
    /// Engine whose tags cycle through `1..=tag_ceiling`.
    pub fn new(tag_ceiling: u16) -> Self {
        Self {
            state: Mutex::new(EngineState {
                slot: None,
                reply: None,
                tag_counter: 0,
                closed: false,
            }),
            cond: Condvar::new(),
            tag_ceiling: tag_ceiling.max(1),
        }
    }

    /// Send `message` and block until its response arrives or `timeout`
    /// elapses. The slot is released on every return path.
    pub fn execute(
        &self,
        transport: &dyn MessageTransport,
        message: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let deadline = Deadline::after(timeout);
        let mut state = self.state.lock();

        while state.slot.is_some() {
            if state.closed {
                return Err(CommandFailure::Interrupted.into());
            }
            if self
                .cond
                .wait_until(&mut state, deadline.instant())
                .timed_out()
                && state.slot.is_some()
            {
                log::debug!("command slot still busy at deadline, giving up");
                return Err(CommandFailure::Busy.into());
            }
        }
        if state.closed {
            return Err(CommandFailure::Interrupted.into());
        }

        let tag = state.next_tag(self.tag_ceiling);
        state.slot = Some(tag);
        state.reply = None;

        let sent = MutexGuard::unlocked(&mut state, || transport.send(tag, message));
        if let Err(e) = sent {
            log::warn!("sending command tag={} failed: {}", tag, e);
            state.release();
            self.cond.notify_all();
            return Err(CommandFailure::Send.into());
        }
        log::debug!("command sent: tag={} message={:02x?}", tag, message);

        let outcome = self.await_reply(&mut state, deadline);
        state.release();
        self.cond.notify_all();

        match &outcome {
            Ok(body) => log::debug!("command tag={} completed ({} bytes)", tag, body.len()),
            Err(e) => log::debug!("command tag={} ended without result: {}", tag, e),
        }
        outcome
    }

    fn await_reply(
        &self,
        state: &mut MutexGuard<'_, EngineState>,
        deadline: Deadline,
    ) -> Result<Vec<u8>> {
        loop {
            match state.reply.take() {
                Some(Reply::Ok(body)) => return Ok(body),
                Some(Reply::Failed) => return Err(CommandFailure::Rejected.into()),
                None => {}
            }
            if state.closed {
                return Err(CommandFailure::Interrupted.into());
            }
            if self.cond.wait_until(state, deadline.instant()).timed_out()
                && state.reply.is_none()
            {
                return Err(CommandFailure::Timeout.into());
            }
        }
    }

    /// Hand a response to the waiting caller. Returns false when `tag` does
    /// not belong to the command in flight; such responses are dropped.
    pub fn complete(&self, tag: Option<u16>, reply: Reply) -> bool {
        let mut state = self.state.lock();
        match (state.slot, tag) {
            (Some(current), Some(tag)) if current == tag && state.reply.is_none() => {
                state.reply = Some(reply);
                self.cond.notify_all();
                true
            }
            (current, tag) => {
                log::warn!(
                    "dropping response with tag {:?} (in flight: {:?})",
                    tag,
                    current
                );
                false
            }
        }
    }

    /// Fail current and future waits with `Interrupted` until reopened.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.cond.notify_all();
    }

    /// Accept commands again after `close`.
    pub fn open(&self) {
        self.state.lock().closed = false;
    }

    /// Whether a command currently occupies the slot.
    pub fn is_busy(&self) -> bool {
        self.state.lock().slot.is_some()
    }

    /// Tag of the command in flight, if any.
    pub fn in_flight_tag(&self) -> Option<u16> {
        self.state.lock().slot
    }
}
