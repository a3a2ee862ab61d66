//! Timeout helpers used across the crate.
//!
//! Blocking waits are bounded by a [`Deadline`] fixed once per call, so a
//! wait interrupted by spurious wakeups never extends the caller's timeout.

use std::time::{Duration, Instant};

use crate::constants::DEFAULT_COMMAND_TIMEOUT_MS;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Default command timeout as Duration.
pub fn default_command_timeout() -> Duration {
    ms(DEFAULT_COMMAND_TIMEOUT_MS)
}

/// Absolute point in monotonic time after which a wait gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Instant);

impl Deadline {
    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self::from_start(Instant::now(), timeout)
    }

    /// Deadline `timeout` after `start`.
    pub fn from_start(start: Instant, timeout: Duration) -> Self {
        // Saturate absurdly large timeouts instead of overflowing Instant
        let at = start
            .checked_add(timeout)
            .unwrap_or_else(|| start + Duration::from_secs(60 * 60 * 24 * 365));
        Self(at)
    }

    /// The deadline as an instant.
    pub fn instant(&self) -> Instant {
        self.0
    }

    /// Time left, or None once the deadline has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.0
            .checked_duration_since(Instant::now())
            .filter(|d| !d.is_zero())
    }

    /// Whether the deadline has passed.
    pub fn expired(&self) -> bool {
        self.remaining().is_none()
    }
}
