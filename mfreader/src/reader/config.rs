// mfreader/src/reader/config.rs

use std::time::Duration;

use crate::constants::{DEFAULT_TAG_CEILING, MAX_MESSAGE_LENGTH};
use crate::utils::default_command_timeout;
use crate::{Error, Result};

/// Tunables of a [`CardReader`](crate::reader::CardReader).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ReaderConfig {
    /// Upper bound on how long a command call blocks, covering both the
    /// wait for a free channel and the wait for the response.
    #[cfg_attr(feature = "serde", serde(rename = "timeout_ms", with = "duration_ms"))]
    pub timeout: Duration,
    /// Tags cycle through `1..=tag_ceiling`.
    pub tag_ceiling: u16,
    /// Longest outbound message (command code included) the reader accepts.
    pub max_message_len: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            timeout: default_command_timeout(),
            tag_ceiling: DEFAULT_TAG_CEILING,
            max_message_len: MAX_MESSAGE_LENGTH,
        }
    }
}

impl ReaderConfig {
    /// Reject zero tag ceiling or message length.
    pub fn validate(&self) -> Result<()> {
        if self.tag_ceiling == 0 {
            return Err(Error::InvalidArgument("tag ceiling must be at least 1".into()));
        }
        if self.max_message_len == 0 {
            return Err(Error::InvalidArgument(
                "maximum message length must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
