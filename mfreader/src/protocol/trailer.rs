// mfreader/src/protocol/trailer.rs

use crate::constants::SECTOR_TRAILER_LEN;
use crate::protocol::parser::{byte_at, ensure_exact_len, slice_at};
use crate::types::Key;
use crate::Result;

/// Sector trailer: both keys, the access bits and the general purpose byte.
///
/// Wire layout (17 bytes) used both for reading and writing:
/// access_flags(4) + key_a(6) + key_b(6) + general_purpose_byte(1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectorTrailer {
    /// Key A
    pub key_a: Key,
    /// Key B
    pub key_b: Key,
    /// Access bits, as stored on the card
    pub access_flags: [u8; 4],
    /// User data byte
    pub general_purpose_byte: u8,
}

impl SectorTrailer {
    /// Assemble a trailer from its parts.
    pub fn new(key_a: Key, key_b: Key, access_flags: [u8; 4], general_purpose_byte: u8) -> Self {
        Self {
            key_a,
            key_b,
            access_flags,
            general_purpose_byte,
        }
    }

    /// Wire form used by WRITE_SECTOR_TRAILER.
    pub fn encode(&self) -> [u8; SECTOR_TRAILER_LEN] {
        let mut out = [0u8; SECTOR_TRAILER_LEN];
        out[0..4].copy_from_slice(&self.access_flags);
        out[4..10].copy_from_slice(self.key_a.as_bytes());
        out[10..16].copy_from_slice(self.key_b.as_bytes());
        out[16] = self.general_purpose_byte;
        out
    }

    /// Decode a READ_SECTOR_TRAILER response body. Anything other than
    /// exactly 17 bytes is rejected.
    pub fn decode(data: &[u8]) -> Result<Self> {
        ensure_exact_len(data, SECTOR_TRAILER_LEN)?;
        let mut access_flags = [0u8; 4];
        access_flags.copy_from_slice(slice_at(data, 0, 4)?);
        Ok(Self {
            key_a: Key::try_from(slice_at(data, 4, 6)?)?,
            key_b: Key::try_from(slice_at(data, 10, 6)?)?,
            access_flags,
            general_purpose_byte: byte_at(data, 16)?,
        })
    }
}
