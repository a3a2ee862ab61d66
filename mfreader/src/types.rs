// mfreader/src/types.rs

use crate::Error;
use crate::constants::{KEY_LEN, KEY_SELECTOR_A, KEY_SELECTOR_B};
use derive_more::{Display, From};
use std::convert::TryFrom;

/// Card technology reported by the reader in a CARD_DETECTED notification.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CardType {
    /// ISO 14443-4
    #[display(fmt = "ISO 14443-4")]
    Iso14443_4 = 1,
    /// ISO 18092
    #[display(fmt = "ISO 18092")]
    Iso18092 = 2,
    /// MIFARE Mini
    #[display(fmt = "MIFARE Mini")]
    MifareMini = 3,
    /// MIFARE 1K
    #[display(fmt = "MIFARE 1K")]
    Mifare1K = 4,
    /// MIFARE 4K
    #[display(fmt = "MIFARE 4K")]
    Mifare4K = 5,
    /// MIFARE Ultralight
    #[display(fmt = "MIFARE Ultralight")]
    MifareUl = 6,
    /// MIFARE Plus
    #[display(fmt = "MIFARE Plus")]
    MifarePlus = 7,
    /// TNP3XXX
    #[display(fmt = "TNP3XXX")]
    Tnp3xxx = 8,
}

impl CardType {
    /// Card type for a wire code, None when unknown.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Iso14443_4),
            2 => Some(Self::Iso18092),
            3 => Some(Self::MifareMini),
            4 => Some(Self::Mifare1K),
            5 => Some(Self::Mifare4K),
            6 => Some(Self::MifareUl),
            7 => Some(Self::MifarePlus),
            8 => Some(Self::Tnp3xxx),
            _ => None,
        }
    }

    /// Wire code of this card type.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for CardType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(Error::UnknownCardType(code))
    }
}

/// Card UID as reported by the reader (variable length).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, From)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uid(Vec<u8>);

impl Uid {
    /// UID copied from `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    /// Borrow the UID bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Owned copy of the UID bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.clone()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a UID without bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hex form, e.g. `"04a1b2"`.
    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(self.as_bytes())
    }
}

/// Which of the two sector keys a key operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Key A
    A,
    /// Key B
    B,
}

impl KeyKind {
    /// Selector byte sent in SET_KEY.
    pub fn selector(&self) -> u8 {
        match self {
            Self::A => KEY_SELECTOR_A,
            Self::B => KEY_SELECTOR_B,
        }
    }
}

/// MIFARE Classic key - Newtype Pattern (6 バイト)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Key([u8; KEY_LEN]);

impl Key {
    /// Factory default transport key.
    pub const DEFAULT: Self = Self([0xFF; KEY_LEN]);

    /// Key from its 6 bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Key {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != KEY_LEN {
            return Err(Error::InvalidArgument(format!(
                "key must have the length {}, got {}",
                KEY_LEN,
                bytes.len()
            )));
        }
        let mut arr = [0u8; KEY_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }
}

/// Validate a block or sector number and narrow it to the single address
/// byte used on the wire.
pub fn address_byte(value: u32, what: &str) -> crate::Result<u8> {
    u8::try_from(value)
        .map_err(|_| Error::InvalidArgument(format!("{} must be between 0 and 255", what)))
}

/// Card currently on the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardSnapshot {
    /// Card technology
    pub card_type: CardType,
    /// Number of blocks reported by the reader
    pub block_count: u8,
    /// Card UID
    pub uid: Uid,
}

impl CardSnapshot {
    /// Snapshot from its parts.
    pub fn new(card_type: CardType, block_count: u8, uid: Uid) -> Self {
        Self {
            card_type,
            block_count,
            uid,
        }
    }
}
