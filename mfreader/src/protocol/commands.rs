// mfreader/src/protocol/commands.rs

use crate::constants::command_code;
use crate::protocol::SectorTrailer;
use crate::types::{Key, KeyKind, address_byte};
use crate::Result;

/// High-level Command enum. Arguments are validated by the constructor
/// functions, so a built `Command` always encodes to a well-formed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reset the card session
    Reset,
    /// Load a key for later authentication
    SetKey {
        /// Which key slot to load
        kind: KeyKind,
        /// Key value
        key: Key,
    },
    /// Read one block
    ReadBlock {
        /// Block number
        block: u8,
    },
    /// Write one block
    WriteBlock {
        /// Block number
        block: u8,
        /// Bytes to store
        data: Vec<u8>,
    },
    /// Read a sector trailer
    ReadSectorTrailer {
        /// Sector number
        sector: u8,
    },
    /// Write a sector trailer
    WriteSectorTrailer {
        /// Sector number
        sector: u8,
        /// Trailer to store
        trailer: SectorTrailer,
    },
}

impl Command {
    /// RESET command.
    pub fn reset() -> Self {
        Self::Reset
    }

    /// Rejects keys whose length is not 6.
    pub fn set_key(kind: KeyKind, key: &[u8]) -> Result<Self> {
        Ok(Self::SetKey {
            kind,
            key: Key::try_from(key)?,
        })
    }

    /// Rejects block numbers above 255.
    pub fn read_block(block: u32) -> Result<Self> {
        Ok(Self::ReadBlock {
            block: address_byte(block, "block")?,
        })
    }

    /// Rejects block numbers above 255. The data is sent as given.
    pub fn write_block(block: u32, data: &[u8]) -> Result<Self> {
        Ok(Self::WriteBlock {
            block: address_byte(block, "block")?,
            data: data.to_vec(),
        })
    }

    /// Rejects sector numbers above 255.
    pub fn read_sector_trailer(sector: u32) -> Result<Self> {
        Ok(Self::ReadSectorTrailer {
            sector: address_byte(sector, "sector")?,
        })
    }

    /// Rejects sector numbers above 255.
    pub fn write_sector_trailer(sector: u32, trailer: &SectorTrailer) -> Result<Self> {
        Ok(Self::WriteSectorTrailer {
            sector: address_byte(sector, "sector")?,
            trailer: *trailer,
        })
    }

    /// Return the command code understood by the reader firmware.
    pub fn command_code(&self) -> u8 {
        match self {
            Self::Reset => command_code::RESET,
            Self::SetKey { .. } => command_code::SET_KEY,
            Self::ReadBlock { .. } => command_code::READ_BLOCK,
            Self::WriteBlock { .. } => command_code::WRITE_BLOCK,
            Self::ReadSectorTrailer { .. } => command_code::READ_SECTOR_TRAILER,
            Self::WriteSectorTrailer { .. } => command_code::WRITE_SECTOR_TRAILER,
        }
    }

    /// Command parameters without the leading command code.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Self::Reset => Vec::new(),
            Self::SetKey { kind, key } => {
                let mut buf = Vec::with_capacity(7);
                buf.push(kind.selector());
                buf.extend_from_slice(key.as_bytes());
                buf
            }
            Self::ReadBlock { block } => vec![*block],
            Self::WriteBlock { block, data } => {
                let mut buf = Vec::with_capacity(1 + data.len());
                buf.push(*block);
                buf.extend_from_slice(data);
                buf
            }
            Self::ReadSectorTrailer { sector } => vec![*sector],
            Self::WriteSectorTrailer { sector, trailer } => {
                let mut buf = Vec::with_capacity(18);
                buf.push(*sector);
                buf.extend_from_slice(&trailer.encode());
                buf
            }
        }
    }

    /// Encode the full outbound message: command code + parameters.
    pub fn encode(&self) -> Vec<u8> {
        let payload = self.payload();
        let mut buf = Vec::with_capacity(1 + payload.len());
        buf.push(self.command_code());
        buf.extend_from_slice(&payload);
        buf
    }
}
