// mfreader/src/protocol/messages.rs

use crate::constants::message_code;
use crate::protocol::parser::{byte_at, ensure_len};
use crate::types::{CardSnapshot, CardType, Uid};
use crate::{Error, Result};

/// Inbound message from the reader, borrowed from the received payload.
/// The first byte selects the kind; the rest is the kind-specific body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message<'a> {
    /// Command succeeded; carries the response body
    CommandOk(&'a [u8]),
    /// Command was rejected by the reader
    CommandFailed,
    /// A card entered the field; carries type, block count and UID
    CardDetected(&'a [u8]),
    /// The card left the field
    CardRemoved,
}

impl<'a> Message<'a> {
    /// Split `data` into kind and body. Empty input and unknown codes are errors.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let code = byte_at(data, 0)?;
        let body = &data[1..];
        match code {
            message_code::COMMAND_OK => Ok(Self::CommandOk(body)),
            message_code::COMMAND_FAILED => Ok(Self::CommandFailed),
            message_code::CARD_DETECTED => Ok(Self::CardDetected(body)),
            message_code::CARD_REMOVED => Ok(Self::CardRemoved),
            other => Err(Error::UnknownMessage(other)),
        }
    }

    /// Message code of this kind.
    pub fn code(&self) -> u8 {
        match self {
            Self::CommandOk(_) => message_code::COMMAND_OK,
            Self::CommandFailed => message_code::COMMAND_FAILED,
            Self::CardDetected(_) => message_code::CARD_DETECTED,
            Self::CardRemoved => message_code::CARD_REMOVED,
        }
    }

    /// True for command responses, false for presence notifications.
    pub fn is_response(&self) -> bool {
        matches!(self, Self::CommandOk(_) | Self::CommandFailed)
    }

    /// Encode back into wire form (code + body).
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![self.code()];
        if let Self::CommandOk(body) | Self::CardDetected(body) = self {
            out.extend_from_slice(body);
        }
        out
    }
}

/// Decode the body of a CARD_DETECTED notification:
/// card_type(1) + block_count(1) + uid(n)
pub fn decode_card_detected(body: &[u8]) -> Result<CardSnapshot> {
    ensure_len(body, 2)?;
    let card_type = CardType::try_from(body[0])?;
    let block_count = body[1];
    let uid = Uid::from_slice(&body[2..]);
    Ok(CardSnapshot::new(card_type, block_count, uid))
}

/// Build a full CARD_DETECTED notification for `card`.
pub fn encode_card_detected(card: &CardSnapshot) -> Vec<u8> {
    let mut out = Vec::with_capacity(3 + card.uid.len());
    out.push(message_code::CARD_DETECTED);
    out.push(card.card_type.code());
    out.push(card.block_count);
    out.extend_from_slice(card.uid.as_bytes());
    out
}
