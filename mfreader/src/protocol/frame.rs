// mfreader/src/protocol/frame.rs

use crate::constants::{GEP_END_BYTE, GEP_END_WITH_TAG_BYTE, GEP_START_BYTE, MAX_MESSAGE_LENGTH};
use crate::protocol::checksum::frame_crc;
use crate::{Error, Result};

/// GEP frame helper. Provides encode/decode of the stream wire format
/// Format: [Start(1)] [DestId(1)] [Body(2*n)] ([Tag(4)] End=0x06 | End=0x03) [CRC(1)]
/// Every body and tag byte is sent as two bytes, one per nibble, each
/// carrying the nibble in its high half and its complement in the low half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Addressed messenger, 0 for broadcast
    pub destination_id: u8,
    /// Message bytes
    pub payload: Vec<u8>,
    /// Correlation tag; None for untagged messages
    pub tag: Option<u16>,
}

fn encode_nibble(nibble: u8) -> u8 {
    (nibble << 4) | (nibble ^ 0x0F)
}

/// Returns the nibble carried by `byte`, or None when the complement half
/// does not match.
fn decode_nibble(byte: u8) -> Option<u8> {
    let nibble = byte >> 4;
    if nibble == (byte ^ 0x0F) & 0x0F {
        Some(nibble)
    } else {
        None
    }
}

fn push_encoded(out: &mut Vec<u8>, byte: u8) {
    out.push(encode_nibble(byte >> 4));
    out.push(encode_nibble(byte & 0x0F));
}

impl Frame {
    /// Build a frame. Destination ids above 15 fall back to broadcast.
    pub fn new(destination_id: u8, payload: Vec<u8>, tag: Option<u16>) -> Self {
        // Ids outside the 4-bit range fall back to broadcast
        let destination_id = if destination_id >= 16 { 0 } else { destination_id };
        Self {
            destination_id,
            payload,
            tag,
        }
    }

    /// Encode the frame into its stream representation.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.payload.len() * 2 + 4 + 2);
        out.push(GEP_START_BYTE);
        out.push(encode_nibble(self.destination_id & 0x0F));
        for &b in &self.payload {
            push_encoded(&mut out, b);
        }
        match self.tag {
            Some(tag) => {
                for b in tag.to_be_bytes() {
                    push_encoded(&mut out, b);
                }
                out.push(GEP_END_WITH_TAG_BYTE);
            }
            None => out.push(GEP_END_BYTE),
        }
        out.push(frame_crc(self.destination_id, &self.payload, self.tag));
        out
    }

    /// Decode exactly one complete frame.
    pub fn decode(bytes: &[u8]) -> Result<Frame> {
        let Some((&crc, head)) = bytes.split_last() else {
            return Err(Error::FrameFormat("empty frame".into()));
        };
        let mut decoder = FrameDecoder::new(0, MAX_MESSAGE_LENGTH);
        if head.iter().any(|&b| decoder.push(b).is_some()) {
            return Err(Error::FrameFormat("trailing bytes after frame".into()));
        }
        match decoder.pending_crc() {
            Some((_, _, expected)) if expected != crc => Err(Error::ChecksumMismatch {
                expected,
                actual: crc,
            }),
            Some(_) => decoder
                .push(crc)
                .ok_or_else(|| Error::FrameFormat("frame exceeds maximum size".into())),
            None => Err(Error::FrameFormat("incomplete or malformed frame".into())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    WaitStart,
    WaitDestination,
    WaitHigh,
    WaitLow,
    WaitCrc { tagged: bool },
}

/// Incremental GEP decoder. Bytes are fed one at a time; corrupted input
/// silently resets the decoder, which resynchronises on the next start byte.
#[derive(Debug)]
pub struct FrameDecoder {
    state: State,
    messenger_id: u8,
    max_size: usize,
    destination_id: u8,
    buf: Vec<u8>,
}

impl FrameDecoder {
    /// `messenger_id` 0 accepts frames for every destination; any other id
    /// accepts broadcast frames and frames addressed to it.
    pub fn new(messenger_id: u8, max_size: usize) -> Self {
        Self {
            state: State::WaitStart,
            messenger_id,
            max_size,
            destination_id: 0,
            buf: Vec::with_capacity(max_size + 2),
        }
    }

    /// Drop any partially received frame.
    pub fn reset(&mut self) {
        self.state = State::WaitStart;
        self.buf.clear();
    }

    /// Feed a slice and collect every frame completed by it.
    pub fn extend(&mut self, bytes: &[u8]) -> Vec<Frame> {
        bytes.iter().filter_map(|&b| self.push(b)).collect()
    }

    /// Body length, tag and expected CRC while waiting for the CRC byte.
    fn pending_crc(&self) -> Option<(usize, Option<u16>, u8)> {
        let State::WaitCrc { tagged } = self.state else {
            return None;
        };
        let body_len = if tagged { self.buf.len() - 2 } else { self.buf.len() };
        let tag = tagged.then(|| u16::from_be_bytes([self.buf[body_len], self.buf[body_len + 1]]));
        let expected = frame_crc(self.destination_id, &self.buf[..body_len], tag);
        Some((body_len, tag, expected))
    }

    /// Feed one byte, returning a frame when `byte` completed one.
    pub fn push(&mut self, byte: u8) -> Option<Frame> {
        if self.state == State::WaitStart && byte != GEP_START_BYTE {
            return None;
        }

        // The CRC byte may legitimately equal the start byte, so it is
        // checked before the restart rule below.
        if let Some((body_len, tag, expected)) = self.pending_crc() {
            if byte == expected {
                self.state = State::WaitStart;
                if body_len > self.max_size {
                    log::trace!("dropping oversized frame ({} bytes)", body_len);
                    return None;
                }
                let payload = self.buf[..body_len].to_vec();
                return Some(Frame {
                    destination_id: self.destination_id,
                    payload,
                    tag,
                });
            }
            log::trace!("frame crc mismatch: expected {:#04x}, got {:#04x}", expected, byte);
            self.state = State::WaitStart;
        }

        if byte == GEP_START_BYTE {
            self.state = State::WaitDestination;
            return None;
        }

        match self.state {
            State::WaitStart | State::WaitCrc { .. } => None,
            State::WaitDestination => {
                match decode_nibble(byte) {
                    Some(id)
                        if self.messenger_id == 0 || id == 0 || id == self.messenger_id =>
                    {
                        self.destination_id = id;
                        self.buf.clear();
                        self.state = State::WaitHigh;
                    }
                    _ => self.state = State::WaitStart,
                }
                None
            }
            State::WaitHigh if byte == GEP_END_BYTE => {
                self.state = State::WaitCrc { tagged: false };
                None
            }
            State::WaitHigh if byte == GEP_END_WITH_TAG_BYTE => {
                self.state = if self.buf.len() >= 2 {
                    State::WaitCrc { tagged: true }
                } else {
                    State::WaitStart
                };
                None
            }
            State::WaitHigh => {
                match decode_nibble(byte) {
                    Some(n) if self.buf.len() < self.max_size + 2 => {
                        self.buf.push(n << 4);
                        self.state = State::WaitLow;
                    }
                    _ => self.state = State::WaitStart,
                }
                None
            }
            State::WaitLow => {
                match (decode_nibble(byte), self.buf.last_mut()) {
                    (Some(n), Some(last)) => {
                        *last |= n;
                        self.state = State::WaitHigh;
                    }
                    _ => self.state = State::WaitStart,
                }
                None
            }
        }
    }
}
