// Shared test payloads, frames and card fixtures

use mfreader::protocol::Frame;
use mfreader::{CardSnapshot, CardType, Key, SectorTrailer, Uid};

pub fn sample_uid_bytes() -> Vec<u8> {
    hex::decode("04a1b2c3d4e5f6").unwrap()
}

pub fn sample_card() -> CardSnapshot {
    CardSnapshot::new(CardType::Mifare1K, 64, Uid::from_slice(&sample_uid_bytes()))
}

/// CARD_DETECTED message for `sample_card`.
pub fn card_detected_message() -> Vec<u8> {
    let mut msg = vec![0x03u8, 0x04, 64];
    msg.extend_from_slice(&sample_uid_bytes());
    msg
}

pub fn sample_trailer() -> SectorTrailer {
    SectorTrailer::new(
        Key::from_bytes([0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5]),
        Key::from_bytes([0xB0, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5]),
        [0xFF, 0x07, 0x80, 0x69],
        0x00,
    )
}

/// Wire bytes of a tagged COMMAND_OK response carrying `body`.
pub fn ok_response_frame(tag: u16, body: &[u8]) -> Vec<u8> {
    let mut payload = vec![0x01u8];
    payload.extend_from_slice(body);
    Frame::new(0, payload, Some(tag)).encode()
}

pub fn sample_block(fill: u8) -> [u8; 16] {
    [fill; 16]
}
