// mfreader/src/test_support.rs

//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize common MockTransport setup so tests across the
//! crate and tests/ directory can reuse the same logic.
#![allow(dead_code)]

use std::sync::Arc;

use crate::protocol::encode_card_detected;
use crate::reader::{CardReader, CardReaderBuilder, ReaderConfig};
use crate::transport::MockTransport;
use crate::{CardSnapshot, Result, constants::message_code};

/// Create a started CardReader backed by a fresh MockTransport.
#[doc(hidden)]
pub fn started_mock_reader(config: ReaderConfig) -> Result<(CardReader, Arc<MockTransport>)> {
    let mock = Arc::new(MockTransport::new());
    let reader = CardReaderBuilder::new()
        .with_transport(mock.clone())
        .with_config(config)
        .build()?;
    reader.start()?;
    Ok((reader, mock))
}

/// Install a responder that acknowledges every command with `body`.
#[doc(hidden)]
pub fn ack_all(mock: &MockTransport, body: Vec<u8>) {
    mock.set_responder(Box::new(move |_tag: u16, _: &[u8]| {
        let mut reply = vec![message_code::COMMAND_OK];
        reply.extend_from_slice(&body);
        Some(reply)
    }));
}

/// Inject a CARD_DETECTED notification for `card`.
#[doc(hidden)]
pub fn present_card(mock: &MockTransport, card: &CardSnapshot) {
    mock.deliver(None, &encode_card_detected(card));
}

/// Inject a CARD_REMOVED notification.
#[doc(hidden)]
pub fn remove_card(mock: &MockTransport) {
    mock.deliver(None, &[message_code::CARD_REMOVED]);
}
