//! Drive a CardReader against the in-memory mock transport.
//!
//! Usage:
//!   cargo run -p mfreader --example mock_session

use std::sync::Arc;

use mfreader::prelude::*;
use mfreader::protocol::encode_card_detected;

fn main() -> Result<()> {
    env_logger::init();

    let mock = Arc::new(MockTransport::new());
    let reader = CardReaderBuilder::new()
        .with_transport(mock.clone())
        .timeout(ms(200))
        .build()?;

    reader.add_card_listener(|reader: &CardReader, present: bool| {
        println!("present={} card={:?}", present, reader.card());
    });
    reader.start()?;

    // Every read returns a block of 0x42, everything else is acknowledged
    mock.set_responder(Box::new(|_tag: u16, msg: &[u8]| {
        let mut reply = vec![0x01];
        if msg[0] == 0x03 {
            reply.extend_from_slice(&[0x42; 16]);
        }
        Some(reply)
    }));

    let card = CardSnapshot::new(CardType::Mifare1K, 64, Uid::from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]));
    mock.deliver(None, &encode_card_detected(&card));

    reader.set_key_a(Key::DEFAULT.as_bytes())?;
    println!("block 4: {}", bytes_to_hex(&reader.read_block(4)?));

    mock.clear_responder();
    match reader.read_block(4) {
        Ok(_) => println!("unexpected answer"),
        Err(e) => println!("silent reader: {}", e),
    }

    mock.deliver(None, &[0x04]);
    reader.stop()?;
    Ok(())
}
