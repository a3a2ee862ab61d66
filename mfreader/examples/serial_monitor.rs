//! Watch a reader on a serial port, print card changes and dump block 0 of
//! every card that shows up.
//!
//! Usage:
//!   cargo run -p mfreader --example serial_monitor --features serial -- /dev/ttyACM0 [key-a-hex]
//!
//! The optional key is given in hex, e.g. `FF:FF:FF:FF:FF:FF`.

use std::sync::Arc;
use std::time::Duration;

use mfreader::prelude::*;
use mfreader::transport::serial;
use mfreader::utils::bytes_to_hex_separated;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "/dev/ttyACM0".to_string());
    let key = match args.next() {
        Some(hex) => Key::try_from(parse_hex(&hex).map_err(Error::InvalidArgument)?.as_slice())?,
        None => Key::DEFAULT,
    };
    let transport = serial::open(&path, serial::DEFAULT_BAUD_RATE)?;
    let reader = CardReaderBuilder::new()
        .with_transport(Arc::new(transport))
        .build()?;

    reader.add_card_listener(move |reader: &CardReader, present: bool| {
        let Some(card) = reader.card().filter(|_| present) else {
            println!("card removed");
            return;
        };
        println!(
            "card detected: {} uid={} blocks={}",
            card.card_type,
            bytes_to_hex_separated(card.uid.as_bytes(), ":"),
            card.block_count
        );
        match reader.set_key_a(key.as_bytes()).and_then(|_| reader.read_block(0)) {
            Ok(block) => println!("  block 0: {}", bytes_to_hex_spaced(&block)),
            Err(e) => println!("  block 0 unreadable: {}", e),
        }
    });

    reader.start()?;
    println!("listening on {}, Ctrl-C to quit", path);
    loop {
        std::thread::sleep(Duration::from_secs(1));
    }
}
