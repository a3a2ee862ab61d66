use std::sync::Arc;

use mfreader::transport::{MessageHandler, MessageTransport, MockTransport};
use parking_lot::Mutex;

type Seen = Arc<Mutex<Vec<(Option<u16>, Vec<u8>)>>>;

fn recording() -> (MessageHandler, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let handler: MessageHandler =
        Arc::new(move |tag: Option<u16>, msg: &[u8]| sink.lock().push((tag, msg.to_vec())));
    (handler, seen)
}

#[test]
fn responder_replies_carry_the_command_tag() {
    let m = MockTransport::new();
    let (handler, seen) = recording();
    m.start(handler).unwrap();
    m.set_responder(Box::new(|tag: u16, msg: &[u8]| {
        (msg[0] == 0x03).then(|| vec![0x01, tag as u8])
    }));

    m.send(41, &[0x03, 0x00]).unwrap();
    m.send(42, &[0x01]).unwrap();

    assert_eq!(*seen.lock(), vec![(Some(41), vec![0x01, 41])]);
    assert_eq!(m.sent().len(), 2);
}

#[test]
fn deliver_after_stop_is_dropped() {
    let m = MockTransport::new();
    let (handler, seen) = recording();
    m.start(handler).unwrap();
    m.deliver(None, &[0x04]);
    m.stop().unwrap();
    m.deliver(None, &[0x04]);

    assert_eq!(seen.lock().len(), 1);
    assert!(!m.is_running());
}

#[test]
fn clear_responder_silences_mock() {
    let m = MockTransport::new();
    let (handler, seen) = recording();
    m.start(handler).unwrap();
    m.set_responder(Box::new(|_tag: u16, _: &[u8]| Some(vec![0x01])));
    m.clear_responder();
    m.send(1, &[0x01]).unwrap();
    assert!(seen.lock().is_empty());
}
