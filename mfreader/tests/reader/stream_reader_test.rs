use std::io::{self, ErrorKind, Read, Write};
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use mfreader::protocol::{Frame, FrameDecoder, encode_card_detected};
use mfreader::reader::CardReaderBuilder;
use mfreader::transport::GepStreamTransport;
use mfreader::{CommandFailure, ms};
use parking_lot::Mutex;

use crate::common::fixtures::{sample_block, sample_card};
use crate::common::init_logging;

/// Host-side reader half: yields what the simulated device sends.
struct DeviceOutput {
    rx: mpsc::Receiver<Vec<u8>>,
    pending: Vec<u8>,
}

impl Read for DeviceOutput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.rx.recv_timeout(Duration::from_millis(10)) {
                Ok(bytes) => self.pending = bytes,
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    return Err(io::Error::new(ErrorKind::TimedOut, "idle"));
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

/// Host-side writer half: decodes frames and answers like a device with
/// a single 16-byte block store per address.
struct DeviceInput {
    decoder: FrameDecoder,
    tx: mpsc::Sender<Vec<u8>>,
    blocks: Arc<Mutex<Vec<[u8; 16]>>>,
    silent: bool,
}

impl DeviceInput {
    fn answer(&mut self, frame: Frame) -> Option<Vec<u8>> {
        let tag = frame.tag?;
        let msg = frame.payload;
        let reply = match *msg.first()? {
            0x03 => {
                let mut reply = vec![0x01];
                reply.extend_from_slice(&self.blocks.lock()[msg[1] as usize]);
                reply
            }
            0x04 if msg.len() == 18 => {
                self.blocks.lock()[msg[1] as usize].copy_from_slice(&msg[2..]);
                vec![0x01]
            }
            _ => vec![0x02],
        };
        Some(Frame::new(0, reply, Some(tag)).encode())
    }
}

impl Write for DeviceInput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for frame in self.decoder.extend(buf) {
            if self.silent {
                continue;
            }
            if let Some(bytes) = self.answer(frame) {
                let _ = self.tx.send(bytes);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn simulated_device(silent: bool) -> (GepStreamTransport, mpsc::Sender<Vec<u8>>) {
    let (tx, rx) = mpsc::channel();
    let output = DeviceOutput {
        rx,
        pending: Vec::new(),
    };
    let input = DeviceInput {
        decoder: FrameDecoder::new(0, 64),
        tx: tx.clone(),
        blocks: Arc::new(Mutex::new(vec![[0u8; 16]; 256])),
        silent,
    };
    (
        GepStreamTransport::new(Box::new(output), Box::new(input)),
        tx,
    )
}

#[test]
fn commands_roundtrip_over_framed_stream() -> Result<()> {
    init_logging();
    let (transport, _notify) = simulated_device(false);
    let reader = CardReaderBuilder::new()
        .with_transport(Arc::new(transport))
        .timeout(ms(1_000))
        .build()?;
    reader.start()?;

    reader.write_block(7, &sample_block(0x3C))?;
    assert_eq!(reader.read_block(7)?, sample_block(0x3C).to_vec());
    assert_eq!(reader.read_block(8)?, vec![0u8; 16]);

    let err = reader.reset_card().unwrap_err();
    assert_eq!(err.command_failure(), Some(CommandFailure::Rejected));

    reader.stop()?;
    Ok(())
}

#[test]
fn notifications_arrive_from_reader_thread() -> Result<()> {
    let (transport, notify) = simulated_device(false);
    let reader = CardReaderBuilder::new()
        .with_transport(Arc::new(transport))
        .build()?;

    let (seen_tx, seen_rx) = mpsc::channel();
    let seen_tx = Mutex::new(seen_tx);
    reader.add_card_listener(move |_: &mfreader::CardReader, present: bool| {
        let _ = seen_tx.lock().send(present);
    });
    reader.start()?;

    notify.send(Frame::new(0, encode_card_detected(&sample_card()), None).encode())?;
    assert!(seen_rx.recv_timeout(Duration::from_secs(2))?);
    assert_eq!(reader.card(), Some(sample_card()));

    notify.send(Frame::new(0, vec![0x04], None).encode())?;
    assert!(!seen_rx.recv_timeout(Duration::from_secs(2))?);
    assert!(!reader.is_card_present());

    reader.stop()?;
    Ok(())
}

#[test]
fn silent_device_times_out() -> Result<()> {
    let (transport, _notify) = simulated_device(true);
    let reader = CardReaderBuilder::new()
        .with_transport(Arc::new(transport))
        .timeout(ms(80))
        .build()?;
    reader.start()?;

    let err = reader.read_block(0).unwrap_err();
    assert_eq!(err.command_failure(), Some(CommandFailure::Timeout));
    reader.stop()?;
    Ok(())
}

/// Reader half that reports, when dropped, whether its thread was unwinding.
struct WatchedOutput {
    inner: DeviceOutput,
    dropped: mpsc::Sender<bool>,
}

impl Read for WatchedOutput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Drop for WatchedOutput {
    fn drop(&mut self) {
        let _ = self.dropped.send(std::thread::panicking());
    }
}

#[test]
fn reader_dropped_during_listener_callback_shuts_down_cleanly() -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let (dropped_tx, dropped_rx) = mpsc::channel();
    let output = WatchedOutput {
        inner: DeviceOutput {
            rx,
            pending: Vec::new(),
        },
        dropped: dropped_tx,
    };
    let input = DeviceInput {
        decoder: FrameDecoder::new(0, 64),
        tx: tx.clone(),
        blocks: Arc::new(Mutex::new(vec![[0u8; 16]; 256])),
        silent: true,
    };
    let transport = GepStreamTransport::new(Box::new(output), Box::new(input));
    let reader = CardReaderBuilder::new()
        .with_transport(Arc::new(transport))
        .build()?;

    let (entered_tx, entered_rx) = mpsc::channel();
    let entered_tx = Mutex::new(entered_tx);
    reader.add_card_listener(move |_: &mfreader::CardReader, _present: bool| {
        let _ = entered_tx.lock().send(());
        std::thread::sleep(ms(200));
    });
    reader.start()?;

    tx.send(Frame::new(0, encode_card_detected(&sample_card()), None).encode())?;
    entered_rx.recv_timeout(Duration::from_secs(2))?;
    // The callback's temporary handle is now the last one
    drop(reader);

    let panicking = dropped_rx.recv_timeout(Duration::from_secs(2))?;
    assert!(!panicking, "reader thread unwound while shutting down");
    Ok(())
}
