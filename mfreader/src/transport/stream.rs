// mfreader/src/transport/stream.rs

use std::io::{ErrorKind, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use parking_lot::Mutex;

use crate::constants::{GEP_BROADCAST_ID, MAX_MESSAGE_LENGTH};
use crate::protocol::{Frame, FrameDecoder};
use crate::transport::traits::{MessageHandler, MessageTransport};
use crate::{Error, Result};

type BoxedReader = Box<dyn Read + Send>;
type BoxedWriter = Box<dyn Write + Send>;

struct Worker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<BoxedReader>,
}

/// GEP messenger over a duplex byte stream.
///
/// Outbound messages are framed and written directly from the caller's
/// thread. Inbound bytes are read on a background thread, decoded and handed
/// to the message handler from there.
///
/// The reader half must return periodically (a read timeout yielding
/// `TimedOut`/`WouldBlock`, or EOF), otherwise `stop` cannot join the
/// reader thread.
pub struct GepStreamTransport {
    writer: Mutex<BoxedWriter>,
    reader: Mutex<Option<BoxedReader>>,
    worker: Mutex<Option<Worker>>,
    messenger_id: u8,
    destination_id: u8,
    max_message_len: usize,
}

impl GepStreamTransport {
    /// Transport over `reader` and `writer`, not started yet.
    pub fn new(reader: BoxedReader, writer: BoxedWriter) -> Self {
        Self {
            writer: Mutex::new(writer),
            reader: Mutex::new(Some(reader)),
            worker: Mutex::new(None),
            messenger_id: 0,
            destination_id: GEP_BROADCAST_ID,
            max_message_len: MAX_MESSAGE_LENGTH,
        }
    }

    /// Accept only frames addressed to `id` (or broadcast). 0 accepts all.
    pub fn with_messenger_id(mut self, id: u8) -> Self {
        self.messenger_id = id & 0x0F;
        self
    }

    /// Destination id written into outbound frames.
    pub fn with_destination_id(mut self, id: u8) -> Self {
        self.destination_id = id;
        self
    }

    /// Longest message sent or accepted.
    pub fn with_max_message_len(mut self, len: usize) -> Self {
        self.max_message_len = len;
        self
    }
}

fn read_loop(
    mut reader: BoxedReader,
    mut decoder: FrameDecoder,
    handler: MessageHandler,
    stop: Arc<AtomicBool>,
) -> BoxedReader {
    let mut buf = [0u8; 64];
    while !stop.load(Ordering::Acquire) {
        match reader.read(&mut buf) {
            Ok(0) => {
                log::debug!("gep stream closed by peer");
                break;
            }
            Ok(n) => {
                for frame in decoder.extend(&buf[..n]) {
                    log::trace!("gep frame in: tag={:?} payload={:02x?}", frame.tag, frame.payload);
                    handler(frame.tag, &frame.payload);
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) =>
            {
                continue;
            }
            Err(e) => {
                log::warn!("gep stream read failed: {}", e);
                break;
            }
        }
    }
    reader
}

impl MessageTransport for GepStreamTransport {
    fn start(&self, handler: MessageHandler) -> Result<()> {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Err(Error::AlreadyStarted);
        }
        let reader = self
            .reader
            .lock()
            .take()
            .ok_or_else(|| Error::Transport("stream reader lost".into()))?;

        let stop = Arc::new(AtomicBool::new(false));
        let decoder = FrameDecoder::new(self.messenger_id, self.max_message_len);
        let thread_stop = stop.clone();
        let handle = std::thread::Builder::new()
            .name("gep-reader".into())
            .spawn(move || read_loop(reader, decoder, handler, thread_stop))?;

        *worker = Some(Worker { stop, handle });
        log::debug!("gep stream transport started");
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let Some(worker) = self.worker.lock().take() else {
            return Ok(());
        };
        worker.stop.store(true, Ordering::Release);
        if worker.handle.thread().id() == std::thread::current().id() {
            // Stopped from a handler running on the reader thread. The loop
            // exits after the handler returns and the reader half is dropped.
            log::debug!("gep stream transport stopped from its reader thread");
            return Ok(());
        }
        match worker.handle.join() {
            Ok(reader) => {
                *self.reader.lock() = Some(reader);
                log::debug!("gep stream transport stopped");
                Ok(())
            }
            Err(_) => Err(Error::Transport("reader thread panicked".into())),
        }
    }

    fn send(&self, tag: u16, payload: &[u8]) -> Result<()> {
        if self.worker.lock().is_none() {
            return Err(Error::NotStarted);
        }
        if payload.len() > self.max_message_len {
            return Err(Error::InvalidLength {
                expected: self.max_message_len,
                actual: payload.len(),
            });
        }
        let bytes = Frame::new(self.destination_id, payload.to_vec(), Some(tag)).encode();
        let mut writer = self.writer.lock();
        writer.write_all(&bytes)?;
        writer.flush()?;
        log::trace!("gep frame out: tag={} payload={:02x?}", tag, payload);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.worker.lock().is_some()
    }
}

impl Drop for GepStreamTransport {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
