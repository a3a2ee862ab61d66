// mfreader/src/transport/serial.rs

#![cfg(feature = "serial")]

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::SerialPort;

use crate::Result;
use crate::transport::stream::GepStreamTransport;

/// Baud rate the reader firmware configures by default.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Read timeout of the port; bounds how long `stop` waits for the reader
/// thread.
const PORT_READ_TIMEOUT: Duration = Duration::from_millis(50);

struct Port(Box<dyn SerialPort>);

impl Read for Port {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Write for Port {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

/// Open `path` (e.g. `/dev/ttyACM0` or `COM3`) and wrap it in a GEP stream
/// transport.
pub fn open(path: &str, baud_rate: u32) -> Result<GepStreamTransport> {
    let port = serialport::new(path, baud_rate)
        .timeout(PORT_READ_TIMEOUT)
        .open()?;
    let reader = port.try_clone()?;
    log::debug!("opened serial port {} at {} baud", path, baud_rate);
    Ok(GepStreamTransport::new(
        Box::new(Port(reader)),
        Box::new(Port(port)),
    ))
}
