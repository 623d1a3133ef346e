//! Byte transport under the reading protocol
//!
//! The protocol client only needs buffer resets, a write, a flush and a
//! line read with a deadline. `SerialTransport` provides these over a real
//! port; tests substitute an in-memory device.

use serialport::{ClearBuffer, SerialPort};
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use super::{serial::clear_buffers, LINE_TERMINATOR, MAX_LINE_LENGTH};

/// Poll interval while waiting for bytes
const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Operations the reading protocol performs on a link
pub trait Transport: Send {
    /// Discard bytes received but not yet read
    fn clear_input(&mut self) -> io::Result<()>;

    /// Discard bytes written but not yet transmitted
    fn clear_output(&mut self) -> io::Result<()>;

    /// Write the whole buffer
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Block until written bytes have been handed to the device
    fn flush(&mut self) -> io::Result<()>;

    /// Read up to and excluding the next line terminator.
    ///
    /// Returns whatever arrived once `timeout` elapses, which is empty when
    /// the device stayed silent. Only transport faults are errors.
    fn read_line(&mut self, timeout: Duration) -> io::Result<Vec<u8>>;
}

/// `Transport` over an open serial port
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Wrap an already opened and configured port
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }

    /// Device name reported by the driver, if any
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl Transport for SerialTransport {
    fn clear_input(&mut self) -> io::Result<()> {
        clear_buffers(self.port.as_mut(), ClearBuffer::Input).map_err(io::Error::from)
    }

    fn clear_output(&mut self) -> io::Result<()> {
        clear_buffers(self.port.as_mut(), ClearBuffer::Output).map_err(io::Error::from)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }

    /// Polls `bytes_to_read()` so the deadline holds regardless of how the
    /// driver implements blocking reads.
    ///
    /// A line longer than `MAX_LINE_LENGTH` is discarded up to its terminator
    /// (or the deadline) and reported as `InvalidData`.
    fn read_line(&mut self, timeout: Duration) -> io::Result<Vec<u8>> {
        let mut line = Vec::new();
        let mut overflowed = false;
        let mut byte = [0u8; 1];
        let start = Instant::now();

        while start.elapsed() < timeout {
            let available = self.port.bytes_to_read().map_err(io::Error::from)?;
            if available == 0 {
                std::thread::sleep(POLL_INTERVAL);
                continue;
            }

            // One byte at a time so nothing past the terminator is consumed
            match self.port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) if byte[0] == LINE_TERMINATOR => {
                    if overflowed {
                        return Err(oversized_line());
                    }
                    return Ok(line);
                }
                Ok(_) if overflowed => {}
                Ok(_) => {
                    line.push(byte[0]);
                    if line.len() >= MAX_LINE_LENGTH {
                        tracing::warn!(
                            "line exceeded {} bytes without terminator, discarding",
                            MAX_LINE_LENGTH
                        );
                        overflowed = true;
                        line.clear();
                    }
                }
                Err(ref e)
                    if e.kind() == io::ErrorKind::TimedOut
                        || e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }

        if overflowed {
            return Err(oversized_line());
        }
        tracing::debug!(
            "read_line: deadline of {}ms reached with {} byte(s)",
            timeout.as_millis(),
            line.len()
        );
        Ok(line)
    }
}

fn oversized_line() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("reply line longer than {} bytes", MAX_LINE_LENGTH),
    )
}
