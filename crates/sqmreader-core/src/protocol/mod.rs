//! Serial Protocol Communication
//!
//! Implements the sensor's request/response protocol: the host sends `R`,
//! the board answers with one `LUX:<value>,SQM:<value>` line.

pub mod client;
mod connection;
mod error;
pub mod serial;
mod transport;

pub use client::{reading_command, request_reading};
pub use connection::{Connection, ConnectionConfig, ConnectionManager, ConnectionState};
pub use error::ProtocolError;
pub use serial::{clear_buffers, configure_port, list_port_details, list_ports, open_port, PortInfo};
pub use transport::{SerialTransport, Transport};

/// Baud rate the sensor firmware is built with (`Serial.begin(115200)`)
pub const DEFAULT_BAUD_RATE: u32 = 115200;

/// Read and write timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Pause after opening the port while the board goes through its auto-reset
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 2000;

/// Command byte requesting a single reading
pub const READ_COMMAND: u8 = b'R';

/// Response line terminator
pub const LINE_TERMINATOR: u8 = b'\n';

/// Upper bound on a response line, guards against a device streaming garbage
pub const MAX_LINE_LENGTH: usize = 1024;
