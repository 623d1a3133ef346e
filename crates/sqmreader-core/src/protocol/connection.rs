//! Connection management
//!
//! Owns the single serial link to the sensor and handles its lifecycle.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    client,
    serial::{configure_port, list_ports, open_port},
    ProtocolError, SerialTransport, Transport, DEFAULT_BAUD_RATE, DEFAULT_SETTLE_DELAY_MS,
    DEFAULT_TIMEOUT_MS,
};
use crate::reading::Reading;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,
    /// Connected and ready
    Connected,
}

/// Connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Baud rate
    pub baud_rate: u32,
    /// Read and write timeout in milliseconds
    pub timeout_ms: u64,
    /// Delay after opening the port before the link is used, in milliseconds
    pub settle_delay_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

impl ConnectionConfig {
    /// Read/write timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Settle delay as a `Duration`
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// An open link to the sensor
pub struct Connection {
    port_name: String,
    timeout: Duration,
    transport: Box<dyn Transport>,
}

impl Connection {
    /// Wrap an already-open transport
    pub fn new(port_name: impl Into<String>, timeout: Duration, transport: Box<dyn Transport>) -> Self {
        Self {
            port_name: port_name.into(),
            timeout,
            transport,
        }
    }

    /// Port this connection was opened on
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Read timeout used for responses
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn transport_mut(&mut self) -> &mut dyn Transport {
        self.transport.as_mut()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("port_name", &self.port_name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Owner of the (at most one) open connection
#[derive(Debug, Default)]
pub struct ConnectionManager {
    config: ConnectionConfig,
    connection: Option<Connection>,
}

impl ConnectionManager {
    /// Create a manager with no open connection
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    /// List available serial ports
    pub fn list_ports() -> Vec<String> {
        list_ports()
    }

    /// Active configuration
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Get current connection state
    pub fn state(&self) -> ConnectionState {
        if self.connection.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Whether a connection is open
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Name of the connected port
    pub fn port_name(&self) -> Option<&str> {
        self.connection.as_ref().map(Connection::port_name)
    }

    /// The open connection, if any
    pub fn connection_mut(&mut self) -> Option<&mut Connection> {
        self.connection.as_mut()
    }

    /// Open `port_name`, closing any previous connection first.
    ///
    /// Blocks for the configured settle delay so the board can finish its
    /// reset, then discards whatever it printed while booting. On failure
    /// the manager is left disconnected.
    pub fn connect(&mut self, port_name: &str) -> Result<(), ProtocolError> {
        // The OS grants the device to one client at a time
        self.disconnect();

        let port_name = port_name.trim();
        if port_name.is_empty() {
            return Err(ProtocolError::connection_failed(port_name, "no port selected"));
        }

        let mut port = open_port(port_name, self.config.baud_rate, self.config.timeout())?;
        configure_port(port.as_mut()).map_err(|e| ProtocolError::connection_failed(port_name, e))?;
        tracing::info!("Connected to {} at {} baud", port_name, self.config.baud_rate);

        std::thread::sleep(self.config.settle_delay());

        let mut transport = SerialTransport::new(port);
        transport
            .clear_input()
            .map_err(|e| ProtocolError::connection_failed(port_name, e))?;

        self.connection = Some(Connection::new(port_name, self.config.timeout(), Box::new(transport)));
        Ok(())
    }

    /// Install an already-open transport as the connection.
    ///
    /// Same lifecycle as [`connect`](Self::connect) minus opening the port
    /// and the settle delay.
    pub fn attach(
        &mut self,
        port_name: &str,
        mut transport: Box<dyn Transport>,
    ) -> Result<(), ProtocolError> {
        self.disconnect();
        transport
            .clear_input()
            .map_err(|e| ProtocolError::connection_failed(port_name, e))?;
        tracing::info!("Attached transport for {}", port_name);
        self.connection = Some(Connection::new(port_name, self.config.timeout(), transport));
        Ok(())
    }

    /// Close the connection, if any
    pub fn disconnect(&mut self) {
        if let Some(conn) = self.connection.take() {
            tracing::info!("Closing {}", conn.port_name());
        }
    }

    /// Request one reading over the open connection
    pub fn request_reading(&mut self) -> Result<Reading, ProtocolError> {
        client::request_reading(self.connection.as_mut())
    }
}
