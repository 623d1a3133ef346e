//! Reading display model
//!
//! Holds the lux, sqm and raw-line fields plus the status line shown to the
//! user, and decides how each connect or reading outcome updates them.

use serde::{Deserialize, Serialize};

use crate::protocol::ProtocolError;
use crate::reading::Reading;

/// Placeholder for an unavailable numeric field
pub const NO_VALUE: &str = "--";

/// Raw-line placeholder after a timeout
pub const NO_DATA: &str = "<no data>";

/// Status line while no port is open
pub const STATUS_NOT_CONNECTED: &str = "Not connected";

/// How prominently a notice should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine outcome
    Info,
    /// Recoverable condition the user should notice
    Warning,
    /// Failed action
    Error,
}

/// Message produced by an action, for the front end to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity
    pub severity: Severity,
    /// Short title
    pub title: String,
    /// Body text
    pub message: String,
}

impl Notice {
    fn new(severity: Severity, title: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

/// Fields shown for the most recent reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingDisplay {
    /// Lux value or `--`
    pub lux: String,
    /// SQM value or `--`
    pub sqm: String,
    /// Last raw line, `<no data>` after a timeout
    pub raw: String,
    /// Connection status line
    pub status: String,
}

impl Default for ReadingDisplay {
    fn default() -> Self {
        Self {
            lux: NO_VALUE.to_string(),
            sqm: NO_VALUE.to_string(),
            raw: String::new(),
            status: STATUS_NOT_CONNECTED.to_string(),
        }
    }
}

impl ReadingDisplay {
    /// Create a display with every field at its placeholder
    pub fn new() -> Self {
        Self::default()
    }

    fn clear_values(&mut self) {
        self.lux = NO_VALUE.to_string();
        self.sqm = NO_VALUE.to_string();
    }

    /// Update the status line after a connect attempt
    pub fn apply_connect(&mut self, port: &str, result: &Result<(), ProtocolError>) -> Notice {
        match result {
            Ok(()) => {
                self.status = format!("Connected to {}", port);
                Notice::new(Severity::Info, "Connected", self.status.clone())
            }
            Err(e) => {
                self.status = STATUS_NOT_CONNECTED.to_string();
                let reason = match e {
                    ProtocolError::ConnectionFailed { reason, .. } => reason.clone(),
                    other => other.to_string(),
                };
                Notice::new(
                    Severity::Error,
                    "Connection error",
                    format!("Could not open port {}:\n{}", port, reason),
                )
            }
        }
    }

    /// Update the status line after an explicit disconnect
    pub fn apply_disconnect(&mut self) -> Notice {
        self.status = STATUS_NOT_CONNECTED.to_string();
        Notice::new(Severity::Info, "Disconnected", STATUS_NOT_CONNECTED)
    }

    /// Update the fields from the outcome of a reading request
    pub fn apply_reading(&mut self, result: &Result<Reading, ProtocolError>) -> Notice {
        match result {
            Ok(reading) => {
                self.raw = reading.raw.clone();
                self.lux = reading.lux.clone();
                self.sqm = reading.sqm.clone();
                Notice::new(Severity::Info, "Reading", reading.raw.clone())
            }
            Err(ProtocolError::NotConnected) => Notice::new(
                Severity::Warning,
                "Not connected",
                "Please connect to a serial port first.",
            ),
            Err(ProtocolError::Timeout) => {
                self.raw = NO_DATA.to_string();
                self.clear_values();
                Notice::new(Severity::Warning, "Timeout", "No data received (timeout).")
            }
            Err(ProtocolError::Parse { raw, source }) => {
                self.raw = raw.clone();
                self.clear_values();
                Notice::new(
                    Severity::Error,
                    "Parse error",
                    format!("Could not understand data from the sensor:\n{}", source),
                )
            }
            Err(ProtocolError::Communication(msg)) => Notice::new(
                Severity::Error,
                "Serial error",
                format!("Serial communication error:\n{}", msg),
            ),
            Err(other) => Notice::new(
                Severity::Error,
                "Serial error",
                format!("Serial communication error:\n{}", other),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_placeholders() {
        let display = ReadingDisplay::new();
        assert_eq!(display.lux, "--");
        assert_eq!(display.sqm, "--");
        assert_eq!(display.raw, "");
        assert_eq!(display.status, "Not connected");
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
