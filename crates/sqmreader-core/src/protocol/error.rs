//! Protocol errors

use thiserror::Error;

use crate::parser::ParseError;

/// Errors that can occur while talking to the sensor
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Could not open port {port}: {reason}")]
    ConnectionFailed { port: String, reason: String },

    #[error("Not connected to a serial port")]
    NotConnected,

    #[error("No data received (timeout)")]
    Timeout,

    #[error("Could not parse sensor line '{raw}': {source}")]
    Parse {
        raw: String,
        #[source]
        source: ParseError,
    },

    #[error("Serial communication error: {0}")]
    Communication(String),
}

impl ProtocolError {
    /// Raw line carried by a parse failure, if any
    pub fn raw_line(&self) -> Option<&str> {
        match self {
            ProtocolError::Parse { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub(crate) fn connection_failed(port: &str, reason: impl ToString) -> Self {
        ProtocolError::ConnectionFailed {
            port: port.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<std::io::Error> for ProtocolError {
    fn from(e: std::io::Error) -> Self {
        ProtocolError::Communication(e.to_string())
    }
}
