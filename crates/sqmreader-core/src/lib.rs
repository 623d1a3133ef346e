//! # SQM Reader Core Library
//!
//! Core functionality for the SQM Reader light sensor client.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Serial port enumeration and a single-owner connection manager
//! - The one-byte request / one-line response reading protocol
//! - Parsing of `LUX:<value>,SQM:<value>` sensor lines
//! - A display model mapping each outcome to the lux, sqm and raw fields
//!
//! ## Example
//!
//! ```rust,ignore
//! use sqmreader_core::protocol::ConnectionManager;
//!
//! let mut manager = ConnectionManager::default();
//! manager.connect("/dev/ttyUSB0")?;
//!
//! let reading = manager.request_reading()?;
//! println!("LUX: {}  SQM: {}", reading.lux, reading.sqm);
//! ```

pub mod display;
pub mod parser;
pub mod protocol;
pub mod reading;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::display::{Notice, ReadingDisplay, Severity};
    pub use crate::parser::{parse_lux_sqm, ParseError};
    pub use crate::protocol::{
        Connection, ConnectionConfig, ConnectionManager, ConnectionState, ProtocolError,
        Transport,
    };
    pub use crate::reading::Reading;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
