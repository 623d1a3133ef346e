//! A single sensor reading

use serde::{Deserialize, Serialize};

use crate::parser::{parse_lux_sqm, ParseError};

/// One parsed reply from the sensor. Values keep the text the board sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Trimmed line as received
    pub raw: String,
    /// Illuminance in lux
    pub lux: String,
    /// Sky brightness in mag/arcsec², or "NaN" when saturated
    pub sqm: String,
}

impl Reading {
    /// Parse a received line into a reading
    pub fn from_line(line: &str) -> Result<Self, ParseError> {
        let raw = line.trim();
        let (lux, sqm) = parse_lux_sqm(raw)?;
        Ok(Self {
            raw: raw.to_string(),
            lux,
            sqm,
        })
    }

    /// Whether the sensor reported a usable SQM value
    pub fn has_sqm(&self) -> bool {
        !self.sqm.eq_ignore_ascii_case("NAN")
    }
}
