//! Sensor line parser
//!
//! The firmware answers each `R` with a single line:
//!
//! ```text
//! LUX:<value>,SQM:<value>
//! ```
//!
//! Lux is always a real number. SQM may be the literal `NaN` when the sensor
//! is saturated (pointed at a lamp or the sun). Values are returned as the
//! text the board sent so they can be shown verbatim.

use thiserror::Error;

const LUX_MARKER: &str = "LUX:";
const SQM_MARKER: &str = "SQM:";

/// Reasons a line is not a valid sensor reading
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// One or both field markers absent
    #[error("No LUX:/SQM: markers in line: {line}")]
    MissingMarkers { line: String },

    /// No comma separating the two fields
    #[error("Wrong number of fields (expected 2, got {found}). Line: {line}")]
    FieldCount { found: usize, line: String },

    /// Fields present but not as `LUX:...,SQM:...`
    #[error("Line does not start with LUX: and SQM:. Line: {line}")]
    FieldOrder { line: String },

    /// Lux value is not a real number
    #[error("Could not convert LUX value to a number: '{value}'")]
    InvalidLux { value: String },

    /// SQM value is neither a real number nor NaN
    #[error("Could not convert SQM value to a number: '{value}'")]
    InvalidSqm { value: String },
}

/// Parse a `LUX:<value>,SQM:<value>` line into its lux and sqm texts.
///
/// The check order matters: marker presence, then field count, then field
/// order, then the numeric values.
pub fn parse_lux_sqm(line: &str) -> Result<(String, String), ParseError> {
    if !line.contains(LUX_MARKER) || !line.contains(SQM_MARKER) {
        return Err(ParseError::MissingMarkers { line: line.to_string() });
    }

    let (lux_part, sqm_part) = line.split_once(',').ok_or_else(|| ParseError::FieldCount {
        found: 1,
        line: line.to_string(),
    })?;
    let lux_part = lux_part.trim();
    let sqm_part = sqm_part.trim();

    if !lux_part.starts_with(LUX_MARKER) || !sqm_part.starts_with(SQM_MARKER) {
        return Err(ParseError::FieldOrder { line: line.to_string() });
    }

    let lux = value_after_colon(lux_part);
    let sqm = value_after_colon(sqm_part);

    if !is_real_number(lux) {
        return Err(ParseError::InvalidLux { value: lux.to_string() });
    }
    if !sqm.eq_ignore_ascii_case("NAN") && !is_real_number(sqm) {
        return Err(ParseError::InvalidSqm { value: sqm.to_string() });
    }

    Ok((lux.to_string(), sqm.to_string()))
}

fn value_after_colon(part: &str) -> &str {
    part.split_once(':').map(|(_, v)| v.trim()).unwrap_or("")
}

/// Finite or infinite real; `f64::from_str` also takes "nan", which is not
fn is_real_number(text: &str) -> bool {
    text.parse::<f64>().map(|v| !v.is_nan()).unwrap_or(false)
}
