//! Reading request
//!
//! One exchange per call: reset buffers, send `R\n`, read one line, parse it.

use super::{Connection, ProtocolError, LINE_TERMINATOR, READ_COMMAND};
use crate::parser::parse_lux_sqm;
use crate::reading::Reading;

const COMMAND: [u8; 2] = [READ_COMMAND, LINE_TERMINATOR];

/// Bytes sent to request a reading. The newline is ignored by the firmware.
pub fn reading_command() -> &'static [u8] {
    &COMMAND
}

/// Decode bytes as UTF-8, dropping invalid sequences instead of replacing them
pub fn decode_line(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Request a single reading over `connection`.
///
/// Fails with [`ProtocolError::NotConnected`] without touching the wire when
/// there is no connection, [`ProtocolError::Timeout`] when nothing but
/// whitespace arrives in time, and [`ProtocolError::Parse`] (carrying the raw
/// line) when the reply is not a valid sensor line.
pub fn request_reading(connection: Option<&mut Connection>) -> Result<Reading, ProtocolError> {
    let conn = connection.ok_or(ProtocolError::NotConnected)?;
    let timeout = conn.timeout();
    let port_name = conn.port_name().to_string();
    let transport = conn.transport_mut();

    transport.clear_input()?;
    transport.clear_output()?;

    tracing::debug!("{}: sending {:02x?}", port_name, reading_command());
    transport.write_all(reading_command())?;
    transport.flush()?;

    tracing::debug!("{}: waiting up to {}ms for reply line", port_name, timeout.as_millis());
    let bytes = transport.read_line(timeout).map_err(|e| {
        tracing::error!("{}: read failed: {}", port_name, e);
        ProtocolError::from(e)
    })?;

    let line = decode_line(&bytes).trim().to_string();
    tracing::debug!("{}: raw line received: {:?}", port_name, line);

    if line.is_empty() {
        tracing::warn!("{}: no data received within {}ms", port_name, timeout.as_millis());
        return Err(ProtocolError::Timeout);
    }

    match parse_lux_sqm(&line) {
        Ok((lux, sqm)) => Ok(Reading { raw: line, lux, sqm }),
        Err(source) => {
            tracing::warn!("{}: parse error: {}", port_name, source);
            Err(ProtocolError::Parse { raw: line, source })
        }
    }
}
