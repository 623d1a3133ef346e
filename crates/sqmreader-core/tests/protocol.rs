use pretty_assertions::assert_eq;
use sqmreader_core::prelude::*;
use sqmreader_core::protocol::{request_reading, DEFAULT_TIMEOUT_MS};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the mock saw and what it will answer
#[derive(Default)]
struct MockState {
    sent: Vec<u8>,
    replies: VecDeque<Vec<u8>>,
    input_clears: usize,
    output_clears: usize,
    flushes: usize,
    read_timeouts: Vec<Duration>,
    fail_on_send: bool,
    fail_on_read: bool,
    dropped: bool,
}

/// In-memory sensor for exercising the protocol client
struct MockSerial {
    state: Arc<Mutex<MockState>>,
}

impl MockSerial {
    fn new() -> (Self, Arc<Mutex<MockState>>) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }

    fn with_response(response: &[u8]) -> (Self, Arc<Mutex<MockState>>) {
        let (mock, state) = Self::new();
        state.lock().unwrap().replies.push_back(response.to_vec());
        (mock, state)
    }
}

impl Drop for MockSerial {
    fn drop(&mut self) {
        self.state.lock().unwrap().dropped = true;
    }
}

impl Transport for MockSerial {
    fn clear_input(&mut self) -> io::Result<()> {
        self.state.lock().unwrap().input_clears += 1;
        Ok(())
    }

    fn clear_output(&mut self) -> io::Result<()> {
        self.state.lock().unwrap().output_clears += 1;
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_on_send {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "Serial write failed"));
        }
        state.sent.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.lock().unwrap().flushes += 1;
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> io::Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.read_timeouts.push(timeout);
        if state.fail_on_read {
            return Err(io::Error::new(io::ErrorKind::Other, "device unplugged"));
        }
        // A silent device yields nothing once the deadline passes
        let reply = state.replies.pop_front().unwrap_or_default();
        Ok(reply
            .split(|b| *b == b'\n')
            .next()
            .map(<[u8]>::to_vec)
            .unwrap_or_default())
    }
}

fn attached(mock: MockSerial) -> ConnectionManager {
    let mut manager = ConnectionManager::default();
    manager
        .attach("/dev/ttyMOCK0", Box::new(mock))
        .expect("attach should succeed");
    manager
}

#[test]
fn test_reading_round_trip() {
    let (mock, state) = MockSerial::with_response(b"LUX:123.4,SQM:5.6\r\n");
    let mut manager = attached(mock);

    let reading = manager.request_reading().unwrap();
    assert_eq!(
        reading,
        Reading {
            raw: "LUX:123.4,SQM:5.6".to_string(),
            lux: "123.4".to_string(),
            sqm: "5.6".to_string(),
        }
    );

    let state = state.lock().unwrap();
    assert_eq!(state.sent, b"R\n");
    assert_eq!(state.flushes, 1);
    // Once on attach, once before the request
    assert_eq!(state.input_clears, 2);
    assert_eq!(state.output_clears, 1);
}

#[test]
fn test_not_connected_sends_nothing() {
    let mut manager = ConnectionManager::default();
    let err = manager.request_reading().unwrap_err();
    assert!(matches!(err, ProtocolError::NotConnected));

    let err = request_reading(None).unwrap_err();
    assert!(matches!(err, ProtocolError::NotConnected));
}

#[test]
fn test_not_connected_after_disconnect() {
    let (mock, state) = MockSerial::new();
    let mut manager = attached(mock);
    manager.disconnect();

    assert!(state.lock().unwrap().dropped);
    let err = manager.request_reading().unwrap_err();
    assert!(matches!(err, ProtocolError::NotConnected));
    assert!(state.lock().unwrap().sent.is_empty());
}

#[test]
fn test_silent_device_times_out_with_configured_window() {
    let (mock, state) = MockSerial::new();
    let mut manager = attached(mock);

    let err = manager.request_reading().unwrap_err();
    assert!(matches!(err, ProtocolError::Timeout));

    let state = state.lock().unwrap();
    assert_eq!(state.sent, b"R\n");
    assert_eq!(
        state.read_timeouts,
        vec![Duration::from_millis(DEFAULT_TIMEOUT_MS)]
    );
}

#[test]
fn test_custom_timeout_is_used_for_reads() {
    let (mock, state) = MockSerial::new();
    let mut manager = ConnectionManager::new(ConnectionConfig {
        timeout_ms: 250,
        ..ConnectionConfig::default()
    });
    manager.attach("/dev/ttyMOCK0", Box::new(mock)).unwrap();

    let _ = manager.request_reading();
    assert_eq!(
        state.lock().unwrap().read_timeouts,
        vec![Duration::from_millis(250)]
    );
}

#[test]
fn test_whitespace_only_reply_is_no_data() {
    let (mock, _state) = MockSerial::with_response(b"  \r\n");
    let mut manager = attached(mock);
    assert!(matches!(
        manager.request_reading(),
        Err(ProtocolError::Timeout)
    ));
}

#[test]
fn test_parse_error_keeps_raw_line() {
    let (mock, _state) = MockSerial::with_response(b"SQM:5.6,LUX:123.4\n");
    let mut manager = attached(mock);

    let err = manager.request_reading().unwrap_err();
    assert_eq!(err.raw_line(), Some("SQM:5.6,LUX:123.4"));
    match err {
        ProtocolError::Parse { source, .. } => {
            assert!(matches!(source, ParseError::FieldOrder { .. }))
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_invalid_utf8_is_dropped() {
    let (mock, _state) = MockSerial::with_response(b"\xffLUX:0.5,\xfeSQM:NaN\n");
    let mut manager = attached(mock);

    let reading = manager.request_reading().unwrap();
    assert_eq!(reading.raw, "LUX:0.5,SQM:NaN");
    assert_eq!(reading.sqm, "NaN");
}

#[test]
fn test_write_failure_is_communication_error() {
    let (mock, state) = MockSerial::new();
    state.lock().unwrap().fail_on_send = true;
    let mut manager = attached(mock);

    let err = manager.request_reading().unwrap_err();
    assert!(matches!(err, ProtocolError::Communication(_)));
    assert!(state.lock().unwrap().read_timeouts.is_empty());
}

#[test]
fn test_read_failure_is_communication_error() {
    let (mock, state) = MockSerial::new();
    state.lock().unwrap().fail_on_read = true;
    let mut manager = attached(mock);

    let err = manager.request_reading().unwrap_err();
    assert!(matches!(err, ProtocolError::Communication(_)));
    // Still connected; the user can simply try again
    assert!(manager.is_connected());
}

#[test]
fn test_reattach_replaces_previous_connection() {
    let (first, first_state) = MockSerial::new();
    let (second, second_state) = MockSerial::with_response(b"LUX:1,SQM:2\n");
    let mut manager = attached(first);

    manager.attach("/dev/ttyMOCK1", Box::new(second)).unwrap();
    assert!(first_state.lock().unwrap().dropped);
    assert_eq!(manager.port_name(), Some("/dev/ttyMOCK1"));

    manager.request_reading().unwrap();
    assert!(first_state.lock().unwrap().sent.is_empty());
    assert_eq!(second_state.lock().unwrap().sent, b"R\n");
}

#[test]
fn test_connect_to_missing_port_leaves_disconnected() {
    let (mock, state) = MockSerial::new();
    let mut manager = attached(mock);

    let err = manager.connect("/dev/no-such-sensor").unwrap_err();
    match err {
        ProtocolError::ConnectionFailed { port, .. } => assert_eq!(port, "/dev/no-such-sensor"),
        other => panic!("expected connection error, got {other:?}"),
    }
    // The previous link is released before the new one is attempted
    assert!(state.lock().unwrap().dropped);
    assert!(!manager.is_connected());
    assert_eq!(manager.state(), ConnectionState::Disconnected);
}

#[test]
fn test_protocol_error_display() {
    assert_eq!(ProtocolError::Timeout.to_string(), "No data received (timeout)");
    assert_eq!(
        ProtocolError::NotConnected.to_string(),
        "Not connected to a serial port"
    );
}
