//! Connection Tests
//!
//! Drives the per-connection loop over in-memory streams.

use std::io::Cursor;
use std::sync::Arc;

use emberkv::network::serve;
use emberkv::{CommandEngine, EmberError, Store};

fn run_session(input: &[u8], allow_inline: bool) -> (Result<u64, EmberError>, Vec<u8>) {
    let engine = CommandEngine::new(Arc::new(Store::new()));
    let mut reader = Cursor::new(input.to_vec());
    let mut output = Vec::new();

    let result = serve(&mut reader, &mut output, &engine, allow_inline);
    (result, output)
}

#[test]
fn test_scenario_over_session() {
    let input = b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n\
*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n\
*2\r\n$3\r\nDEL\r\n$3\r\nfoo\r\n\
*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n\
*2\r\n$3\r\nFOO\r\n$1\r\nx\r\n";

    let (result, output) = run_session(input, true);

    assert_eq!(result.unwrap(), 5);
    assert_eq!(
        output,
        b":1\r\n$3\r\nbar\r\n:1\r\n$-1\r\n-unknown command: FOO\r\n"
    );
}

#[test]
fn test_inline_requests() {
    let (result, output) = run_session(b"SET foo bar\r\nGET foo\r\n", true);

    assert_eq!(result.unwrap(), 2);
    assert_eq!(output, b":1\r\n$3\r\nbar\r\n");
}

#[test]
fn test_error_replies_keep_session_alive() {
    let (result, output) = run_session(b"GET\r\nMSET a 1 b\r\nSET a 1\r\n", true);

    assert_eq!(result.unwrap(), 3);
    assert_eq!(
        output,
        b"-wrong number of arguments for 'GET' command\r\n\
-wrong number of arguments for 'MSET' command\r\n\
:1\r\n"
            .to_vec()
    );
}

#[test]
fn test_framing_error_ends_session_without_reply() {
    // Second frame announces a bad length; the third must never run
    let input = b"SET a 1\r\n*2\r\n$x\r\nGET\r\nSET b 2\r\n";
    let (result, output) = run_session(input, true);

    assert!(matches!(result, Err(EmberError::Framing(_))));
    assert_eq!(output, b":1\r\n");
}

#[test]
fn test_truncated_frame_ends_session() {
    let (result, output) = run_session(b"*2\r\n$3\r\nGET\r\n$3\r\nfo", true);

    assert!(matches!(result, Err(EmberError::Framing(_))));
    assert!(output.is_empty());
}

#[test]
fn test_inline_disabled() {
    let (result, output) = run_session(b"GET foo\r\n", false);

    assert!(matches!(result, Err(EmberError::Framing(_))));
    assert!(output.is_empty());
}

#[test]
fn test_bulk_value_with_trailing_whitespace_survives() {
    let input = b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$4\r\nab  \r\n*2\r\n$3\r\nGET\r\n$1\r\nk\r\n";
    let (result, output) = run_session(input, false);

    assert_eq!(result.unwrap(), 2);
    assert_eq!(output, b":1\r\n$4\r\nab  \r\n");
}
