//! Codec Tests
//!
//! Tests for request and reply framing.

use std::io::Cursor;

use bytes::Bytes;
use emberkv::protocol::{
    decode_reply, decode_request, encode_reply, encode_request, read_reply, read_request,
    write_reply, write_request, Reply, Request, MAX_ARRAY_LEN, MAX_BULK_LEN, MAX_LINE_LEN,
};
use emberkv::EmberError;

fn assert_framing<T: std::fmt::Debug>(result: Result<T, EmberError>) {
    match result {
        Err(EmberError::Framing(_)) => {}
        other => panic!("Expected framing error, got {:?}", other),
    }
}

// =============================================================================
// Reply Encoding Tests
// =============================================================================

#[test]
fn test_encode_integer() {
    assert_eq!(encode_reply(&Reply::Integer(1)), b":1\r\n");
    assert_eq!(encode_reply(&Reply::Integer(-42)), b":-42\r\n");
}

#[test]
fn test_encode_bulk() {
    assert_eq!(encode_reply(&Reply::bulk("bar")), b"$3\r\nbar\r\n");
    assert_eq!(encode_reply(&Reply::bulk("")), b"$0\r\n\r\n");
}

#[test]
fn test_encode_nil() {
    assert_eq!(encode_reply(&Reply::Nil), b"$-1\r\n");
}

#[test]
fn test_encode_array_with_nil_items() {
    let reply = Reply::Array(vec![Some(Bytes::from("a")), None, Some(Bytes::from("bc"))]);
    assert_eq!(
        encode_reply(&reply),
        b"*3\r\n$1\r\na\r\n$-1\r\n$2\r\nbc\r\n"
    );
}

#[test]
fn test_encode_empty_array() {
    assert_eq!(encode_reply(&Reply::Array(vec![])), b"*0\r\n");
}

#[test]
fn test_encode_error() {
    assert_eq!(
        encode_reply(&Reply::error("unknown command: FOO")),
        b"-unknown command: FOO\r\n"
    );
}

#[test]
fn test_encode_error_flattens_line_breaks() {
    let encoded = encode_reply(&Reply::error("bad\r\nthing"));
    assert_eq!(encoded, b"-bad  thing\r\n");

    // Multi-line messages come back flattened, not as the original value
    assert_eq!(decode_reply(&encoded).unwrap(), Reply::error("bad  thing"));
}

// =============================================================================
// Reply Decoding Tests
// =============================================================================

#[test]
fn test_reply_round_trip() {
    let replies = vec![
        Reply::Integer(0),
        Reply::Integer(i64::MIN),
        Reply::Integer(i64::MAX),
        Reply::bulk("hello world"),
        Reply::bulk(""),
        Reply::bulk("trailing spaces   "),
        Reply::Bulk(Bytes::from_static(b"line\r\nbreak\r\n")),
        Reply::bulk((0..=255u8).collect::<Vec<u8>>()),
        Reply::Nil,
        Reply::Array(vec![]),
        Reply::Array(vec![None, Some(Bytes::from("x")), Some(Bytes::new())]),
        Reply::error("wrong number of arguments for 'GET' command"),
    ];

    for reply in replies {
        let decoded = decode_reply(&encode_reply(&reply)).unwrap();
        assert_eq!(decoded, reply);
    }
}

#[test]
fn test_decode_status_line_as_bulk() {
    assert_eq!(decode_reply(b"OK\r\n").unwrap(), Reply::bulk("OK"));
    assert_eq!(decode_reply(b"+PONG\r\n").unwrap(), Reply::bulk("PONG"));
}

#[test]
fn test_decode_accepts_bare_newline() {
    assert_eq!(decode_reply(b":7\n").unwrap(), Reply::Integer(7));
}

#[test]
fn test_decode_reads_one_frame_at_a_time() {
    let mut reader = Cursor::new(b":1\r\n$3\r\nbar\r\n$-1\r\n".to_vec());

    assert_eq!(read_reply(&mut reader).unwrap(), Reply::Integer(1));
    assert_eq!(read_reply(&mut reader).unwrap(), Reply::bulk("bar"));
    assert_eq!(read_reply(&mut reader).unwrap(), Reply::Nil);
    assert_framing(read_reply(&mut reader));
}

#[test]
fn test_decode_bulk_is_length_bounded() {
    // The payload contains a CRLF; only the announced length counts
    let reply = decode_reply(b"$5\r\na\r\nbc\r\n").unwrap();
    assert_eq!(reply, Reply::bulk("a\r\nbc"));
}

// =============================================================================
// Reply Error Handling Tests
// =============================================================================

#[test]
fn test_decode_empty_stream() {
    assert_framing(decode_reply(b""));
}

#[test]
fn test_decode_truncated_line() {
    assert_framing(decode_reply(b":12"));
}

#[test]
fn test_decode_truncated_bulk() {
    assert_framing(decode_reply(b"$10\r\nshort\r\n"));
}

#[test]
fn test_decode_bulk_missing_terminator() {
    assert_framing(decode_reply(b"$3\r\nbarXY"));
}

#[test]
fn test_decode_bad_lengths() {
    assert_framing(decode_reply(b"$abc\r\n"));
    assert_framing(decode_reply(b"$-2\r\n"));
    assert_framing(decode_reply(b"*-1\r\n"));
    assert_framing(decode_reply(b":notanumber\r\n"));
}

#[test]
fn test_decode_oversized_bulk() {
    let frame = format!("${}\r\n", MAX_BULK_LEN + 1);
    assert_framing(decode_reply(frame.as_bytes()));
}

#[test]
fn test_decode_rejects_plus_signed_numbers() {
    assert_framing(decode_reply(b"$+3\r\nbar\r\n"));
    assert_framing(decode_reply(b":+5\r\n"));
    assert_framing(decode_reply(b"*+1\r\n$1\r\na\r\n"));
    assert_framing(decode_request(b"*+1\r\n$3\r\nGET\r\n"));
    assert_eq!(decode_reply(b":-5\r\n").unwrap(), Reply::Integer(-5));
}

#[test]
fn test_decode_line_too_long() {
    // Longest allowed line, bare LF and CRLF terminated
    let mut at_limit = vec![b'a'; MAX_LINE_LEN];
    at_limit.push(b'\n');
    assert_eq!(
        decode_reply(&at_limit).unwrap(),
        Reply::bulk(vec![b'a'; MAX_LINE_LEN])
    );

    let mut over_lf = vec![b'a'; MAX_LINE_LEN + 1];
    over_lf.push(b'\n');
    assert_framing(decode_reply(&over_lf));
    assert_framing(decode_request(&over_lf));

    let mut over_crlf = vec![b'a'; MAX_LINE_LEN + 1];
    over_crlf.extend_from_slice(b"\r\n");
    assert_framing(decode_reply(&over_crlf));
    assert_framing(decode_request(&over_crlf));

    // No terminator at all
    let unterminated = vec![b'a'; MAX_LINE_LEN + 10];
    assert_framing(decode_reply(&unterminated));
    assert_framing(decode_request(&unterminated));
}

#[test]
fn test_decode_oversized_array() {
    let frame = format!("*{}\r\n", MAX_ARRAY_LEN + 1);

    assert_framing(read_reply(&mut Cursor::new(frame.clone().into_bytes())));
    assert_framing(read_request(&mut Cursor::new(frame.into_bytes()), true));
}

#[test]
fn test_decode_array_count_mismatch() {
    assert_framing(decode_reply(b"*3\r\n$1\r\na\r\n$-1\r\n"));
}

#[test]
fn test_decode_array_rejects_non_bulk_items() {
    assert_framing(decode_reply(b"*1\r\n:5\r\n"));
}

// =============================================================================
// Request Tests
// =============================================================================

#[test]
fn test_encode_request() {
    let request = Request::from_args(["SET", "foo", "bar"]);
    assert_eq!(
        encode_request(&request),
        b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n"
    );
}

#[test]
fn test_request_round_trip_keeps_whitespace() {
    let request = Request::from_args(["SET", "k", "  padded value \t "]);
    let decoded = decode_request(&encode_request(&request)).unwrap();
    assert_eq!(decoded, request);
}

#[test]
fn test_decode_inline_request() {
    let request = decode_request(b"set  foo   bar\r\n").unwrap();
    assert_eq!(request, Request::from_args(["set", "foo", "bar"]));
}

#[test]
fn test_inline_request_rejected_when_disabled() {
    let mut reader = Cursor::new(b"GET foo\r\n".to_vec());
    assert_framing(read_request(&mut reader, false));
}

#[test]
fn test_empty_inline_request() {
    assert_framing(decode_request(b"   \r\n"));
}

#[test]
fn test_read_request_clean_end_of_stream() {
    let mut reader = Cursor::new(Vec::new());
    assert!(read_request(&mut reader, true).unwrap().is_none());
}

#[test]
fn test_read_request_truncated_mid_frame() {
    let mut reader = Cursor::new(b"*2\r\n$3\r\nGET\r\n".to_vec());
    assert_framing(read_request(&mut reader, true));
}

#[test]
fn test_request_rejects_nil_argument() {
    assert_framing(decode_request(b"*2\r\n$3\r\nGET\r\n$-1\r\n"));
}

#[test]
fn test_empty_request_array() {
    let request = decode_request(b"*0\r\n").unwrap();
    assert!(request.is_empty());
}

// =============================================================================
// Stream Helper Tests
// =============================================================================

#[test]
fn test_write_and_read_over_stream() {
    let mut buf = Vec::new();
    write_request(&mut buf, &Request::from_args(["GET", "foo"])).unwrap();
    write_reply(&mut buf, &Reply::bulk("bar")).unwrap();

    let mut reader = Cursor::new(buf);
    let request = read_request(&mut reader, false).unwrap().unwrap();
    assert_eq!(request, Request::from_args(["GET", "foo"]));
    assert_eq!(read_reply(&mut reader).unwrap(), Reply::bulk("bar"));
}
