//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! *<argc>\r\n
//! $<len>\r\n<arg bytes>\r\n     (argc times)
//! ```
//! or, for plain-text senders, one inline line: `SET foo bar\r\n`
//!
//! ### Reply Format
//! ```text
//! :<integer>\r\n                 Integer
//! $<len>\r\n<payload>\r\n        Bulk
//! $-1\r\n                        Nil
//! *<count>\r\n<bulk or nil>...   Array
//! -<message>\r\n                 Error
//! <text>\r\n                     Status line, read back as Bulk
//! ```
//!
//! Lines end in `\n` with an optional `\r` before it; only the terminator is
//! stripped. Bulk payloads are read by their announced length, so they may
//! contain any byte, including CR, LF and trailing whitespace.

use std::io::{BufRead, ErrorKind, Read, Write};

use bytes::Bytes;

use super::{Reply, Request};
use crate::error::{EmberError, Result};

/// Maximum bulk payload size (16 MB)
pub const MAX_BULK_LEN: usize = 16 * 1024 * 1024;

/// Maximum number of elements in one array frame
pub const MAX_ARRAY_LEN: usize = 1024 * 1024;

/// Maximum length of a single protocol line, terminator excluded
pub const MAX_LINE_LEN: usize = 64 * 1024;

const CRLF: &[u8] = b"\r\n";
const NIL: &[u8] = b"$-1\r\n";

// =============================================================================
// Encoding
// =============================================================================

/// Encode a reply to bytes
pub fn encode_reply(reply: &Reply) -> Vec<u8> {
    let mut buf = Vec::new();

    match reply {
        Reply::Integer(n) => put_line(&mut buf, b':', n.to_string().as_bytes()),
        Reply::Bulk(payload) => put_bulk(&mut buf, payload),
        Reply::Nil => buf.extend_from_slice(NIL),
        Reply::Array(items) => {
            put_line(&mut buf, b'*', items.len().to_string().as_bytes());
            for item in items {
                match item {
                    Some(payload) => put_bulk(&mut buf, payload),
                    None => buf.extend_from_slice(NIL),
                }
            }
        }
        Reply::Error(message) => {
            // An error is a single line; embedded line breaks would desync the peer
            let message = message.replace(['\r', '\n'], " ");
            put_line(&mut buf, b'-', message.as_bytes());
        }
    }

    buf
}

/// Encode a request as an array of bulk strings
pub fn encode_request(request: &Request) -> Vec<u8> {
    let payload_len: usize = request.args.iter().map(|a| a.len() + 16).sum();
    let mut buf = Vec::with_capacity(16 + payload_len);

    put_line(&mut buf, b'*', request.args.len().to_string().as_bytes());
    for arg in &request.args {
        put_bulk(&mut buf, arg);
    }

    buf
}

fn put_line(buf: &mut Vec<u8>, sigil: u8, body: &[u8]) {
    buf.push(sigil);
    buf.extend_from_slice(body);
    buf.extend_from_slice(CRLF);
}

fn put_bulk(buf: &mut Vec<u8>, payload: &[u8]) {
    put_line(buf, b'$', payload.len().to_string().as_bytes());
    buf.extend_from_slice(payload);
    buf.extend_from_slice(CRLF);
}

// =============================================================================
// Decoding
// =============================================================================

/// Read one request frame
///
/// Returns `Ok(None)` when the stream ends cleanly before a new frame starts.
/// With `allow_inline`, a line that does not start with `*` is split on
/// whitespace into arguments.
pub fn read_request<R: BufRead>(reader: &mut R, allow_inline: bool) -> Result<Option<Request>> {
    let line = match read_line(reader)? {
        Some(line) => line,
        None => return Ok(None),
    };

    match line.split_first() {
        Some((b'*', count)) => {
            let count = parse_count(count)?;
            let mut args = Vec::with_capacity(count.min(64));
            for _ in 0..count {
                match read_bulk_item(reader)? {
                    Some(arg) => args.push(arg),
                    None => {
                        return Err(EmberError::Framing(
                            "nil bulk string inside a request".to_string(),
                        ))
                    }
                }
            }
            Ok(Some(Request::new(args)))
        }
        _ if allow_inline => parse_inline(&line).map(Some),
        _ => Err(EmberError::Framing(format!(
            "expected '*', got '{}'",
            String::from_utf8_lossy(&line)
        ))),
    }
}

/// Read exactly one reply frame
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply> {
    let line = expect_line(reader)?;

    let reply = match line.split_first() {
        Some((b':', digits)) => Reply::Integer(parse_number(digits, "integer")?),
        Some((b'$', len)) => match parse_bulk_len(len)? {
            Some(len) => Reply::Bulk(read_bulk_body(reader, len)?),
            None => Reply::Nil,
        },
        Some((b'*', count)) => {
            let count = parse_count(count)?;
            let mut items = Vec::with_capacity(count.min(64));
            for _ in 0..count {
                items.push(read_bulk_item(reader)?);
            }
            Reply::Array(items)
        }
        Some((b'-', message)) => Reply::Error(String::from_utf8_lossy(message).into_owned()),
        Some((b'+', status)) => Reply::Bulk(Bytes::copy_from_slice(status)),
        _ => Reply::Bulk(Bytes::copy_from_slice(&line)),
    };

    Ok(reply)
}

/// Decode one request from a byte slice
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    let mut reader = bytes;
    read_request(&mut reader, true)?.ok_or_else(unexpected_eof)
}

/// Decode one reply from a byte slice
pub fn decode_reply(bytes: &[u8]) -> Result<Reply> {
    let mut reader = bytes;
    read_reply(&mut reader)
}

/// Split an inline request line into arguments
fn parse_inline(line: &[u8]) -> Result<Request> {
    let args: Vec<Bytes> = line
        .split(|b| b.is_ascii_whitespace())
        .filter(|word| !word.is_empty())
        .map(Bytes::copy_from_slice)
        .collect();

    if args.is_empty() {
        return Err(EmberError::Framing("empty request".to_string()));
    }
    Ok(Request::new(args))
}

/// Read a `$` frame inside an array: payload, or `None` for nil
fn read_bulk_item<R: BufRead>(reader: &mut R) -> Result<Option<Bytes>> {
    let line = expect_line(reader)?;

    match line.split_first() {
        Some((b'$', len)) => match parse_bulk_len(len)? {
            Some(len) => read_bulk_body(reader, len).map(Some),
            None => Ok(None),
        },
        _ => Err(EmberError::Framing(format!(
            "expected bulk string, got '{}'",
            String::from_utf8_lossy(&line)
        ))),
    }
}

/// Read `len` payload bytes plus the trailing CRLF
fn read_bulk_body<R: Read>(reader: &mut R, len: usize) -> Result<Bytes> {
    let mut payload = vec![0u8; len + CRLF.len()];
    reader.read_exact(&mut payload).map_err(framing_on_eof)?;

    if &payload[len..] != CRLF {
        return Err(EmberError::Framing(format!(
            "bulk string of {} bytes not terminated by CRLF",
            len
        )));
    }
    payload.truncate(len);

    Ok(Bytes::from(payload))
}

/// Read one line, without its terminator
///
/// Returns `Ok(None)` if the stream is already at its end.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut line = Vec::new();
    let read = reader
        .by_ref()
        .take(MAX_LINE_LEN as u64 + CRLF.len() as u64)
        .read_until(b'\n', &mut line)?;

    if read == 0 {
        return Ok(None);
    }

    if line.last() != Some(&b'\n') {
        if line.len() > MAX_LINE_LEN {
            return Err(EmberError::Framing(format!(
                "line exceeds {} bytes",
                MAX_LINE_LEN
            )));
        }
        return Err(unexpected_eof());
    }

    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }

    if line.len() > MAX_LINE_LEN {
        return Err(EmberError::Framing(format!(
            "line exceeds {} bytes",
            MAX_LINE_LEN
        )));
    }

    Ok(Some(line))
}

/// Read a line that must be there
fn expect_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    read_line(reader)?.ok_or_else(unexpected_eof)
}

/// Parse a decimal field: ASCII digits with an optional leading `-`
fn parse_number(field: &[u8], what: &str) -> Result<i64> {
    Some(field)
        .filter(|f| matches!(f.first(), Some(b'0'..=b'9') | Some(b'-')))
        .and_then(|f| std::str::from_utf8(f).ok())
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            EmberError::Framing(format!(
                "invalid {} '{}'",
                what,
                String::from_utf8_lossy(field)
            ))
        })
}

/// Parse a bulk length; `-1` means nil
fn parse_bulk_len(field: &[u8]) -> Result<Option<usize>> {
    let len = parse_number(field, "bulk length")?;

    match len {
        -1 => Ok(None),
        len if len < 0 => Err(EmberError::Framing(format!("invalid bulk length {}", len))),
        len if len as u64 > MAX_BULK_LEN as u64 => Err(EmberError::Framing(format!(
            "bulk string too large: {} bytes (max {})",
            len, MAX_BULK_LEN
        ))),
        len => Ok(Some(len as usize)),
    }
}

/// Parse an array count
fn parse_count(field: &[u8]) -> Result<usize> {
    let count = parse_number(field, "array count")?;

    if count < 0 {
        return Err(EmberError::Framing(format!("invalid array count {}", count)));
    }
    if count as u64 > MAX_ARRAY_LEN as u64 {
        return Err(EmberError::Framing(format!(
            "array too large: {} elements (max {})",
            count, MAX_ARRAY_LEN
        )));
    }

    Ok(count as usize)
}

fn unexpected_eof() -> EmberError {
    EmberError::Framing("unexpected end of stream".to_string())
}

fn framing_on_eof(e: std::io::Error) -> EmberError {
    if e.kind() == ErrorKind::UnexpectedEof {
        unexpected_eof()
    } else {
        EmberError::Io(e)
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Write a reply to a stream
pub fn write_reply<W: Write>(writer: &mut W, reply: &Reply) -> Result<()> {
    let bytes = encode_reply(reply);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
