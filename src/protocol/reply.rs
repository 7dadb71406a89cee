//! Reply definitions
//!
//! Represents replies sent to clients.

use bytes::Bytes;

/// A typed reply
///
/// Array items are bulk strings or nil; arrays never nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `:<n>\r\n`
    Integer(i64),

    /// `$<len>\r\n<payload>\r\n`
    Bulk(Bytes),

    /// `$-1\r\n`
    Nil,

    /// `*<count>\r\n` followed by `count` bulk or nil items
    Array(Vec<Option<Bytes>>),

    /// `-<message>\r\n`
    ///
    /// Messages must be single-line: encoding replaces CR and LF with spaces,
    /// so a multi-line message does not survive a round trip unchanged.
    Error(String),
}

impl Reply {
    /// Create a bulk reply from anything byte-like
    pub fn bulk(payload: impl Into<Bytes>) -> Self {
        Reply::Bulk(payload.into())
    }

    /// Create a bulk reply, or nil when absent
    pub fn from_option(value: Option<Bytes>) -> Self {
        match value {
            Some(value) => Reply::Bulk(value),
            None => Reply::Nil,
        }
    }

    /// Create an error reply
    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error(message.into())
    }

    /// Create an integer reply from a count
    pub fn count(n: usize) -> Self {
        Reply::Integer(n as i64)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}
