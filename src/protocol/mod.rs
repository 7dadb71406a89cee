//! Protocol Module
//!
//! Defines the wire protocol for client-server communication: a textual,
//! length-prefixed format in the style of the Redis serialization protocol.
//!
//! ### Request Format
//! ```text
//! *3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n
//! ```
//!
//! ### Commands
//! - GET   key         -> bulk value or nil
//! - SET   key value   -> :1
//! - DEL   key         -> :0 or :1
//! - FLUSH             -> number of keys removed
//! - MSET  k v [k v..] -> number of pairs written
//!
//! ### Reply Types
//! - `:` integer
//! - `$` bulk string, `$-1` nil
//! - `*` array of bulk strings / nils
//! - `-` error

mod command;
mod reply;
mod codec;

pub use command::{Command, CommandType, Request};
pub use reply::Reply;
pub use codec::{
    decode_reply, decode_request, encode_reply, encode_request, read_reply, read_request,
    write_reply, write_request, MAX_ARRAY_LEN, MAX_BULK_LEN, MAX_LINE_LEN,
};
