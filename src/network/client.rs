//! TCP Client
//!
//! Blocking client: one request out, exactly one reply back.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use bytes::Bytes;

use crate::error::{EmberError, Result};
use crate::protocol::{read_reply, write_request, Command, Reply, Request};

/// A connection to an EmberKV server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send one request and wait for its reply
    ///
    /// An error reply becomes `Err(EmberError::Remote)`; the connection stays
    /// usable for the next call.
    pub fn send(&mut self, request: &Request) -> Result<Reply> {
        write_request(&mut self.writer, request)?;

        match read_reply(&mut self.reader)? {
            Reply::Error(message) => Err(EmberError::Remote(message)),
            reply => Ok(reply),
        }
    }

    /// Send raw arguments, e.g. `["SET", "foo", "bar"]`
    pub fn execute<I, A>(&mut self, args: I) -> Result<Reply>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        self.send(&Request::from_args(args))
    }

    /// Get a value by key
    pub fn get(&mut self, key: &str) -> Result<Option<Bytes>> {
        let command = Command::Get {
            key: key.to_string(),
        };
        match self.send(&command.to_request())? {
            Reply::Bulk(value) => Ok(Some(value)),
            Reply::Nil => Ok(None),
            other => Err(unexpected(&command, &other)),
        }
    }

    /// Set a key-value pair
    pub fn set(&mut self, key: &str, value: impl Into<Bytes>) -> Result<i64> {
        let command = Command::Set {
            key: key.to_string(),
            value: value.into(),
        };
        self.integer(&command)
    }

    /// Delete a key, returning how many keys were removed (0 or 1)
    pub fn del(&mut self, key: &str) -> Result<i64> {
        let command = Command::Del {
            key: key.to_string(),
        };
        self.integer(&command)
    }

    /// Remove every key, returning how many there were
    pub fn flush(&mut self) -> Result<i64> {
        self.integer(&Command::Flush)
    }

    /// Set several pairs at once, returning how many were written
    pub fn mset<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Result<i64>
    where
        K: Into<String>,
        V: Into<Bytes>,
    {
        let command = Command::MSet {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        };
        self.integer(&command)
    }

    fn integer(&mut self, command: &Command) -> Result<i64> {
        match self.send(&command.to_request())? {
            Reply::Integer(n) => Ok(n),
            other => Err(unexpected(command, &other)),
        }
    }
}

fn unexpected(command: &Command, reply: &Reply) -> EmberError {
    EmberError::Remote(format!(
        "unexpected reply to {}: {:?}",
        command.command_type().name(),
        reply
    ))
}
