//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::engine::CommandEngine;
use crate::error::{EmberError, Result};
use crate::protocol::{read_request, write_reply};

/// Run the request/reply loop over any reader/writer pair
///
/// Strictly sequential: one request is read, executed and its reply flushed
/// before the next read. Returns the number of requests served when the peer
/// closes the stream. A framing error ends the loop without a reply.
pub fn serve<R, W>(
    reader: &mut R,
    writer: &mut W,
    engine: &CommandEngine,
    allow_inline: bool,
) -> Result<u64>
where
    R: BufRead,
    W: Write,
{
    let mut served = 0;

    loop {
        let request = match read_request(reader, allow_inline)? {
            Some(request) => request,
            None => return Ok(served),
        };

        let reply = engine.dispatch(&request);
        write_reply(writer, &reply)?;
        served += 1;
    }
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Command dispatcher over the shared store
    engine: CommandEngine,

    /// Whether unframed request lines are accepted
    allow_inline: bool,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O on two handles of the same socket
    pub fn new(stream: TcpStream, engine: CommandEngine, allow_inline: bool) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm: every reply is a small write
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            engine,
            allow_inline,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves a direction unbounded)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Peer disconnects and timeouts end the loop with `Ok`; framing errors
    /// end it with `Err`. Either way only this connection is affected.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        match serve(
            &mut self.reader,
            &mut self.writer,
            &self.engine,
            self.allow_inline,
        ) {
            Ok(served) => {
                tracing::debug!(
                    "Client {} disconnected after {} requests",
                    self.peer_addr,
                    served
                );
                Ok(())
            }
            Err(e) if e.is_disconnect() => {
                tracing::debug!("Connection to {} dropped: {}", self.peer_addr, e);
                Ok(())
            }
            Err(EmberError::Io(ref e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                // Unix reports an expired socket timeout as WouldBlock, Windows as TimedOut
                tracing::debug!("Timeout on connection to {}", self.peer_addr);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Closing connection to {}: {}", self.peer_addr, e);
                Err(e)
            }
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
