//! TCP Server
//!
//! Accepts connections and hands each one to its own worker thread.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::engine::CommandEngine;
use crate::error::Result;
use crate::store::Store;

use super::Connection;

/// TCP server for EmberKV
///
/// One thread per accepted connection, no upper bound. Every worker shares
/// the Store passed to [`Server::bind`].
pub struct Server {
    config: Config,
    engine: CommandEngine,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listener described by `config`
    pub fn bind(config: Config, store: Arc<Store>) -> Result<Self> {
        let addr = config.socket_addr()?;
        let listener = TcpListener::bind(addr)?;

        Ok(Self {
            config,
            engine: CommandEngine::new(store),
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address the listener is actually bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle that stops [`Server::run`] from another thread
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        Ok(ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr: wake_addr(self.local_addr()?),
        })
    }

    /// Accept connections until shut down (blocking)
    ///
    /// Accept errors are logged and skipped. Workers already running are
    /// left to finish on their own.
    pub fn run(&self) -> Result<()> {
        tracing::info!("Listening on {}", self.local_addr()?);

        let mut next_id: u64 = 0;
        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            match stream {
                Ok(stream) => {
                    next_id += 1;
                    self.spawn_worker(next_id, stream);
                }
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                }
            }
        }

        tracing::info!("Accept loop stopped");
        Ok(())
    }

    fn spawn_worker(&self, id: u64, stream: TcpStream) {
        let engine = self.engine.clone();
        let allow_inline = self.config.allow_inline;
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        let spawned = thread::Builder::new()
            .name(format!("emberkv-conn-{}", id))
            .spawn(move || {
                let mut connection = match Connection::new(stream, engine, allow_inline) {
                    Ok(connection) => connection,
                    Err(e) => {
                        tracing::warn!("Failed to set up connection {}: {}", id, e);
                        return;
                    }
                };

                if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
                    tracing::warn!(
                        "Failed to set timeouts for {}: {}",
                        connection.peer_addr(),
                        e
                    );
                    return;
                }

                // Errors are logged by the connection itself
                let _ = connection.handle();
            });

        if let Err(e) = spawned {
            tracing::warn!("Failed to spawn worker for connection {}: {}", id, e);
        }
    }
}

/// Stops a running [`Server`]
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting connections
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
        // The accept loop only checks the flag once accept() returns
        if let Err(e) = TcpStream::connect(self.addr) {
            tracing::debug!("Wake-up connection to {} failed: {}", self.addr, e);
        }
    }
}

/// Wildcard listen addresses cannot be connected to on every platform
fn wake_addr(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port())
        }
        IpAddr::V6(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port())
        }
        _ => addr,
    }
}
