//! Configuration for EmberKV
//!
//! Centralized configuration with sensible defaults.

use std::net::{SocketAddr, ToSocketAddrs};

use crate::error::{EmberError, Result};

/// Default listen / connect address
pub const DEFAULT_ADDR: &str = "127.0.0.1:31337";

/// Main configuration for an EmberKV server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Connection read timeout (milliseconds, 0 = wait forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = wait forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Accept unframed, space-separated request lines from plain-text senders
    pub allow_inline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_ADDR.to_string(),
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            allow_inline: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve `listen_addr` to a socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr
            .to_socket_addrs()
            .map_err(|e| EmberError::Config(format!("bad listen address '{}': {}", self.listen_addr, e)))?
            .next()
            .ok_or_else(|| {
                EmberError::Config(format!("listen address '{}' resolved to nothing", self.listen_addr))
            })
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Enable or disable inline (unframed) requests
    pub fn allow_inline(mut self, allow: bool) -> Self {
        self.config.allow_inline = allow;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
