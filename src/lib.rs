//! # EmberKV
//!
//! A small in-memory key-value store with:
//! - A Redis-style textual wire protocol (length-prefixed bulk strings)
//! - Single-writer/multi-reader concurrency over one shared map
//! - One worker thread per TCP connection
//! - A blocking client library
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │            (one thread per client connection)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  frames
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Wire Codec                                │
//! │          (request decode / reply encode)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Request / Reply
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Command Engine                              │
//! │          (name + arity checks, dispatch)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌──────────────┐
//!               │    Store     │
//!               │   (RwLock)   │
//!               └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod protocol;
pub mod engine;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{EmberError, Result};
pub use config::Config;
pub use store::Store;
pub use engine::CommandEngine;
pub use network::{Client, Server};
pub use protocol::{Reply, Request};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of EmberKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
