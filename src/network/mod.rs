//! Network Module
//!
//! TCP server, per-connection sessions and the client.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One worker thread per connection, unbounded
//! - Requests routed through the CommandEngine

mod server;
mod connection;
mod client;

pub use server::{Server, ShutdownHandle};
pub use connection::{serve, Connection};
pub use client::Client;
