//! Engine Module
//!
//! Turns decoded requests into replies.
//!
//! ## Responsibilities
//! - Validate command names and arity before touching the store
//! - Route each command to the matching Store operation
//! - Map results and reply-level errors onto typed replies

use std::sync::Arc;

use crate::error::Result;
use crate::protocol::{Command, Reply, Request};
use crate::store::Store;

/// Stateless command dispatcher over a shared Store
///
/// Cloning is cheap: every clone points at the same Store.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    store: Arc<Store>,
}

impl CommandEngine {
    /// Create an engine over the given store
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Parse and execute one request
    ///
    /// Never fails: arity, unknown-command and key errors come back as
    /// error replies.
    pub fn dispatch(&self, request: &Request) -> Reply {
        match self.try_dispatch(request) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!("Rejected request: {}", e);
                Reply::Error(e.to_string())
            }
        }
    }

    fn try_dispatch(&self, request: &Request) -> Result<Reply> {
        let command = Command::parse(request)?;
        tracing::trace!("Executing {:?}", command.command_type());
        Ok(self.execute(command))
    }

    /// Execute an already validated command
    pub fn execute(&self, command: Command) -> Reply {
        match command {
            Command::Get { key } => Reply::from_option(self.store.get(&key)),
            Command::Set { key, value } => Reply::count(self.store.set(key, value)),
            Command::Del { key } => Reply::count(self.store.delete(&key)),
            Command::Flush => Reply::count(self.store.flush()),
            Command::MSet { pairs } => Reply::count(self.store.mset(pairs)),
        }
    }

    /// Get the shared store
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }
}
