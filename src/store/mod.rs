//! Store Module
//!
//! The shared in-memory key-value map.
//!
//! ## Responsibilities
//! - Map string keys to opaque byte values
//! - Single-writer/multi-reader access pattern
//! - Every mutation is applied inside one critical section, so readers
//!   never see a partially applied MSET or FLUSH
//!
//! ## Data Structure Choice
//! A `HashMap` wrapped in a `parking_lot::RwLock`:
//! - Key order does not matter, so no BTreeMap
//! - Values are `Bytes`, so GET clones a refcount under the read lock

mod table;

pub use table::Store;
