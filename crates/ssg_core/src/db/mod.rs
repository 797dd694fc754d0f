//! Raw key-value storage beneath the entry store.
//!
//! # Responsibility
//! - Define the byte-level `KeyValueStore` contract the repositories use.
//! - Open and close the on-disk LevelDB store owned by the host client.
//!
//! # Invariants
//! - One open `LevelDbStore` owns the database lock for its whole lifetime.
//! - Lock contention is reported as `DbError::Locked`, never retried.
//! - Stores hand back bytes exactly as written; no decoding happens here.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod leveldb;
mod memory;
mod open;

pub use leveldb::LevelDbStore;
pub use memory::MemoryStore;
pub use open::open_db;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Configuration rejected before opening.
    Config(crate::config::ConfigError),
    /// Another process holds the database lock.
    Locked(PathBuf),
    /// The store handle was already closed.
    Closed,
    /// Any other backend failure, kept opaque.
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid database config: {err}"),
            Self::Locked(path) => write!(
                f,
                "database at `{}` is locked by another process",
                path.display()
            ),
            Self::Closed => write!(f, "database handle is closed"),
            Self::Backend { operation, message } => {
                write!(f, "database {operation} failed: {message}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<crate::config::ConfigError> for DbError {
    fn from(value: crate::config::ConfigError) -> Self {
        Self::Config(value)
    }
}

/// Byte-level access to one key-value store.
///
/// Implementations must be shareable across threads: namespace fan-out
/// issues one read or write per namespace concurrently against one handle.
pub trait KeyValueStore: Sync {
    /// Returns the stored bytes for `key`, or `None` when absent.
    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>>;
    /// Replaces the stored bytes for `key`.
    fn put(&self, key: &[u8], value: &[u8]) -> DbResult<()>;
}
