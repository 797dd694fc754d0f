//! Repository layer over the raw key-value store.
//!
//! # Responsibility
//! - Resolve the ordered namespaces of one user.
//! - Provide CRUD over entries inside one namespace and fan-out across all.
//!
//! # Invariants
//! - Namespaces are discovered from the index entry, never invented here.
//! - Every write is a full aggregate replace of one namespace value.
//! - Repository APIs return semantic errors (`NamespaceNotFound`,
//!   `EntryNotFound`) in addition to storage and decode errors.

use crate::codec::entry_value::{DecodeError, EncodeError};
use crate::db::DbError;
use crate::model::entry::EntryLocation;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod entry_repo;
pub mod namespace_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entry and namespace operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Decode(DecodeError),
    Encode(EncodeError),
    NamespaceNotFound(String),
    EntryNotFound(EntryLocation),
    /// A per-namespace task of a fan-out operation panicked.
    TaskFailed(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "{err}"),
            Self::NamespaceNotFound(key) => {
                write!(f, "namespace not found: {}", key.escape_debug())
            }
            Self::EntryNotFound(location) => write!(
                f,
                "no entry `{}` in namespace {}",
                location.entry_key,
                location.namespace_key.escape_debug()
            ),
            Self::TaskFailed(key) => {
                write!(f, "task for namespace {} panicked", key.escape_debug())
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::NamespaceNotFound(_) | Self::EntryNotFound(_) | Self::TaskFailed(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<DecodeError> for RepoError {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

impl From<EncodeError> for RepoError {
    fn from(value: EncodeError) -> Self {
        Self::Encode(value)
    }
}
