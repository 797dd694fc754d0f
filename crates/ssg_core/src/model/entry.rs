//! Database entry model.
//!
//! # Responsibility
//! - Define the domain shape of one namespaced database entry.
//! - Map it exactly to and from the snake_case record persisted on the wire.
//!
//! # Invariants
//! - `key` is unique within a namespace only.
//! - `is_deleted == None` means the same as `Some(false)`.
//! - `version` is carried unchanged from the last read; it is never generated.
//! - `timestamp` is whole seconds since the Unix epoch, set by the writer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// One record inside a namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Namespace holding this entry. Not part of the entry identity.
    pub namespace_key: String,
    pub key: String,
    /// Arbitrary JSON payload; absent for placeholders and tombstones.
    pub value: Option<Value>,
    /// Opaque update token from the last read.
    pub version: Option<String>,
    pub timestamp: i64,
    /// Soft delete tombstone. Tombstones stay readable.
    pub is_deleted: Option<bool>,
}

impl Entry {
    /// Creates a live entry stamped with the current time.
    pub fn new(
        namespace_key: impl Into<String>,
        key: impl Into<String>,
        value: Option<Value>,
    ) -> Self {
        Self {
            namespace_key: namespace_key.into(),
            key: key.into(),
            value,
            version: None,
            timestamp: create_timestamp(),
            is_deleted: None,
        }
    }

    /// Creates a tombstone that keeps `version` so the host accepts the delete.
    pub fn tombstone(
        namespace_key: impl Into<String>,
        key: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        Self {
            namespace_key: namespace_key.into(),
            key: key.into(),
            value: None,
            version,
            timestamp: create_timestamp(),
            is_deleted: Some(true),
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.is_deleted.unwrap_or(false)
    }

    pub fn location(&self) -> EntryLocation {
        EntryLocation::new(self.namespace_key.clone(), self.key.clone())
    }

    pub(crate) fn from_record(namespace_key: &str, record: EntryRecord) -> Self {
        Self {
            namespace_key: namespace_key.to_string(),
            key: record.key,
            value: record.value,
            version: record.version,
            timestamp: record.timestamp,
            is_deleted: record.is_deleted,
        }
    }

    pub(crate) fn to_record(&self) -> EntryRecord {
        EntryRecord {
            is_deleted: self.is_deleted,
            key: self.key.clone(),
            value: self.value.clone(),
            timestamp: self.timestamp,
            version: self.version.clone(),
        }
    }
}

/// Address of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryLocation {
    pub namespace_key: String,
    pub entry_key: String,
}

impl EntryLocation {
    pub fn new(namespace_key: impl Into<String>, entry_key: impl Into<String>) -> Self {
        Self {
            namespace_key: namespace_key.into(),
            entry_key: entry_key.into(),
        }
    }
}

/// Persisted per-entry record. Absent optionals are omitted, never `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct EntryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// One namespace aggregate: ordered `[key, record]` pairs.
pub(crate) type NamespaceRecords = Vec<(String, EntryRecord)>;

/// Returns the current time in whole seconds, rounded up.
pub fn create_timestamp() -> i64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis());
    i64::try_from(millis.div_ceil(1000)).unwrap_or(i64::MAX)
}
