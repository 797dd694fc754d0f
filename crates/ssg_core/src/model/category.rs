//! Collection ("category") domain model.
//!
//! # Responsibility
//! - Define the payload carried by collection entries (`CategoryData`).
//! - Define the storage-facing wrapper that remembers where a collection lives.
//!
//! # Invariants
//! - Fresh categories get an `id` derived from `name` by `create_collection_id`.
//! - Loaded categories are not re-validated against that derivation.
//! - `namespace_key` and `version` are `None` only before the first write and
//!   must be carried forward unchanged afterwards.

use crate::codec::category::{create_collection_id, create_collection_key};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Numeric game identifier used in collection membership lists.
pub type GameId = u64;

/// Collection payload as stored in the entry value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryData {
    pub id: String,
    /// Label shown in the client UI.
    pub name: String,
    /// Explicitly included games. `None` and empty both mean none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<Vec<GameId>>,
    /// Explicitly excluded games.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<Vec<GameId>>,
    /// Dynamic membership rules, passed through untouched.
    /// `Some(Value::Null)` is a stored `null`; `None` is an absent field.
    #[serde(
        rename = "filterSpec",
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub filter_spec: Option<Value>,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl CategoryData {
    /// Creates an empty payload whose id is derived from `name`.
    pub fn for_name(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: create_collection_id(&name),
            name,
            added: None,
            removed: None,
            filter_spec: None,
        }
    }
}

/// A collection plus its storage location and update token.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub namespace_key: Option<String>,
    pub entry_key: String,
    pub is_deleted: Option<bool>,
    pub version: Option<String>,
    pub timestamp: Option<i64>,
    pub data: Option<CategoryData>,
}

impl Category {
    /// Creates a not-yet-persisted category named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let data = CategoryData::for_name(name);
        Self {
            namespace_key: None,
            entry_key: create_collection_key(&data.name),
            is_deleted: None,
            version: None,
            timestamp: None,
            data: Some(data),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.data.as_ref().map(|data| data.name.as_str())
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted.unwrap_or(false)
    }

    /// Clears the tombstone flag.
    pub fn restore(&mut self) {
        self.is_deleted = None;
    }

    pub fn is_persisted(&self) -> bool {
        self.namespace_key.is_some()
    }

    /// Games explicitly included, empty when none.
    pub fn added(&self) -> &[GameId] {
        self.data
            .as_ref()
            .and_then(|data| data.added.as_deref())
            .unwrap_or(&[])
    }
}
