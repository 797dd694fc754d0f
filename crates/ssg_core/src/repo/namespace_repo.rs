//! Namespace discovery.
//!
//! # Responsibility
//! - Read the per-user namespace index entry.
//! - Map each index element to its namespace key, in index order.
//!
//! # Invariants
//! - The index is authoritative; keys not derived from it are unknown.
//! - The last key in index order is the most recently created namespace.

use crate::codec::entry_value::{decode_entry_value, DecodeError};
use crate::config::{namespace_prefix, LocalDbConfig};
use crate::db::KeyValueStore;
use crate::repo::{RepoError, RepoResult};
use log::debug;
use serde_json::Value;

/// Resolves the ordered namespace keys of one user.
pub struct NamespaceResolver<'store, S: KeyValueStore> {
    store: &'store S,
    prefix: String,
}

impl<'store, S: KeyValueStore> NamespaceResolver<'store, S> {
    pub fn new(store: &'store S, steam_user_id: u64) -> Self {
        Self {
            store,
            prefix: namespace_prefix(steam_user_id),
        }
    }

    pub fn from_config(store: &'store S, config: &LocalDbConfig) -> Self {
        Self::new(store, config.steam_user_id)
    }

    /// Key of the index entry listing all namespaces.
    pub fn index_key(&self) -> String {
        format!("{}s", self.prefix)
    }

    /// Key of the namespace with index id `id`.
    pub fn namespace_key(&self, id: &str) -> String {
        format!("{}-{id}", self.prefix)
    }

    /// Returns every namespace key in index order.
    ///
    /// # Errors
    /// - `NamespaceNotFound` when the index entry does not exist.
    /// - `Decode` when the index is not a list of non-empty lists whose first
    ///   element is a number or a string.
    pub fn get_namespace_keys(&self) -> RepoResult<Vec<String>> {
        let index_key = self.index_key();
        let raw = self
            .store
            .get(index_key.as_bytes())?
            .ok_or_else(|| RepoError::NamespaceNotFound(index_key.clone()))?;

        let elements: Vec<Vec<Value>> = decode_entry_value(&raw)?;
        let keys = elements
            .iter()
            .map(|element| namespace_id(element).map(|id| self.namespace_key(&id)))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "event=namespace_resolve module=repo status=ok namespaces={}",
            keys.len()
        );
        Ok(keys)
    }

    /// Returns the most recently created namespace key.
    ///
    /// # Errors
    /// - `NamespaceNotFound` when the index is missing or empty.
    pub fn get_last_namespace_key(&self) -> RepoResult<String> {
        self.get_namespace_keys()?
            .pop()
            .ok_or_else(|| RepoError::NamespaceNotFound(self.index_key()))
    }

    /// Returns whether `namespace_key` is listed by the index.
    pub fn is_known(&self, namespace_key: &str) -> RepoResult<bool> {
        Ok(self
            .get_namespace_keys()?
            .iter()
            .any(|key| key == namespace_key))
    }
}

fn namespace_id(element: &[Value]) -> Result<String, DecodeError> {
    match element.first() {
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(Value::String(text)) => Ok(text.clone()),
        other => Err(DecodeError::Schema {
            fragment: other.map(Value::to_string).unwrap_or_default(),
            message: "namespace index element must start with a number or string".to_string(),
        }),
    }
}
