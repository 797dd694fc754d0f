//! Entry repository contracts and key-value implementation.
//!
//! # Responsibility
//! - Read and write the aggregate value of one namespace as ordered entries.
//! - Offer full-replace and merge writes, per namespace and across namespaces.
//!
//! # Invariants
//! - Within a namespace `key` is the only identity; the first match wins.
//! - Merge replaces matching keys in place and appends new keys at the end,
//!   leaving every untouched entry in its original position.
//! - Full replace drops every entry not passed in. Use merge for incremental writes.
//! - Fan-out issues one task per namespace. There is no cross-namespace
//!   transaction: a failed namespace does not roll back the others.
//! - Only namespaces listed by the index are read or written.
//! - Reads and writes against one namespace are not atomic with each other.

use crate::codec::entry_value::{decode_entry_value, encode_entry_value};
use crate::config::LocalDbConfig;
use crate::db::KeyValueStore;
use crate::model::entry::{Entry, EntryLocation, NamespaceRecords};
use crate::repo::namespace_repo::NamespaceResolver;
use crate::repo::{RepoError, RepoResult};
use log::{debug, info, warn};
use std::thread;

/// Repository interface for namespaced entries.
pub trait EntryRepository {
    /// Returns every namespace key in index order.
    fn get_namespace_keys(&self) -> RepoResult<Vec<String>>;
    /// Returns the most recently created namespace key.
    fn get_last_namespace_key(&self) -> RepoResult<String>;
    /// Returns the entries of one namespace in stored order.
    fn get_entries_for_namespace(&self, namespace_key: &str) -> RepoResult<Vec<Entry>>;
    /// Returns the entries of every namespace, concatenated in namespace order.
    fn get_entries(&self) -> RepoResult<Vec<Entry>>;
    /// Replaces the whole namespace with the given entries of that namespace.
    fn set_entries_for_namespace(&self, namespace_key: &str, entries: &[Entry])
        -> RepoResult<()>;
    /// Merges the given entries into the namespace by key.
    fn update_entries_for_namespace(
        &self,
        namespace_key: &str,
        entries: &[Entry],
    ) -> RepoResult<()>;
    /// Full replace of every namespace referenced by `entries`.
    fn set_entries(&self, entries: &[Entry]) -> RepoResult<()>;
    /// Merge into every namespace referenced by `entries`.
    fn update_entries(&self, entries: &[Entry]) -> RepoResult<()>;

    /// Returns one entry.
    ///
    /// # Errors
    /// - `EntryNotFound` when no entry in the namespace has `entry_key`.
    fn get_entry(&self, namespace_key: &str, entry_key: &str) -> RepoResult<Entry> {
        self.get_entries_for_namespace(namespace_key)?
            .into_iter()
            .find(|entry| entry.key == entry_key)
            .ok_or_else(|| RepoError::EntryNotFound(EntryLocation::new(namespace_key, entry_key)))
    }

    /// Merges a single entry into the namespace.
    fn set_entry_for_namespace(&self, namespace_key: &str, entry: &Entry) -> RepoResult<()> {
        self.update_entries_for_namespace(namespace_key, std::slice::from_ref(entry))
    }

    /// Writes a tombstone for one entry, keeping its version.
    ///
    /// Returns `Ok(false)` when the entry cannot be read; write failures
    /// are still returned as errors.
    fn delete_entry_for_namespace(&self, namespace_key: &str, entry_key: &str) -> RepoResult<bool> {
        let entry = match self.get_entry(namespace_key, entry_key) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(
                    "event=entry_delete module=repo status=skipped entry_key={} error={}",
                    entry_key, err
                );
                return Ok(false);
            }
        };

        let tombstone = Entry::tombstone(namespace_key, entry_key, entry.version);
        self.set_entry_for_namespace(namespace_key, &tombstone)?;
        info!(
            "event=entry_delete module=repo status=ok entry_key={}",
            entry_key
        );
        Ok(true)
    }
}

/// Entry repository over any `KeyValueStore`.
pub struct LocalEntryRepository<'store, S: KeyValueStore> {
    store: &'store S,
    namespaces: NamespaceResolver<'store, S>,
}

impl<'store, S: KeyValueStore> LocalEntryRepository<'store, S> {
    pub fn new(store: &'store S, steam_user_id: u64) -> Self {
        Self {
            store,
            namespaces: NamespaceResolver::new(store, steam_user_id),
        }
    }

    pub fn from_config(store: &'store S, config: &LocalDbConfig) -> Self {
        Self::new(store, config.steam_user_id)
    }

    pub fn namespaces(&self) -> &NamespaceResolver<'store, S> {
        &self.namespaces
    }

    fn ensure_known_namespace(&self, namespace_key: &str) -> RepoResult<()> {
        if self.namespaces.is_known(namespace_key)? {
            return Ok(());
        }
        Err(RepoError::NamespaceNotFound(namespace_key.to_string()))
    }

    /// Reads one aggregate without consulting the index.
    fn read_namespace(&self, namespace_key: &str) -> RepoResult<Vec<Entry>> {
        let raw = self
            .store
            .get(namespace_key.as_bytes())?
            .ok_or_else(|| RepoError::NamespaceNotFound(namespace_key.to_string()))?;

        let records: NamespaceRecords = decode_entry_value(&raw)?;
        Ok(records
            .into_iter()
            .map(|(_, record)| Entry::from_record(namespace_key, record))
            .collect())
    }
}

impl<S: KeyValueStore> EntryRepository for LocalEntryRepository<'_, S> {
    fn get_namespace_keys(&self) -> RepoResult<Vec<String>> {
        self.namespaces.get_namespace_keys()
    }

    fn get_last_namespace_key(&self) -> RepoResult<String> {
        self.namespaces.get_last_namespace_key()
    }

    fn get_entries_for_namespace(&self, namespace_key: &str) -> RepoResult<Vec<Entry>> {
        self.ensure_known_namespace(namespace_key)?;
        self.read_namespace(namespace_key)
    }

    fn get_entries(&self) -> RepoResult<Vec<Entry>> {
        let namespace_keys = self.get_namespace_keys()?;
        let per_namespace = fan_out(&namespace_keys, |namespace_key| {
            self.read_namespace(namespace_key)
        })?;
        Ok(per_namespace.into_iter().flatten().collect())
    }

    fn set_entries_for_namespace(
        &self,
        namespace_key: &str,
        entries: &[Entry],
    ) -> RepoResult<()> {
        self.ensure_known_namespace(namespace_key)?;

        let records: NamespaceRecords = entries
            .iter()
            .filter(|entry| entry.namespace_key == namespace_key)
            .map(|entry| (entry.key.clone(), entry.to_record()))
            .collect();
        let skipped = entries.len() - records.len();
        if skipped > 0 {
            debug!(
                "event=namespace_write module=repo status=filtered skipped={}",
                skipped
            );
        }

        let raw = encode_entry_value(&records)?;
        self.store.put(namespace_key.as_bytes(), &raw)?;
        debug!(
            "event=namespace_write module=repo status=ok entries={} bytes={}",
            records.len(),
            raw.len()
        );
        Ok(())
    }

    fn update_entries_for_namespace(
        &self,
        namespace_key: &str,
        entries: &[Entry],
    ) -> RepoResult<()> {
        let mut merged = self.get_entries_for_namespace(namespace_key)?;
        for entry in entries
            .iter()
            .filter(|entry| entry.namespace_key == namespace_key)
        {
            match merged.iter().position(|existing| existing.key == entry.key) {
                Some(index) => merged[index] = entry.clone(),
                None => merged.push(entry.clone()),
            }
        }
        self.set_entries_for_namespace(namespace_key, &merged)
    }

    fn set_entries(&self, entries: &[Entry]) -> RepoResult<()> {
        let groups = group_by_namespace(entries);
        fan_out(&groups, |(namespace_key, group)| {
            self.set_entries_for_namespace(namespace_key, group)
        })?;
        Ok(())
    }

    fn update_entries(&self, entries: &[Entry]) -> RepoResult<()> {
        let groups = group_by_namespace(entries);
        fan_out(&groups, |(namespace_key, group)| {
            self.update_entries_for_namespace(namespace_key, group)
        })?;
        Ok(())
    }
}

/// Partitions entries by namespace in first-seen namespace order.
fn group_by_namespace(entries: &[Entry]) -> Vec<(String, Vec<Entry>)> {
    let mut groups: Vec<(String, Vec<Entry>)> = Vec::new();
    for entry in entries {
        match groups
            .iter_mut()
            .find(|(namespace_key, _)| *namespace_key == entry.namespace_key)
        {
            Some((_, group)) => group.push(entry.clone()),
            None => groups.push((entry.namespace_key.clone(), vec![entry.clone()])),
        }
    }
    groups
}

/// Runs `task` once per item on scoped threads and returns results in item order.
///
/// Every task runs to completion; the first error in item order is returned.
fn fan_out<I, T, F>(items: &[I], task: F) -> RepoResult<Vec<T>>
where
    I: Sync + NamespaceItem,
    T: Send,
    F: Fn(&I) -> RepoResult<T> + Sync,
{
    if items.len() <= 1 {
        return items.iter().map(&task).collect();
    }

    let task = &task;
    let results: Vec<RepoResult<T>> = thread::scope(|scope| {
        let handles: Vec<_> = items
            .iter()
            .map(|item| (item, scope.spawn(move || task(item))))
            .collect();
        handles
            .into_iter()
            .map(|(item, handle)| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(RepoError::TaskFailed(item.namespace_key().to_string())))
            })
            .collect()
    });
    results.into_iter().collect()
}

/// Item of a fan-out, named by the namespace it targets.
trait NamespaceItem {
    fn namespace_key(&self) -> &str;
}

impl NamespaceItem for String {
    fn namespace_key(&self) -> &str {
        self
    }
}

impl NamespaceItem for (String, Vec<Entry>) {
    fn namespace_key(&self) -> &str {
        &self.0
    }
}
