#![allow(dead_code)]

use serde_json::{json, Value};
use ssg_core::codec::entry_value::encode_entry_value;
use ssg_core::{Entry, KeyValueStore, NamespaceResolver};

pub const USER_ID: u64 = 76_561;

/// Writes a namespace index listing `ids`, in order.
pub fn seed_index<S: KeyValueStore>(store: &S, ids: &[u32]) -> Vec<String> {
    let resolver = NamespaceResolver::new(store, USER_ID);
    let index: Vec<Value> = ids
        .iter()
        .map(|id| json!([id, {"key": format!("namespace-{id}"), "version": "1"}]))
        .collect();
    store
        .put(
            resolver.index_key().as_bytes(),
            &encode_entry_value(&index).unwrap(),
        )
        .unwrap();
    ids.iter()
        .map(|id| resolver.namespace_key(&id.to_string()))
        .collect()
}

/// Writes a raw namespace aggregate of `[key, record]` pairs.
pub fn seed_namespace<S: KeyValueStore>(store: &S, namespace_key: &str, records: Value) {
    store
        .put(
            namespace_key.as_bytes(),
            &encode_entry_value(&records).unwrap(),
        )
        .unwrap();
}

/// Seeds `ids` as namespaces, each with an empty aggregate.
pub fn seed_empty_namespaces<S: KeyValueStore>(store: &S, ids: &[u32]) -> Vec<String> {
    let keys = seed_index(store, ids);
    for key in &keys {
        seed_namespace(store, key, json!([]));
    }
    keys
}

pub fn entry(namespace_key: &str, key: &str, value: Value, timestamp: i64) -> Entry {
    Entry {
        namespace_key: namespace_key.to_string(),
        key: key.to_string(),
        value: Some(value),
        version: None,
        timestamp,
        is_deleted: None,
    }
}

pub fn keys(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.key.as_str()).collect()
}
