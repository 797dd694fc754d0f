mod common;

use common::{entry, keys, seed_empty_namespaces, seed_index, seed_namespace, USER_ID};
use serde_json::json;
use ssg_core::{EntryRepository, KeyValueStore, LocalEntryRepository, MemoryStore, RepoError};

#[test]
fn reads_entries_of_one_namespace_in_stored_order() {
    let store = MemoryStore::new();
    let namespaces = seed_index(&store, &[1]);
    seed_namespace(
        &store,
        &namespaces[0],
        json!([
            ["b", {"key": "b", "value": 2, "timestamp": 10, "version": "4"}],
            ["a", {"key": "a", "timestamp": 11, "is_deleted": true}],
        ]),
    );
    let repo = LocalEntryRepository::new(&store, USER_ID);

    let entries = repo.get_entries_for_namespace(&namespaces[0]).unwrap();
    assert_eq!(keys(&entries), vec!["b", "a"]);
    assert_eq!(entries[0].value, Some(json!(2)));
    assert_eq!(entries[0].version.as_deref(), Some("4"));
    assert_eq!(entries[0].namespace_key, namespaces[0]);
    assert!(entries[1].is_tombstone());
    assert!(entries[1].value.is_none());
}

#[test]
fn missing_aggregate_is_namespace_not_found() {
    let store = MemoryStore::new();
    let namespaces = seed_index(&store, &[1]);
    let repo = LocalEntryRepository::new(&store, USER_ID);

    let err = repo.get_entries_for_namespace(&namespaces[0]).unwrap_err();
    assert!(matches!(err, RepoError::NamespaceNotFound(key) if key == namespaces[0]));
}

#[test]
fn get_entries_concatenates_namespaces_in_index_order() {
    let store = MemoryStore::new();
    let namespaces = seed_index(&store, &[3, 1, 2]);
    for (position, namespace_key) in namespaces.iter().enumerate() {
        let key = format!("entry-{position}");
        seed_namespace(
            &store,
            namespace_key,
            json!([[key.clone(), {"key": key, "timestamp": 1}]]),
        );
    }
    let repo = LocalEntryRepository::new(&store, USER_ID);

    let entries = repo.get_entries().unwrap();
    assert_eq!(keys(&entries), vec!["entry-0", "entry-1", "entry-2"]);
    let owners: Vec<&str> = entries
        .iter()
        .map(|entry| entry.namespace_key.as_str())
        .collect();
    let expected: Vec<&str> = namespaces.iter().map(String::as_str).collect();
    assert_eq!(owners, expected);
}

#[test]
fn get_entry_reports_missing_key() {
    let store = MemoryStore::new();
    let namespaces = seed_empty_namespaces(&store, &[1]);
    let repo = LocalEntryRepository::new(&store, USER_ID);

    let err = repo.get_entry(&namespaces[0], "nope").unwrap_err();
    match err {
        RepoError::EntryNotFound(location) => {
            assert_eq!(location.namespace_key, namespaces[0]);
            assert_eq!(location.entry_key, "nope");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn update_merges_in_place_and_appends_new_keys() {
    let store = MemoryStore::new();
    let namespaces = seed_empty_namespaces(&store, &[1]);
    let ns = &namespaces[0];
    let repo = LocalEntryRepository::new(&store, USER_ID);

    repo.set_entries_for_namespace(
        ns,
        &[
            entry(ns, "A", json!("a"), 1),
            entry(ns, "B", json!("b"), 1),
            entry(ns, "C", json!("c"), 1),
        ],
    )
    .unwrap();
    repo.update_entries_for_namespace(
        ns,
        &[entry(ns, "D", json!("d"), 2), entry(ns, "B", json!("b2"), 2)],
    )
    .unwrap();

    let entries = repo.get_entries_for_namespace(ns).unwrap();
    assert_eq!(keys(&entries), vec!["A", "B", "C", "D"]);
    assert_eq!(entries[1].value, Some(json!("b2")));
    assert_eq!(entries[0], entry(ns, "A", json!("a"), 1));
}

#[test]
fn update_is_idempotent() {
    let store = MemoryStore::new();
    let namespaces = seed_empty_namespaces(&store, &[1]);
    let ns = &namespaces[0];
    let repo = LocalEntryRepository::new(&store, USER_ID);
    repo.set_entries_for_namespace(ns, &[entry(ns, "A", json!(1), 1)])
        .unwrap();

    let patch = [entry(ns, "B", json!(2), 5), entry(ns, "A", json!(3), 5)];
    repo.update_entries_for_namespace(ns, &patch).unwrap();
    let once = repo.get_entries_for_namespace(ns).unwrap();
    repo.update_entries_for_namespace(ns, &patch).unwrap();
    let twice = repo.get_entries_for_namespace(ns).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn set_replaces_whole_namespace() {
    let store = MemoryStore::new();
    let namespaces = seed_empty_namespaces(&store, &[1]);
    let ns = &namespaces[0];
    let repo = LocalEntryRepository::new(&store, USER_ID);
    repo.set_entries_for_namespace(
        ns,
        &[entry(ns, "A", json!(1), 1), entry(ns, "B", json!(2), 1)],
    )
    .unwrap();

    repo.set_entries_for_namespace(ns, &[entry(ns, "B", json!(3), 2)])
        .unwrap();

    let entries = repo.get_entries_for_namespace(ns).unwrap();
    assert_eq!(entries, vec![entry(ns, "B", json!(3), 2)]);
}

#[test]
fn per_namespace_writes_ignore_entries_of_other_namespaces() {
    let store = MemoryStore::new();
    let namespaces = seed_empty_namespaces(&store, &[1, 2]);
    let (first, second) = (&namespaces[0], &namespaces[1]);
    let repo = LocalEntryRepository::new(&store, USER_ID);

    repo.set_entries_for_namespace(
        first,
        &[entry(second, "X", json!(1), 1), entry(first, "Y", json!(2), 1)],
    )
    .unwrap();
    repo.update_entries_for_namespace(first, &[entry(second, "Z", json!(3), 1)])
        .unwrap();

    assert_eq!(keys(&repo.get_entries_for_namespace(first).unwrap()), vec!["Y"]);
    assert!(repo.get_entries_for_namespace(second).unwrap().is_empty());
}

#[test]
fn writes_to_unlisted_namespace_are_rejected() {
    let store = MemoryStore::new();
    seed_empty_namespaces(&store, &[1]);
    let repo = LocalEntryRepository::new(&store, USER_ID);
    let unknown = repo.namespaces().namespace_key("99");

    let err = repo
        .set_entries_for_namespace(&unknown, &[entry(&unknown, "A", json!(1), 1)])
        .unwrap_err();
    assert!(matches!(err, RepoError::NamespaceNotFound(key) if key == unknown));
    assert!(store.get(unknown.as_bytes()).unwrap().is_none());
}

#[test]
fn fan_out_writes_reach_every_namespace() {
    let store = MemoryStore::new();
    let namespaces = seed_empty_namespaces(&store, &[1, 2, 3]);
    let repo = LocalEntryRepository::new(&store, USER_ID);
    repo.set_entries(&[
        entry(&namespaces[0], "keep", json!(0), 1),
        entry(&namespaces[2], "keep", json!(0), 1),
    ])
    .unwrap();

    repo.update_entries(&[
        entry(&namespaces[2], "new", json!(1), 2),
        entry(&namespaces[0], "new", json!(2), 2),
        entry(&namespaces[1], "new", json!(3), 2),
    ])
    .unwrap();

    assert_eq!(
        keys(&repo.get_entries_for_namespace(&namespaces[0]).unwrap()),
        vec!["keep", "new"]
    );
    assert_eq!(
        keys(&repo.get_entries_for_namespace(&namespaces[1]).unwrap()),
        vec!["new"]
    );
    assert_eq!(
        keys(&repo.get_entries_for_namespace(&namespaces[2]).unwrap()),
        vec!["keep", "new"]
    );
}

#[test]
fn fan_out_failure_in_one_namespace_keeps_other_writes() {
    let store = MemoryStore::new();
    let namespaces = seed_index(&store, &[1, 2]);
    seed_namespace(&store, &namespaces[0], json!([]));
    let repo = LocalEntryRepository::new(&store, USER_ID);

    let err = repo
        .update_entries(&[
            entry(&namespaces[0], "A", json!(1), 1),
            entry(&namespaces[1], "B", json!(2), 1),
        ])
        .unwrap_err();

    assert!(matches!(err, RepoError::NamespaceNotFound(key) if key == namespaces[1]));
    assert_eq!(
        keys(&repo.get_entries_for_namespace(&namespaces[0]).unwrap()),
        vec!["A"]
    );
}

#[test]
fn delete_writes_tombstone_that_keeps_version() {
    let store = MemoryStore::new();
    let namespaces = seed_index(&store, &[1]);
    let ns = &namespaces[0];
    seed_namespace(
        &store,
        ns,
        json!([
            ["a", {"key": "a", "value": "x", "timestamp": 1, "version": "7"}],
            ["b", {"key": "b", "value": "y", "timestamp": 1, "version": "8"}],
        ]),
    );
    let repo = LocalEntryRepository::new(&store, USER_ID);

    assert!(repo.delete_entry_for_namespace(ns, "a").unwrap());

    let entries = repo.get_entries_for_namespace(ns).unwrap();
    assert_eq!(keys(&entries), vec!["a", "b"]);
    let deleted = &entries[0];
    assert!(deleted.is_tombstone());
    assert!(deleted.value.is_none());
    assert_eq!(deleted.version.as_deref(), Some("7"));
    assert!(deleted.timestamp > 1);
    assert_eq!(entries[1].value, Some(json!("y")));
}

#[test]
fn delete_of_unreadable_entry_returns_false() {
    let store = MemoryStore::new();
    let namespaces = seed_empty_namespaces(&store, &[1]);
    let repo = LocalEntryRepository::new(&store, USER_ID);

    assert!(!repo.delete_entry_for_namespace(&namespaces[0], "ghost").unwrap());
    assert!(repo.get_entries_for_namespace(&namespaces[0]).unwrap().is_empty());
}

#[test]
fn set_entry_merges_single_entry() {
    let store = MemoryStore::new();
    let namespaces = seed_empty_namespaces(&store, &[1]);
    let ns = &namespaces[0];
    let repo = LocalEntryRepository::new(&store, USER_ID);
    repo.set_entries_for_namespace(ns, &[entry(ns, "A", json!(1), 1)])
        .unwrap();

    repo.set_entry_for_namespace(ns, &entry(ns, "B", json!(2), 1))
        .unwrap();

    assert_eq!(keys(&repo.get_entries_for_namespace(ns).unwrap()), vec!["A", "B"]);
    assert_eq!(repo.get_entry(ns, "B").unwrap().value, Some(json!(2)));
}

#[test]
fn unlisted_namespace_is_neither_read_nor_deleted_from() {
    let store = MemoryStore::new();
    seed_empty_namespaces(&store, &[1]);
    let repo = LocalEntryRepository::new(&store, USER_ID);
    let unknown = repo.namespaces().namespace_key("99");
    seed_namespace(
        &store,
        &unknown,
        json!([["k", {"key": "k", "value": 1, "timestamp": 1, "version": "2"}]]),
    );

    let err = repo.get_entries_for_namespace(&unknown).unwrap_err();
    assert!(matches!(err, RepoError::NamespaceNotFound(key) if key == unknown));
    assert!(matches!(
        repo.get_entry(&unknown, "k").unwrap_err(),
        RepoError::NamespaceNotFound(_)
    ));
    assert!(!repo.delete_entry_for_namespace(&unknown, "k").unwrap());
    assert_eq!(repo.get_entries().unwrap().len(), 0);
}
