//! Core of the shortcut collection sync layer.
//! Reads and writes the client's namespaced local database and the
//! collection records stored inside it.

pub mod codec;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use codec::category::{
    create_collection_id, create_collection_key, MalformedCategoryError, STEAM_COLLECTION_PREFIX,
};
pub use codec::entry_value::{DecodeError, EncodeError, EntryFormat};
pub use config::{ConfigError, LocalDbConfig};
pub use db::{open_db, DbError, KeyValueStore, LevelDbStore, MemoryStore};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Category, CategoryData, GameId};
pub use model::entry::{create_timestamp, Entry, EntryLocation};
pub use model::shortcut::{Shortcut, ShortcutTarget};
pub use repo::entry_repo::{EntryRepository, LocalEntryRepository};
pub use repo::namespace_repo::NamespaceResolver;
pub use repo::{RepoError, RepoResult};
pub use service::category_editor::{CategoryEditor, EditorError};
pub use service::category_service::{CategoryResult, CategoryService, CategoryServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
