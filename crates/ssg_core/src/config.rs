//! Local database configuration.
//!
//! # Responsibility
//! - Describe which on-disk store to open and which user it belongs to.
//! - Derive the per-user key prefix that every namespace key is built from.
//!
//! # Invariants
//! - `db_path` is absolute and non-empty after `validate()`.
//! - `steam_user_id` is never zero after `validate()`.
//! - Stores are never created implicitly unless `create_if_missing` is set.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const NAMESPACE_PREFIX_HEAD: &str = "_https://steamloopback.host\u{0}\u{1}U";
const NAMESPACE_PREFIX_TAIL: &str = "-cloud-storage-namespace";

/// Configuration validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDbPath,
    RelativeDbPath(PathBuf),
    MissingUserId,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDbPath => write!(f, "db_path cannot be empty"),
            Self::RelativeDbPath(path) => {
                write!(f, "db_path must be an absolute path, got `{}`", path.display())
            }
            Self::MissingUserId => write!(f, "steam_user_id must be non-zero"),
        }
    }
}

impl Error for ConfigError {}

/// Settings needed to open one user's local client database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDbConfig {
    /// Directory holding the LevelDB files.
    pub db_path: PathBuf,
    /// Numeric account id of the user owning the namespaces.
    pub steam_user_id: u64,
    /// Create an empty store when `db_path` has none. Off by default.
    pub create_if_missing: bool,
}

impl LocalDbConfig {
    /// Creates a configuration that opens an existing store only.
    pub fn new(db_path: impl Into<PathBuf>, steam_user_id: u64) -> Self {
        Self {
            db_path: db_path.into(),
            steam_user_id,
            create_if_missing: false,
        }
    }

    /// Allows opening a path with no store yet.
    pub fn with_create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = create_if_missing;
        self
    }

    /// Checks the configuration before any file is touched.
    ///
    /// # Errors
    /// - `EmptyDbPath` / `RelativeDbPath` for unusable paths.
    /// - `MissingUserId` when `steam_user_id == 0`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDbPath);
        }
        if !self.db_path.is_absolute() {
            return Err(ConfigError::RelativeDbPath(self.db_path.clone()));
        }
        if self.steam_user_id == 0 {
            return Err(ConfigError::MissingUserId);
        }
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Per-user prefix shared by the namespace index and every namespace key.
    pub fn namespace_prefix(&self) -> String {
        namespace_prefix(self.steam_user_id)
    }
}

/// Builds the per-user namespace prefix for `steam_user_id`.
pub fn namespace_prefix(steam_user_id: u64) -> String {
    format!("{NAMESPACE_PREFIX_HEAD}{steam_user_id}{NAMESPACE_PREFIX_TAIL}")
}

#[cfg(test)]
mod tests {
    use super::{namespace_prefix, ConfigError, LocalDbConfig};

    #[test]
    fn namespace_prefix_embeds_user_id() {
        assert_eq!(
            namespace_prefix(42),
            "_https://steamloopback.host\u{0}\u{1}U42-cloud-storage-namespace"
        );
    }

    #[test]
    fn validate_rejects_relative_path_and_zero_user() {
        let relative = LocalDbConfig::new("htmlcache/leveldb", 7);
        assert!(matches!(
            relative.validate(),
            Err(ConfigError::RelativeDbPath(_))
        ));

        let empty = LocalDbConfig::new("", 7);
        assert_eq!(empty.validate(), Err(ConfigError::EmptyDbPath));

        let anonymous = LocalDbConfig::new(std::env::temp_dir(), 0);
        assert_eq!(anonymous.validate(), Err(ConfigError::MissingUserId));
    }

    #[test]
    fn create_if_missing_is_opt_in() {
        let config = LocalDbConfig::new(std::env::temp_dir(), 7);
        assert!(!config.create_if_missing);
        assert!(config.with_create_if_missing(true).create_if_missing);
    }
}
