//! Store bootstrap for the on-disk LevelDB database.
//!
//! # Responsibility
//! - Validate configuration before touching the file system.
//! - Open the LevelDB store and report lock contention distinctly.
//!
//! # Invariants
//! - A store is only created when `create_if_missing` is set.
//! - Failure to acquire the database lock fails fast with `DbError::Locked`.

use super::{DbResult, LevelDbStore};
use crate::config::LocalDbConfig;
use log::{error, info};
use std::time::Instant;

/// Opens the LevelDB store described by `config`.
///
/// # Side effects
/// - Acquires the database lock until the returned store is closed or dropped.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(config: &LocalDbConfig) -> DbResult<LevelDbStore> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=leveldb");

    if let Err(err) = config.validate() {
        error!(
            "event=db_open module=db status=error mode=leveldb error_code=invalid_config error={}",
            err
        );
        return Err(err.into());
    }

    match LevelDbStore::spawn(config.db_path(), config.create_if_missing) {
        Ok(store) => {
            info!(
                "event=db_open module=db status=ok mode=leveldb duration_ms={} path={}",
                started_at.elapsed().as_millis(),
                config.db_path().display()
            );
            Ok(store)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=leveldb duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}
