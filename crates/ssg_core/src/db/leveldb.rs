//! LevelDB-backed `KeyValueStore`.
//!
//! # Responsibility
//! - Own the LevelDB handle on a dedicated thread for its whole lifetime.
//! - Serve concurrent callers through a command channel.
//!
//! # Invariants
//! - The database is opened and closed on the owner thread only.
//! - Commands are applied in arrival order; each write is a full value put.
//! - Closing joins the owner thread; later calls fail with `DbError::Closed`.

use super::{DbError, DbResult, KeyValueStore};
use log::{error, info};
use rusty_leveldb::{Options, Status, StatusCode, DB};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

const WORKER_THREAD_NAME: &str = "ssg-leveldb";

enum Command {
    Get {
        key: Vec<u8>,
        reply: Sender<DbResult<Option<Vec<u8>>>>,
    },
    Put {
        key: Vec<u8>,
        value: Vec<u8>,
        reply: Sender<DbResult<()>>,
    },
}

/// Handle to an open LevelDB store.
///
/// Dropping the handle shuts the owner thread down and closes the database;
/// `close()` does the same but reports close failures to the caller.
pub struct LevelDbStore {
    path: PathBuf,
    commands: Mutex<Option<Sender<Command>>>,
    worker: Mutex<Option<JoinHandle<DbResult<()>>>>,
}

impl LevelDbStore {
    pub(crate) fn spawn(path: &Path, create_if_missing: bool) -> DbResult<Self> {
        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();
        let worker_path = path.to_path_buf();

        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(worker_path, create_if_missing, command_rx, ready_tx))
            .map_err(|err| DbError::Backend {
                operation: "spawn",
                message: err.to_string(),
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                path: path.to_path_buf(),
                commands: Mutex::new(Some(command_tx)),
                worker: Mutex::new(Some(worker)),
            }),
            Ok(Err(err)) => {
                let _ = worker.join();
                Err(err)
            }
            Err(_) => {
                let _ = worker.join();
                Err(DbError::Backend {
                    operation: "open",
                    message: "owner thread exited before reporting open status".to_string(),
                })
            }
        }
    }

    /// Directory this store was opened from.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Closes the database and releases its lock.
    ///
    /// # Errors
    /// - Returns `DbError::Backend` when LevelDB fails to close cleanly.
    pub fn close(self) -> DbResult<()> {
        self.shutdown()
    }

    fn shutdown(&self) -> DbResult<()> {
        // Dropping the sender ends the owner loop.
        drop(lock(&self.commands)?.take());

        let Some(worker) = lock(&self.worker)?.take() else {
            return Ok(());
        };
        let result = worker.join().map_err(|_| DbError::Backend {
            operation: "close",
            message: "owner thread panicked".to_string(),
        })?;

        match &result {
            Ok(()) => info!(
                "event=db_close module=db status=ok path={}",
                self.path.display()
            ),
            Err(err) => error!(
                "event=db_close module=db status=error path={} error={}",
                self.path.display(),
                err
            ),
        }
        result
    }

    fn request<T>(&self, build: impl FnOnce(Sender<DbResult<T>>) -> Command) -> DbResult<T> {
        let (reply_tx, reply_rx) = mpsc::channel();
        {
            let commands = lock(&self.commands)?;
            let sender = commands.as_ref().ok_or(DbError::Closed)?;
            sender
                .send(build(reply_tx))
                .map_err(|_| DbError::Closed)?;
        }
        reply_rx.recv().map_err(|_| DbError::Closed)?
    }
}

impl KeyValueStore for LevelDbStore {
    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        self.request(|reply| Command::Get {
            key: key.to_vec(),
            reply,
        })
    }

    fn put(&self, key: &[u8], value: &[u8]) -> DbResult<()> {
        self.request(|reply| Command::Put {
            key: key.to_vec(),
            value: value.to_vec(),
            reply,
        })
    }
}

impl Drop for LevelDbStore {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn run_worker(
    path: PathBuf,
    create_if_missing: bool,
    commands: Receiver<Command>,
    ready: Sender<DbResult<()>>,
) -> DbResult<()> {
    let mut options = Options::default();
    options.create_if_missing = create_if_missing;

    let mut db = match DB::open(&path, options) {
        Ok(db) => db,
        Err(status) => {
            let _ = ready.send(Err(status_to_error("open", &path, status)));
            return Ok(());
        }
    };
    let _ = ready.send(Ok(()));

    while let Ok(command) = commands.recv() {
        match command {
            Command::Get { key, reply } => {
                let value = db.get(&key).map(|bytes| bytes.to_vec());
                let _ = reply.send(Ok(value));
            }
            Command::Put { key, value, reply } => {
                let result = db
                    .put(&key, &value)
                    .map_err(|status| status_to_error("put", &path, status));
                let _ = reply.send(result);
            }
        }
    }

    db.close()
        .map_err(|status| status_to_error("close", &path, status))
}

fn status_to_error(operation: &'static str, path: &Path, status: Status) -> DbError {
    if matches!(status.code, StatusCode::LockError) {
        return DbError::Locked(path.to_path_buf());
    }
    DbError::Backend {
        operation,
        message: format!("{:?}: {}", status.code, status.err),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> DbResult<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| DbError::Backend {
        operation: "lock",
        message: "store handle mutex poisoned".to_string(),
    })
}
