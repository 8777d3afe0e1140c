//! Persistent translation history backed by a single `SQLite` file.
//!
//! [`HistoryStore`] owns the database file. It is constructed without I/O and
//! prepares the schema on first use; every operation after that goes through
//! one connection guarded by a mutex, so appends, clears and reads never
//! interleave.

pub mod config;
mod error;
pub mod export;
mod queries;
mod types;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use rusqlite::Connection;

pub use config::HistoryConfig;
pub use error::{HistoryError, HistoryResult};
pub use queries::init_history_table;
pub use types::{HistoryEntry, HistoryRecord, now_timestamp};

#[derive(Clone, Copy)]
enum Access {
    Read,
    Write,
}

impl Access {
    fn error(self, op: &str, cause: rusqlite::Error) -> HistoryError {
        match self {
            Self::Read => HistoryError::read(op, cause),
            Self::Write => HistoryError::write(op, cause),
        }
    }

    fn poisoned(self, op: &str) -> HistoryError {
        let message = format!("{op}: connection lock poisoned");
        match self {
            Self::Read => HistoryError::Read {
                message,
                source: None,
            },
            Self::Write => HistoryError::Write {
                message,
                source: None,
            },
        }
    }
}

/// Lifecycle of the backing file. Set exactly once per store.
type SetupOutcome = Result<Mutex<Connection>, String>;

/// The history store. Share it by reference or behind an `Arc`.
pub struct HistoryStore {
    path: PathBuf,
    config: HistoryConfig,
    state: OnceLock<SetupOutcome>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state.get() {
            None => "uninitialized",
            Some(Ok(_)) => "ready",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("HistoryStore")
            .field("path", &self.path)
            .field("config", &self.config)
            .field("state", &state)
            .finish()
    }
}

/// Open or create the DB at `path` and make sure the history schema exists.
fn open_connection(path: &Path) -> HistoryResult<Connection> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            HistoryError::init(format!("create db dir {}", parent.display()), e)
        })?;
    }
    let conn = Connection::open(path)
        .map_err(|e| HistoryError::init(format!("open db at {}", path.display()), e))?;
    init_history_table(&conn)
        .map_err(|e| HistoryError::init(format!("create history table in {}", path.display()), e))?;
    Ok(conn)
}

impl HistoryStore {
    /// Create a store for the database at `path`. No I/O happens until the
    /// first operation or an explicit [`HistoryStore::ensure_ready`].
    pub fn new(path: impl Into<PathBuf>, config: HistoryConfig) -> Self {
        Self {
            path: path.into(),
            config,
            state: OnceLock::new(),
        }
    }

    /// Create a store at the default location with config loaded from disk
    /// and environment (see [`crate::paths::db_path`]).
    ///
    /// # Errors
    /// Returns [`HistoryError::Init`] if no data directory can be determined.
    pub fn from_env() -> HistoryResult<Self> {
        let path = crate::paths::db_path().ok_or_else(|| HistoryError::Init {
            message: "cannot determine history DB path".to_owned(),
            source: None,
        })?;
        Ok(Self::new(path, HistoryConfig::load()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` once setup has succeeded.
    pub fn is_ready(&self) -> bool {
        matches!(self.state.get(), Some(Ok(_)))
    }

    /// Create the backing file, table and index if absent.
    ///
    /// Runs setup at most once per store. Concurrent callers block until the
    /// first one finishes and then observe its outcome. After a failure every
    /// call reports [`HistoryError::Init`] without touching the disk again.
    ///
    /// # Errors
    /// Returns [`HistoryError::Init`] if the file or schema cannot be prepared.
    pub fn ensure_ready(&self) -> HistoryResult<()> {
        self.connection().map(|_| ())
    }

    fn connection(&self) -> HistoryResult<&Mutex<Connection>> {
        let mut first_failure = None;
        let outcome = self.state.get_or_init(|| match open_connection(&self.path) {
            Ok(conn) => {
                tracing::debug!(path = %self.path.display(), "history store ready");
                Ok(Mutex::new(conn))
            }
            Err(e) => {
                let summary = e.summary();
                tracing::error!(path = %self.path.display(), "history store setup failed: {summary}");
                first_failure = Some(e);
                Err(summary)
            }
        });
        if let Some(e) = first_failure {
            return Err(e);
        }
        outcome.as_ref().map_err(|summary| HistoryError::Init {
            message: summary.clone(),
            source: None,
        })
    }

    fn with_conn<T>(
        &self,
        access: Access,
        op: &str,
        f: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> HistoryResult<T> {
        let mut conn = self
            .connection()?
            .lock()
            .map_err(|_| access.poisoned(op))?;
        f(&mut *conn).map_err(|e| access.error(op, e))
    }

    /// Persist one service result.
    ///
    /// # Errors
    /// Returns [`HistoryError::Write`] if the record is invalid (empty
    /// `service_id` or `query_text`, non-finite `created_at`) or the insert
    /// fails, and [`HistoryError::Init`] if the store could not be set up.
    pub fn append(&self, record: &HistoryRecord) -> HistoryResult<()> {
        validate(record)?;
        let retention = self.config.retention;
        self.with_conn(Access::Write, "insert history entry", |conn| {
            let tx = conn.transaction()?;
            queries::insert_record(&tx, record, retention)?;
            tx.commit()
        })?;
        tracing::debug!(service = %record.service_id, "history entry recorded");
        Ok(())
    }

    /// Best-effort [`HistoryStore::append`]: failures are logged, never returned.
    ///
    /// Returns whether the record was persisted.
    pub fn try_append(&self, record: &HistoryRecord) -> bool {
        match self.append(record) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(service = %record.service_id, "history not recorded: {}", e.summary());
                false
            }
        }
    }

    /// Up to `limit` entries, newest first, skipping the first `offset`.
    ///
    /// Entries with equal `created_at` come back in the order they were
    /// appended. The result is a snapshot; later writes do not affect it.
    ///
    /// # Errors
    /// Returns [`HistoryError::Read`] if the query fails and
    /// [`HistoryError::Init`] if the store could not be set up.
    pub fn list_recent(&self, limit: usize, offset: usize) -> HistoryResult<Vec<HistoryEntry>> {
        self.ensure_ready()?;
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.with_conn(Access::Read, "list history", |conn| {
            queries::select_recent(conn, limit, offset)
        })
    }

    /// # Errors
    /// Returns [`HistoryError::Read`] if the query fails.
    pub fn get(&self, id: i64) -> HistoryResult<Option<HistoryEntry>> {
        self.with_conn(Access::Read, "get history entry", |conn| {
            queries::select_by_id(conn, id)
        })
    }

    /// # Errors
    /// Returns [`HistoryError::Read`] if the query fails.
    pub fn count(&self) -> HistoryResult<u64> {
        self.with_conn(Access::Read, "count history", |conn| queries::count_rows(conn))
    }

    /// Remove one entry. Returns `false` when no entry had that id.
    ///
    /// # Errors
    /// Returns [`HistoryError::Write`] if the DELETE fails.
    pub fn delete(&self, id: i64) -> HistoryResult<bool> {
        self.with_conn(Access::Write, "delete history entry", |conn| {
            queries::delete_by_id(conn, id)
        })
    }

    /// Delete every entry and restart the id sequence, atomically.
    ///
    /// # Errors
    /// Returns [`HistoryError::Write`] if the transaction fails; nothing is
    /// removed in that case.
    pub fn clear_all(&self) -> HistoryResult<()> {
        let removed = self.with_conn(Access::Write, "clear history", |conn| {
            let tx = conn.transaction()?;
            let removed = queries::delete_all(&tx)?;
            tx.commit()?;
            Ok(removed)
        })?;
        tracing::debug!(removed, "history cleared");
        Ok(())
    }
}

fn validate(record: &HistoryRecord) -> HistoryResult<()> {
    if record.service_id.trim().is_empty() {
        return Err(HistoryError::invalid("service_id must not be empty"));
    }
    if record.query_text.trim().is_empty() {
        return Err(HistoryError::invalid("query_text must not be empty"));
    }
    if !record.created_at.is_finite() {
        return Err(HistoryError::invalid("created_at must be a finite timestamp"));
    }
    Ok(())
}



#[cfg(test)]
mod tests_lifecycle;
