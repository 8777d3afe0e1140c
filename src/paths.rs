//! Centralised qhist user-directory resolution.
//!
//! When `QHIST_HOME` is set, it replaces the platform-native config and data
//! directories.
//!
//! For the history database an additional override applies on top:
//!   1. `QHIST_DB_PATH` env var (highest priority)
//!   2. `QHIST_HOME`            (if set)
//!   3. `dirs::data_local_dir().map(|d| d.join("qhist"))`

use std::path::PathBuf;

/// File name of the history database inside the data directory.
pub const DB_FILE_NAME: &str = "history.db";

fn resolve_user_path(dirs_fallback: Option<PathBuf>) -> Option<PathBuf> {
    if let Ok(home) = std::env::var("QHIST_HOME")
        && !home.is_empty()
    {
        return Some(PathBuf::from(home));
    }
    dirs_fallback
}

/// Base directory for `config.toml`.
pub fn user_dir() -> Option<PathBuf> {
    resolve_user_path(dirs::config_dir().map(|d| d.join("qhist")))
}

/// Base directory for data files (the history DB).
pub fn user_data_dir() -> Option<PathBuf> {
    resolve_user_path(dirs::data_local_dir().map(|d| d.join("qhist")))
}

/// Returns the DB path: `QHIST_DB_PATH` overrides; else `user_data_dir()/history.db`.
pub fn db_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("QHIST_DB_PATH")
        && !p.is_empty()
    {
        return Some(PathBuf::from(p));
    }
    user_data_dir().map(|d| d.join(DB_FILE_NAME))
}
