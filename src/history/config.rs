use std::path::Path;

/// Retention policy for the history table.
///
/// `retention == None` keeps every row until it is cleared explicitly.
/// `Some(n)` keeps the `n` most recently appended rows, whatever their
/// `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryConfig {
    pub retention: Option<u32>,
}

/// Private: parsed representation of a qhist config file.
#[derive(serde::Deserialize, Default)]
struct QhistConfigFile {
    history: Option<HistorySection>,
}

#[derive(serde::Deserialize)]
struct HistorySection {
    retention: Option<u32>,
}

/// Read `[history] retention` from a TOML config file path. Returns `None` on any error.
fn read_retention_from_config(path: &Path) -> Option<u32> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<QhistConfigFile>(&content) {
        Ok(cfg) => cfg.history?.retention,
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring malformed config: {e}");
            None
        }
    }
}

/// `0` means "no cap".
const fn normalize(retention: Option<u32>) -> Option<u32> {
    match retention {
        Some(0) | None => None,
        some => some,
    }
}

impl HistoryConfig {
    /// Load retention using the default config location. Priority:
    /// 1. `QHIST_HISTORY_RETENTION` env var
    /// 2. `{user_dir}/config.toml` `[history] retention`
    /// 3. Default: unlimited
    pub fn load() -> Self {
        let file = crate::paths::user_dir().map(|d| d.join("config.toml"));
        Self::load_from(file.as_deref())
    }

    /// Load retention from an explicit config file path. Useful for testing.
    pub fn load_from(config_file: Option<&Path>) -> Self {
        let from_env = std::env::var("QHIST_HISTORY_RETENTION")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok());
        let retention = from_env.or_else(|| config_file.and_then(read_retention_from_config));
        Self {
            retention: normalize(retention),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
