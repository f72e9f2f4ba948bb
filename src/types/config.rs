use serde::{Deserialize, Serialize};

use crate::platform;

/// Runtime configuration, stored as `config.json` in the platform config directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilemarksConfig {
    /// Key the bookmark document is stored under.
    pub storage_key: String,
    /// SQLite file backing the store.
    pub database_path: String,
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    pub log_filter: String,
}

impl Default for FilemarksConfig {
    fn default() -> Self {
        Self {
            storage_key: "filemarks.bookmarks".to_string(),
            database_path: platform::get_data_dir()
                .join("filemarks.db")
                .to_string_lossy()
                .to_string(),
            log_filter: "info".to_string(),
        }
    }
}
