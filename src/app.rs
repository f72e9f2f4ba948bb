//! App Core for filemarks.
//!
//! Composition root: loads the config, sets up logging, opens the SQLite
//! store and hands it to a `BookmarkManager` together with the host's editor
//! and notifier.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::database::store::SqliteStore;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::services::config_engine::{ConfigEngine, ConfigEngineTrait};
use crate::services::editor::EditorService;
use crate::services::notifier::Notifier;
use crate::types::document::ImportReport;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Returns false if a subscriber was
/// already installed (e.g. by the host or an earlier call).
pub fn init_logging(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

/// Central application struct holding the config and the bookmark manager.
pub struct App {
    pub config_engine: ConfigEngine,
    pub bookmark_manager: BookmarkManager,
}

impl App {
    /// Loads the config (`config_path` overrides the platform default),
    /// installs logging with the configured filter and opens the configured
    /// store. The forest is empty until `startup`.
    pub fn new(
        config_path: Option<String>,
        editor: Arc<dyn EditorService>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config_engine = ConfigEngine::new(config_path);
        let config = config_engine.load()?;
        init_logging(&config.log_filter);
        tracing::info!(config = %config_engine.get_config_path(), "filemarks starting");

        let store = SqliteStore::open(&config.database_path)?;
        tracing::debug!(database = %config.database_path, "store opened");
        let bookmark_manager = BookmarkManager::new(Box::new(store), &config.storage_key)
            .with_editor(editor)
            .with_notifier(notifier);

        Ok(Self {
            config_engine,
            bookmark_manager,
        })
    }

    /// Startup sequence: restore the stored forest.
    pub fn startup(&mut self) -> ImportReport {
        self.bookmark_manager.restore()
    }

    /// Shutdown sequence: write the forest one last time.
    pub fn shutdown(&self) {
        if let Err(e) = self.bookmark_manager.persist() {
            tracing::warn!("final save failed: {}", e);
        }
    }
}
