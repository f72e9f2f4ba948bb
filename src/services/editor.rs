//! Editor collaborator seam.
//!
//! The host editor opens and closes files on behalf of bookmarks. Calls may
//! suspend while the editor works; they never touch the bookmark forest.

use async_trait::async_trait;

use crate::types::errors::EditorError;
use crate::types::locator::Locator;

/// Operations the bookmark core needs from the host editor.
#[async_trait]
pub trait EditorService: Send + Sync {
    /// Shows the file at `locator`.
    async fn open_file(&self, locator: &Locator) -> Result<(), EditorError>;
    /// Closes every tab currently showing `locator`.
    async fn close_tabs_for_locator(&self, locator: &Locator) -> Result<(), EditorError>;
}

/// Editor used when no host editor is attached. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedEditor;

#[async_trait]
impl EditorService for DetachedEditor {
    async fn open_file(&self, locator: &Locator) -> Result<(), EditorError> {
        Err(EditorError::OpenFailed(format!("no editor attached: {}", locator)))
    }

    async fn close_tabs_for_locator(&self, locator: &Locator) -> Result<(), EditorError> {
        Err(EditorError::CloseFailed(format!("no editor attached: {}", locator)))
    }
}

/// How a batch open reacts when one file fails to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenPolicy {
    /// Stop at the first failure and return it; later files are not opened.
    #[default]
    AbortOnFailure,
    /// Log the failure and keep going.
    BestEffort,
}

/// How a batch close reacts when one file fails to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosePolicy {
    /// Log the failure and keep going.
    #[default]
    BestEffort,
    /// Stop at the first failure and return it.
    AbortOnFailure,
}

/// Per-bookmark outcome of a batch open or close.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, EditorError)>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
