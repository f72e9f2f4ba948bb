use std::fmt;

// === BookmarkError ===

/// Errors related to the bookmark forest and its serialized form.
#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkError {
    /// Bookmark or group with the given ID was not found.
    NotFound(String),
    /// A serialized record is structurally invalid.
    MalformedRecord(String),
    /// An editor, file or persistence call failed.
    ExternalOperationFailed(String),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            BookmarkError::MalformedRecord(msg) => write!(f, "Malformed bookmark record: {}", msg),
            BookmarkError::ExternalOperationFailed(msg) => {
                write!(f, "External operation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for BookmarkError {}

impl From<StoreError> for BookmarkError {
    fn from(e: StoreError) -> Self {
        BookmarkError::ExternalOperationFailed(e.to_string())
    }
}

impl From<EditorError> for BookmarkError {
    fn from(e: EditorError) -> Self {
        BookmarkError::ExternalOperationFailed(e.to_string())
    }
}

// === StoreError ===

/// Errors related to the key-value persistence backend.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Database operation failed.
    DatabaseError(String),
    /// Failed to serialize or deserialize a stored document.
    SerializationError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DatabaseError(msg) => write!(f, "Store database error: {}", msg),
            StoreError::SerializationError(msg) => {
                write!(f, "Store serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StoreError {}

// === EditorError ===

/// Errors reported by the editor collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorError {
    /// The file could not be opened (missing, unreadable, rejected by the editor).
    OpenFailed(String),
    /// Tabs showing the file could not be closed.
    CloseFailed(String),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::OpenFailed(msg) => write!(f, "Failed to open file: {}", msg),
            EditorError::CloseFailed(msg) => write!(f, "Failed to close file: {}", msg),
        }
    }
}

impl std::error::Error for EditorError {}

// === ConfigError ===

/// Errors related to configuration management.
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading or writing the config file.
    IoError(String),
    /// Failed to serialize or deserialize the config file.
    SerializationError(String),
    /// The provided config value is invalid.
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::SerializationError(msg) => {
                write!(f, "Config serialization error: {}", msg)
            }
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
