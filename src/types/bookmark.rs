use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::document::BookmarkRecord;
use super::errors::{BookmarkError, EditorError};
use super::locator::Locator;
use crate::services::editor::EditorService;
use crate::services::notifier::Notifier;

/// Returns the current time truncated to milliseconds, the precision kept in documents.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Renders a timestamp the way documents store it, e.g. `2024-05-01T10:00:00.000Z`.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, BookmarkError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| BookmarkError::MalformedRecord(format!("invalid createdAt '{}': {}", raw, e)))
}

/// A named pointer to a file.
///
/// `id`, `locator` and `created_at` never change once the bookmark exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    id: String,
    locator: Locator,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl Bookmark {
    /// Creates a bookmark with a fresh ID. The name defaults to the file's base name.
    pub fn new(locator: Locator, name: Option<&str>, description: Option<&str>) -> Self {
        let name = match name {
            Some(n) => n.to_string(),
            None => locator.base_name().to_string(),
        };
        Self {
            id: Uuid::new_v4().to_string(),
            locator,
            name,
            description: description.map(str::to_string),
            created_at: now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Converts the bookmark into its document record.
    pub fn serialize(&self) -> BookmarkRecord {
        BookmarkRecord {
            id: self.id.clone(),
            uri: self.locator.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            created_at: format_timestamp(&self.created_at),
        }
    }

    /// Rebuilds a bookmark from a document record, keeping its original ID and timestamp.
    pub fn deserialize(value: &Value) -> Result<Self, BookmarkError> {
        let record: BookmarkRecord = serde_json::from_value(value.clone())
            .map_err(|e| BookmarkError::MalformedRecord(format!("bookmark: {}", e)))?;
        Self::from_record(record)
    }

    pub fn from_record(record: BookmarkRecord) -> Result<Self, BookmarkError> {
        if record.id.is_empty() {
            return Err(BookmarkError::MalformedRecord("bookmark: empty id".to_string()));
        }
        Ok(Self {
            created_at: parse_timestamp(&record.created_at)?,
            locator: record.uri,
            id: record.id,
            name: record.name,
            description: record.description,
        })
    }

    /// Asks the editor to show this bookmark's file.
    ///
    /// Best effort: a failure is reported through `notifier` and `false` is returned.
    pub async fn open(&self, editor: &dyn EditorService, notifier: &dyn Notifier) -> bool {
        match editor.open_file(&self.locator).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(bookmark = %self.id, locator = %self.locator, "open failed: {}", e);
                notifier.error(&format!("Could not open bookmark '{}': {}", self.name, e));
                false
            }
        }
    }

    /// Closes every editor tab showing this bookmark's file.
    pub async fn close(&self, editor: &dyn EditorService) -> Result<(), EditorError> {
        editor.close_tabs_for_locator(&self.locator).await
    }
}
