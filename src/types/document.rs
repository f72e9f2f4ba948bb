use serde::{Deserialize, Serialize};

use super::locator::Locator;

/// Serialized form of a bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRecord {
    pub id: String,
    /// Canonical `scheme://path` form; an invalid locator rejects the record.
    pub uri: Locator,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
}

/// Serialized form of a group, with its subtree embedded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub bookmarks: Vec<BookmarkRecord>,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
}

/// The whole root forest as stored, exported and imported.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookmarkDocument {
    #[serde(default)]
    pub bookmarks: Vec<BookmarkRecord>,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
}

/// Outcome of an import: how many root records were taken and how many skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub bookmarks: usize,
    pub groups: usize,
    pub skipped: usize,
}
