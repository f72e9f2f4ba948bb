//! Groups: named containers of bookmarks and child groups.
//!
//! A group owns its bookmarks and children outright. The link back to the
//! parent is only the parent's ID and is used for upward lookups.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::bookmark::{format_timestamp, now, parse_timestamp, Bookmark};
use super::document::GroupRecord;
use super::errors::{BookmarkError, EditorError};
use crate::services::editor::{BatchReport, ClosePolicy, EditorService, OpenPolicy};

/// Header fields of a group record; nested entries stay raw so each one can
/// be rejected on its own.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGroup {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    created_at: String,
    // Absent and `null` both mean empty, as at the document root.
    #[serde(default)]
    bookmarks: Option<Vec<Value>>,
    #[serde(default)]
    groups: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    id: String,
    name: String,
    description: Option<String>,
    bookmarks: Vec<Bookmark>,
    children: Vec<Group>,
    parent_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(name: &str, description: Option<&str>, parent_id: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            bookmarks: Vec::new(),
            children: Vec::new(),
            parent_id: parent_id.map(str::to_string),
            created_at: now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn children(&self) -> &[Group] {
        &self.children
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub(crate) fn set_description(&mut self, description: &str) {
        self.description = Some(description.to_string());
    }

    pub(crate) fn set_parent_id(&mut self, parent_id: Option<&str>) {
        self.parent_id = parent_id.map(str::to_string);
    }

    /// Appends `bookmark` unless one with the same ID is already held here.
    pub fn add_bookmark(&mut self, bookmark: Bookmark) {
        if self.bookmarks.iter().any(|b| b.id() == bookmark.id()) {
            return;
        }
        self.bookmarks.push(bookmark);
    }

    /// Removes a bookmark held directly by this group.
    pub fn remove_bookmark(&mut self, id: &str) -> bool {
        self.take_bookmark(id).is_some()
    }

    fn take_bookmark(&mut self, id: &str) -> Option<Bookmark> {
        let idx = self.bookmarks.iter().position(|b| b.id() == id)?;
        Some(self.bookmarks.remove(idx))
    }

    /// Appends `child` unless a direct child with the same ID exists, and
    /// points the child's parent at this group.
    ///
    /// Does not detach `child` from any previous parent; `BookmarkManager::move_group`
    /// is the way to reattach an existing group.
    pub(crate) fn add_group(&mut self, mut child: Group) {
        if self.children.iter().any(|g| g.id == child.id) {
            return;
        }
        child.parent_id = Some(self.id.clone());
        self.children.push(child);
    }

    /// Removes a direct child group.
    pub fn remove_group(&mut self, id: &str) -> bool {
        match self.children.iter().position(|g| g.id == id) {
            Some(idx) => {
                self.children.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty() && self.children.is_empty()
    }

    /// Own bookmarks first, then each child's bookmarks depth-first in insertion order.
    pub fn collect_all_bookmarks(&self) -> Vec<&Bookmark> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a Bookmark>) {
        out.extend(self.bookmarks.iter());
        for child in &self.children {
            child.collect_into(out);
        }
    }

    /// This group followed by every descendant, pre-order.
    pub fn all_groups(&self) -> Vec<&Group> {
        let mut out = Vec::new();
        self.groups_into(&mut out);
        out
    }

    pub(crate) fn groups_into<'a>(&'a self, out: &mut Vec<&'a Group>) {
        out.push(self);
        for child in &self.children {
            child.groups_into(out);
        }
    }

    /// Finds this group or a descendant by ID.
    pub fn find_group(&self, id: &str) -> Option<&Group> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_group(id))
    }

    pub(crate) fn find_group_mut(&mut self, id: &str) -> Option<&mut Group> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_group_mut(id))
    }

    /// Finds a bookmark anywhere in this subtree.
    pub fn find_bookmark(&self, id: &str) -> Option<&Bookmark> {
        self.bookmarks
            .iter()
            .find(|b| b.id() == id)
            .or_else(|| self.children.iter().find_map(|c| c.find_bookmark(id)))
    }

    /// Detaches a bookmark from anywhere in this subtree.
    pub(crate) fn take_bookmark_recursive(&mut self, id: &str) -> Option<Bookmark> {
        if let Some(b) = self.take_bookmark(id) {
            return Some(b);
        }
        self.children
            .iter_mut()
            .find_map(|c| c.take_bookmark_recursive(id))
    }

    /// Detaches a descendant group (never `self`) from anywhere in this subtree.
    pub(crate) fn take_group_recursive(&mut self, id: &str) -> Option<Group> {
        if let Some(idx) = self.children.iter().position(|g| g.id == id) {
            return Some(self.children.remove(idx));
        }
        self.children
            .iter_mut()
            .find_map(|c| c.take_group_recursive(id))
    }

    /// Drops nested bookmarks and groups whose IDs are already in the given
    /// sets, registering every ID that is kept.
    ///
    /// Returns false (and registers nothing) if this group's own ID is taken.
    pub(crate) fn retain_unique(
        &mut self,
        bookmark_ids: &mut HashSet<String>,
        group_ids: &mut HashSet<String>,
    ) -> bool {
        if !group_ids.insert(self.id.clone()) {
            return false;
        }
        let group_id = self.id.clone();
        self.bookmarks.retain(|b| {
            let fresh = bookmark_ids.insert(b.id().to_string());
            if !fresh {
                tracing::warn!(group = %group_id, bookmark = %b.id(), "dropping duplicate bookmark id");
            }
            fresh
        });
        self.children.retain_mut(|c| {
            let fresh = c.retain_unique(bookmark_ids, group_ids);
            if !fresh {
                tracing::warn!(group = %group_id, child = %c.id, "dropping duplicate group id");
            }
            fresh
        });
        true
    }

    /// Converts the group and its whole subtree into a document record.
    pub fn serialize(&self) -> GroupRecord {
        GroupRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            created_at: format_timestamp(&self.created_at),
            bookmarks: self.bookmarks.iter().map(Bookmark::serialize).collect(),
            groups: self.children.iter().map(Group::serialize).collect(),
        }
    }

    /// Rebuilds a group and its subtree from a document record.
    ///
    /// A malformed nested bookmark or group is logged and skipped; only a
    /// malformed header rejects the whole record. The result has no parent.
    pub fn deserialize(value: &Value) -> Result<Self, BookmarkError> {
        let raw: RawGroup = serde_json::from_value(value.clone())
            .map_err(|e| BookmarkError::MalformedRecord(format!("group: {}", e)))?;
        if raw.id.is_empty() {
            return Err(BookmarkError::MalformedRecord("group: empty id".to_string()));
        }

        let mut group = Self {
            created_at: parse_timestamp(&raw.created_at)?,
            id: raw.id,
            name: raw.name,
            description: raw.description,
            bookmarks: Vec::new(),
            children: Vec::new(),
            parent_id: None,
        };

        for entry in raw.bookmarks.iter().flatten() {
            match Bookmark::deserialize(entry) {
                Ok(b) => group.add_bookmark(b),
                Err(e) => tracing::warn!(group = %group.id, "skipping bookmark: {}", e),
            }
        }
        for entry in raw.groups.iter().flatten() {
            match Group::deserialize(entry) {
                Ok(child) => group.add_group(child),
                Err(e) => tracing::warn!(group = %group.id, "skipping child group: {}", e),
            }
        }

        Ok(group)
    }

    /// Opens this group's own bookmarks one after another (descendants are not opened).
    pub async fn open_all(
        &self,
        editor: &dyn EditorService,
        policy: OpenPolicy,
    ) -> Result<BatchReport, EditorError> {
        let mut report = BatchReport::default();
        for bookmark in &self.bookmarks {
            match editor.open_file(bookmark.locator()).await {
                Ok(()) => report.succeeded.push(bookmark.id().to_string()),
                Err(e) => match policy {
                    OpenPolicy::AbortOnFailure => return Err(e),
                    OpenPolicy::BestEffort => {
                        tracing::warn!(bookmark = %bookmark.id(), "open failed: {}", e);
                        report.failed.push((bookmark.id().to_string(), e));
                    }
                },
            }
        }
        Ok(report)
    }

    /// Closes the tabs of this group's own bookmarks one after another.
    pub async fn close_all(
        &self,
        editor: &dyn EditorService,
        policy: ClosePolicy,
    ) -> Result<BatchReport, EditorError> {
        let mut report = BatchReport::default();
        for bookmark in &self.bookmarks {
            match bookmark.close(editor).await {
                Ok(()) => report.succeeded.push(bookmark.id().to_string()),
                Err(e) => match policy {
                    ClosePolicy::AbortOnFailure => return Err(e),
                    ClosePolicy::BestEffort => {
                        tracing::warn!(bookmark = %bookmark.id(), "close failed: {}", e);
                        report.failed.push((bookmark.id().to_string(), e));
                    }
                },
            }
        }
        Ok(report)
    }
}
