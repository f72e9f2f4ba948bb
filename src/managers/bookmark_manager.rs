//! Bookmark Manager for filemarks.
//!
//! Implements `BookmarkManagerTrait`: the single owner of the bookmark forest
//! (root bookmarks plus root groups and everything nested under them). Every
//! mutation writes the whole forest to the injected `KeyValueStore` and then
//! broadcasts a payload-free change event.
//!
//! Lookups that miss are reported as `false`/`None`, never as errors.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::database::store::KeyValueStore;
use crate::services::editor::{BatchReport, ClosePolicy, DetachedEditor, EditorService, OpenPolicy};
use crate::services::notifier::{LogNotifier, Notifier};
use crate::types::bookmark::Bookmark;
use crate::types::document::{BookmarkDocument, ImportReport};
use crate::types::errors::BookmarkError;
use crate::types::group::Group;
use crate::types::locator::Locator;

/// Buffered change events per subscriber before older ones are dropped.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Trait defining bookmark forest operations.
pub trait BookmarkManagerTrait {
    fn list_root_bookmarks(&self) -> Vec<Bookmark>;
    fn list_root_groups(&self) -> Vec<Group>;
    fn add_bookmark(
        &mut self,
        locator: Locator,
        name: Option<&str>,
        description: Option<&str>,
        group_id: Option<&str>,
    ) -> String;
    fn remove_bookmark(&mut self, id: &str) -> bool;
    fn create_group(&mut self, name: &str, description: Option<&str>, parent_id: Option<&str>) -> String;
    fn remove_group(&mut self, id: &str) -> bool;
    fn update_group(&mut self, id: &str, name: Option<&str>, description: Option<&str>) -> bool;
    fn find_bookmark_by_id(&self, id: &str) -> Option<&Bookmark>;
    fn find_group_by_id(&self, id: &str) -> Option<&Group>;
    fn parent_of(&self, group_id: &str) -> Option<&Group>;
    fn list_all_groups(&self) -> Vec<Group>;
    fn list_all_bookmarks(&self) -> Vec<Bookmark>;
    fn move_bookmark_to_group(&mut self, bookmark_id: &str, target_group_id: &str) -> bool;
    fn move_bookmark_to_root(&mut self, bookmark_id: &str) -> bool;
    fn move_group(&mut self, id: &str, new_parent_id: Option<&str>) -> bool;
    fn bookmarks_for_locator(&self, locator: &Locator) -> Vec<Bookmark>;
    fn is_locator_bookmarked(&self, locator: &Locator) -> bool;
    fn export_to_document(&self) -> BookmarkDocument;
    fn import_from_document(&mut self, doc: &Value, merge: bool) -> Result<ImportReport, BookmarkError>;
    fn export_to_file(&self, path: &Path) -> Result<(), BookmarkError>;
    fn import_from_file(&mut self, path: &Path, merge: bool) -> Result<ImportReport, BookmarkError>;
    fn clear(&mut self);
    fn persist(&self) -> Result<(), BookmarkError>;
    fn restore(&mut self) -> ImportReport;
    fn subscribe(&self) -> broadcast::Receiver<()>;
}

/// Root records parsed out of a document, ready to be attached.
struct ParsedDocument {
    bookmarks: Vec<Bookmark>,
    groups: Vec<Group>,
    skipped: usize,
}

/// In-memory bookmark forest with injected persistence, editor and notifier.
pub struct BookmarkManager {
    root_bookmarks: Vec<Bookmark>,
    root_groups: Vec<Group>,
    store: Box<dyn KeyValueStore>,
    storage_key: String,
    editor: Arc<dyn EditorService>,
    notifier: Arc<dyn Notifier>,
    changes: broadcast::Sender<()>,
}

impl BookmarkManager {
    /// Creates an empty manager writing to `store` under `storage_key`.
    ///
    /// No editor is attached and notifications go to the log until
    /// `with_editor` / `with_notifier` replace them. Call `restore` to load
    /// the stored forest.
    pub fn new(store: Box<dyn KeyValueStore>, storage_key: &str) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            root_bookmarks: Vec::new(),
            root_groups: Vec::new(),
            store,
            storage_key: storage_key.to_string(),
            editor: Arc::new(DetachedEditor),
            notifier: Arc::new(LogNotifier),
            changes,
        }
    }

    pub fn with_editor(mut self, editor: Arc<dyn EditorService>) -> Self {
        self.editor = editor;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Persists the forest and tells observers something changed.
    ///
    /// A failed write is logged and reported; the in-memory forest stays as mutated.
    fn commit(&self) {
        if let Err(e) = self.persist() {
            tracing::warn!("persisting bookmarks failed: {}", e);
            self.notifier.error(&format!("Could not save bookmarks: {}", e));
        }
        self.notify();
    }

    fn notify(&self) {
        // No receivers is not an error.
        let _ = self.changes.send(());
    }

    fn find_group_mut(&mut self, id: &str) -> Option<&mut Group> {
        self.root_groups
            .iter_mut()
            .find_map(|g| g.find_group_mut(id))
    }

    /// Detaches a bookmark from wherever it lives in the forest.
    fn take_bookmark(&mut self, id: &str) -> Option<Bookmark> {
        if let Some(idx) = self.root_bookmarks.iter().position(|b| b.id() == id) {
            return Some(self.root_bookmarks.remove(idx));
        }
        self.root_groups
            .iter_mut()
            .find_map(|g| g.take_bookmark_recursive(id))
    }

    /// Detaches a group (with its subtree) from wherever it lives in the forest.
    fn take_group(&mut self, id: &str) -> Option<Group> {
        if let Some(idx) = self.root_groups.iter().position(|g| g.id() == id) {
            return Some(self.root_groups.remove(idx));
        }
        self.root_groups
            .iter_mut()
            .find_map(|g| g.take_group_recursive(id))
    }

    fn all_group_refs(&self) -> Vec<&Group> {
        let mut out = Vec::new();
        for group in &self.root_groups {
            group.groups_into(&mut out);
        }
        out
    }

    fn all_bookmark_refs(&self) -> Vec<&Bookmark> {
        let mut out: Vec<&Bookmark> = self.root_bookmarks.iter().collect();
        for group in self.all_group_refs() {
            out.extend(group.bookmarks().iter());
        }
        out
    }

    /// Deserializes every root record of `doc` independently.
    ///
    /// Only a document that is not an object, or whose `bookmarks`/`groups`
    /// are not arrays, is rejected as a whole.
    fn parse_document(doc: &Value) -> Result<ParsedDocument, BookmarkError> {
        let obj = doc.as_object().ok_or_else(|| {
            BookmarkError::MalformedRecord("document is not a JSON object".to_string())
        })?;

        let section = |key: &str| -> Result<Vec<Value>, BookmarkError> {
            match obj.get(key) {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(Value::Array(items)) => Ok(items.clone()),
                Some(_) => Err(BookmarkError::MalformedRecord(format!(
                    "document field '{}' is not an array",
                    key
                ))),
            }
        };

        let mut parsed = ParsedDocument {
            bookmarks: Vec::new(),
            groups: Vec::new(),
            skipped: 0,
        };

        for entry in section("bookmarks")? {
            match Bookmark::deserialize(&entry) {
                Ok(b) => parsed.bookmarks.push(b),
                Err(e) => {
                    tracing::warn!("skipping bookmark record: {}", e);
                    parsed.skipped += 1;
                }
            }
        }
        for entry in section("groups")? {
            match Group::deserialize(&entry) {
                Ok(g) => parsed.groups.push(g),
                Err(e) => {
                    tracing::warn!("skipping group record: {}", e);
                    parsed.skipped += 1;
                }
            }
        }

        Ok(parsed)
    }

    /// Attaches parsed records at the root, replacing the forest unless `merge`.
    ///
    /// Records whose IDs already exist in the forest (or earlier in the same
    /// document) are dropped so IDs stay unique.
    fn apply_document(&mut self, parsed: ParsedDocument, merge: bool) -> ImportReport {
        if !merge {
            self.root_bookmarks.clear();
            self.root_groups.clear();
        }

        let mut bookmark_ids: HashSet<String> = self
            .all_bookmark_refs()
            .iter()
            .map(|b| b.id().to_string())
            .collect();
        let mut group_ids: HashSet<String> = self
            .all_group_refs()
            .iter()
            .map(|g| g.id().to_string())
            .collect();

        let mut report = ImportReport {
            skipped: parsed.skipped,
            ..ImportReport::default()
        };

        for bookmark in parsed.bookmarks {
            if bookmark_ids.insert(bookmark.id().to_string()) {
                self.root_bookmarks.push(bookmark);
                report.bookmarks += 1;
            } else {
                tracing::warn!(bookmark = %bookmark.id(), "skipping duplicate bookmark id");
                report.skipped += 1;
            }
        }
        for mut group in parsed.groups {
            if group.retain_unique(&mut bookmark_ids, &mut group_ids) {
                group.set_parent_id(None);
                self.root_groups.push(group);
                report.groups += 1;
            } else {
                tracing::warn!(group = %group.id(), "skipping duplicate group id");
                report.skipped += 1;
            }
        }

        report
    }

    /// Opens a bookmark in the editor. Best effort: returns false on any failure.
    pub async fn open_bookmark(&self, id: &str) -> bool {
        match self.find_bookmark_by_id(id) {
            Some(bookmark) => bookmark.open(self.editor.as_ref(), self.notifier.as_ref()).await,
            None => false,
        }
    }

    /// Opens the group's own bookmarks, stopping at the first failure.
    ///
    /// `Ok(None)` if the group does not exist.
    pub async fn open_group(&self, id: &str) -> Result<Option<BatchReport>, BookmarkError> {
        let group = match self.find_group_by_id(id) {
            Some(g) => g,
            None => return Ok(None),
        };
        match group.open_all(self.editor.as_ref(), OpenPolicy::AbortOnFailure).await {
            Ok(report) => Ok(Some(report)),
            Err(e) => {
                tracing::warn!(group = %id, "opening group aborted: {}", e);
                self.notifier
                    .error(&format!("Could not open group '{}': {}", group.name(), e));
                Err(e.into())
            }
        }
    }

    /// Closes the tabs of the group's own bookmarks, continuing past failures.
    ///
    /// `None` if the group does not exist.
    pub async fn close_group(&self, id: &str) -> Option<BatchReport> {
        let group = self.find_group_by_id(id)?;
        let report = group
            .close_all(self.editor.as_ref(), ClosePolicy::BestEffort)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(group = %id, "closing group failed: {}", e);
                BatchReport::default()
            });
        Some(report)
    }
}

impl BookmarkManagerTrait for BookmarkManager {
    fn list_root_bookmarks(&self) -> Vec<Bookmark> {
        self.root_bookmarks.clone()
    }

    fn list_root_groups(&self) -> Vec<Group> {
        self.root_groups.clone()
    }

    /// Adds a bookmark under `group_id`, or at the root if the group does not resolve.
    fn add_bookmark(
        &mut self,
        locator: Locator,
        name: Option<&str>,
        description: Option<&str>,
        group_id: Option<&str>,
    ) -> String {
        let bookmark = Bookmark::new(locator, name, description);
        let id = bookmark.id().to_string();

        let target = match group_id {
            Some(gid) => self.find_group_mut(gid),
            None => None,
        };
        match target {
            Some(group) => group.add_bookmark(bookmark),
            None => {
                if let Some(gid) = group_id {
                    tracing::debug!(group = %gid, "group not found, adding bookmark at root");
                }
                self.root_bookmarks.push(bookmark);
            }
        }

        tracing::debug!(bookmark = %id, "bookmark added");
        self.commit();
        id
    }

    fn remove_bookmark(&mut self, id: &str) -> bool {
        if self.take_bookmark(id).is_none() {
            return false;
        }
        tracing::debug!(bookmark = %id, "bookmark removed");
        self.commit();
        true
    }

    /// Creates a group under `parent_id`, or at the root if the parent does not resolve.
    fn create_group(&mut self, name: &str, description: Option<&str>, parent_id: Option<&str>) -> String {
        let resolved_parent = parent_id.filter(|pid| self.find_group_by_id(pid).is_some());
        let group = Group::new(name, description, resolved_parent);
        let id = group.id().to_string();

        match resolved_parent.and_then(|pid| self.find_group_mut(pid)) {
            Some(parent) => parent.add_group(group),
            None => self.root_groups.push(group),
        }

        tracing::debug!(group = %id, "group created");
        self.commit();
        id
    }

    /// Removes a group and its whole subtree, wherever it is nested.
    fn remove_group(&mut self, id: &str) -> bool {
        if self.take_group(id).is_none() {
            return false;
        }
        tracing::debug!(group = %id, "group removed");
        self.commit();
        true
    }

    /// Updates the given fields; `None` leaves a field unchanged.
    fn update_group(&mut self, id: &str, name: Option<&str>, description: Option<&str>) -> bool {
        let group = match self.find_group_mut(id) {
            Some(g) => g,
            None => return false,
        };
        if let Some(n) = name {
            group.set_name(n);
        }
        if let Some(d) = description {
            group.set_description(d);
        }
        self.commit();
        true
    }

    fn find_bookmark_by_id(&self, id: &str) -> Option<&Bookmark> {
        self.root_bookmarks
            .iter()
            .find(|b| b.id() == id)
            .or_else(|| self.root_groups.iter().find_map(|g| g.find_bookmark(id)))
    }

    fn find_group_by_id(&self, id: &str) -> Option<&Group> {
        self.root_groups.iter().find_map(|g| g.find_group(id))
    }

    fn parent_of(&self, group_id: &str) -> Option<&Group> {
        let parent_id = self.find_group_by_id(group_id)?.parent_id()?;
        self.find_group_by_id(parent_id)
    }

    /// Every group in the forest, pre-order.
    fn list_all_groups(&self) -> Vec<Group> {
        self.all_group_refs().into_iter().cloned().collect()
    }

    /// Root bookmarks, then each group's own bookmarks in `list_all_groups` order.
    fn list_all_bookmarks(&self) -> Vec<Bookmark> {
        self.all_bookmark_refs().into_iter().cloned().collect()
    }

    /// Moves a bookmark to the end of the target group. Nothing changes if
    /// either ID does not resolve.
    fn move_bookmark_to_group(&mut self, bookmark_id: &str, target_group_id: &str) -> bool {
        if self.find_bookmark_by_id(bookmark_id).is_none()
            || self.find_group_by_id(target_group_id).is_none()
        {
            return false;
        }
        let bookmark = match self.take_bookmark(bookmark_id) {
            Some(b) => b,
            None => return false,
        };
        match self.find_group_mut(target_group_id) {
            Some(target) => target.add_bookmark(bookmark),
            None => self.root_bookmarks.push(bookmark),
        }
        tracing::debug!(bookmark = %bookmark_id, group = %target_group_id, "bookmark moved");
        self.commit();
        true
    }

    fn move_bookmark_to_root(&mut self, bookmark_id: &str) -> bool {
        let bookmark = match self.take_bookmark(bookmark_id) {
            Some(b) => b,
            None => return false,
        };
        self.root_bookmarks.push(bookmark);
        tracing::debug!(bookmark = %bookmark_id, "bookmark moved to root");
        self.commit();
        true
    }

    /// Reattaches a group (with its subtree) under `new_parent_id`, or at the
    /// root when `None`.
    ///
    /// Refuses to move a group into itself or one of its own descendants.
    fn move_group(&mut self, id: &str, new_parent_id: Option<&str>) -> bool {
        let group = match self.find_group_by_id(id) {
            Some(g) => g,
            None => return false,
        };
        if let Some(pid) = new_parent_id {
            if group.find_group(pid).is_some() || self.find_group_by_id(pid).is_none() {
                return false;
            }
        }

        let mut group = match self.take_group(id) {
            Some(g) => g,
            None => return false,
        };
        match new_parent_id.and_then(|pid| self.find_group_mut(pid)) {
            Some(parent) => parent.add_group(group),
            None => {
                group.set_parent_id(None);
                self.root_groups.push(group);
            }
        }

        tracing::debug!(group = %id, parent = ?new_parent_id, "group moved");
        self.commit();
        true
    }

    /// Bookmarks whose locator equals `locator` exactly.
    fn bookmarks_for_locator(&self, locator: &Locator) -> Vec<Bookmark> {
        self.all_bookmark_refs()
            .into_iter()
            .filter(|b| b.locator() == locator)
            .cloned()
            .collect()
    }

    fn is_locator_bookmarked(&self, locator: &Locator) -> bool {
        self.all_bookmark_refs()
            .iter()
            .any(|b| b.locator() == locator)
    }

    /// The root forest; each group record embeds its subtree.
    fn export_to_document(&self) -> BookmarkDocument {
        BookmarkDocument {
            bookmarks: self.root_bookmarks.iter().map(Bookmark::serialize).collect(),
            groups: self.root_groups.iter().map(Group::serialize).collect(),
        }
    }

    /// Imports `doc`, replacing the forest unless `merge`.
    ///
    /// Malformed records are skipped and counted. Fails only if the document
    /// itself is unusable, in which case the forest is left untouched.
    fn import_from_document(&mut self, doc: &Value, merge: bool) -> Result<ImportReport, BookmarkError> {
        let parsed = Self::parse_document(doc)?;
        let report = self.apply_document(parsed, merge);
        tracing::info!(
            bookmarks = report.bookmarks,
            groups = report.groups,
            skipped = report.skipped,
            merge,
            "import finished"
        );
        self.commit();
        Ok(report)
    }

    fn export_to_file(&self, path: &Path) -> Result<(), BookmarkError> {
        let json = serde_json::to_string_pretty(&self.export_to_document())
            .map_err(|e| BookmarkError::MalformedRecord(e.to_string()))?;
        fs::write(path, json).map_err(|e| {
            BookmarkError::ExternalOperationFailed(format!(
                "failed to write {}: {}",
                path.display(),
                e
            ))
        })?;
        self.notifier
            .info(&format!("Exported bookmarks to {}", path.display()));
        Ok(())
    }

    fn import_from_file(&mut self, path: &Path, merge: bool) -> Result<ImportReport, BookmarkError> {
        let content = fs::read_to_string(path).map_err(|e| {
            BookmarkError::ExternalOperationFailed(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))
        })?;
        let doc: Value = serde_json::from_str(&content).map_err(|e| {
            BookmarkError::MalformedRecord(format!("{} is not valid JSON: {}", path.display(), e))
        })?;
        let report = self.import_from_document(&doc, merge)?;
        self.notifier.info(&format!(
            "Imported {} bookmark(s) and {} group(s) from {}, skipped {}",
            report.bookmarks,
            report.groups,
            path.display(),
            report.skipped
        ));
        Ok(report)
    }

    fn clear(&mut self) {
        self.root_bookmarks.clear();
        self.root_groups.clear();
        self.commit();
    }

    /// Writes the whole root forest under the storage key.
    fn persist(&self) -> Result<(), BookmarkError> {
        let doc = serde_json::to_value(self.export_to_document())
            .map_err(|e| BookmarkError::MalformedRecord(e.to_string()))?;
        self.store.set(&self.storage_key, &doc)?;
        Ok(())
    }

    /// Replaces the forest with the stored document.
    ///
    /// A missing document leaves the forest empty. A malformed or unreadable
    /// one also leaves it empty and is reported; it is not overwritten until
    /// the next mutation.
    fn restore(&mut self) -> ImportReport {
        self.root_bookmarks.clear();
        self.root_groups.clear();

        let report = match self.store.get(&self.storage_key) {
            Ok(Some(doc)) => match Self::parse_document(&doc) {
                Ok(parsed) => self.apply_document(parsed, false),
                Err(e) => {
                    tracing::warn!("stored bookmarks are malformed: {}", e);
                    self.notifier
                        .error(&format!("Could not load bookmarks: {}", e));
                    ImportReport::default()
                }
            },
            Ok(None) => ImportReport::default(),
            Err(e) => {
                tracing::warn!("reading stored bookmarks failed: {}", e);
                self.notifier
                    .error(&format!("Could not load bookmarks: {}", e));
                ImportReport::default()
            }
        };

        tracing::info!(
            bookmarks = report.bookmarks,
            groups = report.groups,
            skipped = report.skipped,
            "bookmarks restored"
        );
        self.notify();
        report
    }

    /// Receives one `()` per mutation, after it has been persisted.
    fn subscribe(&self) -> broadcast::Receiver<()> {
        self.changes.subscribe()
    }
}
