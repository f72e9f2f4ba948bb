//! Unit tests for document export/import, file export/import and restore.
//!
//! Covers the replace-vs-merge import modes and the partial-success policy:
//! a malformed record is skipped without failing the surrounding import.

use std::sync::{Arc, Mutex};

use filemarks::database::{KeyValueStore, MemoryStore};
use filemarks::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use filemarks::services::notifier::Notifier;
use filemarks::types::errors::BookmarkError;
use filemarks::types::locator::Locator;
use serde_json::{json, Value};
use tempfile::TempDir;

const KEY: &str = "test.bookmarks";

#[derive(Default)]
struct RecordingNotifier {
    infos: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

fn setup() -> (BookmarkManager, MemoryStore) {
    let store = MemoryStore::new();
    let mgr = BookmarkManager::new(Box::new(store.clone()), KEY);
    (mgr, store)
}

fn loc(path: &str) -> Locator {
    Locator::parse(&format!("file://{}", path)).unwrap()
}

fn bookmark_record(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "uri": format!("file:///docs/{}", name),
        "name": name,
        "createdAt": "2024-05-01T10:00:00.000Z"
    })
}

fn all_names(mgr: &BookmarkManager) -> Vec<String> {
    mgr.list_all_bookmarks()
        .iter()
        .map(|b| b.name().to_string())
        .collect()
}

#[test]
fn test_import_without_merge_discards_prior_state() {
    let (mut mgr, _) = setup();
    mgr.add_bookmark(loc("/docs/A"), Some("A"), None, None);
    mgr.create_group("old group", None, None);

    let doc = json!({"bookmarks": [bookmark_record("b", "B")], "groups": []});
    let report = mgr.import_from_document(&doc, false).unwrap();

    assert_eq!(report.bookmarks, 1);
    assert_eq!(all_names(&mgr), vec!["B"]);
    assert!(mgr.list_all_groups().is_empty());
}

#[test]
fn test_import_with_merge_is_additive() {
    let (mut mgr, _) = setup();
    mgr.add_bookmark(loc("/docs/A"), Some("A"), None, None);

    let doc = json!({"bookmarks": [bookmark_record("b", "B")], "groups": []});
    mgr.import_from_document(&doc, true).unwrap();

    assert_eq!(all_names(&mgr), vec!["A", "B"]);
}

#[test]
fn test_import_skips_record_missing_locator() {
    let (mut mgr, _) = setup();
    let doc = json!({
        "bookmarks": [
            bookmark_record("good", "good.md"),
            {"id": "bad", "name": "bad.md", "createdAt": "2024-05-01T10:00:00.000Z"}
        ]
    });

    let report = mgr.import_from_document(&doc, false).unwrap();

    assert_eq!(report.bookmarks, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(mgr.list_all_bookmarks().len(), 1);
    assert_eq!(mgr.list_all_bookmarks()[0].id(), "good");
}

#[test]
fn test_import_nested_groups_preserves_ids_and_parents() {
    let (mut mgr, _) = setup();
    let doc = json!({
        "bookmarks": [],
        "groups": [{
            "id": "g-outer",
            "name": "outer",
            "description": "top level",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "bookmarks": [bookmark_record("b-outer", "outer.md")],
            "groups": [{
                "id": "g-inner",
                "name": "inner",
                "createdAt": "2024-01-02T00:00:00.000Z",
                "bookmarks": [bookmark_record("b-inner", "inner.md")],
                "groups": []
            }]
        }]
    });

    let report = mgr.import_from_document(&doc, false).unwrap();
    assert_eq!(report.groups, 1);

    let inner = mgr.find_group_by_id("g-inner").unwrap();
    assert_eq!(inner.parent_id(), Some("g-outer"));
    assert_eq!(mgr.parent_of("g-inner").unwrap().description(), Some("top level"));
    assert_eq!(mgr.find_bookmark_by_id("b-inner").unwrap().name(), "inner.md");
}

#[test]
fn test_import_treats_null_sections_as_empty_at_every_level() {
    let (mut mgr, _) = setup();
    let doc = json!({
        "bookmarks": null,
        "groups": [{
            "id": "g1",
            "name": "g",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "bookmarks": [bookmark_record("b1", "kept.md")],
            "groups": null
        }, {
            "id": "g2",
            "name": "empty",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "bookmarks": null
        }]
    });

    let report = mgr.import_from_document(&doc, false).unwrap();

    assert_eq!(report.groups, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(mgr.find_bookmark_by_id("b1").unwrap().name(), "kept.md");
    assert!(mgr.find_group_by_id("g1").unwrap().children().is_empty());
    assert!(mgr.find_group_by_id("g2").unwrap().is_empty());
}

#[test]
fn test_merge_drops_colliding_ids() {
    let (mut mgr, _) = setup();
    let doc = json!({
        "bookmarks": [bookmark_record("b1", "one.md")],
        "groups": [{
            "id": "g1",
            "name": "g",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "bookmarks": [bookmark_record("b2", "two.md")]
        }]
    });

    mgr.import_from_document(&doc, false).unwrap();
    let report = mgr.import_from_document(&doc, true).unwrap();

    assert_eq!(report.bookmarks, 0);
    assert_eq!(report.groups, 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(mgr.list_all_bookmarks().len(), 2);
    assert_eq!(mgr.list_all_groups().len(), 1);
}

#[test]
fn test_import_rejects_non_object_document() {
    let (mut mgr, _) = setup();
    mgr.add_bookmark(loc("/keep.md"), None, None, None);

    for doc in [json!([1, 2, 3]), json!("text"), json!({"bookmarks": "nope"})] {
        let result = mgr.import_from_document(&doc, false);
        assert!(matches!(result, Err(BookmarkError::MalformedRecord(_))));
    }
    assert_eq!(all_names(&mgr), vec!["keep.md"]);
}

#[test]
fn test_export_document_shape() {
    let (mut mgr, _) = setup();
    let g = mgr.create_group("Group", Some("desc"), None);
    let child = mgr.create_group("Child", None, Some(&g));
    mgr.add_bookmark(loc("/root.md"), None, None, None);
    mgr.add_bookmark(loc("/child.md"), None, Some("note"), Some(&child));

    let doc = serde_json::to_value(mgr.export_to_document()).unwrap();

    assert_eq!(doc["bookmarks"].as_array().unwrap().len(), 1);
    assert_eq!(doc["bookmarks"][0]["uri"], "file:///root.md");
    assert!(doc["bookmarks"][0].get("description").is_none());
    assert!(doc["bookmarks"][0]["createdAt"].as_str().unwrap().ends_with('Z'));

    let groups = doc["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["description"], "desc");
    assert_eq!(groups[0]["groups"][0]["id"], child.as_str());
    assert_eq!(groups[0]["groups"][0]["bookmarks"][0]["description"], "note");
}

#[test]
fn test_export_then_import_reproduces_forest() {
    let (mut source, _) = setup();
    let g = source.create_group("g", None, None);
    let c = source.create_group("c", Some("nested"), Some(&g));
    source.add_bookmark(loc("/a"), Some("A"), Some("first"), None);
    source.add_bookmark(loc("/b"), None, None, Some(&c));

    let doc = serde_json::to_value(source.export_to_document()).unwrap();
    let (mut target, _) = setup();
    target.import_from_document(&doc, false).unwrap();

    assert_eq!(target.list_root_bookmarks(), source.list_root_bookmarks());
    assert_eq!(target.list_root_groups(), source.list_root_groups());
}

#[test]
fn test_file_export_and_import() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("export.json");

    let notifier = Arc::new(RecordingNotifier::default());
    let (source, _) = setup();
    let mut source = source.with_notifier(notifier.clone());
    let g = source.create_group("g", None, None);
    source.add_bookmark(loc("/in-g"), None, None, Some(&g));
    source.export_to_file(&path).unwrap();
    assert!(notifier.infos.lock().unwrap()[0].starts_with("Exported bookmarks to"));

    let (target, _) = setup();
    let mut target = target.with_notifier(notifier.clone());
    let report = target.import_from_file(&path, true).unwrap();
    assert_eq!(report.groups, 1);
    assert_eq!(target.list_root_groups(), source.list_root_groups());

    let infos = notifier.infos.lock().unwrap();
    assert_eq!(infos.len(), 2);
    assert!(infos[1].starts_with("Imported 0 bookmark(s) and 1 group(s)"));
    assert!(notifier.errors.lock().unwrap().is_empty());
}

#[test]
fn test_file_import_errors() {
    let dir = TempDir::new().unwrap();
    let (mut mgr, _) = setup();

    let missing = mgr.import_from_file(&dir.path().join("missing.json"), false);
    assert!(matches!(missing, Err(BookmarkError::ExternalOperationFailed(_))));

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "{not json").unwrap();
    let result = mgr.import_from_file(&garbage, false);
    assert!(matches!(result, Err(BookmarkError::MalformedRecord(_))));
}

#[test]
fn test_restore_loads_stored_forest() {
    let store = MemoryStore::new();
    let group_id = {
        let mut mgr = BookmarkManager::new(Box::new(store.clone()), KEY);
        let g = mgr.create_group("saved", None, None);
        mgr.add_bookmark(loc("/saved.md"), None, None, Some(&g));
        g
    };

    let mut restored = BookmarkManager::new(Box::new(store), KEY);
    let report = restored.restore();

    assert_eq!(report.groups, 1);
    let group = restored.find_group_by_id(&group_id).unwrap();
    assert_eq!(group.bookmarks()[0].name(), "saved.md");
}

#[test]
fn test_restore_missing_document_leaves_forest_empty() {
    let (mut mgr, _) = setup();
    let report = mgr.restore();
    assert_eq!(report.bookmarks + report.groups + report.skipped, 0);
    assert!(mgr.list_all_bookmarks().is_empty());
}

#[test]
fn test_restore_malformed_document_reports_and_stays_empty() {
    let store = MemoryStore::new();
    store.set(KEY, &json!("this is not a forest")).unwrap();
    let notifier = Arc::new(RecordingNotifier::default());

    let mut mgr = BookmarkManager::new(Box::new(store.clone()), KEY)
        .with_notifier(notifier.clone());
    mgr.restore();

    assert!(mgr.list_all_bookmarks().is_empty());
    assert!(mgr.list_all_groups().is_empty());
    assert_eq!(notifier.errors.lock().unwrap().len(), 1);
    // Restore never overwrites what it could not read.
    assert_eq!(store.get(KEY).unwrap(), Some(json!("this is not a forest")));
}
