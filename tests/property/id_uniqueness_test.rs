//! Property-based tests for identifier uniqueness and removal.
//!
//! For any sequence of bookmark/group creations, every ID in the forest is
//! distinct, and removing any created bookmark makes it unfindable.

use std::collections::HashSet;

use filemarks::database::MemoryStore;
use filemarks::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use filemarks::types::locator::Locator;
use proptest::prelude::*;

/// One creation step: a bookmark or a group, optionally under an earlier group
/// (chosen by index modulo the groups created so far).
#[derive(Debug, Clone)]
enum Op {
    Bookmark { path: String, parent: Option<usize> },
    Group { name: String, parent: Option<usize> },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        ("/[a-z]{1,8}(/[a-z0-9]{1,8}){0,3}", proptest::option::of(0usize..32))
            .prop_map(|(path, parent)| Op::Bookmark { path, parent }),
        ("[A-Za-z][A-Za-z0-9 ]{0,15}", proptest::option::of(0usize..32))
            .prop_map(|(name, parent)| Op::Group { name, parent }),
    ]
}

/// Applies `ops` and returns the manager plus the IDs of created bookmarks and groups.
fn build(ops: &[Op]) -> (BookmarkManager, Vec<String>, Vec<String>) {
    let mut mgr = BookmarkManager::new(Box::new(MemoryStore::new()), "prop");
    let mut bookmarks = Vec::new();
    let mut groups: Vec<String> = Vec::new();

    for op in ops {
        match op {
            Op::Bookmark { path, parent } => {
                let target = parent
                    .filter(|_| !groups.is_empty())
                    .map(|i| groups[i % groups.len()].clone());
                let locator = Locator::parse(&format!("file://{}", path)).unwrap();
                bookmarks.push(mgr.add_bookmark(locator, None, None, target.as_deref()));
            }
            Op::Group { name, parent } => {
                let target = parent
                    .filter(|_| !groups.is_empty())
                    .map(|i| groups[i % groups.len()].clone());
                groups.push(mgr.create_group(name, None, target.as_deref()));
            }
        }
    }

    (mgr, bookmarks, groups)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_id_in_the_forest_is_unique(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let (mgr, bookmarks, groups) = build(&ops);

        let all_bookmarks = mgr.list_all_bookmarks();
        let all_groups = mgr.list_all_groups();
        prop_assert_eq!(all_bookmarks.len(), bookmarks.len());
        prop_assert_eq!(all_groups.len(), groups.len());

        let bookmark_ids: HashSet<&str> = all_bookmarks.iter().map(|b| b.id()).collect();
        let group_ids: HashSet<&str> = all_groups.iter().map(|g| g.id()).collect();
        prop_assert_eq!(bookmark_ids.len(), bookmarks.len());
        prop_assert_eq!(group_ids.len(), groups.len());

        for id in &groups {
            prop_assert!(mgr.find_group_by_id(id).is_some());
        }
    }

    #[test]
    fn removed_bookmarks_are_not_found(
        ops in proptest::collection::vec(arb_op(), 1..40),
        pick in any::<usize>(),
    ) {
        let (mut mgr, bookmarks, _) = build(&ops);
        prop_assume!(!bookmarks.is_empty());

        let victim = &bookmarks[pick % bookmarks.len()];
        prop_assert!(mgr.remove_bookmark(victim));
        prop_assert!(mgr.find_bookmark_by_id(victim).is_none());
        prop_assert_eq!(mgr.list_all_bookmarks().len(), bookmarks.len() - 1);
    }
}
