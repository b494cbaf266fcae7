//! Unit tests for move planning against the real SQLite store.
//!
//! Planned moves are executed so that the planner's no-op arithmetic is
//! checked against what the store actually does with the index.

mod support;

use markshelf::database::Database;
use markshelf::managers::bookmark_manager::TreeStore;
use markshelf::managers::node_cache::NodeCache;
use markshelf::services::ancestry_checker::AncestryChecker;
use markshelf::services::move_planner::{MovePlan, MovePlanner};
use markshelf::types::bookmark::{
    BookmarkNode, MoveDestination, BOOKMARKS_BAR_ID, MAX_INDEX, OTHER_BOOKMARKS_ID, ROOT_ID,
};
use markshelf::types::drag::{DragPayload, DropIntent, DropTarget, Rect};
use markshelf::types::errors::MoveRejection;
use support::{fetch, folder, leaf, titles, RecordingStore};

/// P = [A, B, C] in the bookmarks bar.
struct Row {
    p: BookmarkNode,
    nodes: Vec<BookmarkNode>,
}

fn seed_row(db: &Database) -> Row {
    let p = folder(db, BOOKMARKS_BAR_ID, "P");
    let nodes = ["A", "B", "C"].iter().map(|t| leaf(db, &p.id, t)).collect();
    Row { p, nodes }
}

fn payload(node: &BookmarkNode) -> DragPayload {
    DragPayload::from_node(node)
}

fn target(node: &BookmarkNode) -> DropTarget {
    DropTarget::from_node(node, Rect::new(0.0, 0.0, 100.0, 80.0))
}

#[test]
fn test_after_last_sibling_moves_to_end() {
    let db = Database::open_in_memory().unwrap();
    let row = seed_row(&db);
    let mut store = RecordingStore::new(&db);
    let (a, c) = (&row.nodes[0], &row.nodes[2]);

    let plan = MovePlanner::default()
        .plan_drop(&payload(a), &target(c), DropIntent::After, &NodeCache::new(), &store)
        .unwrap();
    assert_eq!(
        plan,
        MovePlan::Move {
            node_id: a.id.clone(),
            destination: MoveDestination::at(&row.p.id, 3),
        }
    );

    MovePlanner::execute(&plan, &mut store).unwrap();
    assert_eq!(titles(&db, &row.p.id), vec!["B", "C", "A"]);
    let indices: Vec<u32> = store.inner.get_children(&row.p.id).unwrap().iter().map(|n| n.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn test_enter_appends_to_folder() {
    let db = Database::open_in_memory().unwrap();
    let f = folder(&db, OTHER_BOOKMARKS_ID, "F");
    for t in ["X", "Y", "Z"] {
        leaf(&db, &f.id, t);
    }
    let p1 = folder(&db, BOOKMARKS_BAR_ID, "P1");
    let l = leaf(&db, &p1.id, "L");
    let mut store = RecordingStore::new(&db);

    let plan = MovePlanner::default()
        .plan_drop(&payload(&l), &target(&f), DropIntent::Enter, &NodeCache::new(), &store)
        .unwrap();
    assert_eq!(
        plan,
        MovePlan::Move {
            node_id: l.id.clone(),
            destination: MoveDestination::into_folder(&f.id),
        }
    );

    let moved = MovePlanner::execute(&plan, &mut store).unwrap().unwrap();
    assert_eq!(moved.parent_id.as_deref(), Some(f.id.as_str()));
    assert_eq!(moved.index, 3);
    // Bookmarks skip the ancestry walk entirely.
    assert_eq!(store.get_calls.get(), 0);
}

#[test]
fn test_self_drop_is_rejected_for_every_intent() {
    let db = Database::open_in_memory().unwrap();
    let row = seed_row(&db);
    let store = RecordingStore::new(&db);
    let b = &row.nodes[1];

    for intent in [DropIntent::Enter, DropIntent::Before, DropIntent::After] {
        let result = MovePlanner::default().plan_drop(&payload(b), &target(b), intent, &NodeCache::new(), &store);
        assert_eq!(result, Err(MoveRejection::SelfDrop(b.id.clone())));
    }
    assert!(store.move_calls().is_empty());
}

#[test]
fn test_enter_on_bookmark_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    let row = seed_row(&db);
    let store = RecordingStore::new(&db);

    let result = MovePlanner::default().plan_drop(
        &payload(&row.nodes[0]),
        &target(&row.nodes[1]),
        DropIntent::Enter,
        &NodeCache::new(),
        &store,
    );
    let rejection = result.unwrap_err();
    assert_eq!(rejection, MoveRejection::NotAFolder(row.nodes[1].id.clone()));
    assert!(rejection.is_silent());
}

#[test]
fn test_reorder_against_root_level_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    let row = seed_row(&db);
    let store = RecordingStore::new(&db);
    let planner = MovePlanner::default();
    let a = payload(&row.nodes[0]);

    let bar = fetch(&db, BOOKMARKS_BAR_ID);
    let result = planner.plan_drop(&a, &target(&bar), DropIntent::Before, &NodeCache::new(), &store);
    assert_eq!(result, Err(MoveRejection::RootReorder(BOOKMARKS_BAR_ID.to_string())));

    let root = fetch(&db, ROOT_ID);
    let result = planner.plan_drop(&a, &target(&root), DropIntent::After, &NodeCache::new(), &store);
    assert_eq!(result, Err(MoveRejection::RootReorder(ROOT_ID.to_string())));

    // Entering a permanent folder is an ordinary move.
    let plan = planner.plan_drop(&a, &target(&bar), DropIntent::Enter, &NodeCache::new(), &store);
    assert!(matches!(plan, Ok(MovePlan::Move { .. })));
}

#[test]
fn test_folder_into_descendant_is_rejected_silently() {
    let db = Database::open_in_memory().unwrap();
    let f1 = folder(&db, BOOKMARKS_BAR_ID, "F1");
    let f2 = folder(&db, &f1.id, "F2");
    let deep = leaf(&db, &f2.id, "Deep");
    let store = RecordingStore::new(&db);
    let planner = MovePlanner::default();

    let result = planner.plan_drop(&payload(&f1), &target(&f2), DropIntent::Enter, &NodeCache::new(), &store);
    let rejection = result.unwrap_err();
    assert_eq!(
        rejection,
        MoveRejection::DescendantCycle {
            folder_id: f1.id.clone(),
            target_id: f2.id.clone(),
        }
    );
    assert!(rejection.is_silent());

    // Reordering next to a node inside F2 is the same cycle.
    let result = planner.plan_drop(&payload(&f1), &target(&deep), DropIntent::Before, &NodeCache::new(), &store);
    assert!(matches!(result, Err(MoveRejection::DescendantCycle { .. })));
    assert!(store.move_calls().is_empty());
}

#[test]
fn test_folder_into_unrelated_folder_is_planned() {
    let db = Database::open_in_memory().unwrap();
    let f1 = folder(&db, BOOKMARKS_BAR_ID, "F1");
    folder(&db, &f1.id, "F2");
    let other = folder(&db, OTHER_BOOKMARKS_ID, "Other");
    let mut store = RecordingStore::new(&db);

    let plan = MovePlanner::default()
        .plan_drop(&payload(&f1), &target(&other), DropIntent::Enter, &NodeCache::new(), &store)
        .unwrap();
    MovePlanner::execute(&plan, &mut store).unwrap();
    assert_eq!(fetch(&db, &f1.id).parent_id.as_deref(), Some(other.id.as_str()));
}

#[test]
fn test_unknown_ancestry_fails_closed_and_is_reported() {
    let db = Database::open_in_memory().unwrap();
    let f1 = folder(&db, BOOKMARKS_BAR_ID, "F1");
    let f2 = folder(&db, OTHER_BOOKMARKS_ID, "F2");
    let mut store = RecordingStore::new(&db);
    store.fail_get_on = Some(f2.id.clone());

    let result = MovePlanner::default().plan_drop(&payload(&f1), &target(&f2), DropIntent::Enter, &NodeCache::new(), &store);
    let rejection = result.unwrap_err();
    assert!(matches!(rejection, MoveRejection::AncestryUnknown { ref id, .. } if *id == f2.id));
    assert!(!rejection.is_silent());
    assert!(store.move_calls().is_empty());
}

#[test]
fn test_depth_cap_fails_closed() {
    let db = Database::open_in_memory().unwrap();
    let f1 = folder(&db, BOOKMARKS_BAR_ID, "F1");
    let f2 = folder(&db, OTHER_BOOKMARKS_ID, "F2");
    let f3 = folder(&db, &f2.id, "F3");
    let store = RecordingStore::new(&db);

    let planner = MovePlanner::new(AncestryChecker::new(1));
    let result = planner.plan_drop(&payload(&f1), &target(&f3), DropIntent::Enter, &NodeCache::new(), &store);
    assert_eq!(result, Err(MoveRejection::DepthExceeded(1)));
}

#[test]
fn test_warm_cache_avoids_store_reads() {
    let db = Database::open_in_memory().unwrap();
    let f1 = folder(&db, BOOKMARKS_BAR_ID, "F1");
    let f2 = folder(&db, OTHER_BOOKMARKS_ID, "F2");
    let store = RecordingStore::new(&db);
    let mut cache = NodeCache::new();
    cache.index_tree(&store.get_subtree(ROOT_ID).unwrap());

    MovePlanner::default()
        .plan_drop(&payload(&f1), &target(&f2), DropIntent::Enter, &cache, &store)
        .unwrap();
    assert_eq!(store.get_calls.get(), 0);
}

/// Every before/after drop within [A, B, C]: the planner reports a no-op
/// exactly when the store would leave the order unchanged.
#[test]
fn test_no_op_detection_matches_store() {
    for source in 0..3 {
        for target_idx in 0..3 {
            if source == target_idx {
                continue;
            }
            for intent in [DropIntent::Before, DropIntent::After] {
                let db = Database::open_in_memory().unwrap();
                let row = seed_row(&db);
                let mut store = RecordingStore::new(&db);

                let plan = MovePlanner::default()
                    .plan_drop(
                        &payload(&row.nodes[source]),
                        &target(&row.nodes[target_idx]),
                        intent,
                        &NodeCache::new(),
                        &store,
                    )
                    .unwrap();
                MovePlanner::execute(&plan, &mut store).unwrap();

                let unchanged = titles(&db, &row.p.id) == vec!["A", "B", "C"];
                assert_eq!(
                    plan == MovePlan::NoOp,
                    unchanged,
                    "source {} target {} {:?}",
                    source,
                    target_idx,
                    intent
                );
                assert_eq!(store.move_calls().is_empty(), plan == MovePlan::NoOp);
            }
        }
    }
}

#[test]
fn test_relocation_defaults_to_current_parent() {
    let db = Database::open_in_memory().unwrap();
    let row = seed_row(&db);
    let store = RecordingStore::new(&db);
    let c = &row.nodes[2];

    let plan = MovePlanner::default()
        .plan_relocation(c, MoveDestination { parent_id: None, index: Some(0) }, &NodeCache::new(), &store)
        .unwrap();
    assert_eq!(
        plan,
        MovePlan::Move {
            node_id: c.id.clone(),
            destination: MoveDestination::at(&row.p.id, 0),
        }
    );

    let same_slot = MovePlanner::default()
        .plan_relocation(c, MoveDestination::at(&row.p.id, 2), &NodeCache::new(), &store)
        .unwrap();
    assert_eq!(same_slot, MovePlan::NoOp);
}

#[test]
fn test_relocation_into_itself_or_root_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    let row = seed_row(&db);
    let store = RecordingStore::new(&db);
    let planner = MovePlanner::default();

    let result = planner.plan_relocation(&row.p, MoveDestination::into_folder(&row.p.id), &NodeCache::new(), &store);
    assert_eq!(result, Err(MoveRejection::SelfDrop(row.p.id.clone())));

    let result = planner.plan_relocation(&row.nodes[0], MoveDestination::into_folder(ROOT_ID), &NodeCache::new(), &store);
    assert_eq!(result, Err(MoveRejection::RootReorder(row.nodes[0].id.clone())));
}

#[test]
fn test_execute_no_op_sends_nothing() {
    let db = Database::open_in_memory().unwrap();
    let mut store = RecordingStore::new(&db);
    assert_eq!(MovePlanner::execute(&MovePlan::NoOp, &mut store), Ok(None));
    assert!(store.move_calls().is_empty());
}

#[test]
fn test_impossible_positions_are_refused_without_overflow() {
    let db = Database::open_in_memory().unwrap();
    let row = seed_row(&db);
    let mut store = RecordingStore::new(&db);
    let (a, c) = (&row.nodes[0], &row.nodes[2]);
    let planner = MovePlanner::default();

    let mut far = target(c);
    far.index = u32::MAX;
    for intent in [DropIntent::Before, DropIntent::After] {
        let result = planner.plan_drop(&payload(a), &far, intent, &NodeCache::new(), &store);
        assert_eq!(
            result,
            Err(MoveRejection::InvalidPosition { id: c.id.clone(), index: u32::MAX })
        );
    }

    let mut stray = payload(a);
    stray.index = MAX_INDEX + 1;
    let rejection = planner
        .plan_relocation(&stray, MoveDestination::at(&row.p.id, 0), &NodeCache::new(), &store)
        .unwrap_err();
    assert!(!rejection.is_silent());

    // The largest real position still plans an "after" drop.
    far.index = MAX_INDEX;
    let plan = planner
        .plan_drop(&payload(a), &far, DropIntent::After, &NodeCache::new(), &store)
        .unwrap();
    assert_eq!(
        plan,
        MovePlan::Move {
            node_id: a.id.clone(),
            destination: MoveDestination::at(&row.p.id, MAX_INDEX + 1),
        }
    );
    assert!(MovePlanner::execute(&plan, &mut store).is_err());
    assert_eq!(titles(&db, &row.p.id), vec!["A", "B", "C"]);
}
