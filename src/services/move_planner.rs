//! Move planning.
//!
//! Turns "drop source on target with intent" into at most one absolute
//! `move_node(id, {parent, index})` call. The store has no notion of
//! "after sibling X", so reorders are expressed as the target's index (or
//! index + 1) in the target's parent, in the store's pre-removal frame.

use tracing::debug;

use crate::managers::bookmark_manager::TreeStore;
use crate::managers::node_cache::NodeCache;
use crate::services::ancestry_checker::AncestryChecker;
use crate::types::bookmark::{BookmarkNode, MoveDestination, Placement, MAX_INDEX, ROOT_ID};
use crate::types::drag::DropIntent;
use crate::types::errors::{AncestryError, MoveRejection, StoreError};

/// The single store call a drop resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovePlan {
    Move {
        node_id: String,
        destination: MoveDestination,
    },
    /// The node would land in the slot it already occupies.
    NoOp,
}

fn invalid_position(node: &impl Placement) -> MoveRejection {
    MoveRejection::InvalidPosition {
        id: node.node_id().to_string(),
        index: node.position(),
    }
}

/// Position of `node`, refused when no stored node could have it.
fn checked_position(node: &impl Placement) -> Result<u32, MoveRejection> {
    match node.position() {
        index if index <= MAX_INDEX => Ok(index),
        _ => Err(invalid_position(node)),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MovePlanner {
    ancestry: AncestryChecker,
}

impl MovePlanner {
    pub fn new(ancestry: AncestryChecker) -> Self {
        Self { ancestry }
    }

    pub fn ancestry(&self) -> &AncestryChecker {
        &self.ancestry
    }

    /// Plans the drop of `source` onto `target` with the resolved `intent`.
    pub fn plan_drop<S: TreeStore + ?Sized>(
        &self,
        source: &impl Placement,
        target: &impl Placement,
        intent: DropIntent,
        cache: &NodeCache,
        store: &S,
    ) -> Result<MovePlan, MoveRejection> {
        if source.node_id() == target.node_id() {
            return Err(MoveRejection::SelfDrop(source.node_id().to_string()));
        }

        let destination = match intent {
            DropIntent::Enter => {
                if !target.folder() {
                    return Err(MoveRejection::NotAFolder(target.node_id().to_string()));
                }
                MoveDestination::into_folder(target.node_id())
            }
            DropIntent::Before | DropIntent::After => {
                let parent = match target.parent() {
                    Some(parent) if parent != ROOT_ID => parent,
                    _ => return Err(MoveRejection::RootReorder(target.node_id().to_string())),
                };
                let position = checked_position(target)?;
                let index = if intent == DropIntent::Before {
                    Some(position)
                } else {
                    position.checked_add(1)
                };
                let index = index.ok_or_else(|| invalid_position(target))?;
                MoveDestination::at(parent, index)
            }
        };

        self.plan_relocation(source, destination, cache, store)
    }

    /// Plans moving `source` to an explicit destination, applying the same
    /// self, cycle and no-op guards as a drop.
    pub fn plan_relocation<S: TreeStore + ?Sized>(
        &self,
        source: &impl Placement,
        destination: MoveDestination,
        cache: &NodeCache,
        store: &S,
    ) -> Result<MovePlan, MoveRejection> {
        let node_id = source.node_id();
        let current = checked_position(source)?;
        let parent_id = match destination.parent_id.as_deref().or(source.parent()) {
            Some(parent) if parent != ROOT_ID => parent.to_string(),
            _ => return Err(MoveRejection::RootReorder(node_id.to_string())),
        };
        if parent_id == node_id {
            return Err(MoveRejection::SelfDrop(node_id.to_string()));
        }
        if source.folder() {
            self.guard_cycle(node_id, &parent_id, cache, store)?;
        }

        if source.parent() == Some(parent_id.as_str()) {
            if let Some(index) = destination.index {
                // Pre-removal frame: both the current slot and the one right
                // after it put the node back where it is.
                if index == current || current.checked_add(1) == Some(index) {
                    debug!(id = node_id, index, "drop resolves to current position");
                    return Ok(MovePlan::NoOp);
                }
            }
        }

        Ok(MovePlan::Move {
            node_id: node_id.to_string(),
            destination: MoveDestination {
                parent_id: Some(parent_id),
                index: destination.index,
            },
        })
    }

    fn guard_cycle<S: TreeStore + ?Sized>(
        &self,
        folder_id: &str,
        parent_id: &str,
        cache: &NodeCache,
        store: &S,
    ) -> Result<(), MoveRejection> {
        match self.ancestry.is_ancestor_or_self(folder_id, parent_id, cache, store) {
            Ok(false) => Ok(()),
            Ok(true) => Err(MoveRejection::DescendantCycle {
                folder_id: folder_id.to_string(),
                target_id: parent_id.to_string(),
            }),
            Err(AncestryError::DepthExceeded(depth)) => Err(MoveRejection::DepthExceeded(depth)),
            Err(AncestryError::Lookup(err)) => Err(MoveRejection::AncestryUnknown {
                id: parent_id.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    /// Issues the planned store call. `Ok(None)` means nothing was sent.
    pub fn execute<S: TreeStore + ?Sized>(
        plan: &MovePlan,
        store: &mut S,
    ) -> Result<Option<BookmarkNode>, StoreError> {
        match plan {
            MovePlan::NoOp => Ok(None),
            MovePlan::Move {
                node_id,
                destination,
            } => store.move_node(node_id, destination).map(Some),
        }
    }
}
