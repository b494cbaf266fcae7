//! Drag session state machine.
//!
//! Tracks one drag gesture from start to drop or cancel across any number of
//! enter/over/leave events on any number of targets. Hover events only
//! update the highlighted target; the drop is the single event that may
//! reach the store, and every drop or cancel leaves the session idle.

use tracing::{debug, trace, warn};

use crate::managers::bookmark_manager::TreeStore;
use crate::managers::node_cache::NodeCache;
use crate::services::intent_resolver::IntentResolver;
use crate::services::move_planner::{MovePlan, MovePlanner};
use crate::types::bookmark::BookmarkNode;
use crate::types::drag::{DragPayload, DropIntent, DropTarget, Point, RenderHints};
use crate::types::errors::{DragError, MoveRejection, PayloadError, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        source: DragPayload,
    },
    Hovering {
        source: DragPayload,
        target_id: String,
        intent: DropIntent,
    },
}

/// The terminal result of one drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// The store moved the node.
    Moved(BookmarkNode),
    /// The drop put the node back in its own slot; no store call was made.
    Unchanged,
    /// The planner refused the drop; no store call was made.
    Rejected(MoveRejection),
    /// The store refused the move.
    Failed(StoreError),
    /// The drop carried an unreadable payload; the gesture ended without a move.
    Aborted(PayloadError),
    /// No drag was active.
    Ignored,
}

impl DropOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, DropOutcome::Moved(_))
    }

    /// Message to show the user, if this outcome warrants one.
    pub fn notification(&self) -> Option<String> {
        match self {
            DropOutcome::Failed(err) => Some(err.to_string()),
            DropOutcome::Rejected(rejection) if !rejection.is_silent() => {
                Some(rejection.to_string())
            }
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct DragSession {
    state: DragState,
    resolver: IntentResolver,
    planner: MovePlanner,
}

impl DragSession {
    pub fn new(resolver: IntentResolver, planner: MovePlanner) -> Self {
        Self {
            state: DragState::Idle,
            resolver,
            planner,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DragState::Idle
    }

    pub fn source(&self) -> Option<&DragPayload> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { source } | DragState::Hovering { source, .. } => Some(source),
        }
    }

    pub fn resolver(&self) -> &IntentResolver {
        &self.resolver
    }

    /// Swaps the layout geometry, e.g. after switching between grid and list.
    pub fn set_resolver(&mut self, resolver: IntentResolver) {
        self.resolver = resolver;
    }

    /// Swaps the planner, e.g. after the depth bound changed.
    pub fn set_planner(&mut self, planner: MovePlanner) {
        self.planner = planner;
    }

    pub fn planner(&self) -> &MovePlanner {
        &self.planner
    }

    /// `dragstart`: captures the dragged node's snapshot.
    pub fn start(&mut self, payload: DragPayload) -> Result<(), DragError> {
        if let Some(active) = self.source() {
            return Err(DragError::AlreadyDragging(active.id.clone()));
        }
        payload.validate()?;
        debug!(id = %payload.id, parent = ?payload.parent_id, index = payload.index, "drag started");
        self.state = DragState::Dragging { source: payload };
        Ok(())
    }

    /// `dragstart` fed straight from the transfer channel.
    pub fn start_from_transfer(&mut self, raw: &str) -> Result<(), DragError> {
        let payload = DragPayload::decode(raw)?;
        self.start(payload)
    }

    /// `dragenter`: same handling as `dragover`.
    pub fn enter(&mut self, target: &DropTarget, pointer: Point) -> RenderHints {
        self.over(target, pointer)
    }

    /// `dragover`: re-resolves the intent for `target` and returns its hints.
    pub fn over(&mut self, target: &DropTarget, pointer: Point) -> RenderHints {
        let Some(source) = self.source().cloned() else {
            return RenderHints::idle();
        };
        if source.id == target.id {
            self.state = DragState::Dragging { source };
            return RenderHints::idle();
        }

        let intent = self.resolver.resolve(pointer, target.bounds, target.is_folder);
        trace!(source = %source.id, target = %target.id, ?intent, "drag over");
        self.state = DragState::Hovering {
            source,
            target_id: target.id.clone(),
            intent,
        };
        RenderHints::hovering(intent, self.resolver.axis)
    }

    /// `dragleave`: drops the highlight if it belongs to `target_id`.
    pub fn leave(&mut self, target_id: &str) {
        if let DragState::Hovering {
            source,
            target_id: current,
            ..
        } = &self.state
        {
            if current == target_id {
                self.state = DragState::Dragging {
                    source: source.clone(),
                };
            }
        }
    }

    /// Hints for rendering `target_id` in the current state.
    pub fn hints(&self, target_id: &str) -> RenderHints {
        match &self.state {
            DragState::Hovering {
                target_id: current,
                intent,
                ..
            } if current == target_id => RenderHints::hovering(*intent, self.resolver.axis),
            _ => RenderHints::idle(),
        }
    }

    /// `dragend` without a drop, or an aborted drag.
    pub fn cancel(&mut self) {
        if let Some(source) = self.source() {
            debug!(id = %source.id, "drag cancelled");
        }
        self.state = DragState::Idle;
    }

    /// `drop` using the snapshot captured at drag start.
    pub fn drop_on<S: TreeStore + ?Sized>(
        &mut self,
        target: &DropTarget,
        pointer: Point,
        cache: &NodeCache,
        store: &mut S,
    ) -> DropOutcome {
        // Idle before planning, whatever happens next.
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        let source = match state {
            DragState::Idle => {
                debug!(target = %target.id, "drop without an active drag");
                return DropOutcome::Ignored;
            }
            DragState::Dragging { source } | DragState::Hovering { source, .. } => source,
        };
        self.complete(&source, target, pointer, cache, store)
    }

    /// `drop` carrying the raw transfer payload, which overrides the snapshot.
    pub fn drop_with_transfer<S: TreeStore + ?Sized>(
        &mut self,
        raw: &str,
        target: &DropTarget,
        pointer: Point,
        cache: &NodeCache,
        store: &mut S,
    ) -> DropOutcome {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        if state == DragState::Idle {
            debug!(target = %target.id, "drop without an active drag");
            return DropOutcome::Ignored;
        }
        match DragPayload::decode(raw) {
            Ok(source) => self.complete(&source, target, pointer, cache, store),
            Err(err) => {
                warn!(error = %err, "aborting drag with unreadable payload");
                DropOutcome::Aborted(err)
            }
        }
    }

    fn complete<S: TreeStore + ?Sized>(
        &self,
        source: &DragPayload,
        target: &DropTarget,
        pointer: Point,
        cache: &NodeCache,
        store: &mut S,
    ) -> DropOutcome {
        let intent = self.resolver.resolve(pointer, target.bounds, target.is_folder);
        let plan = match self.planner.plan_drop(source, target, intent, cache, &*store) {
            Ok(plan) => plan,
            Err(rejection) => {
                if rejection.is_silent() {
                    debug!(%rejection, "drop suppressed");
                } else {
                    warn!(%rejection, "drop refused");
                }
                return DropOutcome::Rejected(rejection);
            }
        };
        if plan == MovePlan::NoOp {
            return DropOutcome::Unchanged;
        }

        match MovePlanner::execute(&plan, store) {
            Ok(Some(node)) => DropOutcome::Moved(node),
            Ok(None) => DropOutcome::Unchanged,
            Err(err) => {
                warn!(id = %source.id, error = %err, "store rejected move");
                DropOutcome::Failed(err)
            }
        }
    }
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new(IntentResolver::default(), MovePlanner::default())
    }
}
