//! App Core for Markshelf.
//!
//! Owns the database, the node cache, settings and the drag session, and
//! wires them together: the cache is refreshed here, and only here, after
//! the store confirms a mutation.

use tracing::{debug, info, warn};

use crate::database::connection::Database;
use crate::managers::bookmark_manager::{BookmarkManager, TreeStore};
use crate::managers::drag_session::{DragSession, DropOutcome};
use crate::managers::node_cache::{ChildrenState, NodeCache};
use crate::services::ancestry_checker::AncestryChecker;
use crate::services::intent_resolver::IntentResolver;
use crate::services::move_planner::{MovePlan, MovePlanner};
use crate::services::search::SearchTracker;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::bookmark::{
    BookmarkChanges, BookmarkNode, CreateDetails, MoveDestination, ROOT_ID,
};
use crate::types::drag::{DragPayload, DropTarget, Point, RenderHints, ViewMode};
use crate::types::errors::{AncestryError, DragError, SettingsError, StoreError};

/// Central application struct.
///
/// The tree store borrows the connection, so it is created on demand via
/// [`App::store`] rather than stored.
pub struct App {
    pub db: Database,
    pub cache: NodeCache,
    pub settings_engine: SettingsEngine,
    pub session: DragSession,
    pub search: SearchTracker,
}

impl App {
    /// Opens the database at `db_path` and loads settings from the platform
    /// config directory.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open(db_path)?;
        let mut settings_engine = SettingsEngine::new(None);
        if let Err(e) = settings_engine.load() {
            warn!(error = %e, "falling back to default settings");
        }
        Ok(Self::with_parts(db, settings_engine))
    }

    pub fn with_parts(db: Database, settings_engine: SettingsEngine) -> Self {
        let mut app = Self {
            db,
            cache: NodeCache::new(),
            settings_engine,
            session: DragSession::default(),
            search: SearchTracker::new(),
        };
        app.apply_settings();
        app
    }

    pub fn store(&self) -> BookmarkManager<'_> {
        BookmarkManager::new(self.db.connection())
    }

    fn planner(&self) -> MovePlanner {
        let depth = self.settings_engine.get_settings().drag.max_tree_depth;
        MovePlanner::new(AncestryChecker::new(depth))
    }

    /// Rebuilds the drag geometry and depth bound from the current settings.
    pub fn apply_settings(&mut self) {
        let settings = self.settings_engine.get_settings();
        let resolver = IntentResolver::new(
            settings.appearance.view_mode.axis(),
            settings.drag.edge_margin,
        );
        let planner = self.planner();
        if self.session.is_idle() {
            self.session = DragSession::new(resolver, planner);
        } else {
            self.session.set_resolver(resolver);
            self.session.set_planner(planner);
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<(), SettingsError> {
        let value = serde_json::to_value(mode)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;
        self.settings_engine.set_value("appearance.view_mode", value)?;
        self.apply_settings();
        Ok(())
    }

    // ─── Loading ───

    /// Children of `folder_id`, from the cache when already fetched.
    pub fn open_folder(&mut self, folder_id: &str) -> Result<Vec<BookmarkNode>, StoreError> {
        if let ChildrenState::Loaded(children) = self.cache.children(folder_id) {
            return Ok(children.into_iter().cloned().collect());
        }
        self.refresh_folder(folder_id)
    }

    /// Refetches one folder level and replaces its cached entries.
    pub fn refresh_folder(&mut self, folder_id: &str) -> Result<Vec<BookmarkNode>, StoreError> {
        let store = self.store();
        let folder = store.get_node(folder_id)?;
        let children = store.get_children(folder_id)?;
        self.cache.insert(&folder);
        self.cache.insert_children(folder_id, &children);
        Ok(children)
    }

    /// Full-tree pass that lets ancestry checks run from the cache.
    pub fn index_tree(&mut self) -> Result<usize, StoreError> {
        let tree = self.store().get_subtree(ROOT_ID)?;
        self.cache.clear();
        self.cache.index_tree(&tree);
        Ok(self.cache.len())
    }

    pub fn breadcrumbs(&self, id: &str) -> Result<Vec<BookmarkNode>, AncestryError> {
        self.planner()
            .ancestry()
            .path_to(id, &self.cache, &self.store())
    }

    pub fn search_bookmarks(&mut self, query: &str) -> Result<Vec<BookmarkNode>, StoreError> {
        let limit = self.settings_engine.get_settings().search.max_results;
        let store = BookmarkManager::new(self.db.connection());
        let (ticket, results) = self.search.run(&store, query, limit)?;
        Ok(self.search.accept(ticket, results).unwrap_or_default())
    }

    // ─── Mutations ───

    pub fn create(&mut self, details: &CreateDetails) -> Result<BookmarkNode, StoreError> {
        let node = self.store().create(details)?;
        self.refresh_after_mutation(&[Some(details.parent_id.clone())]);
        Ok(node)
    }

    pub fn update(&mut self, id: &str, changes: &BookmarkChanges) -> Result<BookmarkNode, StoreError> {
        let node = self.store().update(id, changes)?;
        self.cache.insert(&node);
        Ok(node)
    }

    /// Removes a node; folders with children need `recursive`.
    pub fn remove(&mut self, id: &str, recursive: bool) -> Result<(), StoreError> {
        let mut store = self.store();
        let removed = if recursive {
            let subtree = store.get_subtree(id)?;
            store.remove_tree(id)?;
            subtree
        } else {
            let node = store.get_node(id)?;
            store.remove(id)?;
            node
        };
        self.cache.invalidate_tree(&removed);
        self.refresh_after_mutation(&[removed.parent_id]);
        Ok(())
    }

    /// Moves `bookmark_id` into `destination_folder_id`, at `index` or appended.
    /// Returns `true` when the node ends up at the destination.
    pub fn on_move_bookmark(
        &mut self,
        bookmark_id: &str,
        destination_folder_id: &str,
        index: Option<u32>,
    ) -> bool {
        let mut store = BookmarkManager::new(self.db.connection());
        let source = match store.get_node(bookmark_id) {
            Ok(node) => node,
            Err(e) => {
                warn!(id = bookmark_id, error = %e, "cannot move missing node");
                return false;
            }
        };
        let destination = MoveDestination {
            parent_id: Some(destination_folder_id.to_string()),
            index,
        };

        let plan = match self
            .planner()
            .plan_relocation(&source, destination, &self.cache, &store)
        {
            Ok(plan) => plan,
            Err(rejection) => {
                if rejection.is_silent() {
                    debug!(%rejection, "move suppressed");
                } else {
                    warn!(%rejection, "move refused");
                }
                return false;
            }
        };
        if plan == MovePlan::NoOp {
            return true;
        }

        match MovePlanner::execute(&plan, &mut store) {
            Ok(moved) => {
                let new_parent = moved.and_then(|node| {
                    self.cache.insert(&node);
                    node.parent_id
                });
                self.refresh_after_mutation(&[source.parent_id, new_parent]);
                true
            }
            Err(e) => {
                warn!(id = bookmark_id, error = %e, "store rejected move");
                false
            }
        }
    }

    // ─── Drag gesture ───

    pub fn drag_start(&mut self, payload: DragPayload) -> Result<(), DragError> {
        self.session.start(payload)
    }

    pub fn drag_start_from_transfer(&mut self, raw: &str) -> Result<(), DragError> {
        self.session.start_from_transfer(raw)
    }

    pub fn drag_over(&mut self, target: &DropTarget, pointer: Point) -> RenderHints {
        self.session.over(target, pointer)
    }

    pub fn drag_leave(&mut self, target_id: &str) {
        self.session.leave(target_id);
    }

    pub fn drag_end(&mut self) {
        self.session.cancel();
    }

    /// Completes the gesture. `transfer`, when given, is the raw payload from
    /// the drop event and takes precedence over the snapshot from drag start.
    pub fn drop_on(
        &mut self,
        target: &DropTarget,
        pointer: Point,
        transfer: Option<&str>,
    ) -> DropOutcome {
        let source_parent = match transfer {
            Some(raw) => DragPayload::decode(raw).ok().and_then(|p| p.parent_id),
            None => self.session.source().and_then(|p| p.parent_id.clone()),
        };

        let mut store = BookmarkManager::new(self.db.connection());
        let outcome = match transfer {
            Some(raw) => self
                .session
                .drop_with_transfer(raw, target, pointer, &self.cache, &mut store),
            None => self.session.drop_on(target, pointer, &self.cache, &mut store),
        };

        if let DropOutcome::Moved(node) = &outcome {
            info!(id = %node.id, parent = ?node.parent_id, index = node.index, "drop moved node");
            // The destination may not be loaded; keep the node's own parent link current.
            self.cache.insert(node);
            let new_parent = node.parent_id.clone();
            self.refresh_after_mutation(&[source_parent, new_parent]);
        }
        outcome
    }

    /// Refetches the given folders if they were loaded. Failures only leave
    /// the folder marked as not fetched.
    fn refresh_after_mutation(&mut self, folders: &[Option<String>]) {
        for folder_id in folders.iter().flatten() {
            if !self.cache.is_loaded(folder_id) {
                continue;
            }
            if let Err(e) = self.refresh_folder(folder_id) {
                warn!(folder = %folder_id, error = %e, "cache refresh failed");
                self.cache.invalidate_folder(folder_id);
            }
        }
    }
}
