// Markshelf state managers
// Managers own state: the bookmark tree store, the node cache, the drag session.

pub mod bookmark_manager;
pub mod drag_session;
pub mod node_cache;
