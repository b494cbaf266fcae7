//! Folder ancestry checks.
//!
//! Walks parent links from the node cache, fetching single nodes from the
//! store when the cache has not indexed them yet (the popup paints from a
//! shallow first load while the full tree is still being indexed). The walk
//! is bounded by the maximum supported tree depth; longer chains are treated
//! as corrupt data and refused.

use tracing::debug;

use crate::managers::bookmark_manager::TreeStore;
use crate::managers::node_cache::NodeCache;
use crate::types::bookmark::BookmarkNode;
use crate::types::errors::{AncestryError, StoreError};
use crate::types::settings::MAX_SUPPORTED_TREE_DEPTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AncestryChecker {
    max_depth: usize,
}

impl Default for AncestryChecker {
    fn default() -> Self {
        Self::new(MAX_SUPPORTED_TREE_DEPTH)
    }
}

impl AncestryChecker {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn lookup<S: TreeStore + ?Sized>(
        &self,
        id: &str,
        cache: &NodeCache,
        store: &S,
    ) -> Result<BookmarkNode, StoreError> {
        if let Some(node) = cache.get(id) {
            return Ok(node.clone());
        }
        debug!(id, "ancestry cache miss, fetching node");
        store.get_node(id)
    }

    fn parent_of<S: TreeStore + ?Sized>(
        &self,
        id: &str,
        cache: &NodeCache,
        store: &S,
    ) -> Result<Option<String>, StoreError> {
        if let Some(parent) = cache.parent_of(id) {
            return Ok(parent.map(str::to_string));
        }
        debug!(id, "ancestry cache miss, fetching node");
        Ok(store.get_node(id)?.parent_id)
    }

    /// Whether `ancestor_id` is `descendant_id` itself or lies on its parent chain.
    pub fn is_ancestor_or_self<S: TreeStore + ?Sized>(
        &self,
        ancestor_id: &str,
        descendant_id: &str,
        cache: &NodeCache,
        store: &S,
    ) -> Result<bool, AncestryError> {
        let mut current = descendant_id.to_string();
        for _ in 0..=self.max_depth {
            if current == ancestor_id {
                return Ok(true);
            }
            match self.parent_of(&current, cache, store)? {
                Some(parent) => current = parent,
                None => return Ok(false),
            }
        }
        Err(AncestryError::DepthExceeded(self.max_depth))
    }

    /// Nodes from the root down to `id`, inclusive. Used for breadcrumbs.
    pub fn path_to<S: TreeStore + ?Sized>(
        &self,
        id: &str,
        cache: &NodeCache,
        store: &S,
    ) -> Result<Vec<BookmarkNode>, AncestryError> {
        let mut path = Vec::new();
        let mut node = self.lookup(id, cache, store)?;
        for _ in 0..=self.max_depth {
            let parent = node.parent_id.clone();
            path.push(node);
            match parent {
                Some(parent) => node = self.lookup(&parent, cache, store)?,
                None => {
                    path.reverse();
                    return Ok(path);
                }
            }
        }
        Err(AncestryError::DepthExceeded(self.max_depth))
    }
}
