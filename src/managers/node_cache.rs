//! Read-through cache of bookmark nodes.
//!
//! The popup paints from this cache while the store stays the source of
//! truth. A folder's child list is tracked separately from the folder node
//! itself: no list means the children were never fetched, an empty list
//! means the folder is known to be empty. Writers are the data-loading paths
//! (`App`), which refresh entries after confirmed store mutations; the drag
//! core only reads.

use std::collections::HashMap;

use tracing::trace;

use crate::types::bookmark::BookmarkNode;

/// What the cache knows about a folder's children.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildrenState<'a> {
    NotFetched,
    Loaded(Vec<&'a BookmarkNode>),
}

#[derive(Debug, Default)]
pub struct NodeCache {
    nodes: HashMap<String, BookmarkNode>,
    children: HashMap<String, Vec<String>>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a node snapshot. Nested children, when present, are indexed too
    /// and mark the node's child list as loaded.
    pub fn insert(&mut self, node: &BookmarkNode) {
        if let Some(children) = &node.children {
            self.insert_children(&node.id, children);
        }
        self.nodes.insert(node.id.clone(), node.shallow());
    }

    /// Records the complete, ordered child list of `folder_id`.
    pub fn insert_children(&mut self, folder_id: &str, children: &[BookmarkNode]) {
        let ids = children.iter().map(|child| child.id.clone()).collect();
        self.children.insert(folder_id.to_string(), ids);
        for child in children {
            self.insert(child);
        }
    }

    /// Indexes a fully fetched subtree (the slow background pass).
    pub fn index_tree(&mut self, root: &BookmarkNode) {
        self.insert(root);
        trace!(nodes = self.nodes.len(), "indexed bookmark tree");
    }

    pub fn get(&self, id: &str) -> Option<&BookmarkNode> {
        self.nodes.get(id)
    }

    /// Cached parent of `id`: `None` when the node is not cached,
    /// `Some(None)` for the root.
    pub fn parent_of(&self, id: &str) -> Option<Option<&str>> {
        self.nodes.get(id).map(|node| node.parent_id.as_deref())
    }

    pub fn children(&self, folder_id: &str) -> ChildrenState<'_> {
        match self.children.get(folder_id) {
            None => ChildrenState::NotFetched,
            Some(ids) => {
                ChildrenState::Loaded(ids.iter().filter_map(|id| self.nodes.get(id)).collect())
            }
        }
    }

    pub fn is_loaded(&self, folder_id: &str) -> bool {
        self.children.contains_key(folder_id)
    }

    /// Forgets a node and its child list.
    pub fn invalidate(&mut self, id: &str) {
        self.nodes.remove(id);
        self.children.remove(id);
    }

    /// Forgets every node in a removed subtree, nested children included.
    pub fn invalidate_tree(&mut self, root: &BookmarkNode) {
        if let Some(children) = &root.children {
            for child in children {
                self.invalidate_tree(child);
            }
        }
        self.invalidate(&root.id);
    }

    /// Marks a folder's children as not fetched, keeping the folder node.
    pub fn invalidate_folder(&mut self, folder_id: &str) {
        self.children.remove(folder_id);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.children.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
