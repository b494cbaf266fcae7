//! Bookmark tree store for Markshelf.
//!
//! Defines `TreeStore`, the node CRUD + absolute-position move surface the
//! drag-and-drop core targets, and `BookmarkManager`, its SQLite implementation.
//!
//! Sibling positions are kept dense (`0..n`) per parent: every mutation that
//! inserts or removes a child shifts the later siblings inside one transaction.

use rusqlite::{params, Connection, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};
use uuid::Uuid;

use crate::types::bookmark::{
    BookmarkChanges, BookmarkNode, CreateDetails, MoveDestination, ROOT_ID,
};
use crate::types::errors::StoreError;

/// Operations the bookmark tree store provides.
///
/// `move_node` interprets `destination.index` against the destination's
/// children *before* the node is taken out of its old slot, so moving a node
/// later within its own folder lands it one slot before the requested index.
pub trait TreeStore {
    fn get_node(&self, id: &str) -> Result<BookmarkNode, StoreError>;
    /// Direct children of a folder, ordered by index.
    fn get_children(&self, folder_id: &str) -> Result<Vec<BookmarkNode>, StoreError>;
    /// The node with all descendants fetched.
    fn get_subtree(&self, id: &str) -> Result<BookmarkNode, StoreError>;
    fn search(&self, query: &str, limit: usize) -> Result<Vec<BookmarkNode>, StoreError>;
    fn create(&mut self, details: &CreateDetails) -> Result<BookmarkNode, StoreError>;
    fn update(&mut self, id: &str, changes: &BookmarkChanges) -> Result<BookmarkNode, StoreError>;
    /// Removes a bookmark or an empty folder.
    fn remove(&mut self, id: &str) -> Result<(), StoreError>;
    /// Removes a folder and everything beneath it.
    fn remove_tree(&mut self, id: &str) -> Result<(), StoreError>;
    fn move_node(&mut self, id: &str, destination: &MoveDestination) -> Result<BookmarkNode, StoreError>;
}

const NODE_COLUMNS: &str = "id, parent_id, title, url, position, date_added";

/// Makes `%`, `_` and `\` match literally under `LIKE ... ESCAPE '\'`.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Tree store backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
}

impl<'a> BookmarkManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Current time in milliseconds since the UNIX epoch.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    fn row_to_node(row: &rusqlite::Row) -> rusqlite::Result<BookmarkNode> {
        Ok(BookmarkNode {
            id: row.get(0)?,
            parent_id: row.get(1)?,
            title: row.get(2)?,
            url: row.get(3)?,
            index: row.get(4)?,
            date_added: row.get(5)?,
            children: None,
        })
    }

    fn find_node(&self, id: &str) -> Result<Option<BookmarkNode>, StoreError> {
        let node = self
            .conn
            .query_row(
                &format!("SELECT {NODE_COLUMNS} FROM bookmark_nodes WHERE id = ?1"),
                params![id],
                Self::row_to_node,
            )
            .optional()?;
        Ok(node)
    }

    fn require_folder(&self, id: &str) -> Result<BookmarkNode, StoreError> {
        match self.find_node(id)? {
            None => Err(StoreError::FolderNotFound(id.to_string())),
            Some(node) if !node.is_folder() => Err(StoreError::NotAFolder(id.to_string())),
            Some(node) => Ok(node),
        }
    }

    /// The root and its direct children are fixed.
    fn is_permanent(node: &BookmarkNode) -> bool {
        match node.parent_id.as_deref() {
            None => true,
            Some(parent) => parent == ROOT_ID,
        }
    }

    fn child_count(&self, parent_id: &str) -> Result<u32, StoreError> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM bookmark_nodes WHERE parent_id = ?1",
            params![parent_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn list_children(&self, parent_id: &str) -> Result<Vec<BookmarkNode>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {NODE_COLUMNS} FROM bookmark_nodes WHERE parent_id = ?1 ORDER BY position"
        ))?;
        let rows = stmt.query_map(params![parent_id], Self::row_to_node)?;

        let mut children = Vec::new();
        for row in rows {
            children.push(row?);
        }
        Ok(children)
    }

    /// Whether `ancestor_id` is `id` itself or one of its ancestors.
    fn is_within(&self, ancestor_id: &str, id: &str) -> Result<bool, StoreError> {
        let hits: i64 = self.conn.query_row(
            "WITH RECURSIVE chain(id, parent_id) AS (
                 SELECT id, parent_id FROM bookmark_nodes WHERE id = ?1
                 UNION
                 SELECT n.id, n.parent_id FROM bookmark_nodes n JOIN chain c ON n.id = c.parent_id
             )
             SELECT COUNT(*) FROM chain WHERE id = ?2",
            params![id, ancestor_id],
            |row| row.get(0),
        )?;
        Ok(hits > 0)
    }

    fn fill_children(&self, node: &mut BookmarkNode) -> Result<(), StoreError> {
        if !node.is_folder() {
            return Ok(());
        }
        let mut children = self.list_children(&node.id)?;
        for child in children.iter_mut() {
            self.fill_children(child)?;
        }
        node.children = Some(children);
        Ok(())
    }
}

impl<'a> TreeStore for BookmarkManager<'a> {
    fn get_node(&self, id: &str) -> Result<BookmarkNode, StoreError> {
        self.find_node(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn get_children(&self, folder_id: &str) -> Result<Vec<BookmarkNode>, StoreError> {
        let folder = self.get_node(folder_id)?;
        if !folder.is_folder() {
            return Err(StoreError::NotAFolder(folder_id.to_string()));
        }
        self.list_children(folder_id)
    }

    fn get_subtree(&self, id: &str) -> Result<BookmarkNode, StoreError> {
        let mut node = self.get_node(id)?;
        self.fill_children(&mut node)?;
        Ok(node)
    }

    /// Matches title or url by substring, bookmarks and folders alike.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<BookmarkNode>, StoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like(query));
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {NODE_COLUMNS} FROM bookmark_nodes \
             WHERE parent_id IS NOT NULL \
               AND (title LIKE ?1 ESCAPE '\\' OR url LIKE ?1 ESCAPE '\\') \
             ORDER BY title COLLATE NOCASE, id LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![pattern, limit as i64], Self::row_to_node)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn create(&mut self, details: &CreateDetails) -> Result<BookmarkNode, StoreError> {
        let parent = self.require_folder(&details.parent_id)?;
        if parent.is_root() {
            return Err(StoreError::Permanent(parent.id));
        }

        let count = self.child_count(&parent.id)?;
        let index = match details.index {
            Some(index) if index > count => {
                return Err(StoreError::InvalidIndex {
                    parent_id: parent.id,
                    index,
                })
            }
            Some(index) => index,
            None => count,
        };

        let node = BookmarkNode {
            id: Uuid::new_v4().to_string(),
            parent_id: Some(parent.id.clone()),
            title: details.title.clone(),
            url: details.url.clone(),
            index,
            date_added: Self::now(),
            children: None,
        };

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE bookmark_nodes SET position = position + 1 WHERE parent_id = ?1 AND position >= ?2",
            params![parent.id, index],
        )?;
        tx.execute(
            "INSERT INTO bookmark_nodes (id, parent_id, title, url, position, date_added) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![node.id, node.parent_id, node.title, node.url, node.index, node.date_added],
        )?;
        tx.commit()?;

        debug!(id = %node.id, parent = %parent.id, index, "created bookmark node");
        Ok(node)
    }

    fn update(&mut self, id: &str, changes: &BookmarkChanges) -> Result<BookmarkNode, StoreError> {
        let node = self.get_node(id)?;
        if Self::is_permanent(&node) {
            return Err(StoreError::Permanent(node.id));
        }
        if changes.url.is_some() && node.is_folder() {
            return Err(StoreError::UrlOnFolder(node.id));
        }

        let title = changes.title.clone().unwrap_or_else(|| node.title.clone());
        let url = changes.url.clone().or_else(|| node.url.clone());
        self.conn.execute(
            "UPDATE bookmark_nodes SET title = ?1, url = ?2 WHERE id = ?3",
            params![title, url, id],
        )?;

        debug!(id, "updated bookmark node");
        Ok(BookmarkNode { title, url, ..node })
    }

    fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let node = self.get_node(id)?;
        if Self::is_permanent(&node) {
            return Err(StoreError::Permanent(node.id));
        }
        if node.is_folder() && self.child_count(id)? > 0 {
            return Err(StoreError::FolderNotEmpty(node.id));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM bookmark_nodes WHERE id = ?1", params![id])?;
        tx.execute(
            "UPDATE bookmark_nodes SET position = position - 1 WHERE parent_id = ?1 AND position > ?2",
            params![node.parent_id, node.index],
        )?;
        tx.commit()?;

        debug!(id, "removed bookmark node");
        Ok(())
    }

    fn remove_tree(&mut self, id: &str) -> Result<(), StoreError> {
        let node = self.get_node(id)?;
        if Self::is_permanent(&node) {
            return Err(StoreError::Permanent(node.id));
        }
        if !node.is_folder() {
            return Err(StoreError::NotAFolder(node.id));
        }

        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            "WITH RECURSIVE subtree(id) AS (
                 SELECT ?1
                 UNION
                 SELECT n.id FROM bookmark_nodes n JOIN subtree s ON n.parent_id = s.id
             )
             DELETE FROM bookmark_nodes WHERE id IN (SELECT id FROM subtree)",
            params![id],
        )?;
        tx.execute(
            "UPDATE bookmark_nodes SET position = position - 1 WHERE parent_id = ?1 AND position > ?2",
            params![node.parent_id, node.index],
        )?;
        tx.commit()?;

        debug!(id, removed, "removed bookmark subtree");
        Ok(())
    }

    fn move_node(&mut self, id: &str, destination: &MoveDestination) -> Result<BookmarkNode, StoreError> {
        let node = self.get_node(id)?;
        if Self::is_permanent(&node) {
            return Err(StoreError::Permanent(node.id));
        }
        let old_parent = node.parent_id.clone().unwrap_or_default();
        let new_parent = destination
            .parent_id
            .clone()
            .unwrap_or_else(|| old_parent.clone());

        let parent = self.require_folder(&new_parent)?;
        if parent.is_root() {
            return Err(StoreError::Permanent(parent.id));
        }
        if node.is_folder() && self.is_within(&node.id, &new_parent)? {
            return Err(StoreError::Cycle(node.id));
        }

        let same_parent = new_parent == old_parent;
        let count = self.child_count(&new_parent)?;
        let target = match destination.index {
            Some(index) if index > count => {
                return Err(StoreError::InvalidIndex {
                    parent_id: new_parent,
                    index,
                })
            }
            Some(index) if same_parent && index > node.index => index - 1,
            Some(index) => index,
            None if same_parent => count.saturating_sub(1),
            None => count,
        };

        if same_parent && target == node.index {
            debug!(id, index = target, "move leaves node in place");
            return Ok(node);
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE bookmark_nodes SET position = position - 1 \
             WHERE parent_id = ?1 AND position > ?2 AND id != ?3",
            params![old_parent, node.index, id],
        )?;
        tx.execute(
            "UPDATE bookmark_nodes SET position = position + 1 \
             WHERE parent_id = ?1 AND position >= ?2 AND id != ?3",
            params![new_parent, target, id],
        )?;
        tx.execute(
            "UPDATE bookmark_nodes SET parent_id = ?1, position = ?2 WHERE id = ?3",
            params![new_parent, target, id],
        )?;
        tx.commit()?;

        info!(id, from = %old_parent, to = %new_parent, index = target, "moved bookmark node");
        Ok(BookmarkNode {
            parent_id: Some(new_parent),
            index: target,
            ..node
        })
    }
}
