use serde::{Deserialize, Serialize};

/// Id of the synthetic tree root. It is the only node without a parent.
pub const ROOT_ID: &str = "0";

/// Id of the permanent "Bookmarks Bar" folder.
pub const BOOKMARKS_BAR_ID: &str = "1";

/// Id of the permanent "Other Bookmarks" folder.
pub const OTHER_BOOKMARKS_ID: &str = "2";

/// Largest sibling position a node can hold. Anything above it did not come
/// from the store.
pub const MAX_INDEX: u32 = i32::MAX as u32;

/// One entry in the bookmark tree: a bookmark (leaf, has a url) or a folder.
///
/// `children` is `None` when the folder's children were not fetched together
/// with the node. A fetched folder with no children carries `Some(vec![])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub index: u32,
    pub date_added: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BookmarkNode>>,
}

impl BookmarkNode {
    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Returns a copy of this node without any nested children.
    pub fn shallow(&self) -> BookmarkNode {
        BookmarkNode {
            children: None,
            ..self.clone()
        }
    }
}

/// Parameters for creating a node. A missing `url` creates a folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDetails {
    pub parent_id: String,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
}

/// Fields to change on an existing node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookmarkChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Destination of a move: parent defaults to the current one, index to append.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDestination {
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
}

impl MoveDestination {
    pub fn into_folder(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            index: None,
        }
    }

    pub fn at(parent_id: impl Into<String>, index: u32) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            index: Some(index),
        }
    }
}

/// Position facts the move planner needs about a node, whatever carries them
/// (a fetched node, a drag payload, a rendered drop target).
pub trait Placement {
    fn node_id(&self) -> &str;
    fn parent(&self) -> Option<&str>;
    fn position(&self) -> u32;
    fn folder(&self) -> bool;
}

impl Placement for BookmarkNode {
    fn node_id(&self) -> &str {
        &self.id
    }

    fn parent(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    fn position(&self) -> u32 {
        self.index
    }

    fn folder(&self) -> bool {
        self.is_folder()
    }
}
