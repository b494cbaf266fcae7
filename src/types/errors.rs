use thiserror::Error;

// === StoreError ===

/// Errors reported by the bookmark tree store. These are user-visible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Node with the given ID was not found.
    #[error("Bookmark not found: {0}")]
    NotFound(String),
    /// The destination parent does not exist.
    #[error("Bookmark folder not found: {0}")]
    FolderNotFound(String),
    /// The operation needs a folder but the node is a bookmark.
    #[error("Not a bookmark folder: {0}")]
    NotAFolder(String),
    /// A url was set on a folder.
    #[error("Cannot set a url on folder: {0}")]
    UrlOnFolder(String),
    /// `remove` was called on a folder that still has children.
    #[error("Bookmark folder is not empty: {0}")]
    FolderNotEmpty(String),
    /// The index is outside the destination's `0..=len` range.
    #[error("Invalid bookmark index {index} for folder {parent_id}")]
    InvalidIndex { parent_id: String, index: u32 },
    /// The root and its permanent folders cannot be modified.
    #[error("Cannot modify permanent node: {0}")]
    Permanent(String),
    /// The move would place a folder inside its own subtree.
    #[error("Cannot move {0} into its own subtree")]
    Cycle(String),
    /// Database operation failed.
    #[error("Bookmark database error: {0}")]
    DatabaseError(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

// === MoveRejection ===

/// Why the move planner refused a move without calling the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejection {
    /// The node was dropped onto itself.
    #[error("Cannot drop {0} onto itself")]
    SelfDrop(String),
    /// The destination lies inside the dragged folder's subtree.
    #[error("Cannot move folder {folder_id} into its descendant {target_id}")]
    DescendantCycle { folder_id: String, target_id: String },
    /// The target has no parent to reorder within.
    #[error("Cannot reorder relative to the root: {0}")]
    RootReorder(String),
    /// An `enter` drop was aimed at a bookmark.
    #[error("Cannot drop into a bookmark: {0}")]
    NotAFolder(String),
    /// The ancestry lookup failed, so the move was refused.
    #[error("Cannot determine ancestry of {id}: {reason}")]
    AncestryUnknown { id: String, reason: String },
    /// The parent chain was longer than the supported tree depth.
    #[error("Bookmark tree deeper than {0} levels")]
    DepthExceeded(usize),
    /// A source or target carried a position no stored node can have.
    #[error("Invalid position {index} for {id}")]
    InvalidPosition { id: String, index: u32 },
}

impl MoveRejection {
    /// Whether the rejection is just "not a legal drop" and should not be
    /// shown to the user.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            MoveRejection::SelfDrop(_)
                | MoveRejection::DescendantCycle { .. }
                | MoveRejection::RootReorder(_)
                | MoveRejection::NotAFolder(_)
        )
    }
}

// === AncestryError ===

/// Failure to walk a node's parent chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AncestryError {
    /// A node in the chain could not be fetched.
    #[error("Ancestry lookup failed: {0}")]
    Lookup(#[from] StoreError),
    /// The walk exceeded the maximum supported tree depth.
    #[error("Bookmark tree deeper than {0} levels")]
    DepthExceeded(usize),
}

// === PayloadError ===

/// Errors decoding the drag transfer payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// The transfer channel carried no data.
    #[error("Drag payload is empty")]
    Empty,
    /// The payload is not a valid tagged record.
    #[error("Malformed drag payload: {0}")]
    Malformed(String),
    /// A required field is missing or blank.
    #[error("Drag payload missing field: {0}")]
    MissingField(&'static str),
    /// `isFolder` disagrees with the presence of a url.
    #[error("Drag payload kind mismatch for node: {0}")]
    KindMismatch(String),
    /// `index` is beyond any position the store hands out.
    #[error("Drag payload index out of range: {0}")]
    IndexOutOfRange(u32),
}

// === DragError ===

/// Errors driving the drag session state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DragError {
    /// A drag started while another one was still in progress.
    #[error("Drag already in progress for node: {0}")]
    AlreadyDragging(String),
    /// The payload could not be decoded; the session was aborted.
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
