use serde::{Deserialize, Serialize};

use super::bookmark::{BookmarkNode, Placement, MAX_INDEX};
use super::errors::PayloadError;

/// How the popup lays out the current folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    /// Grid tiles are ordered left to right, list rows top to bottom.
    pub fn axis(self) -> Axis {
        match self {
            ViewMode::Grid => Axis::Horizontal,
            ViewMode::List => Axis::Vertical,
        }
    }
}

/// Primary axis along which siblings are ordered on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rendered bounding box of a drop target, in the same space as the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Extent of the box along `axis`.
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Offset of `point` from the box's start edge along `axis`.
    pub fn offset(&self, point: Point, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => point.x - self.x,
            Axis::Vertical => point.y - self.y,
        }
    }
}

/// Width of the reorder zones at both ends of a drop target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMargin {
    /// Fixed width in pixels.
    Pixels(f64),
    /// Fraction of the box's extent along the primary axis.
    Fraction(f64),
}

impl Default for EdgeMargin {
    fn default() -> Self {
        EdgeMargin::Pixels(20.0)
    }
}

impl EdgeMargin {
    /// Margin width for a box of the given extent, never more than half of it.
    pub fn width_for(self, extent: f64) -> f64 {
        let raw = match self {
            EdgeMargin::Pixels(px) => px,
            EdgeMargin::Fraction(f) => f * extent,
        };
        raw.max(0.0).min(extent / 2.0)
    }
}

/// Classified meaning of a drop over one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropIntent {
    Enter,
    Before,
    After,
}

/// Presentation label for the side of the target a reorder lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    pub fn for_intent(intent: DropIntent, axis: Axis) -> Option<Edge> {
        match (intent, axis) {
            (DropIntent::Enter, _) => None,
            (DropIntent::Before, Axis::Horizontal) => Some(Edge::Left),
            (DropIntent::After, Axis::Horizontal) => Some(Edge::Right),
            (DropIntent::Before, Axis::Vertical) => Some(Edge::Top),
            (DropIntent::After, Axis::Vertical) => Some(Edge::Bottom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Sort,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
    #[default]
    Center,
}

/// Visual feedback for one drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderHints {
    pub is_over: bool,
    pub interaction_mode: InteractionMode,
    pub drop_position: DropPosition,
    pub edge: Option<Edge>,
}

impl RenderHints {
    /// Hints for a target that is not being hovered.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn hovering(intent: DropIntent, axis: Axis) -> Self {
        let (interaction_mode, drop_position) = match intent {
            DropIntent::Enter => (InteractionMode::Move, DropPosition::Center),
            DropIntent::Before => (InteractionMode::Sort, DropPosition::Before),
            DropIntent::After => (InteractionMode::Sort, DropPosition::After),
        };
        Self {
            is_over: true,
            interaction_mode,
            drop_position,
            edge: Edge::for_intent(intent, axis),
        }
    }
}

/// Snapshot of the dragged node, written at drag start and read on every
/// later event. It is authoritative for what is being dragged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub is_folder: bool,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub index: u32,
}

/// Tagged envelope carried over the transfer channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DragTransfer {
    BookmarkNode(DragPayload),
}

impl DragPayload {
    pub fn from_node(node: &BookmarkNode) -> Self {
        Self {
            id: node.id.clone(),
            title: node.title.clone(),
            url: node.url.clone(),
            is_folder: node.is_folder(),
            parent_id: node.parent_id.clone(),
            index: node.index,
        }
    }

    /// Serializes the payload into its tagged wire form.
    pub fn encode(&self) -> Result<String, PayloadError> {
        serde_json::to_string(&DragTransfer::BookmarkNode(self.clone()))
            .map_err(|e| PayloadError::Malformed(e.to_string()))
    }

    /// Parses and validates a payload received from the transfer channel.
    pub fn decode(raw: &str) -> Result<Self, PayloadError> {
        if raw.trim().is_empty() {
            return Err(PayloadError::Empty);
        }
        let DragTransfer::BookmarkNode(payload) =
            serde_json::from_str::<DragTransfer>(raw)
                .map_err(|e| PayloadError::Malformed(e.to_string()))?;
        payload.validate()?;
        Ok(payload)
    }

    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.id.is_empty() {
            return Err(PayloadError::MissingField("id"));
        }
        if self.is_folder == self.url.is_some() {
            return Err(PayloadError::KindMismatch(self.id.clone()));
        }
        if self.index > MAX_INDEX {
            return Err(PayloadError::IndexOutOfRange(self.index));
        }
        Ok(())
    }
}

impl Placement for DragPayload {
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
        self.is_folder
    }
}

/// A rendered candidate drop target: the node it shows plus its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTarget {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub index: u32,
    pub is_folder: bool,
    pub bounds: Rect,
}

impl DropTarget {
    pub fn from_node(node: &BookmarkNode, bounds: Rect) -> Self {
        Self {
            id: node.id.clone(),
            parent_id: node.parent_id.clone(),
            index: node.index,
            is_folder: node.is_folder(),
            bounds,
        }
    }
}

impl Placement for DropTarget {
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
        self.is_folder
    }
}
