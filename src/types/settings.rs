use serde::{Deserialize, Serialize};

use super::drag::{EdgeMargin, ViewMode};

/// Deepest parent chain the ancestry walk will follow before giving up.
pub const MAX_SUPPORTED_TREE_DEPTH: usize = 128;

/// Top-level popup settings container.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PopupSettings {
    pub appearance: AppearanceSettings,
    pub drag: DragSettings,
    pub search: SearchSettings,
}

/// Layout preferences for the folder view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppearanceSettings {
    pub view_mode: ViewMode,
}

/// Drag-and-drop tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DragSettings {
    pub edge_margin: EdgeMargin,
    pub max_tree_depth: usize,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            edge_margin: EdgeMargin::default(),
            max_tree_depth: MAX_SUPPORTED_TREE_DEPTH,
        }
    }
}

/// Search preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchSettings {
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { max_results: 100 }
    }
}
