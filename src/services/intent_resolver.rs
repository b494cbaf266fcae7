//! Drop intent classification.
//!
//! Maps a pointer position over one candidate target to enter / before /
//! after. Pure geometry over the layout's primary axis; it keeps no state
//! and is recomputed on every drag-over.

use crate::types::drag::{Axis, DropIntent, EdgeMargin, Point, Rect};

/// Targets thinner than this along the primary axis have no usable zones.
pub const MIN_TARGET_EXTENT: f64 = 1.0;

/// Resolver configured for one layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntentResolver {
    pub axis: Axis,
    pub margin: EdgeMargin,
}

impl IntentResolver {
    pub fn new(axis: Axis, margin: EdgeMargin) -> Self {
        Self { axis, margin }
    }

    pub fn resolve(&self, pointer: Point, bounds: Rect, is_folder: bool) -> DropIntent {
        resolve_intent(pointer, bounds, self.axis, is_folder, self.margin)
    }
}

impl Default for IntentResolver {
    fn default() -> Self {
        Self::new(Axis::Horizontal, EdgeMargin::default())
    }
}

/// Classifies the drop intent for `pointer` over a target box.
///
/// The start margin yields `Before`, the end margin `After`. The center zone
/// yields `Enter` for folders; bookmarks cannot be entered, so there the
/// nearer half decides between `Before` and `After`.
pub fn resolve_intent(
    pointer: Point,
    bounds: Rect,
    axis: Axis,
    is_folder: bool,
    margin: EdgeMargin,
) -> DropIntent {
    let extent = bounds.extent(axis);
    // Also catches NaN extents.
    if !(extent >= MIN_TARGET_EXTENT) {
        return if is_folder {
            DropIntent::Enter
        } else {
            DropIntent::Before
        };
    }

    let raw = bounds.offset(pointer, axis);
    let offset = if raw.is_nan() {
        extent / 2.0
    } else {
        raw.clamp(0.0, extent)
    };
    let edge = margin.width_for(extent);

    if offset < edge {
        DropIntent::Before
    } else if offset > extent - edge {
        DropIntent::After
    } else if is_folder {
        DropIntent::Enter
    } else if offset < extent / 2.0 {
        DropIntent::Before
    } else {
        DropIntent::After
    }
}
