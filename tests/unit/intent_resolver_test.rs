//! Unit tests for drop intent classification over grid tiles and list rows.

use markshelf::services::intent_resolver::{resolve_intent, IntentResolver};
use markshelf::types::drag::{Axis, DropIntent, EdgeMargin, Point, Rect};
use rstest::rstest;

/// A 200x40 box at (100, 50).
fn tile() -> Rect {
    Rect::new(100.0, 50.0, 200.0, 40.0)
}

#[rstest]
#[case::start_margin_folder(105.0, true, DropIntent::Before)]
#[case::start_margin_leaf(105.0, false, DropIntent::Before)]
#[case::end_margin_folder(295.0, true, DropIntent::After)]
#[case::end_margin_leaf(295.0, false, DropIntent::After)]
#[case::center_folder(200.0, true, DropIntent::Enter)]
#[case::center_left_leaf(150.0, false, DropIntent::Before)]
#[case::center_right_leaf(250.0, false, DropIntent::After)]
#[case::exact_midpoint_leaf(200.0, false, DropIntent::After)]
fn test_horizontal_zones(#[case] x: f64, #[case] is_folder: bool, #[case] expected: DropIntent) {
    let resolver = IntentResolver::new(Axis::Horizontal, EdgeMargin::Pixels(20.0));
    assert_eq!(resolver.resolve(Point::new(x, 70.0), tile(), is_folder), expected);
}

#[rstest]
#[case::top(52.0, DropIntent::Before)]
#[case::middle(70.0, DropIntent::Enter)]
#[case::bottom(88.0, DropIntent::After)]
fn test_vertical_axis_uses_height(#[case] y: f64, #[case] expected: DropIntent) {
    // Height 40 with a 10px margin; x is irrelevant in list layout.
    let intent = resolve_intent(
        Point::new(105.0, y),
        tile(),
        Axis::Vertical,
        true,
        EdgeMargin::Pixels(10.0),
    );
    assert_eq!(intent, expected);
}

#[test]
fn test_box_edges_resolve_before_and_after() {
    let bounds = tile();
    for is_folder in [true, false] {
        let at_start = resolve_intent(Point::new(100.0, 70.0), bounds, Axis::Horizontal, is_folder, EdgeMargin::default());
        let at_end = resolve_intent(Point::new(300.0, 70.0), bounds, Axis::Horizontal, is_folder, EdgeMargin::default());
        assert_eq!(at_start, DropIntent::Before);
        assert_eq!(at_end, DropIntent::After);
    }
}

#[test]
fn test_pointer_outside_box_is_clamped() {
    let resolver = IntentResolver::default();
    assert_eq!(resolver.resolve(Point::new(-500.0, 0.0), tile(), true), DropIntent::Before);
    assert_eq!(resolver.resolve(Point::new(900.0, 0.0), tile(), true), DropIntent::After);
}

#[test]
fn test_fractional_margin_scales_with_extent() {
    let resolver = IntentResolver::new(Axis::Horizontal, EdgeMargin::Fraction(0.25));
    // 25% of 200px: the start zone ends at x = 150.
    assert_eq!(resolver.resolve(Point::new(149.0, 70.0), tile(), true), DropIntent::Before);
    assert_eq!(resolver.resolve(Point::new(151.0, 70.0), tile(), true), DropIntent::Enter);
    assert_eq!(resolver.resolve(Point::new(251.0, 70.0), tile(), true), DropIntent::After);
}

#[test]
fn test_margin_wider_than_box_leaves_no_center() {
    let narrow = Rect::new(0.0, 0.0, 30.0, 30.0);
    let resolver = IntentResolver::new(Axis::Horizontal, EdgeMargin::Pixels(40.0));
    assert_eq!(resolver.resolve(Point::new(10.0, 0.0), narrow, true), DropIntent::Before);
    assert_eq!(resolver.resolve(Point::new(20.0, 0.0), narrow, true), DropIntent::After);
}

#[rstest]
#[case::zero_width(0.0)]
#[case::sub_pixel(0.5)]
#[case::negative(-10.0)]
#[case::nan(f64::NAN)]
fn test_degenerate_box_degrades_by_kind(#[case] width: f64) {
    let bounds = Rect::new(10.0, 10.0, width, 40.0);
    let resolver = IntentResolver::default();
    assert_eq!(resolver.resolve(Point::new(10.0, 20.0), bounds, true), DropIntent::Enter);
    assert_eq!(resolver.resolve(Point::new(10.0, 20.0), bounds, false), DropIntent::Before);
}

#[test]
fn test_nan_pointer_is_treated_as_center() {
    let resolver = IntentResolver::default();
    let pointer = Point::new(f64::NAN, 70.0);
    assert_eq!(resolver.resolve(pointer, tile(), true), DropIntent::Enter);
    assert_eq!(resolver.resolve(pointer, tile(), false), DropIntent::After);
}
