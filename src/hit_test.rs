#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::geometry::Aabb;
use crate::shape::{
    CalloutShape, CircleShape, DimensionShape, EllipseShape, MarkerShape, Orientation, PathShape, PolygonShape,
    RectShape, StarShape, TailDirection, TextShape,
};

// =============================================================
// Helpers
// =============================================================

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn rect(x: f64, y: f64, w: f64, h: f64) -> Layer {
    Layer::new(Shape::Rectangle(RectShape { x, y, width: w, height: h }))
}

fn line(x1: f64, y1: f64, x2: f64, y2: f64, arrow: bool) -> Layer {
    let shape = LineShape { x1, y1, x2, y2, control_x: None, control_y: None, orientation: Orientation::Free };
    Layer::new(if arrow { Shape::Arrow(shape) } else { Shape::Line(shape) })
}

fn callout() -> Layer {
    Layer::new(Shape::Callout(CalloutShape {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 60.0,
        tail_tip_x: None,
        tail_tip_y: None,
        tail_direction: TailDirection::Bottom,
        tail_position: None,
        tail_size: None,
    }))
}

fn path(points: &[(f64, f64)], closed: bool) -> Layer {
    Layer::new(Shape::Path(PathShape { points: points.iter().map(|&(x, y)| pt(x, y)).collect(), closed }))
}

fn handles(layer: &Layer) -> Vec<Handle> {
    selection_handles(layer, 1.0, &EngineConfig::default()).into_iter().map(|hp| hp.handle).collect()
}

fn handle_at(layer: &Layer, handle: Handle) -> Point {
    selection_handles(layer, 1.0, &EngineConfig::default())
        .into_iter()
        .find(|hp| hp.handle == handle)
        .map(|hp| hp.point)
        .unwrap()
}

// =============================================================
// Handle tokens
// =============================================================

#[test]
fn handle_tokens_round_trip() {
    for handle in Handle::COMPASS.into_iter().chain([Handle::Rotate, Handle::Control, Handle::TailTip]) {
        assert_eq!(Handle::from_token(handle.as_str()), Some(handle));
    }
    assert_eq!(Handle::from_token("north"), None);
}

#[test]
fn handle_serializes_as_token() {
    assert_eq!(serde_json::to_string(&Handle::TailTip).unwrap(), "\"tailTip\"");
    assert_eq!(serde_json::to_string(&Handle::Nw).unwrap(), "\"nw\"");
}

#[test]
fn opposite_anchor_mirrors_box_position() {
    assert_eq!(Handle::Se.box_position(), Some((1.0, 1.0)));
    assert_eq!(Handle::Se.opposite_anchor(), Some((0.0, 0.0)));
    assert_eq!(Handle::N.opposite_anchor(), Some((0.5, 1.0)));
    assert_eq!(Handle::Rotate.opposite_anchor(), None);
}

// =============================================================
// Selection handles
// =============================================================

#[test]
fn box_handles_in_priority_order() {
    let order = handles(&rect(0.0, 0.0, 100.0, 50.0));
    assert_eq!(order[0], Handle::Rotate);
    assert_eq!(&order[1..5], &[Handle::Nw, Handle::Ne, Handle::Se, Handle::Sw]);
    assert_eq!(order.len(), 9);
}

#[test]
fn rotate_handle_sits_above_top_edge() {
    let layer = rect(0.0, 0.0, 100.0, 50.0);
    assert_eq!(handle_at(&layer, Handle::Rotate), pt(50.0, -24.0));
    // At 2x zoom the offset halves in logical space.
    let zoomed = selection_handles(&layer, 2.0, &EngineConfig::default());
    assert_eq!(zoomed[0].point, pt(50.0, -12.0));
}

#[test]
fn handles_follow_rotation() {
    let layer = rect(0.0, 0.0, 100.0, 50.0).with_rotation(90.0);
    let se = handle_at(&layer, Handle::Se);
    assert!(approx_eq(se.x, 25.0) && approx_eq(se.y, 75.0), "{se:?}");
}

#[test]
fn callout_adds_tail_tip_handle() {
    let layer = callout();
    assert_eq!(handles(&layer)[1], Handle::TailTip);
    assert_eq!(handle_at(&layer, Handle::TailTip), pt(50.0, 80.0));
}

#[test]
fn line_handles_have_no_rotate() {
    let order = handles(&line(0.0, 0.0, 100.0, 0.0, false));
    assert_eq!(order, vec![Handle::W, Handle::E, Handle::N, Handle::S]);
    let layer = line(0.0, 0.0, 100.0, 0.0, false);
    assert_eq!(handle_at(&layer, Handle::N), pt(50.0, -12.0));
    assert_eq!(handle_at(&layer, Handle::S), pt(50.0, 12.0));
}

#[test]
fn arrow_control_handle_comes_first() {
    let layer = line(0.0, 0.0, 100.0, 0.0, true);
    assert_eq!(handles(&layer)[0], Handle::Control);
    assert_eq!(handle_at(&layer, Handle::Control), pt(50.0, 0.0));
}

#[test]
fn dimension_shows_endpoint_and_side_handles() {
    let layer = Layer::new(Shape::Dimension(DimensionShape {
        x1: 0.0,
        y1: 0.0,
        x2: 100.0,
        y2: 0.0,
        orientation: Orientation::Free,
    }));
    assert_eq!(handles(&layer), vec![Handle::W, Handle::E, Handle::N, Handle::S]);
}

#[test]
fn dimension_side_handles_sit_off_the_midpoint() {
    let layer = Layer::new(Shape::Dimension(DimensionShape {
        x1: 100.0,
        y1: 100.0,
        x2: 200.0,
        y2: 100.0,
        orientation: Orientation::Free,
    }));
    let config = EngineConfig::default();
    assert_eq!(hit_test_selection_handles(&layer, pt(150.0, 88.0), 1.0, &config), Some(Handle::N));
    assert_eq!(hit_test_selection_handles(&layer, pt(150.0, 112.0), 1.0, &config), Some(Handle::S));
    // Offset is screen-constant.
    assert_eq!(hit_test_selection_handles(&layer, pt(150.0, 94.0), 2.0, &config), Some(Handle::N));
}

#[test]
fn unknown_shape_has_no_handles() {
    assert!(handles(&Layer::new(Shape::Unknown)).is_empty());
}

#[test]
fn hit_test_handles() {
    let layer = rect(0.0, 0.0, 100.0, 50.0);
    let config = EngineConfig::default();
    assert_eq!(hit_test_selection_handles(&layer, pt(103.0, 52.0), 1.0, &config), Some(Handle::Se));
    assert_eq!(hit_test_selection_handles(&layer, pt(50.0, -22.0), 1.0, &config), Some(Handle::Rotate));
    assert_eq!(hit_test_selection_handles(&layer, pt(50.0, 1.0), 1.0, &config), Some(Handle::N));
    assert_eq!(hit_test_selection_handles(&layer, pt(50.0, 25.0), 1.0, &config), None);
}

#[test]
fn handle_tolerance_is_screen_constant() {
    let layer = rect(0.0, 0.0, 100.0, 50.0);
    let config = EngineConfig::default();
    // 6 logical units away: inside 8px at 1x, outside 8px at 2x (4 logical).
    assert_eq!(hit_test_selection_handles(&layer, pt(106.0, 50.0), 1.0, &config), Some(Handle::Se));
    assert_eq!(hit_test_selection_handles(&layer, pt(106.0, 50.0), 2.0, &config), None);
    assert_eq!(hit_test_selection_handles(&layer, pt(112.0, 50.0), 0.5, &config), Some(Handle::Se));
}

// =============================================================
// Cursors
// =============================================================

#[test]
fn cursor_for_unrotated_handles() {
    assert_eq!(resize_cursor(Handle::N, 0.0), "ns-resize");
    assert_eq!(resize_cursor(Handle::S, 0.0), "ns-resize");
    assert_eq!(resize_cursor(Handle::E, 0.0), "ew-resize");
    assert_eq!(resize_cursor(Handle::Ne, 0.0), "nesw-resize");
    assert_eq!(resize_cursor(Handle::Se, 0.0), "nwse-resize");
}

#[test]
fn cursor_follows_rotation() {
    assert_eq!(resize_cursor(Handle::N, 90.0), "ew-resize");
    assert_eq!(resize_cursor(Handle::N, 45.0), "nesw-resize");
    assert_eq!(resize_cursor(Handle::E, -90.0), "ns-resize");
}

#[test]
fn cursor_for_special_handles() {
    assert_eq!(resize_cursor(Handle::Rotate, 0.0), "grab");
    assert_eq!(resize_cursor(Handle::Control, 0.0), "crosshair");
    assert_eq!(resize_cursor(Handle::TailTip, 30.0), "crosshair");
}

// =============================================================
// Point in layer
// =============================================================

#[test]
fn rotated_rect_unrotates_point() {
    let layer = rect(0.0, 0.0, 100.0, 100.0).with_rotation(45.0);
    assert!(is_point_in_layer(&layer, pt(50.0, 50.0), 0.0));
    assert!(!is_point_in_layer(&layer, pt(95.0, 5.0), 0.0));
    assert!(is_point_in_layer(&layer, pt(50.0, -15.0), 0.0));
}

#[test]
fn circle_and_ellipse() {
    let circle = Layer::new(Shape::Circle(CircleShape { x: 0.0, y: 0.0, radius: 10.0 }));
    assert!(is_point_in_layer(&circle, pt(9.0, 0.0), 0.0));
    assert!(!is_point_in_layer(&circle, pt(8.0, 8.0), 0.0));

    let ellipse = Layer::new(Shape::Ellipse(EllipseShape { x: 0.0, y: 0.0, radius_x: 40.0, radius_y: 10.0 }));
    assert!(is_point_in_layer(&ellipse, pt(35.0, 0.0), 0.0));
    assert!(!is_point_in_layer(&ellipse, pt(0.0, 15.0), 0.0));
}

#[test]
fn regular_polygon_uses_edges_not_circle() {
    let hexagon = Layer::new(Shape::Polygon(PolygonShape { x: 0.0, y: 0.0, radius: 50.0, sides: 6 }));
    assert!(is_point_in_layer(&hexagon, pt(0.0, -49.0), 0.0));
    assert!(is_point_in_layer(&hexagon, pt(40.0, 0.0), 0.0));
    // Inside the circumcircle but past the flat right edge (apothem ≈ 43.3).
    assert!(!is_point_in_layer(&hexagon, pt(45.0, 0.0), 0.0));
}

#[test]
fn star_uses_its_spikes() {
    let star = Layer::new(Shape::Star(StarShape { x: 0.0, y: 0.0, radius: 50.0, sides: 5, inner_radius: Some(20.0) }));
    assert!(is_point_in_layer(&star, pt(0.0, -45.0), 0.0));
    assert!(is_point_in_layer(&star, pt(0.0, 15.0), 0.0));
    assert!(!is_point_in_layer(&star, pt(0.0, 30.0), 0.0));
}

#[test]
fn line_within_tolerance() {
    let layer = line(0.0, 0.0, 100.0, 0.0, false);
    assert!(is_point_in_layer(&layer, pt(50.0, 5.0), 6.0));
    assert!(!is_point_in_layer(&layer, pt(50.0, 7.0), 6.0));
}

#[test]
fn curved_arrow_tests_the_curve() {
    let mut layer = line(0.0, 0.0, 100.0, 0.0, true);
    layer.apply_patch(&crate::shape::LayerPatch { control_x: Some(50.0), control_y: Some(100.0), ..Default::default() });
    assert!(is_point_in_layer(&layer, pt(50.0, 48.0), 6.0));
    assert!(!is_point_in_layer(&layer, pt(50.0, 2.0), 6.0));
}

#[test]
fn closed_path_fills_open_path_does_not() {
    let triangle = [(0.0, 0.0), (100.0, 0.0), (50.0, 100.0)];
    assert!(is_point_in_layer(&path(&triangle, true), pt(50.0, 30.0), 6.0));
    assert!(!is_point_in_layer(&path(&triangle, false), pt(50.0, 30.0), 6.0));
    // Near the closing segment from (50, 100) back to (0, 0).
    assert!(is_point_in_layer(&path(&triangle, true), pt(23.0, 50.0), 6.0));
    assert!(is_point_in_layer(&path(&triangle, false), pt(50.0, 3.0), 6.0));
}

#[test]
fn callout_body_and_tail() {
    let layer = callout();
    assert!(is_point_in_layer(&layer, pt(10.0, 10.0), 0.0));
    assert!(is_point_in_layer(&layer, pt(55.0, 75.0), 0.0));
    assert!(!is_point_in_layer(&layer, pt(70.0, 75.0), 0.0));
}

#[test]
fn marker_and_text_use_boxes() {
    let marker = Layer::new(Shape::Marker(MarkerShape { x: 0.0, y: 0.0, size: None }));
    assert!(is_point_in_layer(&marker, pt(11.0, -11.0), 0.0));
    assert!(!is_point_in_layer(&marker, pt(13.0, 0.0), 0.0));

    let text = Layer::new(Shape::Text(TextShape { x: 0.0, y: 0.0, width: 0.0, height: 0.0, font_size: Some(20.0) }));
    assert!(is_point_in_layer(&text, pt(19.0, 19.0), 0.0));
    assert!(!is_point_in_layer(&text, pt(21.0, 5.0), 0.0));
}

#[test]
fn unknown_is_never_hit() {
    assert!(!is_point_in_layer(&Layer::new(Shape::Unknown), pt(0.0, 0.0), 100.0));
}

// =============================================================
// Layer picking
// =============================================================

#[test]
fn topmost_layer_wins() {
    let bottom = rect(0.0, 0.0, 100.0, 100.0);
    let top = rect(50.0, 50.0, 100.0, 100.0);
    let layers = vec![bottom.clone(), top.clone()];
    assert_eq!(get_layer_at_point(&layers, pt(75.0, 75.0), 0.0).map(|l| l.id), Some(top.id));
    assert_eq!(get_layer_at_point(&layers, pt(25.0, 25.0), 0.0).map(|l| l.id), Some(bottom.id));
    assert!(get_layer_at_point(&layers, pt(500.0, 500.0), 0.0).is_none());
}

#[test]
fn hidden_and_locked_layers_are_skipped() {
    let bottom = rect(0.0, 0.0, 100.0, 100.0);
    let mut top = rect(0.0, 0.0, 100.0, 100.0);
    top.visible = false;
    let layers = vec![bottom.clone(), top.clone()];
    assert_eq!(get_layer_at_point(&layers, pt(50.0, 50.0), 0.0).map(|l| l.id), Some(bottom.id));

    top.visible = true;
    top.locked = true;
    let layers = vec![bottom.clone(), top];
    assert_eq!(get_layer_at_point(&layers, pt(50.0, 50.0), 0.0).map(|l| l.id), Some(bottom.id));
}

// =============================================================
// Marquee
// =============================================================

#[test]
fn rects_intersect_mixed_forms() {
    let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
    let b = Aabb { left: 5.0, top: 5.0, right: 15.0, bottom: 15.0 };
    assert!(rects_intersect(&a, &b));
    assert!(rects_intersect(&b, &a));
}

#[test]
fn touching_rects_do_not_intersect() {
    let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
    let b = Bounds::new(10.0, 0.0, 10.0, 10.0);
    assert!(!rects_intersect(&a, &b));
    assert!(!rects_intersect(&b, &a));
}

#[test]
fn missing_rect_never_intersects() {
    let none: Option<Bounds> = None;
    assert!(!rects_intersect(&none, &Bounds::new(-10.0, -10.0, 20.0, 20.0)));
    assert!(!rects_intersect(&Bounds::new(-10.0, -10.0, 20.0, 20.0), &none));
}

#[test]
fn non_finite_rect_never_intersects() {
    let nan = Bounds::new(f64::NAN, 0.0, 10.0, 10.0);
    assert!(!rects_intersect(&nan, &Bounds::new(-10.0, -10.0, 20.0, 20.0)));
}

#[test]
fn marquee_rect_normalises_direction() {
    assert_eq!(marquee_rect(pt(50.0, 10.0), pt(20.0, 40.0)), Bounds::new(20.0, 10.0, 30.0, 30.0));
    assert_eq!(marquee_rect(pt(20.0, 10.0), pt(50.0, 40.0)), Bounds::new(20.0, 10.0, 30.0, 30.0));
}

#[test]
fn marquee_selects_overlapping_pickable_layers() {
    let inside = rect(10.0, 10.0, 20.0, 20.0);
    let outside = rect(200.0, 200.0, 20.0, 20.0);
    let mut hidden = rect(10.0, 10.0, 20.0, 20.0);
    hidden.visible = false;
    let layers = vec![inside.clone(), outside, hidden];
    assert_eq!(layers_in_marquee(&layers, &Bounds::new(0.0, 0.0, 50.0, 50.0)), vec![inside.id]);
}

#[test]
fn marquee_skips_layers_without_bounds() {
    let empty_path = Layer::new(Shape::Path(PathShape { points: Vec::new(), closed: false }));
    let layers = vec![empty_path];
    assert!(layers_in_marquee(&layers, &Bounds::new(-50.0, -50.0, 100.0, 100.0)).is_empty());
}

#[test]
fn marquee_uses_rotated_extent() {
    // A thin bar rotated upright reaches into a marquee above its unrotated box.
    let bar = rect(0.0, 45.0, 100.0, 10.0).with_rotation(90.0);
    let layers = vec![bar.clone()];
    assert_eq!(layers_in_marquee(&layers, &Bounds::new(45.0, 5.0, 10.0, 10.0)), vec![bar.id]);
}
