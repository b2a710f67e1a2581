#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use serde_json::json;
use uuid::Uuid;

use super::*;

fn rect(x: f64, y: f64, w: f64, h: f64) -> Layer {
    Layer::new(Shape::Rectangle(RectShape { x, y, width: w, height: h }))
}

fn callout(direction: TailDirection) -> CalloutShape {
    CalloutShape {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 60.0,
        tail_tip_x: None,
        tail_tip_y: None,
        tail_direction: direction,
        tail_position: None,
        tail_size: None,
    }
}

// =============================================================
// Deserialization
// =============================================================

#[test]
fn rectangle_from_json() {
    let layer = Layer::from_json(r#"{"type":"rectangle","x":10,"y":20,"width":100,"height":50}"#).unwrap();
    assert_eq!(layer.shape, Shape::Rectangle(RectShape { x: 10.0, y: 20.0, width: 100.0, height: 50.0 }));
    assert_eq!(layer.rotation, 0.0);
    assert!(layer.visible);
    assert!(!layer.locked);
}

#[test]
fn explicit_id_is_kept() {
    let id = Uuid::new_v4();
    let text = json!({ "id": id, "type": "circle", "x": 0, "y": 0, "radius": 10 }).to_string();
    let layer = Layer::from_json(&text).unwrap();
    assert_eq!(layer.id, id);
}

#[test]
fn ellipse_uses_camel_case_radii() {
    let layer = Layer::from_json(r#"{"type":"ellipse","x":5,"y":6,"radiusX":30,"radiusY":20}"#).unwrap();
    let Shape::Ellipse(e) = layer.shape else { panic!("expected ellipse") };
    assert_eq!((e.radius_x, e.radius_y), (30.0, 20.0));
}

#[test]
fn star_accepts_points_alias_and_defaults() {
    let layer = Layer::from_json(r#"{"type":"star","x":0,"y":0,"radius":40,"points":7}"#).unwrap();
    let Shape::Star(s) = layer.shape else { panic!("expected star") };
    assert_eq!(s.sides, 7);
    assert_eq!(s.effective_inner_radius(), 20.0);

    let layer = Layer::from_json(r#"{"type":"star","x":0,"y":0,"radius":40}"#).unwrap();
    let Shape::Star(s) = layer.shape else { panic!("expected star") };
    assert_eq!(s.sides, 5);
}

#[test]
fn polygon_defaults_to_six_sides() {
    let layer = Layer::from_json(r#"{"type":"polygon","x":0,"y":0,"radius":40}"#).unwrap();
    let Shape::Polygon(p) = layer.shape else { panic!("expected polygon") };
    assert_eq!(p.sides, 6);
}

#[test]
fn unknown_type_is_kept_as_unknown() {
    let layer = Layer::from_json(r#"{"type":"sticker","x":0,"y":0}"#).unwrap();
    assert_eq!(layer.shape, Shape::Unknown);
    assert!(!layer.is_pickable());
}

#[test]
fn unknown_orientation_falls_back_to_free() {
    let layer = Layer::from_json(r#"{"type":"line","x1":0,"y1":0,"x2":10,"y2":0,"orientation":"diagonal"}"#).unwrap();
    let Shape::Line(l) = layer.shape else { panic!("expected line") };
    assert_eq!(l.orientation, Orientation::Free);
}

#[test]
fn horizontal_orientation_parses() {
    let layer =
        Layer::from_json(r#"{"type":"dimension","x1":0,"y1":0,"x2":10,"y2":0,"orientation":"horizontal"}"#).unwrap();
    let Shape::Dimension(d) = layer.shape else { panic!("expected dimension") };
    assert_eq!(d.orientation, Orientation::Horizontal);
}

#[test]
fn malformed_known_shape_is_an_error() {
    let err = Layer::from_json(r#"{"type":"rectangle","x":"left"}"#).unwrap_err();
    assert!(matches!(err, LayerError::Json(_)));
}

#[test]
fn layers_from_json_requires_array() {
    let err = layers_from_json(r#"{"type":"rectangle"}"#).unwrap_err();
    assert!(matches!(err, LayerError::NotAnArray));
}

#[test]
fn layers_from_json_keeps_order() {
    let layers = layers_from_json(
        r#"[{"type":"rectangle","x":0,"y":0,"width":1,"height":1},{"type":"marker","x":5,"y":5}]"#,
    )
    .unwrap();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0].shape.type_name(), "rectangle");
    assert_eq!(layers[1].shape.type_name(), "marker");
}

#[test]
fn serialized_layer_carries_type_tag() {
    let layer = rect(1.0, 2.0, 3.0, 4.0);
    let value = serde_json::to_value(&layer).unwrap();
    assert_eq!(value["type"], "rectangle");
    assert_eq!(value["width"], 3.0);
}

// =============================================================
// Defaults and derived geometry
// =============================================================

#[test]
fn text_and_marker_defaults() {
    let text = TextShape { x: 0.0, y: 0.0, width: 0.0, height: 0.0, font_size: None };
    assert_eq!(text.effective_font_size(), 16.0);
    let marker = MarkerShape { x: 0.0, y: 0.0, size: None };
    assert_eq!(marker.effective_size(), 24.0);
}

#[test]
fn line_control_requires_both_coordinates() {
    let mut line = LineShape {
        x1: 0.0,
        y1: 0.0,
        x2: 10.0,
        y2: 20.0,
        control_x: Some(3.0),
        control_y: None,
        orientation: Orientation::Free,
    };
    assert_eq!(line.control(), None);
    line.control_y = Some(4.0);
    assert_eq!(line.control(), Some(Point::new(3.0, 4.0)));
    assert_eq!(line.midpoint(), Point::new(5.0, 10.0));
}

#[test]
fn implicit_tail_tip_per_direction() {
    assert_eq!(callout(TailDirection::Bottom).implicit_tail_tip(), Point::new(50.0, 80.0));
    assert_eq!(callout(TailDirection::Top).implicit_tail_tip(), Point::new(50.0, -20.0));
    assert_eq!(callout(TailDirection::Left).implicit_tail_tip(), Point::new(-20.0, 30.0));
    assert_eq!(callout(TailDirection::Right).implicit_tail_tip(), Point::new(120.0, 30.0));
}

#[test]
fn local_tail_tip_is_relative_to_center() {
    let c = callout(TailDirection::Bottom);
    assert_eq!(c.local_tail_tip(), Point::new(0.0, 50.0));
}

#[test]
fn explicit_tail_tip_wins() {
    let mut c = callout(TailDirection::Bottom);
    c.tail_tip_x = Some(-70.0);
    c.tail_tip_y = Some(10.0);
    assert_eq!(c.local_tail_tip(), Point::new(-70.0, 10.0));
}

// =============================================================
// Patches
// =============================================================

#[test]
fn apply_patch_sets_only_present_fields() {
    let mut layer = rect(10.0, 20.0, 100.0, 50.0);
    let changed = layer.apply_patch(&LayerPatch { width: Some(150.0), ..Default::default() });
    assert!(changed);
    assert_eq!(layer.shape, Shape::Rectangle(RectShape { x: 10.0, y: 20.0, width: 150.0, height: 50.0 }));
}

#[test]
fn apply_patch_ignores_foreign_fields() {
    let mut layer = rect(0.0, 0.0, 10.0, 10.0);
    let before = layer.clone();
    assert!(!layer.apply_patch(&LayerPatch { radius: Some(5.0), x1: Some(3.0), ..Default::default() }));
    assert_eq!(layer, before);
}

#[test]
fn apply_patch_rotation_applies_to_any_shape() {
    let mut layer = Layer::new(Shape::Unknown);
    assert!(layer.apply_patch(&LayerPatch { rotation: Some(45.0), ..Default::default() }));
    assert_eq!(layer.rotation, 45.0);
}

#[test]
fn apply_patch_replaces_path_points() {
    let mut layer = Layer::new(Shape::Path(PathShape { points: vec![Point::new(0.0, 0.0)], closed: false }));
    let points = vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)];
    assert!(layer.apply_patch(&LayerPatch { points: Some(points.clone()), ..Default::default() }));
    let Shape::Path(p) = &layer.shape else { panic!("expected path") };
    assert_eq!(p.points, points);
}

#[test]
fn patch_serializes_sparse_camel_case() {
    let patch = LayerPatch { radius_x: Some(40.0), tail_tip_y: Some(3.0), ..Default::default() };
    let value = serde_json::to_value(&patch).unwrap();
    assert_eq!(value, json!({ "radiusX": 40.0, "tailTipY": 3.0 }));
}

#[test]
fn empty_patch() {
    assert!(LayerPatch::default().is_empty());
    assert!(!LayerPatch { x: Some(0.0), ..Default::default() }.is_empty());
}

// =============================================================
// Layer list
// =============================================================

#[test]
fn list_insert_replaces_in_place() {
    let mut list = LayerList::new();
    let a = rect(0.0, 0.0, 1.0, 1.0);
    let b = rect(5.0, 5.0, 1.0, 1.0);
    list.insert(a.clone());
    list.insert(b.clone());

    let mut moved = a.clone();
    moved.rotation = 30.0;
    list.insert(moved);

    assert_eq!(list.len(), 2);
    assert_eq!(list.as_slice()[0].id, a.id);
    assert_eq!(list.as_slice()[0].rotation, 30.0);
    assert_eq!(list.as_slice()[1].id, b.id);
}

#[test]
fn list_apply_patch_and_remove() {
    let mut list = LayerList::new();
    let a = rect(0.0, 0.0, 1.0, 1.0);
    let id = a.id;
    list.load(vec![a]);

    assert!(list.apply_patch(&id, &LayerPatch { x: Some(9.0), ..Default::default() }));
    assert!(!list.apply_patch(&Uuid::new_v4(), &LayerPatch::default()));
    assert!(matches!(&list.get(&id).unwrap().shape, Shape::Rectangle(r) if r.x == 9.0));

    assert!(list.remove(&id).is_some());
    assert!(list.is_empty());
    assert!(list.remove(&id).is_none());
}

#[test]
fn hidden_and_locked_layers_are_not_pickable() {
    let mut layer = rect(0.0, 0.0, 1.0, 1.0);
    assert!(layer.is_pickable());
    layer.visible = false;
    assert!(!layer.is_pickable());
    layer.visible = true;
    layer.locked = true;
    assert!(!layer.is_pickable());
}
