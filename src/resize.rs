//! Resize math: turns a handle drag into a sparse [`LayerPatch`].
//!
//! DESIGN
//! ======
//! Every shape type has its own sub-algorithm, selected by an exhaustive
//! match on [`Shape`]. All of them are pure: the input layer is never
//! touched, and the caller applies the returned patch. `None` means "apply
//! nothing" (unknown type, a handle the type does not support, or a
//! degenerate path). Axis-locked lines and dimensions omit the locked fields
//! instead of returning `None`.
//!
//! Deltas are measured along the layer's own axes for every handle except
//! [`Handle::TailTip`], which receives a world-space delta and un-rotates it
//! here. The interaction controller un-rotates pointer motion before calling.
//!
//! Box shapes (rectangle, textbox, callout body) resize in their unrotated
//! frame first; [`correct_for_rotation`] then shifts the result so the
//! anchor opposite the dragged handle stays put on screen.

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use std::f64::consts::FRAC_1_SQRT_2;

use tracing::trace;

use crate::consts::{
    DEGENERATE_EPSILON, MAX_FONT_SIZE, MAX_MARKER_SIZE, MIN_FONT_SIZE, MIN_MARKER_SIZE, MIN_RADIUS,
};
use crate::geometry::{Bounds, Point, rotate_about, rotate_vector};
use crate::hit::Handle;
use crate::shape::{
    CalloutShape, DimensionShape, EllipseShape, Layer, LayerPatch, LineShape, MarkerShape, Orientation, PathShape,
    Shape, TextShape,
};

/// Modifier-driven resize modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeOptions {
    /// Keep the aspect ratio; the axis with the larger delta drives the scale.
    pub proportional: bool,
    /// Resize symmetrically about the unchanged center.
    pub from_center: bool,
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Compute the patch produced by dragging `handle` by `(dx, dy)`.
#[must_use]
pub fn calculate_resize(layer: &Layer, handle: Handle, dx: f64, dy: f64, options: ResizeOptions) -> Option<LayerPatch> {
    let patch = match &layer.shape {
        Shape::Rectangle(r) | Shape::Textbox(r) => {
            resize_rotated_box(Bounds::new(r.x, r.y, r.width, r.height), layer.rotation, handle, dx, dy, options)
        }
        Shape::Circle(c) => radial_delta(handle, dx, dy).map(|d| LayerPatch {
            radius: Some(clamp_radius(c.radius + d)),
            ..Default::default()
        }),
        Shape::Ellipse(e) => resize_ellipse(e, handle, dx, dy),
        Shape::Polygon(p) => radial_delta(handle, dx, dy).map(|d| LayerPatch {
            radius: Some(clamp_radius(p.radius + d)),
            ..Default::default()
        }),
        // Inner radius is left alone, so the spike ratio drifts on resize.
        Shape::Star(s) => radial_delta(handle, dx, dy).map(|d| LayerPatch {
            radius: Some(clamp_radius(s.radius + d)),
            ..Default::default()
        }),
        Shape::Line(l) => Some(resize_line(l, handle, dx, dy, false)),
        Shape::Arrow(l) => Some(resize_line(l, handle, dx, dy, true)),
        Shape::Path(p) => resize_path(p, handle, dx, dy, options),
        Shape::Text(t) => resize_text(t, handle, dx, dy, options),
        Shape::Marker(m) => resize_marker(m, handle, dx, dy),
        Shape::Dimension(d) => resize_dimension(d, handle, dx, dy),
        Shape::Callout(c) => {
            if handle == Handle::TailTip {
                Some(move_tail_tip(c, layer.rotation, dx, dy))
            } else {
                resize_rotated_box(Bounds::new(c.x, c.y, c.width, c.height), layer.rotation, handle, dx, dy, options)
            }
        }
        Shape::Unknown => None,
    };
    if patch.is_none() {
        trace!(shape = layer.shape.type_name(), handle = handle.as_str(), "resize rejected");
    }
    patch
}

/// Shift a naive (unrotated-frame) resize result so the anchor opposite
/// `handle` keeps its world position under `rotation`.
///
/// Both boxes rotate about their own centers. The anchor is the opposite
/// corner for corner handles and the opposite edge midpoint for edge
/// handles. Only position changes; the naive size is kept.
#[must_use]
pub fn correct_for_rotation(original: &Bounds, naive: &Bounds, rotation: f64, handle: Handle) -> Bounds {
    let Some((fx, fy)) = handle.opposite_anchor() else {
        return *naive;
    };
    if rotation == 0.0 {
        return *naive;
    }
    let anchor_world = rotate_about(original.point_at(fx, fy), original.center(), rotation);
    let (ox, oy) = rotate_vector((fx - 0.5) * naive.width, (fy - 0.5) * naive.height, rotation);
    let center = Point::new(anchor_world.x - ox, anchor_world.y - oy);
    Bounds::new(center.x - naive.width * 0.5, center.y - naive.height * 0.5, naive.width, naive.height)
}

/// The patch that moves a layer by `(dx, dy)` in world space.
///
/// Explicit callout tail tips live in the body's local frame and ride along
/// without being patched.
#[must_use]
pub fn translate_patch(layer: &Layer, dx: f64, dy: f64) -> Option<LayerPatch> {
    let moved_xy = |x: f64, y: f64| LayerPatch { x: Some(x + dx), y: Some(y + dy), ..Default::default() };
    let moved_ends = |x1: f64, y1: f64, x2: f64, y2: f64| LayerPatch {
        x1: Some(x1 + dx),
        y1: Some(y1 + dy),
        x2: Some(x2 + dx),
        y2: Some(y2 + dy),
        ..Default::default()
    };
    match &layer.shape {
        Shape::Rectangle(r) | Shape::Textbox(r) => Some(moved_xy(r.x, r.y)),
        Shape::Circle(c) => Some(moved_xy(c.x, c.y)),
        Shape::Ellipse(e) => Some(moved_xy(e.x, e.y)),
        Shape::Polygon(p) => Some(moved_xy(p.x, p.y)),
        Shape::Star(s) => Some(moved_xy(s.x, s.y)),
        Shape::Text(t) => Some(moved_xy(t.x, t.y)),
        Shape::Marker(m) => Some(moved_xy(m.x, m.y)),
        Shape::Callout(c) => Some(moved_xy(c.x, c.y)),
        Shape::Line(l) | Shape::Arrow(l) => {
            let mut patch = moved_ends(l.x1, l.y1, l.x2, l.y2);
            if let Some(control) = l.control() {
                patch.control_x = Some(control.x + dx);
                patch.control_y = Some(control.y + dy);
            }
            Some(patch)
        }
        Shape::Dimension(d) => Some(moved_ends(d.x1, d.y1, d.x2, d.y2)),
        Shape::Path(p) => {
            if p.points.is_empty() {
                return None;
            }
            let points = p.points.iter().map(|pt| pt.offset(dx, dy)).collect();
            Some(LayerPatch { points: Some(points), ..Default::default() })
        }
        Shape::Unknown => None,
    }
}

// =============================================================================
// BOX SHAPES
// =============================================================================

/// Resize an axis-aligned box by dragging one of the eight compass handles.
///
/// Returns `None` for non-compass handles. Sizes collapse to zero rather
/// than going negative, pinned at the anchor.
fn resize_box(b: Bounds, handle: Handle, dx: f64, dy: f64, options: ResizeOptions) -> Option<Bounds> {
    let (sx, sy) = handle.compass_signs()?;
    let factor = if options.from_center { 2.0 } else { 1.0 };

    let mut width = b.width + sx * dx * factor;
    let mut height = b.height + sy * dy * factor;

    if options.proportional && b.width.abs() > DEGENERATE_EPSILON && b.height.abs() > DEGENERATE_EPSILON {
        let x_drives = if sx != 0.0 && sy != 0.0 { dx.abs() >= dy.abs() } else { sx != 0.0 };
        let scale = if x_drives { width / b.width } else { height / b.height };
        width = b.width * scale;
        height = b.height * scale;
    }

    let width = width.max(0.0);
    let height = height.max(0.0);

    let (fx, fy) = if options.from_center { (0.5, 0.5) } else { handle.opposite_anchor()? };
    let anchor = b.point_at(fx, fy);
    Some(Bounds::new(anchor.x - fx * width, anchor.y - fy * height, width, height))
}

fn resize_rotated_box(
    original: Bounds,
    rotation: f64,
    handle: Handle,
    dx: f64,
    dy: f64,
    options: ResizeOptions,
) -> Option<LayerPatch> {
    let naive = resize_box(original, handle, dx, dy, options)?;
    // From-center results keep the center, which rotation already leaves fixed.
    let b = if options.from_center { naive } else { correct_for_rotation(&original, &naive, rotation, handle) };
    Some(LayerPatch {
        x: Some(b.x),
        y: Some(b.y),
        width: Some(b.width),
        height: Some(b.height),
        ..Default::default()
    })
}

// =============================================================================
// RADIAL SHAPES
// =============================================================================

/// Delta projected onto the handle's unit outward normal.
fn radial_delta(handle: Handle, dx: f64, dy: f64) -> Option<f64> {
    let (sx, sy) = handle.compass_signs()?;
    let projected = sx * dx + sy * dy;
    Some(if sx != 0.0 && sy != 0.0 { projected * FRAC_1_SQRT_2 } else { projected })
}

fn clamp_radius(r: f64) -> f64 {
    r.max(MIN_RADIUS)
}

fn resize_ellipse(e: &EllipseShape, handle: Handle, dx: f64, dy: f64) -> Option<LayerPatch> {
    let (sx, sy) = handle.compass_signs()?;
    let mut patch = LayerPatch::default();
    if sx != 0.0 {
        patch.radius_x = Some(clamp_radius(e.radius_x + sx * dx));
    }
    if sy != 0.0 {
        patch.radius_y = Some(clamp_radius(e.radius_y + sy * dy));
    }
    Some(patch)
}

fn resize_marker(m: &MarkerShape, handle: Handle, dx: f64, dy: f64) -> Option<LayerPatch> {
    let (sx, sy) = handle.compass_signs()?;
    let size = (m.effective_size() + sx * dx + sy * dy).clamp(MIN_MARKER_SIZE, MAX_MARKER_SIZE).round();
    Some(LayerPatch { size: Some(size), ..Default::default() })
}

// =============================================================================
// LINEAR SHAPES
// =============================================================================

fn resize_line(l: &LineShape, handle: Handle, dx: f64, dy: f64, is_arrow: bool) -> LayerPatch {
    let mut patch = LayerPatch::default();
    match handle {
        Handle::W => {
            patch.x1 = Some(l.x1 + dx);
            patch.y1 = Some(l.y1 + dy);
        }
        Handle::N | Handle::S => {
            let (sin, cos) = (l.y2 - l.y1).atan2(l.x2 - l.x1).sin_cos();
            let (px, py) = (-sin, cos);
            let amount = dx * px + dy * py;
            patch.x1 = Some(l.x1 + amount * px);
            patch.y1 = Some(l.y1 + amount * py);
            patch.x2 = Some(l.x2 + amount * px);
            patch.y2 = Some(l.y2 + amount * py);
        }
        Handle::Control if is_arrow => {
            let base = l.control().unwrap_or_else(|| l.midpoint());
            patch.control_x = Some(base.x + dx);
            patch.control_y = Some(base.y + dy);
        }
        _ => {
            patch.x2 = Some(l.x2 + dx);
            patch.y2 = Some(l.y2 + dy);
        }
    }
    lock_axis(&mut patch, l.orientation);
    patch
}

fn resize_dimension(d: &DimensionShape, handle: Handle, dx: f64, dy: f64) -> Option<LayerPatch> {
    let mut patch = LayerPatch::default();
    match handle {
        Handle::E | Handle::Se => {
            patch.x2 = Some(d.x2 + dx);
            patch.y2 = Some(d.y2 + dy);
        }
        Handle::W | Handle::Nw => {
            patch.x1 = Some(d.x1 + dx);
            patch.y1 = Some(d.y1 + dy);
        }
        Handle::N | Handle::S => {
            patch.y1 = Some(d.y1 + dy);
            patch.y2 = Some(d.y2 + dy);
        }
        _ => return None,
    }
    lock_axis(&mut patch, d.orientation);
    Some(patch)
}

/// Drop the fields an orientation lock forbids.
fn lock_axis(patch: &mut LayerPatch, orientation: Orientation) {
    match orientation {
        Orientation::Free => {}
        Orientation::Horizontal => {
            patch.y1 = None;
            patch.y2 = None;
            patch.control_y = None;
        }
        Orientation::Vertical => {
            patch.x1 = None;
            patch.x2 = None;
            patch.control_x = None;
        }
    }
}

// =============================================================================
// PATH AND TEXT
// =============================================================================

fn resize_path(p: &PathShape, handle: Handle, dx: f64, dy: f64, options: ResizeOptions) -> Option<LayerPatch> {
    let old = Bounds::enclosing(&p.points)?;
    if old.is_degenerate(DEGENERATE_EPSILON) {
        return None;
    }
    let new = resize_box(old, handle, dx, dy, options)?;

    // A zero-width (or zero-height) path keeps that axis untouched.
    let (scale_x, origin_x) =
        if old.width > DEGENERATE_EPSILON { (new.width / old.width, new.x) } else { (1.0, old.x) };
    let (scale_y, origin_y) =
        if old.height > DEGENERATE_EPSILON { (new.height / old.height, new.y) } else { (1.0, old.y) };

    let points = p
        .points
        .iter()
        .map(|pt| Point::new(origin_x + (pt.x - old.x) * scale_x, origin_y + (pt.y - old.y) * scale_y))
        .collect();
    Some(LayerPatch { points: Some(points), ..Default::default() })
}

fn resize_text(t: &TextShape, handle: Handle, dx: f64, dy: f64, options: ResizeOptions) -> Option<LayerPatch> {
    let (sx, sy) = handle.compass_signs()?;
    let font_size = t.effective_font_size().max(MIN_FONT_SIZE);
    let width = if t.width > DEGENERATE_EPSILON { t.width } else { font_size };
    let height = if t.height > DEGENERATE_EPSILON { t.height } else { font_size };

    let new = resize_box(Bounds::new(t.x, t.y, width, height), handle, dx, dy, options)?;
    let (ratio_x, ratio_y) = (new.width / width, new.height / height);
    // Corners follow the larger box ratio; edges follow the axis they move.
    let ratio = match (sx != 0.0, sy != 0.0) {
        (true, true) => ratio_x.max(ratio_y),
        (true, false) => ratio_x,
        _ => ratio_y,
    };

    let font_size = (font_size * ratio).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    Some(LayerPatch { font_size: Some(font_size), ..Default::default() })
}

// =============================================================================
// CALLOUT TAIL
// =============================================================================

/// Move the tail tip. Always returns explicit local coordinates.
fn move_tail_tip(c: &CalloutShape, rotation: f64, dx: f64, dy: f64) -> LayerPatch {
    let tip = if let Some(tip) = c.explicit_tail_tip() {
        let (ldx, ldy) = rotate_vector(dx, dy, -rotation);
        tip.offset(ldx, ldy)
    } else {
        c.local_tail_tip().offset(dx, dy)
    };
    LayerPatch { tail_tip_x: Some(tip.x), tail_tip_y: Some(tip.y), ..Default::default() }
}
