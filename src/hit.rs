//! Hit-testing: selection handles, layer bodies, and marquee rectangles.
//!
//! Handle positions are recomputed from the layer's current bounds every
//! time; nothing here is cached. Tolerances that come from the config are
//! screen pixels and are divided by the zoom so grab areas keep the same
//! on-screen size at every zoom level.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::consts::{CURVE_SAMPLES, DEFAULT_TAIL_SIZE};
use crate::geometry::{
    Bounds, Point, ToAabb, distance_to_polyline, distance_to_segment, layer_bounds, normalize_degrees,
    point_in_polygon, quad_point, rotate_about, star_vertices, world_aabb,
};
use crate::shape::{Layer, LayerId, LineShape, Shape};

/// A named grab point on a selected layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Handle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
    /// Rotation knob above the top edge.
    Rotate,
    /// Quadratic control point of an arrow.
    Control,
    /// Callout tail tip.
    TailTip,
}

impl Handle {
    /// The eight compass handles, corners first.
    pub const COMPASS: [Handle; 8] =
        [Handle::Nw, Handle::Ne, Handle::Se, Handle::Sw, Handle::N, Handle::E, Handle::S, Handle::W];

    /// Parse a wire token such as `"se"` or `"tailTip"`.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "n" => Self::N,
            "ne" => Self::Ne,
            "e" => Self::E,
            "se" => Self::Se,
            "s" => Self::S,
            "sw" => Self::Sw,
            "w" => Self::W,
            "nw" => Self::Nw,
            "rotate" => Self::Rotate,
            "control" => Self::Control,
            "tailTip" => Self::TailTip,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::N => "n",
            Self::Ne => "ne",
            Self::E => "e",
            Self::Se => "se",
            Self::S => "s",
            Self::Sw => "sw",
            Self::W => "w",
            Self::Nw => "nw",
            Self::Rotate => "rotate",
            Self::Control => "control",
            Self::TailTip => "tailTip",
        }
    }

    /// Outward direction of a compass handle as `(-1 | 0 | 1, -1 | 0 | 1)`.
    #[must_use]
    pub fn compass_signs(self) -> Option<(f64, f64)> {
        Some(match self {
            Self::N => (0.0, -1.0),
            Self::Ne => (1.0, -1.0),
            Self::E => (1.0, 0.0),
            Self::Se => (1.0, 1.0),
            Self::S => (0.0, 1.0),
            Self::Sw => (-1.0, 1.0),
            Self::W => (-1.0, 0.0),
            Self::Nw => (-1.0, -1.0),
            Self::Rotate | Self::Control | Self::TailTip => return None,
        })
    }

    /// Fractional box position of the handle itself; `(0, 0)` is top-left.
    #[must_use]
    pub fn box_position(self) -> Option<(f64, f64)> {
        let (sx, sy) = self.compass_signs()?;
        Some(((sx + 1.0) * 0.5, (sy + 1.0) * 0.5))
    }

    /// Fractional box position of the point that stays fixed while this handle is dragged.
    #[must_use]
    pub fn opposite_anchor(self) -> Option<(f64, f64)> {
        let (fx, fy) = self.box_position()?;
        Some((1.0 - fx, 1.0 - fy))
    }
}

/// A handle and where it currently sits in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandlePoint {
    pub handle: Handle,
    pub point: Point,
}

// =============================================================
// Selection handles
// =============================================================

/// World positions of every handle the layer shows, in hit priority order:
/// rotate, type-specific, corners, then edges.
#[must_use]
pub fn selection_handles(layer: &Layer, zoom: f64, config: &EngineConfig) -> Vec<HandlePoint> {
    let Some(bounds) = layer_bounds(layer) else {
        return Vec::new();
    };
    let zoom = if zoom > 0.0 { zoom } else { 1.0 };
    let center = bounds.center();
    let rotation = normalize_degrees(layer.rotation);
    let place = |handle: Handle, p: Point| HandlePoint { handle, point: rotate_about(p, center, rotation) };

    match &layer.shape {
        Shape::Line(l) | Shape::Arrow(l) => {
            let mut out = Vec::with_capacity(5);
            if matches!(layer.shape, Shape::Arrow(_)) {
                out.push(place(Handle::Control, l.control().unwrap_or_else(|| l.midpoint())));
            }
            let offset = config.line_side_handle_offset_px / zoom;
            let ends = endpoint_handles(Point::new(l.x1, l.y1), Point::new(l.x2, l.y2), offset);
            out.extend(ends.into_iter().map(|(handle, p)| place(handle, p)));
            out
        }
        Shape::Dimension(d) => {
            let offset = config.line_side_handle_offset_px / zoom;
            endpoint_handles(Point::new(d.x1, d.y1), Point::new(d.x2, d.y2), offset)
                .into_iter()
                .map(|(handle, p)| place(handle, p))
                .collect()
        }
        Shape::Unknown => Vec::new(),
        _ => {
            let mut out = Vec::with_capacity(10);
            let offset = config.rotate_handle_offset_px / zoom;
            out.push(place(Handle::Rotate, Point::new(center.x, bounds.y - offset)));
            if let Shape::Callout(c) = &layer.shape {
                let tip = c.local_tail_tip();
                out.push(place(Handle::TailTip, center.offset(tip.x, tip.y)));
            }
            for handle in Handle::COMPASS {
                if let Some((fx, fy)) = handle.box_position() {
                    out.push(place(handle, bounds.point_at(fx, fy)));
                }
            }
            out
        }
    }
}

/// The first handle within the screen-constant hit radius of `point`.
#[must_use]
pub fn hit_test_selection_handles(layer: &Layer, point: Point, zoom: f64, config: &EngineConfig) -> Option<Handle> {
    let zoom = if zoom > 0.0 { zoom } else { 1.0 };
    let tolerance = config.handle_hit_px / zoom;
    selection_handles(layer, zoom, config)
        .into_iter()
        .find(|hp| hp.point.distance_to(point) <= tolerance)
        .map(|hp| hp.handle)
}

/// `w`/`e` on the endpoints, `n`/`s` either side of the midpoint at `offset`.
fn endpoint_handles(start: Point, end: Point, offset: f64) -> [(Handle, Point); 4] {
    // Unit normal, rotated 90° clockwise from the direction of travel.
    let (sin, cos) = (end.y - start.y).atan2(end.x - start.x).sin_cos();
    let (px, py) = (-sin, cos);
    let mid = Point::new((start.x + end.x) * 0.5, (start.y + end.y) * 0.5);
    [
        (Handle::W, start),
        (Handle::E, end),
        (Handle::N, mid.offset(-px * offset, -py * offset)),
        (Handle::S, mid.offset(px * offset, py * offset)),
    ]
}

/// CSS cursor for a handle on a layer rotated by `rotation` degrees.
#[must_use]
pub fn resize_cursor(handle: Handle, rotation: f64) -> &'static str {
    const CURSORS: [&str; 4] = ["ns-resize", "nesw-resize", "ew-resize", "nwse-resize"];
    let base = match handle {
        Handle::N => 0.0,
        Handle::Ne => 45.0,
        Handle::E => 90.0,
        Handle::Se => 135.0,
        Handle::S => 180.0,
        Handle::Sw => 225.0,
        Handle::W => 270.0,
        Handle::Nw => 315.0,
        Handle::Rotate => return "grab",
        Handle::Control | Handle::TailTip => return "crosshair",
    };
    let angle = normalize_degrees(base + rotation);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let sector = ((angle / 45.0).round() as usize) % 8;
    CURSORS[sector % 4]
}

// =============================================================
// Layer bodies
// =============================================================

/// Whether `point` (logical coordinates) falls on the layer.
///
/// `tolerance` is the logical-space slop for thin shapes such as lines and
/// open paths; filled shapes use their exact outline.
#[must_use]
pub fn is_point_in_layer(layer: &Layer, point: Point, tolerance: f64) -> bool {
    let Some(bounds) = layer_bounds(layer) else {
        return false;
    };
    let center = bounds.center();
    let p = rotate_about(point, center, -normalize_degrees(layer.rotation));

    match &layer.shape {
        Shape::Rectangle(_) | Shape::Textbox(_) | Shape::Text(_) | Shape::Marker(_) => bounds.contains(p),
        Shape::Circle(c) => point_in_ellipse(p, center, c.radius, c.radius, tolerance),
        Shape::Ellipse(e) => point_in_ellipse(p, center, e.radius_x, e.radius_y, tolerance),
        Shape::Polygon(poly) => point_in_regular_polygon(p, center, poly.radius, poly.sides),
        Shape::Star(s) => point_in_polygon(p, &star_vertices(center, s.radius, s.effective_inner_radius(), s.sides)),
        Shape::Line(l) | Shape::Arrow(l) => distance_to_line(p, l) <= tolerance,
        Shape::Dimension(d) => distance_to_segment(p, Point::new(d.x1, d.y1), Point::new(d.x2, d.y2)) <= tolerance,
        Shape::Path(path) => {
            if path.closed && point_in_polygon(p, &path.points) {
                return true;
            }
            let mut dist = distance_to_polyline(p, &path.points);
            if path.closed {
                if let (Some(first), Some(last)) = (path.points.first(), path.points.last()) {
                    dist = dist.min(distance_to_segment(p, *last, *first));
                }
            }
            dist <= tolerance
        }
        Shape::Callout(c) => {
            if bounds.contains(p) {
                return true;
            }
            let tip = c.local_tail_tip();
            let reach = c.tail_size.unwrap_or(DEFAULT_TAIL_SIZE) * 0.5;
            distance_to_segment(p, center, center.offset(tip.x, tip.y)) <= reach.max(tolerance)
        }
        Shape::Unknown => false,
    }
}

/// Normalised distance test; a collapsed axis falls back to the tolerance.
fn point_in_ellipse(p: Point, center: Point, rx: f64, ry: f64, tolerance: f64) -> bool {
    if rx <= 0.0 || ry <= 0.0 {
        return p.distance_to(center) <= tolerance;
    }
    let nx = (p.x - center.x) / rx;
    let ny = (p.y - center.y) / ry;
    nx * nx + ny * ny <= 1.0
}

/// Angle-sector test against a regular polygon with its first vertex straight up.
fn point_in_regular_polygon(p: Point, center: Point, radius: f64, sides: u32) -> bool {
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    let dist = dx.hypot(dy);
    if dist > radius {
        return false;
    }
    if dist < f64::EPSILON {
        return true;
    }
    let sector = TAU / f64::from(sides.max(3));
    let theta = (dy.atan2(dx) + FRAC_PI_2).rem_euclid(TAU);
    let from_edge_normal = theta.rem_euclid(sector) - sector * 0.5;
    let apothem = radius * (sector * 0.5).cos();
    dist * from_edge_normal.cos() <= apothem
}

fn distance_to_line(p: Point, l: &LineShape) -> f64 {
    let a = Point::new(l.x1, l.y1);
    let b = Point::new(l.x2, l.y2);
    let Some(control) = l.control() else {
        return distance_to_segment(p, a, b);
    };
    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<Point> =
        (0..=CURVE_SAMPLES).map(|i| quad_point(a, control, b, i as f64 / CURVE_SAMPLES as f64)).collect();
    distance_to_polyline(p, &samples)
}

/// The top-most pickable layer under `point`.
///
/// `layers` is bottom-most first, so the search runs in reverse.
#[must_use]
pub fn get_layer_at_point(layers: &[Layer], point: Point, tolerance: f64) -> Option<&Layer> {
    layers
        .iter()
        .rev()
        .filter(|l| l.is_pickable())
        .find(|l| is_point_in_layer(l, point, tolerance))
}

// =============================================================
// Marquee
// =============================================================

/// Strict rect overlap. Accepts either rect form; a missing or non-finite rect never intersects.
#[must_use]
pub fn rects_intersect(a: &impl ToAabb, b: &impl ToAabb) -> bool {
    match (a.to_aabb(), b.to_aabb()) {
        (Some(a), Some(b)) => a.overlaps(&b),
        _ => false,
    }
}

/// Normalised rect spanned by a drag from `start` to `end`, in either order.
#[must_use]
pub fn marquee_rect(start: Point, end: Point) -> Bounds {
    Bounds::new(start.x.min(end.x), start.y.min(end.y), (end.x - start.x).abs(), (end.y - start.y).abs())
}

/// Ids of pickable layers whose rotated bounds intersect the marquee, bottom-most first.
#[must_use]
pub fn layers_in_marquee(layers: &[Layer], marquee: &Bounds) -> Vec<LayerId> {
    layers
        .iter()
        .filter(|l| l.is_pickable())
        .filter(|l| rects_intersect(&world_aabb(l), marquee))
        .map(|l| l.id)
        .collect()
}
