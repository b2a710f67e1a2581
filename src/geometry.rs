//! Geometry primitives: points, rects, rotation, and per-type bounds.
//!
//! Two rect forms are used throughout the crate. [`Bounds`] is the
//! origin-plus-size form the layer model speaks; [`Aabb`] is the edge form
//! used for overlap tests. Both convert to an `Aabb` through [`ToAabb`].
//!
//! Rotation angles are degrees, clockwise on screen (y grows downward).

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::shape::{Layer, LineShape, Shape};

/// A point in either screen or logical space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Translate by a delta.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// Rect as origin (top-left) plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Bounds of a box given by its center and half extents.
    #[must_use]
    pub fn from_center(center: Point, half_width: f64, half_height: f64) -> Self {
        Self::new(center.x - half_width, center.y - half_height, half_width * 2.0, half_height * 2.0)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Point at fractional position `(fx, fy)` inside the box; `(0, 0)` is top-left.
    #[must_use]
    pub fn point_at(&self, fx: f64, fy: f64) -> Point {
        Point::new(self.x + self.width * fx, self.y + self.height * fy)
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Both sides below `epsilon`.
    #[must_use]
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        self.width.abs() < epsilon && self.height.abs() < epsilon
    }

    /// Smallest bounds enclosing all `points`. `None` for an empty slice.
    #[must_use]
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut aabb = Aabb { left: first.x, top: first.y, right: first.x, bottom: first.y };
        for p in &points[1..] {
            aabb.left = aabb.left.min(p.x);
            aabb.top = aabb.top.min(p.y);
            aabb.right = aabb.right.max(p.x);
            aabb.bottom = aabb.bottom.max(p.y);
        }
        Some(aabb.to_bounds())
    }
}

/// Axis-aligned box as edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Aabb {
    #[must_use]
    pub fn to_bounds(self) -> Bounds {
        Bounds::new(self.left, self.top, self.right - self.left, self.bottom - self.top)
    }

    /// Strict overlap; boxes that only share an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left < other.right && other.left < self.right && self.top < other.bottom && other.top < self.bottom
    }

    fn is_finite(&self) -> bool {
        self.left.is_finite() && self.top.is_finite() && self.right.is_finite() && self.bottom.is_finite()
    }
}

/// Anything that can be normalised to edge form.
///
/// Invalid input (a `None`, or non-finite coordinates) normalises to `None`.
pub trait ToAabb {
    fn to_aabb(&self) -> Option<Aabb>;
}

impl ToAabb for Aabb {
    fn to_aabb(&self) -> Option<Aabb> {
        self.is_finite().then_some(*self)
    }
}

impl ToAabb for Bounds {
    fn to_aabb(&self) -> Option<Aabb> {
        let (left, right) = if self.width < 0.0 { (self.x + self.width, self.x) } else { (self.x, self.x + self.width) };
        let (top, bottom) = if self.height < 0.0 { (self.y + self.height, self.y) } else { (self.y, self.y + self.height) };
        Aabb { left, top, right, bottom }.to_aabb()
    }
}

impl<T: ToAabb> ToAabb for Option<T> {
    fn to_aabb(&self) -> Option<Aabb> {
        self.as_ref().and_then(ToAabb::to_aabb)
    }
}

impl<T: ToAabb> ToAabb for &T {
    fn to_aabb(&self) -> Option<Aabb> {
        (*self).to_aabb()
    }
}

// =============================================================
// Rotation
// =============================================================

/// Normalise an angle in degrees to `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if d >= 360.0 { 0.0 } else { d }
}

/// Rotate a vector clockwise (on a y-down screen) by `degrees`.
#[must_use]
pub fn rotate_vector(dx: f64, dy: f64, degrees: f64) -> (f64, f64) {
    if degrees == 0.0 {
        return (dx, dy);
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    (dx * cos - dy * sin, dx * sin + dy * cos)
}

/// Rotate `p` about `center` by `degrees`.
#[must_use]
pub fn rotate_about(p: Point, center: Point, degrees: f64) -> Point {
    let (dx, dy) = rotate_vector(p.x - center.x, p.y - center.y, degrees);
    Point::new(center.x + dx, center.y + dy)
}

// =============================================================
// Per-type bounds
// =============================================================

/// The layer's bounding box in its own unrotated frame.
///
/// Rotation, when present, is applied about this box's center. Returns `None`
/// for unknown shapes and empty paths.
#[must_use]
pub fn layer_bounds(layer: &Layer) -> Option<Bounds> {
    match &layer.shape {
        Shape::Rectangle(r) | Shape::Textbox(r) => Some(Bounds::new(r.x, r.y, r.width, r.height)),
        Shape::Circle(c) => Some(Bounds::from_center(Point::new(c.x, c.y), c.radius, c.radius)),
        Shape::Ellipse(e) => Some(Bounds::from_center(Point::new(e.x, e.y), e.radius_x, e.radius_y)),
        Shape::Polygon(p) => Some(Bounds::from_center(Point::new(p.x, p.y), p.radius, p.radius)),
        Shape::Star(s) => Some(Bounds::from_center(Point::new(s.x, s.y), s.radius, s.radius)),
        Shape::Line(l) | Shape::Arrow(l) => Some(line_bounds(l)),
        Shape::Path(p) => Bounds::enclosing(&p.points),
        Shape::Text(t) => {
            let (w, h) = text_extent(t.width, t.height, t.effective_font_size());
            Some(Bounds::new(t.x, t.y, w, h))
        }
        Shape::Marker(m) => {
            let half = m.effective_size() * 0.5;
            Some(Bounds::from_center(Point::new(m.x, m.y), half, half))
        }
        Shape::Dimension(d) => Bounds::enclosing(&[Point::new(d.x1, d.y1), Point::new(d.x2, d.y2)]),
        Shape::Callout(c) => Some(Bounds::new(c.x, c.y, c.width, c.height)),
        Shape::Unknown => None,
    }
}

/// Text boxes that were never measured fall back to a one-line square of the font size.
fn text_extent(width: f64, height: f64, font_size: f64) -> (f64, f64) {
    let w = if width > 0.0 { width } else { font_size };
    let h = if height > 0.0 { height } else { font_size };
    (w, h)
}

/// Tight bounds of a line, including the full extent of its quadratic curve.
fn line_bounds(line: &LineShape) -> Bounds {
    let p0 = Point::new(line.x1, line.y1);
    let p2 = Point::new(line.x2, line.y2);
    let Some(p1) = line.control() else {
        return Bounds::enclosing(&[p0, p2]).unwrap_or_default();
    };
    let mut extremes = vec![p0, p2];
    for t in [quad_extremum(p0.x, p1.x, p2.x), quad_extremum(p0.y, p1.y, p2.y)].into_iter().flatten() {
        extremes.push(quad_point(p0, p1, p2, t));
    }
    Bounds::enclosing(&extremes).unwrap_or_default()
}

/// Parameter in `(0, 1)` where a 1-D quadratic Bézier has zero derivative.
fn quad_extremum(a: f64, b: f64, c: f64) -> Option<f64> {
    let denom = a - 2.0 * b + c;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let t = (a - b) / denom;
    (t > 0.0 && t < 1.0).then_some(t)
}

/// Evaluate a quadratic Bézier at `t`.
#[must_use]
pub fn quad_point(p0: Point, p1: Point, p2: Point, t: f64) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * p0.x + 2.0 * u * t * p1.x + t * t * p2.x,
        u * u * p0.y + 2.0 * u * t * p1.y + t * t * p2.y,
    )
}

/// World-space AABB of the layer after rotation.
///
/// Ellipses use their exact rotated extent; everything else rotates the
/// corners of [`layer_bounds`]. Callouts include their tail tip.
#[must_use]
pub fn world_aabb(layer: &Layer) -> Option<Aabb> {
    let bounds = layer_bounds(layer)?;
    let center = bounds.center();
    let rotation = normalize_degrees(layer.rotation);

    let mut points = Vec::with_capacity(5);
    match &layer.shape {
        Shape::Circle(_) => return bounds.to_aabb(),
        Shape::Ellipse(e) => {
            let (sin, cos) = rotation.to_radians().sin_cos();
            let hw = ((e.radius_x * cos).powi(2) + (e.radius_y * sin).powi(2)).sqrt();
            let hh = ((e.radius_x * sin).powi(2) + (e.radius_y * cos).powi(2)).sqrt();
            return Bounds::from_center(center, hw, hh).to_aabb();
        }
        Shape::Callout(c) => {
            let tip = c.local_tail_tip();
            points.push(rotate_about(Point::new(center.x + tip.x, center.y + tip.y), center, rotation));
        }
        _ => {}
    }
    for (fx, fy) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
        points.push(rotate_about(bounds.point_at(fx, fy), center, rotation));
    }
    Bounds::enclosing(&points).and_then(|b| b.to_aabb())
}

// =============================================================
// Distance and containment
// =============================================================

/// Shortest distance from `p` to the segment `a`–`b`. Zero-length segments measure to `a`.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < f64::EPSILON {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Shortest distance from `p` to an open polyline. `INFINITY` for an empty list.
#[must_use]
pub fn distance_to_polyline(p: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => p.distance_to(*only),
        _ => points.windows(2).map(|w| distance_to_segment(p, w[0], w[1])).fold(f64::INFINITY, f64::min),
    }
}

/// Even-odd ray-casting containment test.
#[must_use]
pub fn point_in_polygon(p: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (vertices[i], vertices[j]);
        if (vi.y > p.y) != (vj.y > p.y) && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Vertices of a star with `points` tips, first tip straight up.
#[must_use]
pub fn star_vertices(center: Point, outer: f64, inner: f64, points: u32) -> Vec<Point> {
    let n = points.max(2);
    let step = std::f64::consts::PI / f64::from(n);
    (0..n * 2)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let angle = -std::f64::consts::FRAC_PI_2 + step * f64::from(i);
            Point::new(center.x + r * angle.cos(), center.y + r * angle.sin())
        })
        .collect()
}
