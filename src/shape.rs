//! Layer model: the per-type shape geometry, sparse patches, and the layer list.
//!
//! This module defines what sits on the canvas (`Layer`, `Shape`), a sparse
//! update type for incremental edits (`LayerPatch`), and the runtime list that
//! owns all live layers in z-order (`LayerList`).
//!
//! Layers arrive as JSON objects tagged by a `type` field. Unknown types are
//! kept as [`Shape::Unknown`] rather than rejected so a newer document still
//! loads; every geometry operation treats them as inert.

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{
    DEFAULT_FONT_SIZE, DEFAULT_MARKER_SIZE, DEFAULT_POLYGON_SIDES, DEFAULT_STAR_POINTS, DEFAULT_TAIL_POSITION,
    DEFAULT_TAIL_SIZE, STAR_INNER_RATIO,
};
use crate::geometry::Point;

/// Unique identifier for a layer.
pub type LayerId = Uuid;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    #[error("invalid layer json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("layer list must be a json array")]
    NotAnArray,
}

// =============================================================================
// SHAPE GEOMETRY
// =============================================================================

/// Axis lock for lines and dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Orientation {
    /// No constraint.
    #[default]
    Free,
    /// Only X fields may change during a resize.
    Horizontal,
    /// Only Y fields may change during a resize.
    Vertical,
}

impl From<String> for Orientation {
    fn from(value: String) -> Self {
        match value.as_str() {
            "horizontal" => Self::Horizontal,
            "vertical" => Self::Vertical,
            _ => Self::Free,
        }
    }
}

impl Orientation {
    fn is_free(&self) -> bool {
        *self == Self::Free
    }
}

/// Edge of a callout body that an implicit tail grows from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TailDirection {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl From<String> for TailDirection {
    fn from(value: String) -> Self {
        match value.as_str() {
            "top" => Self::Top,
            "left" => Self::Left,
            "right" => Self::Right,
            _ => Self::Bottom,
        }
    }
}

/// Top-left anchored box. Used by rectangles and textboxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectShape {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleShape {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EllipseShape {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    pub radius_x: f64,
    pub radius_y: f64,
}

/// Regular polygon centered on `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonShape {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    #[serde(default = "default_polygon_sides")]
    pub sides: u32,
}

/// Star centered on `(x, y)`. `sides` counts the outer points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarShape {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    #[serde(default = "default_star_points", alias = "points")]
    pub sides: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_radius: Option<f64>,
}

impl StarShape {
    /// Inner vertex radius, falling back to half the outer radius.
    #[must_use]
    pub fn effective_inner_radius(&self) -> f64 {
        self.inner_radius.unwrap_or(self.radius * STAR_INNER_RATIO)
    }
}

/// Segment between two endpoints, optionally bent through a quadratic control point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineShape {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Orientation::is_free")]
    pub orientation: Orientation,
}

impl LineShape {
    /// The control point if both coordinates are set.
    #[must_use]
    pub fn control(&self) -> Option<Point> {
        match (self.control_x, self.control_y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        }
    }

    /// Segment midpoint; the implicit control point of a straight line.
    #[must_use]
    pub fn midpoint(&self) -> Point {
        Point::new((self.x1 + self.x2) * 0.5, (self.y1 + self.y2) * 0.5)
    }
}

/// Freehand polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathShape {
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextShape {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
}

impl TextShape {
    #[must_use]
    pub fn effective_font_size(&self) -> f64 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }
}

/// Numbered marker badge centered on `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerShape {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

impl MarkerShape {
    #[must_use]
    pub fn effective_size(&self) -> f64 {
        self.size.unwrap_or(DEFAULT_MARKER_SIZE)
    }
}

/// Measurement line between two endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionShape {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default, skip_serializing_if = "Orientation::is_free")]
    pub orientation: Orientation,
}

/// Speech-bubble body with a pointed tail.
///
/// The tail is either explicit (`tail_tip_x`/`tail_tip_y`, local frame with
/// origin at the body center, unrotated) or implicit, derived from
/// `tail_direction`, `tail_position` and `tail_size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalloutShape {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail_tip_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail_tip_y: Option<f64>,
    #[serde(default)]
    pub tail_direction: TailDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail_position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail_size: Option<f64>,
}

impl CalloutShape {
    /// Body center in world coordinates.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// The explicit local tail tip, if one has been materialised.
    #[must_use]
    pub fn explicit_tail_tip(&self) -> Option<Point> {
        match (self.tail_tip_x, self.tail_tip_y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        }
    }

    /// World position of the implicit tail tip, ignoring rotation.
    #[must_use]
    pub fn implicit_tail_tip(&self) -> Point {
        let position = self.tail_position.unwrap_or(DEFAULT_TAIL_POSITION);
        let size = self.tail_size.unwrap_or(DEFAULT_TAIL_SIZE);
        match self.tail_direction {
            TailDirection::Bottom => Point::new(self.x + self.width * position, self.y + self.height + size),
            TailDirection::Top => Point::new(self.x + self.width * position, self.y - size),
            TailDirection::Left => Point::new(self.x - size, self.y + self.height * position),
            TailDirection::Right => Point::new(self.x + self.width + size, self.y + self.height * position),
        }
    }

    /// Tail tip in the local frame. Implicit tips are translated, not rotated.
    #[must_use]
    pub fn local_tail_tip(&self) -> Point {
        if let Some(tip) = self.explicit_tail_tip() {
            return tip;
        }
        let world = self.implicit_tail_tip();
        let center = self.center();
        Point::new(world.x - center.x, world.y - center.y)
    }
}

/// Per-type geometry, tagged by the JSON `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rectangle(RectShape),
    Textbox(RectShape),
    Circle(CircleShape),
    Ellipse(EllipseShape),
    Polygon(PolygonShape),
    Star(StarShape),
    Line(LineShape),
    Arrow(LineShape),
    Path(PathShape),
    Text(TextShape),
    Marker(MarkerShape),
    Dimension(DimensionShape),
    Callout(CalloutShape),
    /// A `type` this engine does not know. Never hit, never resized.
    #[serde(other)]
    Unknown,
}

impl Shape {
    /// The JSON `type` tag for this shape.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Rectangle(_) => "rectangle",
            Self::Textbox(_) => "textbox",
            Self::Circle(_) => "circle",
            Self::Ellipse(_) => "ellipse",
            Self::Polygon(_) => "polygon",
            Self::Star(_) => "star",
            Self::Line(_) => "line",
            Self::Arrow(_) => "arrow",
            Self::Path(_) => "path",
            Self::Text(_) => "text",
            Self::Marker(_) => "marker",
            Self::Dimension(_) => "dimension",
            Self::Callout(_) => "callout",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this shape is drawn as a segment between two endpoints.
    #[must_use]
    pub fn is_linear(&self) -> bool {
        matches!(self, Self::Line(_) | Self::Arrow(_) | Self::Dimension(_))
    }
}

fn default_polygon_sides() -> u32 {
    DEFAULT_POLYGON_SIDES
}

fn default_star_points() -> u32 {
    DEFAULT_STAR_POINTS
}

fn default_true() -> bool {
    true
}

// =============================================================================
// LAYER
// =============================================================================

/// A layer as stored in the document and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique identifier; generated when the source omits it.
    #[serde(default = "Uuid::new_v4")]
    pub id: LayerId,
    /// Clockwise rotation in degrees around the shape's own center. May be unnormalised.
    #[serde(default)]
    pub rotation: f64,
    /// Hidden layers are drawn by nobody and never hit.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Locked layers are drawn but cannot be picked.
    #[serde(default)]
    pub locked: bool,
    #[serde(flatten)]
    pub shape: Shape,
}

impl Layer {
    /// Wrap a shape in a fresh, visible, unrotated layer.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self { id: Uuid::new_v4(), rotation: 0.0, visible: true, locked: false, shape }
    }

    /// Builder-style rotation setter.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Parse a single layer from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `Json` if the text is not valid JSON or a known shape's fields are malformed.
    pub fn from_json(text: &str) -> Result<Self, LayerError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Whether the layer can be picked by pointer hit-testing or marquee.
    #[must_use]
    pub fn is_pickable(&self) -> bool {
        self.visible && !self.locked && !matches!(self.shape, Shape::Unknown)
    }

    /// Apply a sparse patch. Fields that do not belong to this shape type are ignored.
    ///
    /// Returns `true` if any field changed.
    pub fn apply_patch(&mut self, patch: &LayerPatch) -> bool {
        let mut changed = false;
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
            changed = true;
        }
        changed |= match &mut self.shape {
            Shape::Rectangle(r) | Shape::Textbox(r) => {
                set(&mut r.x, patch.x) | set(&mut r.y, patch.y) | set(&mut r.width, patch.width) | set(&mut r.height, patch.height)
            }
            Shape::Circle(c) => set(&mut c.x, patch.x) | set(&mut c.y, patch.y) | set(&mut c.radius, patch.radius),
            Shape::Ellipse(e) => {
                set(&mut e.x, patch.x)
                    | set(&mut e.y, patch.y)
                    | set(&mut e.radius_x, patch.radius_x)
                    | set(&mut e.radius_y, patch.radius_y)
            }
            Shape::Polygon(p) => set(&mut p.x, patch.x) | set(&mut p.y, patch.y) | set(&mut p.radius, patch.radius),
            Shape::Star(s) => set(&mut s.x, patch.x) | set(&mut s.y, patch.y) | set(&mut s.radius, patch.radius),
            Shape::Line(l) | Shape::Arrow(l) => {
                set(&mut l.x1, patch.x1)
                    | set(&mut l.y1, patch.y1)
                    | set(&mut l.x2, patch.x2)
                    | set(&mut l.y2, patch.y2)
                    | set_opt(&mut l.control_x, patch.control_x)
                    | set_opt(&mut l.control_y, patch.control_y)
            }
            Shape::Path(p) => match &patch.points {
                Some(points) => {
                    p.points.clone_from(points);
                    true
                }
                None => false,
            },
            Shape::Text(t) => {
                set(&mut t.x, patch.x)
                    | set(&mut t.y, patch.y)
                    | set(&mut t.width, patch.width)
                    | set(&mut t.height, patch.height)
                    | set_opt(&mut t.font_size, patch.font_size)
            }
            Shape::Marker(m) => set(&mut m.x, patch.x) | set(&mut m.y, patch.y) | set_opt(&mut m.size, patch.size),
            Shape::Dimension(d) => {
                set(&mut d.x1, patch.x1) | set(&mut d.y1, patch.y1) | set(&mut d.x2, patch.x2) | set(&mut d.y2, patch.y2)
            }
            Shape::Callout(c) => {
                set(&mut c.x, patch.x)
                    | set(&mut c.y, patch.y)
                    | set(&mut c.width, patch.width)
                    | set(&mut c.height, patch.height)
                    | set_opt(&mut c.tail_tip_x, patch.tail_tip_x)
                    | set_opt(&mut c.tail_tip_y, patch.tail_tip_y)
            }
            Shape::Unknown => false,
        };
        changed
    }
}

fn set(field: &mut f64, value: Option<f64>) -> bool {
    match value {
        Some(v) => {
            *field = v;
            true
        }
        None => false,
    }
}

fn set_opt(field: &mut Option<f64>, value: Option<f64>) -> bool {
    match value {
        Some(v) => {
            *field = Some(v);
            true
        }
        None => false,
    }
}

/// Parse a JSON array of layers, bottom-most first.
///
/// # Errors
///
/// Returns `NotAnArray` if the document is not an array, or `Json` if it is not
/// valid JSON or any element is malformed.
pub fn layers_from_json(text: &str) -> Result<Vec<Layer>, LayerError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(items) = value else {
        return Err(LayerError::NotAnArray);
    };
    let mut layers = Vec::with_capacity(items.len());
    for item in items {
        layers.push(serde_json::from_value(item)?);
    }
    Ok(layers)
}

// =============================================================================
// PATCH
// =============================================================================

/// Sparse update for a layer. Only present fields are applied; an absent
/// field always means "unchanged", never "cleared".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail_tip_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail_tip_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl LayerPatch {
    /// Returns `true` if the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// LAYER LIST
// =============================================================================

/// Layers in z-order: index 0 is drawn first (bottom-most).
#[derive(Debug, Clone, Default)]
pub struct LayerList {
    layers: Vec<Layer>,
}

impl LayerList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Replace all layers with a full snapshot, bottom-most first.
    pub fn load(&mut self, layers: Vec<Layer>) {
        self.layers = layers;
    }

    /// Add a layer on top of the stack, replacing any layer with the same id in place.
    pub fn insert(&mut self, layer: Layer) {
        match self.index_of(&layer.id) {
            Some(i) => self.layers[i] = layer,
            None => self.layers.push(layer),
        }
    }

    /// Remove a layer by id, returning it if it was present.
    pub fn remove(&mut self, id: &LayerId) -> Option<Layer> {
        let index = self.index_of(id)?;
        Some(self.layers.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == *id)
    }

    /// Apply a patch to an existing layer. Returns false if the layer doesn't exist.
    pub fn apply_patch(&mut self, id: &LayerId, patch: &LayerPatch) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.layers[index].apply_patch(patch);
        true
    }

    /// Layers bottom-most first.
    #[must_use]
    pub fn as_slice(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn index_of(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == *id)
    }
}
