//! Shared numeric constants for the engine.

// ── Zoom ────────────────────────────────────────────────────────

/// Smallest zoom factor the view accepts.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest zoom factor the view accepts.
pub const MAX_ZOOM: f64 = 5.0;

/// Zoom increment for a single click-to-zoom.
pub const ZOOM_STEP: f64 = 0.25;

/// Zoom change per screen pixel of vertical drag-to-zoom motion.
pub const DRAG_ZOOM_SENSITIVITY: f64 = 0.01;

/// Zoom change per wheel pixel.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.001;

/// Screen pixels of content that must stay visible when panning is constrained.
pub const PAN_MARGIN_PX: f64 = 50.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for selection handles.
pub const HANDLE_HIT_PX: f64 = 8.0;

/// Distance from the top edge to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

/// Offset of a line's perpendicular `n`/`s` handles from its midpoint, in screen pixels.
pub const LINE_SIDE_HANDLE_OFFSET_PX: f64 = 12.0;

/// Screen-space slop for thin shapes (lines, open paths).
pub const LINE_HIT_PX: f64 = 6.0;

/// Number of segments used to sample a quadratic curve for hit-testing.
pub const CURVE_SAMPLES: usize = 24;

/// Rotation step applied while the snap modifier is held, in degrees.
pub const ROTATION_SNAP_DEG: f64 = 15.0;

// ── Resize limits ───────────────────────────────────────────────

/// Minimum radius for circles, ellipse axes, polygons and stars.
pub const MIN_RADIUS: f64 = 5.0;

/// Marker size bounds.
pub const MIN_MARKER_SIZE: f64 = 10.0;
pub const MAX_MARKER_SIZE: f64 = 200.0;

/// Text font size bounds.
pub const MIN_FONT_SIZE: f64 = 1.0;
pub const MAX_FONT_SIZE: f64 = 1000.0;

/// Bounding boxes with both sides below this are too small to scale.
pub const DEGENERATE_EPSILON: f64 = 1e-6;

// ── Defaults ────────────────────────────────────────────────────

/// Font size assumed when a text layer does not carry one.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Marker size assumed when a marker layer does not carry one.
pub const DEFAULT_MARKER_SIZE: f64 = 24.0;

/// Callout tail length when unset.
pub const DEFAULT_TAIL_SIZE: f64 = 20.0;

/// Callout tail position along its edge when unset.
pub const DEFAULT_TAIL_POSITION: f64 = 0.5;

/// Side count for polygons when unset.
pub const DEFAULT_POLYGON_SIDES: u32 = 6;

/// Point count for stars when unset.
pub const DEFAULT_STAR_POINTS: u32 = 5;

/// Inner-to-outer radius ratio for stars without an explicit inner radius.
pub const STAR_INNER_RATIO: f64 = 0.5;
