//! View transform: zoom and pan over the logical canvas.
//!
//! Logical coordinates are the image's own pixel space. A pointer event
//! arrives in client (CSS) pixels; it is first scaled into the canvas
//! element's backing-store pixels, then the pan and zoom are undone:
//!
//! ```text
//! device  = (client - rect_origin) * (device_size / displayed_size)
//! logical = (device - pan) / zoom
//! ```
//!
//! Every zoom change goes through [`ViewTransform::set_zoom`], which keeps
//! a chosen anchor point at the same screen position.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use tracing::debug;

use crate::config::EngineConfig;
use crate::consts::{MAX_ZOOM, MIN_ZOOM};
use crate::geometry::Point;

/// The canvas element's on-screen rect and backing-store size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    /// Client-space left edge of the element.
    pub left: f64,
    /// Client-space top edge of the element.
    pub top: f64,
    /// Displayed (CSS) width.
    pub width: f64,
    /// Displayed (CSS) height.
    pub height: f64,
    /// Backing-store width in device pixels.
    pub device_width: f64,
    /// Backing-store height in device pixels.
    pub device_height: f64,
}

impl CanvasRect {
    /// An element whose backing store matches its displayed size.
    #[must_use]
    pub fn unscaled(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height, device_width: width, device_height: height }
    }
}

/// Zoom and pan state for one editor instance.
///
/// `pan_x` / `pan_y` are device pixels; `zoom` is a scale factor (1.0 = 100%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    min_zoom: f64,
    max_zoom: f64,
    user_has_set_zoom: bool,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(MIN_ZOOM, MAX_ZOOM)
    }
}

impl ViewTransform {
    /// Identity view with the given zoom bounds.
    ///
    /// Bounds that are not positive and finite fall back to the defaults; an
    /// inverted pair is swapped.
    #[must_use]
    pub fn new(min_zoom: f64, max_zoom: f64) -> Self {
        let valid = |z: f64| z.is_finite() && z > 0.0;
        let min_zoom = if valid(min_zoom) { min_zoom } else { MIN_ZOOM };
        let max_zoom = if valid(max_zoom) { max_zoom } else { MAX_ZOOM };
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom { (min_zoom, max_zoom) } else { (max_zoom, min_zoom) };
        Self { zoom: 1.0, pan_x: 0.0, pan_y: 0.0, min_zoom, max_zoom, user_has_set_zoom: false }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.min_zoom, config.max_zoom)
    }

    #[must_use]
    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    #[must_use]
    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    /// Whether the user explicitly zoomed since the last [`reset`](Self::reset).
    #[must_use]
    pub fn user_has_set_zoom(&self) -> bool {
        self.user_has_set_zoom
    }

    /// Record an explicit user zoom so automatic fitting leaves it alone.
    pub fn mark_user_zoom(&mut self) {
        self.user_has_set_zoom = true;
    }

    // --- Mapping ---

    /// Scale a client-space point into the canvas backing store.
    #[must_use]
    pub fn client_to_device(client: Point, rect: &CanvasRect) -> Point {
        let scale_x = if rect.width > 0.0 { rect.device_width / rect.width } else { 1.0 };
        let scale_y = if rect.height > 0.0 { rect.device_height / rect.height } else { 1.0 };
        Point::new((client.x - rect.left) * scale_x, (client.y - rect.top) * scale_y)
    }

    /// Map a raw pointer position to logical canvas coordinates.
    #[must_use]
    pub fn client_to_logical(&self, client: Point, rect: &CanvasRect) -> Point {
        self.screen_to_logical(Self::client_to_device(client, rect))
    }

    /// Convert a device-space point to logical coordinates.
    #[must_use]
    pub fn screen_to_logical(&self, screen: Point) -> Point {
        Point::new((screen.x - self.pan_x) / self.zoom, (screen.y - self.pan_y) / self.zoom)
    }

    /// Convert a logical point to device-space coordinates.
    #[must_use]
    pub fn logical_to_screen(&self, logical: Point) -> Point {
        Point::new(logical.x * self.zoom + self.pan_x, logical.y * self.zoom + self.pan_y)
    }

    /// Convert a screen-space distance to a logical distance.
    #[must_use]
    pub fn screen_dist_to_logical(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    // --- Zoom ---

    /// Change zoom by `delta`, keeping `anchor`'s screen position fixed.
    ///
    /// Returns `false` when the clamped target equals the current zoom.
    pub fn zoom_by(&mut self, delta: f64, anchor: Point) -> bool {
        if !delta.is_finite() {
            return false;
        }
        self.set_zoom(self.zoom + delta, anchor)
    }

    /// Set an absolute zoom, keeping `anchor`'s screen position fixed.
    pub fn set_zoom(&mut self, target: f64, anchor: Point) -> bool {
        if !target.is_finite() {
            return false;
        }
        let target = target.clamp(self.min_zoom, self.max_zoom);
        if target == self.zoom {
            return false;
        }
        let screen_before = self.logical_to_screen(anchor);
        self.zoom = target;
        self.pan_x = screen_before.x - self.zoom * anchor.x;
        self.pan_y = screen_before.y - self.zoom * anchor.y;
        debug!(zoom = self.zoom, pan_x = self.pan_x, pan_y = self.pan_y, "zoom changed");
        true
    }

    /// Click-to-zoom: one fixed step in, or out when `zoom_out` is set.
    pub fn click_zoom(&mut self, anchor: Point, zoom_out: bool, step: f64) -> bool {
        self.mark_user_zoom();
        let delta = if zoom_out { -step } else { step };
        self.zoom_by(delta, anchor)
    }

    /// Drag-to-zoom: upward motion (negative `dy_px`) zooms in.
    pub fn drag_zoom(&mut self, dy_px: f64, anchor: Point, sensitivity: f64) -> bool {
        self.mark_user_zoom();
        self.zoom_by(-dy_px * sensitivity, anchor)
    }

    /// Fit `content` into `viewport` and center it, unless the user has zoomed.
    ///
    /// Returns `false` (and leaves the view alone) after an explicit user zoom
    /// or for empty content.
    pub fn fit_to_window(&mut self, content: (f64, f64), viewport: (f64, f64)) -> bool {
        if self.user_has_set_zoom {
            debug!("fit to window skipped: user zoom in effect");
            return false;
        }
        let (cw, ch) = content;
        let (vw, vh) = viewport;
        if cw <= 0.0 || ch <= 0.0 || vw <= 0.0 || vh <= 0.0 {
            return false;
        }
        self.zoom = (vw / cw).min(vh / ch).clamp(self.min_zoom, self.max_zoom);
        self.pan_x = (vw - cw * self.zoom) * 0.5;
        self.pan_y = (vh - ch * self.zoom) * 0.5;
        debug!(zoom = self.zoom, "fit to window");
        true
    }

    /// Back to 100% at the origin, forgetting any user zoom.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        self.user_has_set_zoom = false;
    }

    // --- Pan ---

    /// Shift the view by a device-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Clamp pan so at least `margin` pixels of `content` stay inside `viewport` on each axis.
    pub fn constrain_pan(&mut self, content: (f64, f64), viewport: (f64, f64), margin: f64) {
        self.pan_x = constrain_axis(self.pan_x, content.0 * self.zoom, viewport.0, margin);
        self.pan_y = constrain_axis(self.pan_y, content.1 * self.zoom, viewport.1, margin);
    }
}

/// Keep `[pan, pan + extent]` overlapping `[0, viewport]` by at least `margin`.
fn constrain_axis(pan: f64, extent: f64, viewport: f64, margin: f64) -> f64 {
    let margin = margin.min(extent).min(viewport).max(0.0);
    let lo = margin - extent;
    let hi = viewport - margin;
    if lo <= hi { pan.clamp(lo, hi) } else { (lo + hi) * 0.5 }
}
