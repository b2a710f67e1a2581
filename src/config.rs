//! Tunable engine settings.
//!
//! DESIGN
//! ======
//! Every field defaults to the matching constant in [`crate::consts`], so an
//! embedding editor only writes the settings it wants to change. Settings can
//! come from a JSON object and then be overridden per field from `LAYERS_*`
//! environment variables. Overrides that fail to parse are logged and
//! skipped; structural problems (an inverted zoom range, a non-positive
//! tolerance) are reported by [`EngineConfig::validate`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::{
    DRAG_ZOOM_SENSITIVITY, HANDLE_HIT_PX, LINE_HIT_PX, LINE_SIDE_HANDLE_OFFSET_PX, MAX_ZOOM, MIN_ZOOM, PAN_MARGIN_PX,
    ROTATE_HANDLE_OFFSET_PX, ROTATION_SNAP_DEG, WHEEL_ZOOM_SENSITIVITY, ZOOM_STEP,
};

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid zoom range: min {min} must be positive and not above max {max}")]
    InvalidZoomRange { min: f64, max: f64 },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
}

// =============================================================================
// CONFIG
// =============================================================================

/// Engine settings. Pixel values are screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom increment for click-to-zoom.
    pub zoom_step: f64,
    /// Zoom change per pixel of vertical drag-to-zoom.
    pub drag_zoom_sensitivity: f64,
    /// Zoom change per pixel of wheel delta.
    pub wheel_zoom_sensitivity: f64,
    pub handle_hit_px: f64,
    pub rotate_handle_offset_px: f64,
    pub line_side_handle_offset_px: f64,
    pub line_hit_px: f64,
    /// Rotation step while the snap modifier is held, in degrees.
    pub rotation_snap_deg: f64,
    /// Content that must stay on screen when panning is constrained.
    pub pan_margin_px: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: ZOOM_STEP,
            drag_zoom_sensitivity: DRAG_ZOOM_SENSITIVITY,
            wheel_zoom_sensitivity: WHEEL_ZOOM_SENSITIVITY,
            handle_hit_px: HANDLE_HIT_PX,
            rotate_handle_offset_px: ROTATE_HANDLE_OFFSET_PX,
            line_side_handle_offset_px: LINE_SIDE_HANDLE_OFFSET_PX,
            line_hit_px: LINE_HIT_PX,
            rotation_snap_deg: ROTATION_SNAP_DEG,
            pan_margin_px: PAN_MARGIN_PX,
        }
    }
}

impl EngineConfig {
    /// Parse settings from a JSON object. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Json` for malformed input, or the first `validate` failure.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `LAYERS_*` environment overrides on top of `self`.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Apply overrides from any key lookup. Unparseable values are skipped with a warning.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&str, &mut f64); 11] = [
            ("LAYERS_MIN_ZOOM", &mut self.min_zoom),
            ("LAYERS_MAX_ZOOM", &mut self.max_zoom),
            ("LAYERS_ZOOM_STEP", &mut self.zoom_step),
            ("LAYERS_DRAG_ZOOM_SENSITIVITY", &mut self.drag_zoom_sensitivity),
            ("LAYERS_WHEEL_ZOOM_SENSITIVITY", &mut self.wheel_zoom_sensitivity),
            ("LAYERS_HANDLE_HIT_PX", &mut self.handle_hit_px),
            ("LAYERS_ROTATE_HANDLE_OFFSET_PX", &mut self.rotate_handle_offset_px),
            ("LAYERS_LINE_SIDE_HANDLE_OFFSET_PX", &mut self.line_side_handle_offset_px),
            ("LAYERS_LINE_HIT_PX", &mut self.line_hit_px),
            ("LAYERS_ROTATION_SNAP_DEG", &mut self.rotation_snap_deg),
            ("LAYERS_PAN_MARGIN_PX", &mut self.pan_margin_px),
        ];
        for (key, field) in fields {
            let Some(raw) = lookup(key) else {
                continue;
            };
            match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => *field = value,
                _ => warn!(key, value = %raw, "ignoring unparseable config override"),
            }
        }
        self
    }

    /// Check structural constraints.
    ///
    /// # Errors
    ///
    /// Returns `InvalidZoomRange` if `min_zoom` is not positive or exceeds
    /// `max_zoom`, and `NonPositive` for a non-positive step, sensitivity or
    /// tolerance.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_zoom <= 0.0 || self.min_zoom > self.max_zoom {
            return Err(ConfigError::InvalidZoomRange { min: self.min_zoom, max: self.max_zoom });
        }
        let positive = [
            ("zoom_step", self.zoom_step),
            ("drag_zoom_sensitivity", self.drag_zoom_sensitivity),
            ("wheel_zoom_sensitivity", self.wheel_zoom_sensitivity),
            ("handle_hit_px", self.handle_hit_px),
            ("line_hit_px", self.line_hit_px),
            ("rotation_snap_deg", self.rotation_snap_deg),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }
}
