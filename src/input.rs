//! Input model: modifier keys, mouse buttons, and the interaction state machine.
//!
//! `Modifiers` captures the user's intent at the time of a pointer event.
//! `InteractionState` is the active gesture being tracked between
//! pointer-down and pointer-up, carrying the context needed to turn later
//! pointer positions into layer patches.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::geometry::Point;
use crate::hit::Handle;
use crate::resize::ResizeOptions;
use crate::shape::{Layer, LayerId};

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift: proportional resize, additive selection, snapped rotation.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option: resize from the center.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Resize modes selected by these modifiers.
    #[must_use]
    pub fn resize_options(self) -> ResizeOptions {
        ResizeOptions { proportional: self.shift, from_center: self.alt }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// The gesture in progress between pointer-down and pointer-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    /// No gesture; pointer moves only update the cursor.
    #[default]
    Idle,
    /// A selection handle is being dragged.
    Resizing {
        id: LayerId,
        handle: Handle,
        /// Logical pointer position at press time.
        start: Point,
        /// The layer as it was at press time; every move resizes from this snapshot.
        original: Layer,
    },
    /// The rotate handle is being dragged.
    Rotating {
        id: LayerId,
        /// Rotation pivot in logical space.
        center: Point,
        /// Layer rotation in degrees at press time.
        orig_rotation: f64,
        /// Pointer angle around `center` at press time, in degrees.
        start_angle: f64,
    },
    /// Selected layers are being moved.
    Dragging {
        ids: Vec<LayerId>,
        /// Logical pointer position at the previous event.
        last: Point,
    },
    /// A marquee rectangle is being drawn over empty canvas.
    MarqueeSelecting {
        start: Point,
        current: Point,
        /// Add hits to the existing selection instead of replacing it.
        additive: bool,
    },
}

impl InteractionState {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resizing { .. } => "resizing",
            Self::Rotating { .. } => "rotating",
            Self::Dragging { .. } => "dragging",
            Self::MarqueeSelecting { .. } => "marquee",
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
