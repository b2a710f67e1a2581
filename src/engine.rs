//! Interaction controller: turns pointer events into layer patches.
//!
//! `EngineCore` owns the layer list, the selection, the view transform and
//! the current [`InteractionState`]. Each handler maps the raw client point
//! through the view, hit-tests, advances the state machine, and returns the
//! [`Action`]s the host must carry out (redraw, record history, persist).
//! Patches are applied to the engine's own layer list before they are
//! reported, so engine state and the emitted actions never disagree.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::debug;

use crate::config::{ConfigError, EngineConfig};
use crate::geometry::{Bounds, Point, layer_bounds, normalize_degrees, rotate_vector};
use crate::hit::{self, Handle};
use crate::input::{Button, InteractionState, Modifiers};
use crate::resize::{calculate_resize, translate_patch};
use crate::shape::{Layer, LayerId, LayerList, LayerPatch};
use crate::view::{CanvasRect, ViewTransform};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A layer changed; the patch has already been applied to the engine's copy.
    LayerUpdated { id: LayerId, patch: LayerPatch },
    /// The selection changed to exactly these ids.
    SelectionChanged(Vec<LayerId>),
    /// The marquee to draw, or `None` to stop drawing it.
    MarqueeChanged(Option<Bounds>),
    SetCursor(&'static str),
    RenderNeeded,
}

/// Core engine state. Independent of any browser or drawing backend.
pub struct EngineCore {
    pub layers: LayerList,
    pub view: ViewTransform,
    pub config: EngineConfig,
    pub canvas: CanvasRect,
    selection: Vec<LayerId>,
    state: InteractionState,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            layers: LayerList::new(),
            view: ViewTransform::from_config(&config),
            config,
            canvas: CanvasRect::unscaled(0.0, 0.0, 0.0, 0.0),
            selection: Vec::new(),
            state: InteractionState::Idle,
        }
    }

    /// Like [`EngineCore::new`], but rejects a config that fails [`EngineConfig::validate`].
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn try_new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    // --- Data inputs ---

    /// Replace all layers. Selected ids that no longer exist are dropped.
    pub fn load_layers(&mut self, layers: Vec<Layer>) {
        self.layers.load(layers);
        let layers = &self.layers;
        self.selection.retain(|id| layers.get(id).is_some());
    }

    /// Apply a patch that originated outside the engine (undo, remote edit).
    pub fn apply_patch(&mut self, id: &LayerId, patch: &LayerPatch) -> bool {
        self.layers.apply_patch(id, patch)
    }

    /// Remove a layer, deselecting it if needed.
    pub fn remove_layer(&mut self, id: &LayerId) -> Option<Layer> {
        self.selection.retain(|s| s != id);
        self.layers.remove(id)
    }

    /// Update the canvas element geometry used to map pointer events.
    pub fn set_canvas_rect(&mut self, rect: CanvasRect) {
        self.canvas = rect;
    }

    /// Replace the selection. Unknown ids are ignored.
    pub fn set_selection(&mut self, ids: Vec<LayerId>) {
        let layers = &self.layers;
        self.selection = ids.into_iter().filter(|id| layers.get(id).is_some()).collect();
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> &[LayerId] {
        &self.selection
    }

    #[must_use]
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    #[must_use]
    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.get(id)
    }

    /// Map a client-space pointer position into logical coordinates.
    #[must_use]
    pub fn logical_point(&self, client: Point) -> Point {
        self.view.client_to_logical(client, &self.canvas)
    }

    /// The only selected layer, if exactly one is selected. Handles are shown only then.
    #[must_use]
    pub fn single_selected(&self) -> Option<&Layer> {
        match self.selection.as_slice() {
            [id] => self.layers.get(id),
            _ => None,
        }
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, client: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary || !self.state.is_idle() {
            return Vec::new();
        }
        let p = self.logical_point(client);
        let mut actions = Vec::new();

        if let Some((layer, handle)) = self.handle_under(p) {
            let next = if handle == Handle::Rotate {
                let center = layer_bounds(layer).map_or(p, |b| b.center());
                InteractionState::Rotating {
                    id: layer.id,
                    center,
                    orig_rotation: layer.rotation,
                    start_angle: pointer_angle(center, p),
                }
            } else {
                InteractionState::Resizing { id: layer.id, handle, start: p, original: layer.clone() }
            };
            self.transition(next);
            return actions;
        }

        let tolerance = self.view.screen_dist_to_logical(self.config.line_hit_px);
        if let Some(id) = hit::get_layer_at_point(self.layers.as_slice(), p, tolerance).map(|l| l.id) {
            let selected = self.selection.contains(&id);
            if modifiers.shift && selected {
                self.selection.retain(|s| *s != id);
                actions.push(Action::SelectionChanged(self.selection.clone()));
                return actions;
            }
            if modifiers.shift {
                self.selection.push(id);
                actions.push(Action::SelectionChanged(self.selection.clone()));
            } else if !selected {
                self.selection = vec![id];
                actions.push(Action::SelectionChanged(self.selection.clone()));
            }
            self.transition(InteractionState::Dragging { ids: self.selection.clone(), last: p });
            return actions;
        }

        if !modifiers.shift && !self.selection.is_empty() {
            self.selection.clear();
            actions.push(Action::SelectionChanged(Vec::new()));
        }
        self.transition(InteractionState::MarqueeSelecting { start: p, current: p, additive: modifiers.shift });
        actions
    }

    pub fn on_pointer_move(&mut self, client: Point, modifiers: Modifiers) -> Vec<Action> {
        let p = self.logical_point(client);
        let mut actions = Vec::new();
        let mut state = std::mem::take(&mut self.state);

        match &mut state {
            InteractionState::Idle => actions.push(Action::SetCursor(self.cursor_at(p))),
            InteractionState::Resizing { id, handle, start, original } => {
                let (dx, dy) = (p.x - start.x, p.y - start.y);
                // Everything but the tail tip is resized along the layer's own axes.
                let (dx, dy) = if *handle == Handle::TailTip { (dx, dy) } else { rotate_vector(dx, dy, -original.rotation) };
                if let Some(patch) = calculate_resize(original, *handle, dx, dy, modifiers.resize_options()) {
                    self.push_patch(*id, patch, &mut actions);
                }
            }
            InteractionState::Rotating { id, center, orig_rotation, start_angle } => {
                let mut rotation = *orig_rotation + pointer_angle(*center, p) - *start_angle;
                let snap = self.config.rotation_snap_deg;
                if modifiers.shift && snap > 0.0 {
                    rotation = (rotation / snap).round() * snap;
                }
                let patch = LayerPatch { rotation: Some(normalize_degrees(rotation)), ..Default::default() };
                self.push_patch(*id, patch, &mut actions);
            }
            InteractionState::Dragging { ids, last } => {
                let (dx, dy) = (p.x - last.x, p.y - last.y);
                for id in ids.iter() {
                    let patch = self.layers.get(id).and_then(|layer| translate_patch(layer, dx, dy));
                    if let Some(patch) = patch {
                        self.push_patch(*id, patch, &mut actions);
                    }
                }
                *last = p;
            }
            InteractionState::MarqueeSelecting { start, current, .. } => {
                *current = p;
                actions.push(Action::MarqueeChanged(Some(hit::marquee_rect(*start, p))));
            }
        }

        self.state = state;
        if actions.iter().any(|a| !matches!(a, Action::SetCursor(_))) {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    pub fn on_pointer_up(&mut self, client: Point, _modifiers: Modifiers) -> Vec<Action> {
        if self.state.is_idle() {
            return Vec::new();
        }
        let p = self.logical_point(client);
        let mut actions = Vec::new();

        if let InteractionState::MarqueeSelecting { start, additive, .. } = &self.state {
            let rect = hit::marquee_rect(*start, p);
            let hits = hit::layers_in_marquee(self.layers.as_slice(), &rect);
            if !*additive {
                self.selection.clear();
            }
            for id in hits {
                if !self.selection.contains(&id) {
                    self.selection.push(id);
                }
            }
            debug!(selected = self.selection.len(), "marquee selection");
            actions.push(Action::MarqueeChanged(None));
            actions.push(Action::SelectionChanged(self.selection.clone()));
        }

        self.transition(InteractionState::Idle);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Zoom about the pointer. Positive `delta_y` (scrolling down) zooms out.
    pub fn on_wheel(&mut self, client: Point, delta_y: f64, _modifiers: Modifiers) -> Vec<Action> {
        let anchor = self.logical_point(client);
        self.view.mark_user_zoom();
        render_if(self.view.zoom_by(-delta_y * self.config.wheel_zoom_sensitivity, anchor))
    }

    // --- View ---

    /// Click-to-zoom at the pointer: one `zoom_step` in, or out when `zoom_out` is set.
    pub fn click_zoom(&mut self, client: Point, zoom_out: bool) -> Vec<Action> {
        let anchor = self.logical_point(client);
        render_if(self.view.click_zoom(anchor, zoom_out, self.config.zoom_step))
    }

    /// Drag-to-zoom about `anchor_client` (the press point). `dy_px` is the
    /// vertical motion since the previous event; dragging up zooms in.
    pub fn drag_zoom(&mut self, anchor_client: Point, dy_px: f64) -> Vec<Action> {
        let anchor = self.logical_point(anchor_client);
        render_if(self.view.drag_zoom(dy_px, anchor, self.config.drag_zoom_sensitivity))
    }

    /// Fit an image of `content` logical pixels into the canvas, unless the user has zoomed.
    pub fn fit_to_window(&mut self, content: (f64, f64)) -> Vec<Action> {
        let viewport = (self.canvas.device_width, self.canvas.device_height);
        render_if(self.view.fit_to_window(content, viewport))
    }

    /// Pan by a device-space delta, keeping `pan_margin_px` of the content on screen.
    pub fn pan_by(&mut self, dx: f64, dy: f64, content: (f64, f64)) -> Vec<Action> {
        let viewport = (self.canvas.device_width, self.canvas.device_height);
        self.view.pan_by(dx, dy);
        self.view.constrain_pan(content, viewport, self.config.pan_margin_px);
        vec![Action::RenderNeeded]
    }

    // --- Internals ---

    fn transition(&mut self, next: InteractionState) {
        debug!(from = self.state.name(), to = next.name(), "interaction state changed");
        self.state = next;
    }

    fn push_patch(&mut self, id: LayerId, patch: LayerPatch, actions: &mut Vec<Action>) {
        if self.layers.apply_patch(&id, &patch) {
            actions.push(Action::LayerUpdated { id, patch });
        }
    }

    fn handle_under(&self, p: Point) -> Option<(&Layer, Handle)> {
        let layer = self.single_selected()?;
        let handle = hit::hit_test_selection_handles(layer, p, self.view.zoom, &self.config)?;
        Some((layer, handle))
    }

    fn cursor_at(&self, p: Point) -> &'static str {
        if let Some((layer, handle)) = self.handle_under(p) {
            return hit::resize_cursor(handle, layer.rotation);
        }
        let tolerance = self.view.screen_dist_to_logical(self.config.line_hit_px);
        if hit::get_layer_at_point(self.layers.as_slice(), p, tolerance).is_some() { "move" } else { "default" }
    }
}

fn render_if(changed: bool) -> Vec<Action> {
    if changed { vec![Action::RenderNeeded] } else { Vec::new() }
}

/// Clockwise angle of `p` around `center`, in degrees, with 0 pointing up.
fn pointer_angle(center: Point, p: Point) -> f64 {
    (p.y - center.y).atan2(p.x - center.x).to_degrees() + 90.0
}
