//! Geometry and coordinate-transform engine for the layer overlay editor.
//!
//! The editor draws annotation layers (rectangles, ellipses, arrows, paths,
//! callouts, ...) over a raster image on a zoomable, pannable canvas. This
//! crate owns every piece of that editor with real geometry in it: resize
//! handle math, hit-testing, and the client ↔ logical coordinate mapping.
//! Drawing, history, persistence and toolbar wiring live in the host and
//! consume the [`shape::LayerPatch`]es and [`engine::Action`]s produced here.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Interaction controller: pointer state machine over layers, selection and view |
//! | [`shape`] | Layer model, the per-type [`shape::Shape`] sum type, sparse patches |
//! | [`geometry`] | Points, rects, per-type bounds, rotation helpers |
//! | [`resize`] | Per-type resize math and rotation correction |
//! | [`hit`] | Selection handles, point-in-layer tests, marquee selection |
//! | [`view`] | Zoom/pan view transform and pointer mapping |
//! | [`input`] | Modifier keys, buttons, and the interaction state enum |
//! | [`config`] | Tunable engine settings |
//! | [`consts`] | Shared numeric constants (zoom limits, minimum sizes, etc.) |

pub mod config;
pub mod consts;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod resize;
pub mod shape;
pub mod view;
