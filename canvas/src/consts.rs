//! Shared numeric constants for the canvas crate.

// ── Objects ─────────────────────────────────────────────────────

/// Minimum width and height of an overlay object, in canvas units.
pub const MIN_OBJECT_SIZE: f64 = 50.0;

/// Default size of a new text box.
pub const TEXT_DEFAULT_SIZE: (f64, f64) = (150.0, 50.0);

/// Default size of a new circle or rectangle.
pub const SHAPE_DEFAULT_SIZE: (f64, f64) = (150.0, 100.0);

/// Default size of a new image, audio, or location object.
pub const MEDIA_DEFAULT_SIZE: (f64, f64) = (200.0, 150.0);

/// Default outline width for new shapes.
pub const SHAPE_DEFAULT_STROKE_WIDTH: f64 = 2.0;

// ── Gestures ────────────────────────────────────────────────────

/// Distance from a shape's bounding box edge, in screen pixels, within which
/// a resize grabs that edge.
pub const SHAPE_EDGE_THRESHOLD_PX: f64 = 20.0;

// ── Zoom ────────────────────────────────────────────────────────

/// Zoom level, in percent, at which screen and canvas units coincide.
pub const DEFAULT_ZOOM_PERCENT: f64 = 100.0;

/// Lower bound for the zoom setting, in percent.
pub const MIN_ZOOM_PERCENT: f64 = 10.0;

/// Upper bound for the zoom setting, in percent.
pub const MAX_ZOOM_PERCENT: f64 = 500.0;
