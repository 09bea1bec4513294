//! Input model: interaction modes, the settings snapshot, and the gesture state machine.
//!
//! `Settings` is the shared tool state (mode, zoom, brush, typography). It is
//! an immutable value updated only through [`Settings::reduce`], and the
//! dispatcher reads it from its own copy rather than from ambient state.
//! `InputState` tracks the single gesture in progress between pointer-down and
//! pointer-up, carrying the context needed to compute each frame's mutation.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::consts::{DEFAULT_ZOOM_PERCENT, MAX_ZOOM_PERCENT, MIN_ZOOM_PERCENT};
use crate::doc::{ObjectId, Stroke, StrokeMode};
use crate::hit::ResizeHandle;

/// Which interaction is wired to the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Select objects; selected text follows style changes.
    #[default]
    Select,
    /// Read-only browsing.
    View,
    /// Freehand drawing.
    Draw,
    /// Freehand erasing.
    Erase,
    /// Drag objects.
    Move,
    /// Resize objects.
    Resize,
    /// Rotate objects that have a rotation attribute.
    Rotate,
    /// Delete objects on click.
    Delete,
    /// Place text boxes.
    Text,
    /// Place images (content supplied by the upload collaborator).
    Image,
    /// Place audio clips (content supplied by the upload collaborator).
    Audio,
    /// Place map pins (content supplied by the geocoding collaborator).
    Location,
    /// Place circles.
    Circle,
    /// Place rectangles.
    Rectangle,
}

impl Mode {
    /// The stroke compositing mode, for freehand modes.
    #[must_use]
    pub fn stroke_mode(self) -> Option<StrokeMode> {
        match self {
            Self::Draw => Some(StrokeMode::Draw),
            Self::Erase => Some(StrokeMode::Erase),
            _ => None,
        }
    }

    /// Whether this mode places new objects.
    #[must_use]
    pub fn is_creation(self) -> bool {
        matches!(self, Self::Text | Self::Image | Self::Audio | Self::Location | Self::Circle | Self::Rectangle)
    }
}

/// Snapshot of the shared tool settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub mode: Mode,
    /// Zoom in percent; `100` is 1:1.
    pub zoom: f64,
    /// Brush size for strokes.
    pub size: f64,
    /// Current colour for strokes, text, and shapes.
    pub color: String,
    pub font_size: f64,
    pub font_family: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::Select,
            zoom: DEFAULT_ZOOM_PERCENT,
            size: 33.0,
            color: "#000000".to_owned(),
            font_size: 16.0,
            font_family: "Inter, system-ui, -apple-system, sans-serif".to_owned(),
        }
    }
}

/// One update to [`Settings`].
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsAction {
    SetMode(Mode),
    SetZoom(f64),
    SetSize(f64),
    SetColor(String),
    SetFontSize(f64),
    SetFontFamily(String),
}

impl SettingsAction {
    /// Whether this action changes the style a selected object should adopt.
    #[must_use]
    pub fn is_style(&self) -> bool {
        matches!(self, Self::SetColor(_) | Self::SetFontSize(_) | Self::SetFontFamily(_))
    }
}

impl Settings {
    /// Return the settings with `action` applied. Zoom is clamped to the
    /// supported range so the zoom factor is never zero.
    #[must_use]
    pub fn reduce(self, action: SettingsAction) -> Self {
        match action {
            SettingsAction::SetMode(mode) => Self { mode, ..self },
            SettingsAction::SetZoom(zoom) => {
                let zoom = if zoom.is_finite() { zoom.clamp(MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT) } else { self.zoom };
                Self { zoom, ..self }
            }
            SettingsAction::SetSize(size) => Self { size, ..self },
            SettingsAction::SetColor(color) => Self { color, ..self },
            SettingsAction::SetFontSize(font_size) => Self { font_size, ..self },
            SettingsAction::SetFontFamily(font_family) => Self { font_family, ..self },
        }
    }
}

/// A gesture in progress. Each variant carries the context captured at
/// pointer-down; moves are computed against it rather than accumulated
/// frame-to-frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Freehand stroke being drawn; points are appended per move.
    Drawing { stroke: Stroke },
    /// Moving an object.
    Dragging {
        id: ObjectId,
        /// Screen-space pointer position at pointer-down.
        start_screen: Point,
        orig_x: f64,
        orig_y: f64,
    },
    /// Resizing a non-shape object, keeping its aspect ratio.
    Resizing {
        id: ObjectId,
        start_screen: Point,
        orig_w: f64,
        orig_h: f64,
        /// Width / height at pointer-down.
        aspect: f64,
    },
    /// Resizing a circle or rectangle from its nearest edge or corner.
    ResizingShape {
        id: ObjectId,
        handle: ResizeHandle,
        start_screen: Point,
        orig_x: f64,
        orig_y: f64,
        orig_w: f64,
        orig_h: f64,
    },
    /// Rotating an object about its screen-space centre.
    Rotating {
        id: ObjectId,
        center_screen: Point,
        /// Pointer angle at pointer-down, in degrees.
        start_angle: f64,
        /// Object rotation at pointer-down, in degrees.
        orig_rotation: f64,
    },
}

/// Gesture machine: `Idle` until pointer-down starts a gesture, `Active`
/// until pointer-up (or cancel) ends it. Ending always returns to `Idle`, so
/// the end handler runs exactly once per start.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputState {
    #[default]
    Idle,
    Active(Gesture),
}

impl InputState {
    /// Begin a gesture. Returns `false` and keeps the current gesture if one
    /// is already active.
    pub fn start(&mut self, gesture: Gesture) -> bool {
        if self.is_active() {
            return false;
        }
        *self = Self::Active(gesture);
        true
    }

    /// Mutable access to the active gesture, if any.
    pub fn active_mut(&mut self) -> Option<&mut Gesture> {
        match self {
            Self::Idle => None,
            Self::Active(g) => Some(g),
        }
    }

    /// End the active gesture, returning it and resetting to `Idle`.
    pub fn finish(&mut self) -> Option<Gesture> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Active(g) => Some(g),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}
