//! Local mutation dispatcher.
//!
//! The [`Engine`] turns pointer gestures and edit commands into document
//! mutations. Every handler applies its mutation to the document immediately
//! (optimistically) and returns the matching [`Action`]s, which the host
//! serializes and sends to peers in the same tick. Handlers never fail: a
//! gesture that would violate an invariant (size floor, rotation on a variant
//! without one, stale id) simply produces no action.
//!
//! Gestures are gated by [`Mode`]: pointer-down starts only the gesture the
//! current mode wires up, and pointer-move / pointer-up drive whichever
//! gesture is active.

use crate::camera::{Camera, Point, angle_deg};
use crate::consts::{
    MEDIA_DEFAULT_SIZE, MIN_OBJECT_SIZE, SHAPE_DEFAULT_SIZE, SHAPE_DEFAULT_STROKE_WIDTH, SHAPE_EDGE_THRESHOLD_PX,
    TEXT_DEFAULT_SIZE,
};
use crate::doc::{DrawPoint, Document, Mutation, ObjectId, ObjectKind, OverlayObject, Stroke, new_object_id};
use crate::hit::ResizeHandle;
use crate::input::{Gesture, InputState, Mode, Settings, SettingsAction};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from handlers for the host to broadcast.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A stroke point for peers to render; the document is unchanged until the stroke ends.
    DrawProgress(DrawPoint),
    /// A finished stroke was appended.
    StrokeAdded(Stroke),
    /// An object was created.
    ObjectAdded(OverlayObject),
    /// An object was replaced with this value.
    ObjectUpdated(OverlayObject),
    /// An object was removed.
    ObjectDeleted(ObjectId),
}

/// Style fields to change on one object. Absent fields are left alone;
/// fields a variant does not have are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylePatch {
    pub color: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub stroke_width: Option<f64>,
}

/// Dispatcher state: the document, the settings snapshot, and the gesture machine.
#[derive(Debug, Default)]
pub struct Engine {
    pub doc: Document,
    pub settings: Settings,
    pub input: InputState,
    /// Object whose style follows settings changes.
    pub selected_id: Option<ObjectId>,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine over an already-loaded document.
    #[must_use]
    pub fn with_document(doc: Document) -> Self {
        Self { doc, ..Self::default() }
    }

    // --- Data inputs ---

    /// Replace the document content, abandoning any gesture in progress.
    pub fn load_content(&mut self, content: Document) {
        self.input = InputState::Idle;
        self.selected_id = None;
        self.commit(Mutation::InitContent(content));
    }

    /// Apply a mutation received from a peer. Uses the same reducers as local edits.
    pub fn apply_remote(&mut self, mutation: Mutation) {
        if let Mutation::DeleteObject(id) = &mutation {
            if self.selected_id.as_ref() == Some(id) {
                self.selected_id = None;
            }
        }
        self.commit(mutation);
    }

    fn commit(&mut self, mutation: Mutation) {
        self.doc = std::mem::take(&mut self.doc).apply(mutation);
    }

    fn replace(&mut self, object: OverlayObject) -> Vec<Action> {
        self.commit(Mutation::UpdateObject(object.clone()));
        vec![Action::ObjectUpdated(object)]
    }

    // --- Settings / viewport ---

    /// Update the settings snapshot. Style changes are also applied to the
    /// selected object.
    pub fn update_settings(&mut self, action: SettingsAction) -> Vec<Action> {
        let patch = match &action {
            SettingsAction::SetColor(c) => StylePatch { color: Some(c.clone()), ..StylePatch::default() },
            SettingsAction::SetFontSize(s) => StylePatch { font_size: Some(*s), ..StylePatch::default() },
            SettingsAction::SetFontFamily(f) => StylePatch { font_family: Some(f.clone()), ..StylePatch::default() },
            _ => StylePatch::default(),
        };
        let is_style = action.is_style();
        self.settings = std::mem::take(&mut self.settings).reduce(action);

        match (is_style, self.selected_id.clone()) {
            (true, Some(id)) => self.set_style(&id, &patch),
            _ => Vec::new(),
        }
    }

    /// Update the viewport size in CSS pixels.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Select an object (or clear the selection).
    pub fn select(&mut self, id: Option<ObjectId>) {
        self.selected_id = id;
    }

    /// The camera for the current zoom setting and viewport.
    #[must_use]
    pub fn camera(&self) -> Camera {
        Camera::from_percent(self.settings.zoom, self.viewport_width, self.viewport_height)
    }

    // --- Pointer gestures ---

    /// Pointer pressed at `screen`, over `target` if it hit an object.
    pub fn on_pointer_down(&mut self, screen: Point, target: Option<&str>) -> Vec<Action> {
        if self.input.is_active() {
            return Vec::new();
        }
        let cam = self.camera();
        let mode = self.settings.mode;

        if let Some(stroke_mode) = mode.stroke_mode() {
            let p = cam.screen_to_canvas(screen);
            let stroke = Stroke {
                mode: stroke_mode,
                color: self.settings.color.clone(),
                size: self.settings.size,
                path: vec![p],
            };
            let point = draw_point(&stroke, p, true);
            self.input.start(Gesture::Drawing { stroke });
            return vec![Action::DrawProgress(point)];
        }

        match (mode, target) {
            (Mode::Select, target) => {
                self.select(target.map(ToOwned::to_owned));
                Vec::new()
            }
            (Mode::Delete, Some(id)) => self.delete_object(id),
            (Mode::Move, Some(id)) => {
                if let Some(obj) = self.doc.object(id) {
                    let gesture =
                        Gesture::Dragging { id: obj.id.clone(), start_screen: screen, orig_x: obj.x, orig_y: obj.y };
                    self.input.start(gesture);
                }
                Vec::new()
            }
            (Mode::Resize, Some(id)) => {
                if let Some(obj) = self.doc.object(id) {
                    let gesture = if obj.kind.is_shape() {
                        let rect = cam.object_screen_rect(obj.x, obj.y, obj.width, obj.height);
                        Gesture::ResizingShape {
                            id: obj.id.clone(),
                            handle: ResizeHandle::nearest(&rect, screen, SHAPE_EDGE_THRESHOLD_PX),
                            start_screen: screen,
                            orig_x: obj.x,
                            orig_y: obj.y,
                            orig_w: obj.width,
                            orig_h: obj.height,
                        }
                    } else {
                        let aspect = aspect_ratio(obj.width, obj.height);
                        Gesture::Resizing {
                            id: obj.id.clone(),
                            start_screen: screen,
                            orig_w: obj.width,
                            orig_h: obj.height,
                            aspect,
                        }
                    };
                    self.input.start(gesture);
                }
                Vec::new()
            }
            (Mode::Rotate, Some(id)) => {
                if let Some(obj) = self.doc.object(id) {
                    if let Some(orig_rotation) = obj.kind.rotation() {
                        let center_screen = cam.object_screen_rect(obj.x, obj.y, obj.width, obj.height).center();
                        let gesture = Gesture::Rotating {
                            id: obj.id.clone(),
                            center_screen,
                            start_angle: angle_deg(center_screen, screen),
                            orig_rotation,
                        };
                        self.input.start(gesture);
                    }
                }
                Vec::new()
            }
            (_, None) if mode.is_creation() => match self.default_kind(mode) {
                Some(kind) => self.create_object(kind, cam.screen_to_canvas(screen)),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Pointer moved to `screen` while pressed.
    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
        let cam = self.camera();
        let Some(gesture) = self.input.active_mut() else {
            return Vec::new();
        };

        match gesture {
            Gesture::Drawing { stroke } => {
                let p = cam.screen_to_canvas(screen);
                stroke.path.push(p);
                vec![Action::DrawProgress(draw_point(stroke, p, false))]
            }
            Gesture::Dragging { id, start_screen, orig_x, orig_y } => {
                let x = *orig_x + cam.screen_dist_to_canvas(screen.x - start_screen.x);
                let y = *orig_y + cam.screen_dist_to_canvas(screen.y - start_screen.y);
                let id = id.clone();
                self.move_object(&id, x, y)
            }
            Gesture::Resizing { id, start_screen, orig_w, aspect, .. } => {
                let width = *orig_w + cam.screen_dist_to_canvas(screen.x - start_screen.x);
                let height = width / *aspect;
                let id = id.clone();
                self.resize_object(&id, width, height)
            }
            Gesture::ResizingShape { id, handle, start_screen, orig_x, orig_y, orig_w, orig_h } => {
                let dx = cam.screen_dist_to_canvas(screen.x - start_screen.x);
                let dy = cam.screen_dist_to_canvas(screen.y - start_screen.y);
                let (mut x, mut y, mut width, mut height) = (*orig_x, *orig_y, *orig_w, *orig_h);
                if let Some(side) = handle.horizontal {
                    width = *orig_w + side.sign() * dx;
                    x = *orig_x + dx / 2.0;
                }
                if let Some(side) = handle.vertical {
                    height = *orig_h + side.sign() * dy;
                    y = *orig_y + dy / 2.0;
                }
                let id = id.clone();
                self.reshape_object(&id, x, y, width, height)
            }
            Gesture::Rotating { id, center_screen, start_angle, orig_rotation } => {
                let degrees = *orig_rotation + (angle_deg(*center_screen, screen) - *start_angle);
                let id = id.clone();
                self.rotate_object(&id, degrees)
            }
        }
    }

    /// Pointer released (or capture lost). Ends the active gesture exactly once.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        match self.input.finish() {
            Some(Gesture::Drawing { stroke }) if stroke.is_valid() => {
                self.commit(Mutation::AddStroke(stroke.clone()));
                vec![Action::StrokeAdded(stroke)]
            }
            _ => Vec::new(),
        }
    }

    // --- Object mutations ---

    fn default_kind(&self, mode: Mode) -> Option<ObjectKind> {
        let s = &self.settings;
        match mode {
            Mode::Text => Some(ObjectKind::Text {
                text: String::new(),
                color: s.color.clone(),
                font_size: s.font_size,
                font_family: s.font_family.clone(),
                rotation: 0.0,
            }),
            Mode::Circle => Some(ObjectKind::Circle {
                color: s.color.clone(),
                stroke_width: SHAPE_DEFAULT_STROKE_WIDTH,
                rotation: 0.0,
            }),
            Mode::Rectangle => Some(ObjectKind::Rectangle {
                color: s.color.clone(),
                stroke_width: SHAPE_DEFAULT_STROKE_WIDTH,
                rotation: 0.0,
            }),
            _ => None,
        }
    }

    /// Create an object of `kind` centred at canvas point `at`, with a fresh
    /// id and the default size for its variant. The new object is selected.
    pub fn create_object(&mut self, kind: ObjectKind, at: Point) -> Vec<Action> {
        let (width, height) = match kind {
            ObjectKind::Text { .. } => TEXT_DEFAULT_SIZE,
            ObjectKind::Circle { .. } | ObjectKind::Rectangle { .. } => SHAPE_DEFAULT_SIZE,
            ObjectKind::Image { .. } | ObjectKind::Audio { .. } | ObjectKind::Location { .. } => MEDIA_DEFAULT_SIZE,
        };
        let object = OverlayObject { id: new_object_id(), x: at.x, y: at.y, width, height, kind };
        self.selected_id = Some(object.id.clone());
        self.commit(Mutation::AddObject(object.clone()));
        vec![Action::ObjectAdded(object)]
    }

    /// Remove an object. Unknown ids produce no action.
    pub fn delete_object(&mut self, id: &str) -> Vec<Action> {
        if self.doc.object(id).is_none() {
            return Vec::new();
        }
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        self.commit(Mutation::DeleteObject(id.to_owned()));
        vec![Action::ObjectDeleted(id.to_owned())]
    }

    /// Move an object's centre to canvas point `(x, y)`.
    pub fn move_object(&mut self, id: &str, x: f64, y: f64) -> Vec<Action> {
        let Some(obj) = self.doc.object(id) else {
            return Vec::new();
        };
        let moved = OverlayObject { x, y, ..obj.clone() };
        self.replace(moved)
    }

    /// Set an object's size. Sizes at or below the floor are rejected and the
    /// current size is kept.
    pub fn resize_object(&mut self, id: &str, width: f64, height: f64) -> Vec<Action> {
        let Some(obj) = self.doc.object(id) else {
            return Vec::new();
        };
        if !size_allowed(width, height) {
            return Vec::new();
        }
        let resized = OverlayObject { width, height, ..obj.clone() };
        self.replace(resized)
    }

    fn reshape_object(&mut self, id: &str, x: f64, y: f64, width: f64, height: f64) -> Vec<Action> {
        let Some(obj) = self.doc.object(id) else {
            return Vec::new();
        };
        if !size_allowed(width, height) {
            return Vec::new();
        }
        let reshaped = OverlayObject { x, y, width, height, ..obj.clone() };
        self.replace(reshaped)
    }

    /// Set an object's rotation in degrees. No-op for variants without rotation.
    pub fn rotate_object(&mut self, id: &str, degrees: f64) -> Vec<Action> {
        let Some(obj) = self.doc.object(id) else {
            return Vec::new();
        };
        let mut rotated = obj.clone();
        if !rotated.kind.set_rotation(degrees) {
            return Vec::new();
        }
        self.replace(rotated)
    }

    /// Replace the content of a text object.
    pub fn set_text(&mut self, id: &str, new_text: &str) -> Vec<Action> {
        let Some(obj) = self.doc.object(id) else {
            return Vec::new();
        };
        let mut edited = obj.clone();
        let ObjectKind::Text { text, .. } = &mut edited.kind else {
            return Vec::new();
        };
        new_text.clone_into(text);
        self.replace(edited)
    }

    /// Apply a style change to one object. Produces no action when nothing changes.
    pub fn set_style(&mut self, id: &str, patch: &StylePatch) -> Vec<Action> {
        let Some(obj) = self.doc.object(id) else {
            return Vec::new();
        };
        let mut styled = obj.clone();
        match &mut styled.kind {
            ObjectKind::Text { color, font_size, font_family, .. } => {
                if let Some(c) = &patch.color {
                    c.clone_into(color);
                }
                if let Some(s) = patch.font_size {
                    *font_size = s;
                }
                if let Some(f) = &patch.font_family {
                    f.clone_into(font_family);
                }
            }
            ObjectKind::Circle { color, stroke_width, .. } | ObjectKind::Rectangle { color, stroke_width, .. } => {
                if let Some(c) = &patch.color {
                    c.clone_into(color);
                }
                if let Some(w) = patch.stroke_width {
                    *stroke_width = w;
                }
            }
            ObjectKind::Image { .. } | ObjectKind::Audio { .. } | ObjectKind::Location { .. } => {}
        }
        if &styled == obj {
            return Vec::new();
        }
        self.replace(styled)
    }

    // --- Queries ---

    /// Look up an object by id.
    #[must_use]
    pub fn object(&self, id: &str) -> Option<&OverlayObject> {
        self.doc.object(id)
    }
}

fn size_allowed(width: f64, height: f64) -> bool {
    width.is_finite() && height.is_finite() && width > MIN_OBJECT_SIZE && height > MIN_OBJECT_SIZE
}

/// Width over height, or square when either side is missing or degenerate.
fn aspect_ratio(width: f64, height: f64) -> f64 {
    let aspect = width / height;
    if width > 0.0 && height > 0.0 && aspect.is_finite() { aspect } else { 1.0 }
}

fn draw_point(stroke: &Stroke, p: Point, begin: bool) -> DrawPoint {
    DrawPoint { x: p.x, y: p.y, mode: stroke.mode, color: stroke.color.clone(), size: stroke.size, begin }
}
