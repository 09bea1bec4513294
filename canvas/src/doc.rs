//! Document model: strokes, overlay objects, and the pure reducers over them.
//!
//! This module defines what is on a canvas (`Stroke`, `OverlayObject`,
//! `ObjectKind`), a sparse-update type for legacy partial edits
//! (`ObjectPatch`), the per-point draw payload (`DrawPoint`), and the
//! document itself (`Document`) with its fixed set of reducers.
//!
//! Every reducer takes the current document by value and returns the next
//! one. Reducers never fail: stale ids are no-ops, and shape invariants
//! (minimum sizes, rotation only where declared) are enforced by the
//! dispatcher that constructs the inputs, not here. Local and remote
//! mutations flow through the same [`Document::apply`], so the document
//! cannot tell where a change came from.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::camera::Point;

/// Opaque, client-generated object identifier.
pub type ObjectId = String;

/// Generate a fresh object id.
#[must_use]
pub fn new_object_id() -> ObjectId {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// STROKES
// =============================================================================

/// How a stroke composites onto the raster surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeMode {
    /// Paint over (`source-over`).
    #[default]
    Draw,
    /// Punch out (`destination-out`). Occludes earlier strokes; never deletes them.
    Erase,
}

/// A finished freehand path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stroke {
    #[serde(default)]
    pub mode: StrokeMode,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub path: Vec<Point>,
}

impl Stroke {
    /// A stroke with no points is never committed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.path.is_empty()
    }
}

/// One point of a stroke in progress, plus the tool settings a peer needs to
/// render it before the stroke is finished.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawPoint {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub mode: StrokeMode,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: f64,
    /// First point of a new stroke; renderers start a fresh path here.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub begin: bool,
}

// =============================================================================
// OVERLAY OBJECTS
// =============================================================================

/// Variant-specific attributes of an overlay object, tagged by `type`.
///
/// Every field defaults when absent so a sparse payload from a trusted peer
/// still yields a (partially populated) object instead of an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    Image {
        #[serde(default)]
        src: String,
        #[serde(default)]
        rotation: f64,
    },
    Audio {
        #[serde(default)]
        url: String,
        #[serde(default)]
        filename: String,
    },
    Location {
        #[serde(default)]
        label: String,
        #[serde(default)]
        lat: f64,
        #[serde(default)]
        lng: f64,
    },
    Text {
        #[serde(default)]
        text: String,
        #[serde(default)]
        color: String,
        #[serde(default, rename = "fontSize")]
        font_size: f64,
        #[serde(default, rename = "fontFamily")]
        font_family: String,
        #[serde(default)]
        rotation: f64,
    },
    Circle {
        #[serde(default)]
        color: String,
        #[serde(default, rename = "strokeWidth")]
        stroke_width: f64,
        #[serde(default)]
        rotation: f64,
    },
    Rectangle {
        #[serde(default)]
        color: String,
        #[serde(default, rename = "strokeWidth")]
        stroke_width: f64,
        #[serde(default)]
        rotation: f64,
    },
}

impl ObjectKind {
    /// Wire name of the variant (the `type` tag).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Image { .. } => "image",
            Self::Audio { .. } => "audio",
            Self::Location { .. } => "location",
            Self::Text { .. } => "text",
            Self::Circle { .. } => "circle",
            Self::Rectangle { .. } => "rectangle",
        }
    }

    /// Rotation in degrees, for variants that declare one.
    #[must_use]
    pub fn rotation(&self) -> Option<f64> {
        match self {
            Self::Image { rotation, .. }
            | Self::Text { rotation, .. }
            | Self::Circle { rotation, .. }
            | Self::Rectangle { rotation, .. } => Some(*rotation),
            Self::Audio { .. } | Self::Location { .. } => None,
        }
    }

    /// Set the rotation. Returns `false` (and changes nothing) for variants
    /// without a rotation attribute.
    pub fn set_rotation(&mut self, degrees: f64) -> bool {
        match self {
            Self::Image { rotation, .. }
            | Self::Text { rotation, .. }
            | Self::Circle { rotation, .. }
            | Self::Rectangle { rotation, .. } => {
                *rotation = degrees;
                true
            }
            Self::Audio { .. } | Self::Location { .. } => false,
        }
    }

    /// Circle and rectangle resize per edge rather than by aspect ratio.
    #[must_use]
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Circle { .. } | Self::Rectangle { .. })
    }
}

/// A positioned, resizable entity layered above the raster surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayObject {
    #[serde(default)]
    pub id: ObjectId,
    /// Centre x in canvas space.
    #[serde(default)]
    pub x: f64,
    /// Centre y in canvas space.
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

/// Sparse update for an overlay object. Only present fields are applied.
///
/// Carried by legacy `*-move` / `*-resize` / `*-rotate` messages, which send
/// the changed fields and the id rather than the whole object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectPatch {
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl ObjectPatch {
    /// Return a copy of `object` with the present fields applied.
    #[must_use]
    pub fn merged_into(&self, object: &OverlayObject) -> OverlayObject {
        let mut next = object.clone();
        if let Some(x) = self.x {
            next.x = x;
        }
        if let Some(y) = self.y {
            next.y = y;
        }
        if let Some(w) = self.width {
            next.width = w;
        }
        if let Some(h) = self.height {
            next.height = h;
        }
        if let Some(r) = self.rotation {
            next.kind.set_rotation(r);
        }
        next
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

/// One reducer input.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Replace all content (first load, or discarding the session's edits).
    InitContent(Document),
    /// Append a finished stroke.
    AddStroke(Stroke),
    /// Insert an object; an existing object with the same id is replaced.
    AddObject(OverlayObject),
    /// Whole-object replace keyed by id; unknown ids are ignored.
    UpdateObject(OverlayObject),
    /// Remove by id; unknown ids are ignored.
    DeleteObject(ObjectId),
}

/// In-memory content of one canvas. Also the persisted snapshot body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    objects: Vec<OverlayObject>,
    #[serde(default)]
    strokes: Vec<Stroke>,
    /// Legacy baked-in raster background, as a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl Document {
    /// Build a document from parts.
    #[must_use]
    pub fn new(objects: Vec<OverlayObject>, strokes: Vec<Stroke>, image: Option<String>) -> Self {
        Self { objects, strokes, image }
    }

    /// Parse a stored content value, skipping entries that do not parse.
    ///
    /// Missing or non-array `objects` / `strokes` become empty. Returns the
    /// document and the number of entries skipped.
    #[must_use]
    pub fn from_value_lenient(value: &Value) -> (Self, usize) {
        let mut skipped = 0;
        let objects = collect_lenient::<OverlayObject>(value.get("objects"), &mut skipped);
        let strokes = collect_lenient::<Stroke>(value.get("strokes"), &mut skipped)
            .into_iter()
            .filter(|s| {
                let valid = s.is_valid();
                if !valid {
                    skipped += 1;
                }
                valid
            })
            .collect();
        let image = value.get("image").and_then(Value::as_str).map(ToOwned::to_owned);
        (Self { objects, strokes, image }, skipped)
    }

    /// Run one reducer.
    #[must_use]
    pub fn apply(self, mutation: Mutation) -> Self {
        match mutation {
            Mutation::InitContent(content) => self.init_content(content),
            Mutation::AddStroke(stroke) => self.add_stroke(stroke),
            Mutation::AddObject(object) => self.add_object(object),
            Mutation::UpdateObject(object) => self.update_object(object),
            Mutation::DeleteObject(id) => self.delete_object(&id),
        }
    }

    /// Replace objects, strokes, and background with `content`.
    #[must_use]
    pub fn init_content(self, content: Document) -> Self {
        content
    }

    /// Append a stroke. Strokes without points are dropped.
    #[must_use]
    pub fn add_stroke(mut self, stroke: Stroke) -> Self {
        if stroke.is_valid() {
            self.strokes.push(stroke);
        }
        self
    }

    /// Insert an object, replacing in place if its id is already present.
    #[must_use]
    pub fn add_object(mut self, object: OverlayObject) -> Self {
        match self.objects.iter_mut().find(|o| o.id == object.id) {
            Some(existing) => *existing = object,
            None => self.objects.push(object),
        }
        self
    }

    /// Replace the object with the same id. Unknown ids are a no-op.
    #[must_use]
    pub fn update_object(mut self, object: OverlayObject) -> Self {
        if let Some(existing) = self.objects.iter_mut().find(|o| o.id == object.id) {
            *existing = object;
        }
        self
    }

    /// Remove the object with `id`. Unknown ids are a no-op.
    #[must_use]
    pub fn delete_object(mut self, id: &str) -> Self {
        self.objects.retain(|o| o.id != id);
        self
    }

    /// Objects in stable insertion order.
    #[must_use]
    pub fn objects(&self) -> &[OverlayObject] {
        &self.objects
    }

    /// Strokes in creation order.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Legacy raster background, if any.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Look up an object by id.
    #[must_use]
    pub fn object(&self, id: &str) -> Option<&OverlayObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Returns `true` if the document has no objects, strokes, or background.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.strokes.is_empty() && self.image.is_none()
    }
}

fn collect_lenient<T: serde::de::DeserializeOwned>(value: Option<&Value>, skipped: &mut usize) -> Vec<T> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                *skipped += 1;
                None
            }
        })
        .collect()
}
