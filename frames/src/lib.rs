//! Shared message envelope and JSON codec for realtime canvas sync.
//!
//! Every message on the sync socket is a flat `{ "type": ..., "payload": ... }`
//! object. This crate owns that envelope and the mapping from the `type`
//! string (including the legacy per-object aliases such as `text-move`) to a
//! closed [`MessageKind`]. Payloads stay as `serde_json::Value` here; typed
//! payload structs live with the document model that gives them meaning.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error returned by the encode/decode helpers.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text could not be parsed as an envelope, or a payload did not
    /// match the requested shape.
    #[error("invalid message json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Object type names that prefix legacy per-type message names.
pub const LEGACY_OBJECT_TYPES: [&str; 6] = ["text", "image", "audio", "location", "circle", "rectangle"];

/// Recognised mutation kinds carried by a [`Message`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// One intermediate point of a stroke being drawn by a peer.
    Draw,
    /// A finished stroke appended to the peer's document.
    StrokeAdd,
    /// A new overlay object.
    ObjectAdd,
    /// A whole-object replace, or a partial patch for legacy payloads.
    ObjectUpdate,
    /// Removal of an overlay object by id.
    ObjectDelete,
}

impl MessageKind {
    /// Canonical wire name for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draw => "draw",
            Self::StrokeAdd => "stroke-add",
            Self::ObjectAdd => "object-add",
            Self::ObjectUpdate => "object-update",
            Self::ObjectDelete => "object-delete",
        }
    }

    /// Map a wire `type` string to a kind.
    ///
    /// Legacy names of the form `<object-type>-<verb>` are folded into the
    /// generic kinds: `-add` into [`Self::ObjectAdd`], `-move`, `-resize`,
    /// `-rotate` and `-update` into [`Self::ObjectUpdate`], `-delete` into
    /// [`Self::ObjectDelete`]. Anything else is unrecognised.
    #[must_use]
    pub fn classify(kind: &str) -> Option<Self> {
        match kind {
            "draw" => return Some(Self::Draw),
            "stroke-add" => return Some(Self::StrokeAdd),
            "object-add" => return Some(Self::ObjectAdd),
            "object-update" => return Some(Self::ObjectUpdate),
            "object-delete" => return Some(Self::ObjectDelete),
            _ => {}
        }

        let (prefix, verb) = kind.split_once('-')?;
        if !LEGACY_OBJECT_TYPES.contains(&prefix) {
            return None;
        }
        match verb {
            "add" => Some(Self::ObjectAdd),
            "move" | "resize" | "rotate" | "update" => Some(Self::ObjectUpdate),
            "delete" => Some(Self::ObjectDelete),
            _ => None,
        }
    }
}

/// A single message on the sync wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Wire type name, e.g. `"object-update"` or legacy `"image-move"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Mutation payload; an empty object when absent on the wire.
    #[serde(default = "empty_payload")]
    pub payload: Value,
}

fn empty_payload() -> Value {
    Value::Object(Map::new())
}

impl Message {
    /// Build a message with a raw JSON payload.
    #[must_use]
    pub fn new(kind: MessageKind, payload: Value) -> Self {
        Self { kind: kind.as_str().to_owned(), payload }
    }

    /// Build a message by serializing a typed payload.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] if `payload` cannot be represented as JSON.
    pub fn with_payload<T: Serialize>(kind: MessageKind, payload: &T) -> Result<Self, CodecError> {
        Ok(Self::new(kind, serde_json::to_value(payload)?))
    }

    /// The recognised kind of this message, if any.
    #[must_use]
    pub fn classify(&self) -> Option<MessageKind> {
        MessageKind::classify(&self.kind)
    }

    /// Deserialize the payload into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] when the payload does not match `T`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        Ok(T::deserialize(&self.payload)?)
    }

    /// Object type named by a legacy per-type message, e.g. `"text"` for
    /// `"text-add"`. `None` for canonical kinds.
    #[must_use]
    pub fn legacy_object_type(&self) -> Option<&str> {
        let (prefix, _) = self.kind.split_once('-')?;
        LEGACY_OBJECT_TYPES.contains(&prefix).then_some(prefix)
    }

    /// Whether the payload names its object type, i.e. carries a whole object.
    #[must_use]
    pub fn carries_object_type(&self) -> bool {
        self.payload.get("type").is_some_and(Value::is_string)
    }
}

/// Encode a message as JSON text for a websocket text frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if serialization fails.
pub fn encode_message(message: &Message) -> Result<String, CodecError> {
    Ok(serde_json::to_string(message)?)
}

/// Decode JSON text into a message.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed JSON or text that is not an
/// object with a string `type` field.
pub fn decode_message(text: &str) -> Result<Message, CodecError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
