//! Mapping from dispatcher actions to wire messages.

#[cfg(test)]
#[path = "protocol_test.rs"]
mod protocol_test;

use canvas::engine::Action;
use frames::{CodecError, Message, MessageKind};

/// Serialize one dispatcher action as the message peers expect.
///
/// # Errors
///
/// Returns [`CodecError`] if the payload cannot be represented as JSON.
pub fn action_to_message(action: &Action) -> Result<Message, CodecError> {
    match action {
        Action::DrawProgress(point) => Message::with_payload(MessageKind::Draw, point),
        Action::StrokeAdded(stroke) => Message::with_payload(MessageKind::StrokeAdd, stroke),
        Action::ObjectAdded(object) => Message::with_payload(MessageKind::ObjectAdd, object),
        Action::ObjectUpdated(object) => Message::with_payload(MessageKind::ObjectUpdate, object),
        Action::ObjectDeleted(id) => Ok(Message::new(MessageKind::ObjectDelete, serde_json::json!({ "id": id }))),
    }
}
