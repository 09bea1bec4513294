//! Remote mutation applier: inbound messages into document mutations.
//!
//! DESIGN
//! ======
//! Inbound messages go through the same reducers as local edits via
//! [`Engine::apply_remote`], so the document cannot tell where a change came
//! from. Peers are trusted: payloads are shape-matched only, and missing
//! fields fall back to their defaults.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here fails. Unknown message types are ignored (peers may speak a
//! newer protocol), payloads that do not match their kind are logged and
//! dropped, and references to unknown ids are silent no-ops because network
//! reordering makes them expected.

#[cfg(test)]
#[path = "applier_test.rs"]
mod applier_test;

use canvas::doc::{DrawPoint, Mutation, ObjectPatch, OverlayObject, Stroke};
use canvas::engine::Engine;
use frames::{Message, MessageKind};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Outcome of handling one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// A peer's in-progress stroke point, for incremental rendering only.
    Draw(DrawPoint),
    /// A reducer ran (possibly as a no-op for a stale id).
    Mutated(MessageKind),
    /// The message was not applied.
    Ignored,
}

/// Apply one inbound message to the engine's document.
pub fn apply_message(engine: &mut Engine, message: &Message) -> Applied {
    let Some(kind) = message.classify() else {
        debug!(kind = %message.kind, "ignoring unrecognised message type");
        return Applied::Ignored;
    };

    if kind == MessageKind::Draw {
        return match message.payload_as::<DrawPoint>() {
            Ok(point) => Applied::Draw(point),
            Err(e) => {
                warn!(error = %e, "dropping malformed draw payload");
                Applied::Ignored
            }
        };
    }

    match to_mutation(engine, kind, message) {
        Ok(Some(mutation)) => {
            engine.apply_remote(mutation);
            Applied::Mutated(kind)
        }
        Ok(None) => Applied::Mutated(kind),
        Err(e) => {
            warn!(error = %e, kind = %message.kind, "dropping malformed payload");
            Applied::Ignored
        }
    }
}

/// Build the reducer input for a message. `Ok(None)` means there is nothing
/// to apply, e.g. a legacy patch for an id this peer does not have.
fn to_mutation(engine: &Engine, kind: MessageKind, message: &Message) -> Result<Option<Mutation>, frames::CodecError> {
    let mutation = match kind {
        MessageKind::Draw => return Ok(None),
        MessageKind::StrokeAdd => Mutation::AddStroke(message.payload_as::<Stroke>()?),
        MessageKind::ObjectAdd => Mutation::AddObject(whole_object(message)?),
        MessageKind::ObjectUpdate => {
            if message.carries_object_type() {
                Mutation::UpdateObject(whole_object(message)?)
            } else {
                let patch = message.payload_as::<ObjectPatch>()?;
                let Some(current) = engine.object(&patch.id) else {
                    debug!(id = %patch.id, "patch for unknown object; ignoring");
                    return Ok(None);
                };
                Mutation::UpdateObject(patch.merged_into(current))
            }
        }
        MessageKind::ObjectDelete => Mutation::DeleteObject(message.payload_as::<ObjectPatch>()?.id),
    };
    Ok(Some(mutation))
}

/// Parse a payload as a whole object. Legacy `<type>-add` payloads may omit
/// `type`; it is taken from the message name.
fn whole_object(message: &Message) -> Result<OverlayObject, frames::CodecError> {
    if message.carries_object_type() {
        return message.payload_as::<OverlayObject>();
    }
    let mut payload = message.payload.clone();
    if let (Some(object_type), Value::Object(map)) = (message.legacy_object_type(), &mut payload) {
        map.insert("type".to_owned(), Value::String(object_type.to_owned()));
    }
    let object = OverlayObject::deserialize(&payload)?;
    Ok(object)
}
