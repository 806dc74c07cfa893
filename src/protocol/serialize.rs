//! Serialization layer - convert engine types to/from the wire tuples.

use serde::{Deserialize, Serialize};

use crate::crdt::change::RemoteChange;
use crate::crdt::char::Char;
use crate::crdt::document::Document;
use crate::crdt::identifier::Identifier;
use crate::error::{EngineError, Result};
use crate::{Lamport, SiteId};

/// Wire form of a [`Char`]: `[[[digit, site], ...], lamport, value]`.
pub type CharSerial = (Vec<(u32, SiteId)>, Lamport, char);

/// Wire tag of a [`RemoteChange`], `"add"` or `"remove"`.
///
/// Any other tag fails decoding, surfacing as [`EngineError::Protocol`] from
/// [`decode_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Remove,
}

/// Wire form of a [`RemoteChange`]: `[kind, char]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSerial(pub ChangeKind, pub CharSerial);

/// Broadcast envelope: one change plus the sender's lamport at send time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeMessage {
    pub change: ChangeSerial,
    pub lamport: Lamport,
}

/// Serialize a Char to its wire tuple.
pub fn serialize_char(ch: &Char) -> CharSerial {
    let position = ch.position.iter().map(|id| (id.digit, id.site)).collect();
    (position, ch.lamport, ch.value)
}

/// Rebuild a Char from its wire tuple.
pub fn deserialize_char(serial: CharSerial) -> Char {
    let (position, lamport, value) = serial;
    Char::new(
        position
            .into_iter()
            .map(|(digit, site)| Identifier::new(digit, site))
            .collect(),
        lamport,
        value,
    )
}

/// Serialize a RemoteChange to its wire tuple.
pub fn serialize_change(change: &RemoteChange) -> ChangeSerial {
    match change {
        RemoteChange::Add(ch) => ChangeSerial(ChangeKind::Add, serialize_char(ch)),
        RemoteChange::Remove(ch) => ChangeSerial(ChangeKind::Remove, serialize_char(ch)),
    }
}

/// Rebuild a RemoteChange from its wire tuple.
pub fn deserialize_change(serial: ChangeSerial) -> RemoteChange {
    let ChangeSerial(kind, ch) = serial;
    match kind {
        ChangeKind::Add => RemoteChange::Add(deserialize_char(ch)),
        ChangeKind::Remove => RemoteChange::Remove(deserialize_char(ch)),
    }
}

/// Serialize a whole document, in document order (the init-handshake state).
pub fn serialize_document(document: &Document) -> Vec<CharSerial> {
    document.chars().map(serialize_char).collect()
}

/// Rebuild a document from serialized state.
pub fn deserialize_document(serials: Vec<CharSerial>) -> Document {
    Document::from_chars(serials.into_iter().map(deserialize_char))
}

/// Encode any wire message as JSON.
pub fn encode_message<M: Serialize>(message: &M) -> Result<String> {
    serde_json::to_string(message)
        .map_err(|err| EngineError::Protocol(format!("failed to encode message: {err}")))
}

/// Decode a wire message from JSON.
pub fn decode_message<M: serde::de::DeserializeOwned>(payload: &str) -> Result<M> {
    serde_json::from_str(payload)
        .map_err(|err| EngineError::Protocol(format!("failed to decode message: {err}")))
}
