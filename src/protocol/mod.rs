//! Wire formats exchanged with the transport.
//!
//! Everything on the wire is a compact JSON tuple, unchanged from the
//! original protocol so replicas can interoperate across versions:
//!
//! - Char: `[[[digit, site], ...], lamport, value]`
//! - RemoteChange: `["add" | "remove", char]`
//! - Broadcast envelope: `{"change": ..., "lamport": ...}`
//! - Init snapshot: an ordered array of serialized Chars

pub mod serialize;

pub use serialize::{
    decode_message, deserialize_change, deserialize_char, deserialize_document, encode_message,
    serialize_change, serialize_char, serialize_document, ChangeKind, ChangeMessage, ChangeSerial,
    CharSerial,
};
