//! coedit-core - Sequence CRDT engine for real-time collaborative text editing
//!
//! Each participating replica owns a [`Replica`] session. Local edits are fed
//! in as [`LocalChange`] range replaces and come back out as [`RemoteChange`]
//! records for the transport to broadcast; inbound remote records are applied
//! one at a time and yield the [`LocalChange`] the hosting editor should make
//! to its buffer. Replicas converge to identical text for every delivery
//! order, delay, and duplication, with no central coordination and no
//! tombstones.
//!
//! The rendering widget, the transport, and presence/cursor broadcasting are
//! external collaborators and live outside this crate.
//!
//! # Examples
//!
//! ```rust
//! use coedit_core::{LocalChange, Replica, TextPoint};
//!
//! let mut replica = Replica::new(1);
//! let at = TextPoint::new(0, 0);
//! let outbound = replica
//!     .apply_local(&LocalChange::new(at, at, "hello"))
//!     .unwrap();
//!
//! assert_eq!(replica.text(), "hello");
//! assert_eq!(outbound.len(), 5); // one Add per character, ready to broadcast
//! ```

pub mod crdt;
pub mod error;
pub mod protocol;
pub mod session;

// Re-exports for convenience
pub use crdt::change::{LocalChange, RemoteChange, TextPoint};
pub use crdt::char::Char;
pub use crdt::document::Document;
pub use crdt::history::History;
pub use crdt::identifier::Identifier;
pub use error::{EngineError, Result};
pub use session::{AppliedBatch, Replica};

/// Replica/session identifier, assigned once by the external init handshake.
/// Real sessions count from 1; site 0 is reserved for the boundary sentinels.
pub type SiteId = u32;

/// Logical clock value stamped on every [`Char`].
pub type Lamport = u64;
