//! Sequence CRDT building blocks for collaborative text editing.
//!
//! The document is an ordered sequence of [`Char`]s, each carrying a
//! fractional-index position (a path of [`Identifier`]s) that totally orders
//! it against every other Char ever created, on any replica. Editing never
//! renumbers existing Chars: insertion mints a fresh position strictly
//! between its neighbors, deletion removes the Char outright (no tombstones).
//!
//! # Modules
//!
//! - [`decimal`] - base-256 arbitrary-length digit arithmetic
//! - [`identifier`] - `(digit, site)` path links
//! - [`char`] - the Char value object and its position/equality split
//! - [`position`] - dense position generation between two bounds
//! - [`search`] - the shared generic binary search
//! - [`change`] - local (UI) and remote (wire) change records
//! - [`document`] - lines of Chars and the four conversion operations
//! - [`history`] - per-replica undo/redo batching

pub mod change;
pub mod char;
pub mod decimal;
pub mod document;
pub mod history;
pub mod identifier;
pub mod position;
pub mod search;

pub use change::{LocalChange, RemoteChange, TextPoint};
pub use char::Char;
pub use document::Document;
pub use history::History;
pub use identifier::Identifier;
