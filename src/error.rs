//! Error types shared across the engine.
//!
//! Contract violations indicate a broken precondition that risks replica
//! divergence; they are reported as errors, never silently corrected.
//! Expected no-ops (duplicate deliveries, empty undo stacks) are not errors
//! and surface as `None` from the operations concerned.

use crate::crdt::change::TextPoint;
use crate::SiteId;
use thiserror::Error;

/// Errors produced by the CRDT engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A range replace arrived with its endpoints swapped.
    #[error("inverted change range: {from} comes after {to}")]
    InvertedRange { from: TextPoint, to: TextPoint },

    /// An edit addressed a line or column the document does not have.
    #[error("edit location out of bounds at {line}:{col}")]
    OutOfBounds { line: usize, col: usize },

    /// Position generation was handed bounds that are not in order
    /// (equal digits with the left site above the right site).
    #[error("position bounds out of order: left site {left} exceeds right site {right}")]
    MisorderedBounds { left: SiteId, right: SiteId },

    /// A digit-vector sum produced a carry past the most significant digit;
    /// the sum is not representable at this length.
    #[error("digit overflow: carry escaped the most significant digit")]
    DigitOverflow,

    /// A wire payload could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
