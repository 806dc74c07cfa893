//! Change records: what the editor widget speaks and what the wire speaks.

use std::fmt;

use crate::crdt::char::Char;
use crate::Lamport;

/// A `(line, column)` location in the editor buffer.
///
/// The derived ordering is line-major, matching buffer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextPoint {
    pub line: usize,
    pub col: usize,
}

impl TextPoint {
    /// Create a new point.
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for TextPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A range replace in editor coordinates: delete `[from, to)`, then insert
/// `text` at `from`. This is both what the hosting editor reports for local
/// edits and what it receives back when remote changes land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalChange {
    pub from: TextPoint,
    pub to: TextPoint,
    pub text: String,
}

impl LocalChange {
    /// Create a new range replace.
    pub fn new(from: TextPoint, to: TextPoint, text: impl Into<String>) -> Self {
        Self {
            from,
            to,
            text: text.into(),
        }
    }

    /// A pure insertion at a single point.
    pub fn insertion(at: TextPoint, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }
}

/// The wire mutation record exchanged between replicas.
///
/// Application is idempotent: delivering the same record twice leaves the
/// document unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteChange {
    /// Insert this Char at its position.
    Add(Char),
    /// Remove the Char at this position (matched by full equality).
    Remove(Char),
}

impl RemoteChange {
    /// The Char this record carries.
    pub fn char(&self) -> &Char {
        match self {
            RemoteChange::Add(ch) | RemoteChange::Remove(ch) => ch,
        }
    }

    /// Whether this record adds a Char.
    pub fn is_addition(&self) -> bool {
        matches!(self, RemoteChange::Add(_))
    }

    /// The change that undoes this one.
    ///
    /// Undoing an `Add` removes the very Char that was added, keeping its
    /// lamport so the removal matches it exactly. Undoing a `Remove` inserts
    /// a replacement Char, which is a new creation and takes the fresh
    /// `lamport`.
    pub fn inverted(&self, lamport: Lamport) -> RemoteChange {
        match self {
            RemoteChange::Add(ch) => {
                RemoteChange::Remove(Char::new(ch.position.clone(), ch.lamport, ch.value))
            }
            RemoteChange::Remove(ch) => {
                RemoteChange::Add(Char::new(ch.position.clone(), lamport, ch.value))
            }
        }
    }
}
