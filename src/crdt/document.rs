//! The shared document: lines of Chars ordered by position, plus the four
//! operations converting between local edits and remote change records.

use std::cmp::Ordering;
use std::fmt;
use std::mem;

use crate::crdt::change::{LocalChange, RemoteChange, TextPoint};
use crate::crdt::char::Char;
use crate::crdt::position::generate_position_between;
use crate::crdt::search::{binary_search, SearchMode};
use crate::error::{EngineError, Result};
use crate::{Lamport, SiteId};

/// The replica-local copy of the shared text.
///
/// Stored as lines of [`Char`]s. Two invariants hold at every public-method
/// boundary:
///
/// - Chars are strictly increasing by position, across the whole document.
/// - Every line except the last ends with a `'\n'` Char; only the last line
///   may be empty or unterminated.
///
/// Local edits mint fresh Chars and report them as [`RemoteChange`]s for
/// broadcast; inbound remote changes are located by position (binary search
/// at both levels) and report the [`LocalChange`] the hosting editor should
/// apply. Remote application is idempotent, so duplicated delivery is safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<Vec<Char>>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            lines: vec![Vec::new()],
        }
    }

    /// Seed a document from Chars already in document order, splitting lines
    /// at every newline Char. This is the init-handshake entry point.
    pub fn from_chars<I>(chars: I) -> Self
    where
        I: IntoIterator<Item = Char>,
    {
        let mut lines = Vec::new();
        let mut line = Vec::new();
        for ch in chars {
            let is_newline = ch.value == '\n';
            line.push(ch);
            if is_newline {
                lines.push(mem::take(&mut line));
            }
        }
        lines.push(line);
        Self { lines }
    }

    /// All Chars in document order.
    pub fn chars(&self) -> impl Iterator<Item = &Char> {
        self.lines.iter().flat_map(|line| line.iter())
    }

    /// Number of Chars, newline Chars included.
    pub fn len(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    /// Whether the document holds no Chars at all.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(Vec::is_empty)
    }

    /// Number of lines (at least 1; the final line may be empty).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Apply a local insertion: mint a Char per inserted character and splice
    /// them in at `change.from`, splitting lines at newlines.
    ///
    /// Returns the minted Chars as `Add` records for broadcast. Fails without
    /// touching the document if `change.from` is out of bounds.
    pub fn local_insert(
        &mut self,
        lamport: Lamport,
        site: SiteId,
        change: &LocalChange,
    ) -> Result<Vec<RemoteChange>> {
        let TextPoint {
            line: line_index,
            col,
        } = change.from;
        let line_len = self
            .lines
            .get(line_index)
            .map(Vec::len)
            .ok_or(EngineError::OutOfBounds {
                line: line_index,
                col,
            })?;
        if col > line_len {
            return Err(EngineError::OutOfBounds {
                line: line_index,
                col,
            });
        }

        let mut previous = self.preceding_char(line_index, col).position;
        let next = self.char_at(line_index, col)?.position;

        // Mint everything before mutating, so a failed generation cannot
        // leave the document half-edited.
        let mut minted = Vec::new();
        for value in change.text.chars() {
            let position = generate_position_between(&previous, &next, site)?;
            previous = position.clone();
            minted.push(Char::new(position, lamport, value));
        }

        let mut current = mem::take(&mut self.lines[line_index]);
        let after = current.split_off(col);
        let mut new_lines = Vec::new();
        for ch in &minted {
            let is_newline = ch.value == '\n';
            current.push(ch.clone());
            if is_newline {
                new_lines.push(mem::take(&mut current));
            }
        }
        current.extend(after);
        new_lines.push(current);
        self.lines.splice(line_index..=line_index, new_lines);

        Ok(minted.into_iter().map(RemoteChange::Add).collect())
    }

    /// Apply a local deletion of the range `[change.from, change.to)`,
    /// merging the first and last affected lines when the range spans lines.
    ///
    /// Returns the removed Chars as `Remove` records for broadcast. An
    /// inverted range or an out-of-bounds endpoint fails without touching the
    /// document.
    pub fn local_delete(&mut self, change: &LocalChange) -> Result<Vec<RemoteChange>> {
        let (from, to) = (change.from, change.to);
        if from > to {
            return Err(EngineError::InvertedRange { from, to });
        }
        if to.line >= self.lines.len() {
            return Err(EngineError::OutOfBounds {
                line: to.line,
                col: to.col,
            });
        }
        if from.col > self.lines[from.line].len() {
            return Err(EngineError::OutOfBounds {
                line: from.line,
                col: from.col,
            });
        }
        if to.col > self.lines[to.line].len() {
            return Err(EngineError::OutOfBounds {
                line: to.line,
                col: to.col,
            });
        }

        let mut removed = Vec::new();
        if from.line == to.line {
            removed.extend(self.lines[from.line].drain(from.col..to.col));
        } else {
            // Drop the spanned lines and keep the first line's prefix joined
            // with the last line's suffix; middle lines vanish entirely.
            let spanned: Vec<Vec<Char>> = self.lines.drain(from.line..=to.line).collect();
            let last_index = spanned.len() - 1;
            let mut merged = Vec::new();
            for (index, mut line) in spanned.into_iter().enumerate() {
                let start = if index == 0 { from.col } else { 0 };
                let end = if index == last_index { to.col } else { line.len() };
                removed.extend(line.drain(start..end));
                merged.extend(line);
            }
            self.lines.insert(from.line, merged);
        }

        Ok(removed.into_iter().map(RemoteChange::Remove).collect())
    }

    /// Apply an inbound `Add`.
    ///
    /// Locates the slot by position. A Char already occupying that exact
    /// position is a duplicate delivery: nothing changes and `None` comes
    /// back. Otherwise the Char is inserted (splitting the line when it is a
    /// newline) and the equivalent editor edit is returned.
    pub fn remote_insert(&mut self, ch: &Char) -> Option<LocalChange> {
        let (line_index, col, found) = self.find_position(ch);
        if found {
            tracing::debug!("duplicate add at {}:{} ignored", line_index, col);
            return None;
        }

        let at = TextPoint::new(line_index, col);
        let change = LocalChange::insertion(at, ch.value.to_string());
        if ch.value == '\n' {
            let mut before = mem::take(&mut self.lines[line_index]);
            let after = before.split_off(col);
            before.push(ch.clone());
            self.lines.splice(line_index..=line_index, [before, after]);
        } else {
            self.lines[line_index].insert(col, ch.clone());
        }
        Some(change)
    }

    /// Apply an inbound `Remove`.
    ///
    /// The target must match by full equality (position, lamport, value); a
    /// missing or merely position-equal Char means the removal already
    /// happened or refers to a Char this replica never saw; both are no-ops.
    /// Removing a line's only newline merges it with the following line.
    pub fn remote_delete(&mut self, ch: &Char) -> Option<LocalChange> {
        let (line_index, col, found) = self.find_position(ch);
        if !found || self.lines[line_index][col] != *ch {
            tracing::debug!("remove without a matching char at {}:{} ignored", line_index, col);
            return None;
        }

        self.lines[line_index].remove(col);
        let newline_left = self.lines[line_index].iter().any(|c| c.value == '\n');
        if !newline_left && line_index + 1 < self.lines.len() {
            let next = self.lines.remove(line_index + 1);
            self.lines[line_index].extend(next);
            Some(LocalChange::new(
                TextPoint::new(line_index, col),
                TextPoint::new(line_index + 1, 0),
                "",
            ))
        } else {
            Some(LocalChange::new(
                TextPoint::new(line_index, col),
                TextPoint::new(line_index, col + 1),
                "",
            ))
        }
    }

    /// Two-level position lookup: which line, which column, and whether a
    /// Char with that exact position is already there.
    fn find_position(&self, target: &Char) -> (usize, usize, bool) {
        let line_index = binary_search(&self.lines, SearchMode::Before, |line| {
            compare_char_with_line(target, line)
        })
        .max(0) as usize;
        let line = &self.lines[line_index];
        let col = binary_search(line, SearchMode::At, |ch| target.compare(ch)) as usize;
        if col < line.len() {
            let found = target.compare(&line[col]) == Ordering::Equal;
            (line_index, col, found)
        } else if line_index + 1 < self.lines.len() {
            // Every line but the last ends in a newline, so a slot past the
            // end of a line belongs at the start of the next one.
            (line_index + 1, 0, false)
        } else {
            (line_index, col, false)
        }
    }

    /// The Char just before `(line_index, col)` in document order, or the
    /// start-of-file boundary.
    fn preceding_char(&self, line_index: usize, col: usize) -> Char {
        if col == 0 {
            if line_index == 0 {
                Char::start_of_file()
            } else {
                self.lines[line_index - 1]
                    .last()
                    .cloned()
                    .unwrap_or_else(Char::start_of_file)
            }
        } else {
            self.lines[line_index][col - 1].clone()
        }
    }

    /// The Char at `(line_index, col)`, or the end-of-file boundary when the
    /// slot is just past the final line.
    fn char_at(&self, line_index: usize, col: usize) -> Result<Char> {
        let line = &self.lines[line_index];
        if col < line.len() {
            Ok(line[col].clone())
        } else if line_index == self.lines.len() - 1 && col == line.len() {
            Ok(Char::end_of_file())
        } else {
            Err(EngineError::OutOfBounds {
                line: line_index,
                col,
            })
        }
    }
}

/// Where does `target` sort relative to a line? Lines are compared through
/// their first Char; the empty line (only ever the last) sorts with
/// end-of-file.
fn compare_char_with_line(target: &Char, line: &[Char]) -> Ordering {
    match line.first() {
        Some(first) => target.compare(first),
        None => target.compare(&Char::end_of_file()),
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.chars() {
            write!(f, "{}", ch.value)?;
        }
        Ok(())
    }
}
