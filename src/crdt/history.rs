//! Per-replica undo/redo history with edit batching.
//!
//! History records the remote-change records a replica generates locally,
//! grouped into batches that undo and redo as one unit. Batching follows the
//! editor conventions users expect: a burst of typing undoes together, but
//! whitespace, pauses, cursor movement, and kind changes start fresh batches.
//!
//! Only locally generated changes belong here; a replica can never undo
//! another replica's edits.

use std::time::{Duration, Instant};

use crate::crdt::change::RemoteChange;
use crate::Lamport;

/// Changes separated by more than this go in separate batches.
const DELAY_BETWEEN_BATCHES: Duration = Duration::from_millis(1000);

/// Most additions (or entries of a removal batch) coalesced into one batch.
const MAX_BATCHED_CHANGES: usize = 10;

/// Undo stack and redo stack of change batches.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<Vec<RemoteChange>>,
    redo_stack: Vec<Vec<RemoteChange>>,
    break_next_batch: bool,
    last_change_at: Option<Instant>,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record locally generated changes, coalescing into the current batch
    /// when the batching rules allow it.
    pub fn on_changes(&mut self, changes: Vec<RemoteChange>) {
        self.on_changes_at(Instant::now(), changes);
    }

    /// [`History::on_changes`] with an explicit timestamp.
    pub fn on_changes_at(&mut self, now: Instant, changes: Vec<RemoteChange>) {
        if changes.is_empty() {
            return;
        }

        if self.should_start_new_batch(now, &changes) {
            self.undo_stack.push(changes);
        } else if let Some(batch) = self.undo_stack.last_mut() {
            batch.extend(changes);
        }

        self.break_next_batch = false;
        self.last_change_at = Some(now);
    }

    /// Pop the latest undo batch, inverted and ready to apply.
    ///
    /// Chars re-added while undoing a removal are new creations and take the
    /// fresh `lamport`. The inverted batch moves to the redo stack. `None`
    /// when there is nothing to undo.
    pub fn make_undo_changes(&mut self, lamport: Lamport) -> Option<Vec<RemoteChange>> {
        let batch = self.undo_stack.pop()?;
        let undo_changes: Vec<RemoteChange> =
            batch.iter().map(|change| change.inverted(lamport)).collect();
        self.redo_stack.push(undo_changes.clone());
        self.break_next_batch = true;
        Some(undo_changes)
    }

    /// Pop the latest redo batch, inverted and ready to apply; the mirror of
    /// [`History::make_undo_changes`].
    pub fn make_redo_changes(&mut self, lamport: Lamport) -> Option<Vec<RemoteChange>> {
        let batch = self.redo_stack.pop()?;
        let redo_changes: Vec<RemoteChange> =
            batch.iter().map(|change| change.inverted(lamport)).collect();
        self.undo_stack.push(redo_changes.clone());
        self.break_next_batch = true;
        Some(redo_changes)
    }

    /// Cursor movements break batches: whatever comes next starts fresh.
    pub fn on_cursor_move(&mut self) {
        self.break_next_batch = true;
    }

    /// Number of batches available to undo.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of batches available to redo.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    fn should_start_new_batch(&self, now: Instant, changes: &[RemoteChange]) -> bool {
        if self.break_next_batch {
            return true;
        }

        // Only single-character edits coalesce.
        if changes.len() > 1 {
            return true;
        }
        let change = &changes[0];

        // Don't batch changes that are far apart in time.
        let within_delay = self
            .last_change_at
            .is_some_and(|at| now.saturating_duration_since(at) < DELAY_BETWEEN_BATCHES);
        if !within_delay {
            return true;
        }

        let Some(batch) = self.undo_stack.last() else {
            return true;
        };
        let additions = batch.iter().filter(|c| c.is_addition()).count();

        match change {
            RemoteChange::Add(ch) => {
                // Break up long insert runs, and break at whitespace so an
                // undo takes back a word, not a paragraph.
                additions >= MAX_BATCHED_CHANGES || matches!(ch.value, ' ' | '\t' | '\n' | '\r')
            }
            RemoteChange::Remove(_) => {
                // Removals never join a batch holding additions.
                additions > 0 || batch.len() >= MAX_BATCHED_CHANGES
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crdt::char::Char;
    use crate::crdt::identifier::Identifier;

    fn add(digit: u32, lamport: Lamport, value: char) -> RemoteChange {
        RemoteChange::Add(Char::new(vec![Identifier::new(digit, 1)], lamport, value))
    }

    fn remove(digit: u32, lamport: Lamport, value: char) -> RemoteChange {
        RemoteChange::Remove(Char::new(vec![Identifier::new(digit, 1)], lamport, value))
    }

    // Successive timestamps well inside the batching delay.
    fn ticks(start: Instant) -> impl FnMut() -> Instant {
        let mut elapsed = Duration::ZERO;
        move || {
            elapsed += Duration::from_millis(10);
            start + elapsed
        }
    }

    #[test]
    fn test_cannot_undo_or_redo_nothing() {
        let mut history = History::new();
        assert_eq!(history.make_undo_changes(0), None);
        assert_eq!(history.make_redo_changes(0), None);
    }

    #[test]
    fn test_sequential_inserts_get_batched() {
        let mut history = History::new();
        let mut tick = ticks(Instant::now());
        history.on_changes_at(tick(), vec![add(111, 0, 'a')]);
        history.on_changes_at(tick(), vec![add(112, 1, 'b')]);
        assert_eq!(history.make_undo_changes(2).unwrap().len(), 2);
    }

    #[test]
    fn test_multi_char_insertions_get_their_own_batch() {
        let mut history = History::new();
        let mut tick = ticks(Instant::now());
        history.on_changes_at(tick(), vec![add(111, 0, 'a')]);
        history.on_changes_at(tick(), vec![add(112, 1, 'b'), add(113, 2, 'c')]);
        assert_eq!(history.make_undo_changes(3).unwrap().len(), 2);
    }

    #[test]
    fn test_insertion_after_undo_starts_a_new_batch() {
        let mut history = History::new();
        let mut tick = ticks(Instant::now());
        history.on_changes_at(tick(), vec![add(111, 0, 'a')]);
        history.make_undo_changes(1);
        history.on_changes_at(tick(), vec![add(112, 2, 'b')]);
        history.on_changes_at(tick(), vec![add(113, 3, 'c')]);
        assert_eq!(history.make_undo_changes(4).unwrap().len(), 2);
    }

    #[test]
    fn test_break_apart_large_insertions() {
        let mut history = History::new();
        let mut tick = ticks(Instant::now());
        for i in 0..11 {
            history.on_changes_at(tick(), vec![add(111 + i, i as Lamport, 'a')]);
        }
        assert_eq!(history.make_undo_changes(11).unwrap().len(), 1);
        assert_eq!(history.make_undo_changes(12).unwrap().len(), 10);
    }

    #[test]
    fn test_break_apart_large_deletions() {
        let mut history = History::new();
        let mut tick = ticks(Instant::now());
        for i in 0..15 {
            history.on_changes_at(tick(), vec![add(111 + i, i as Lamport, 'a')]);
        }
        for i in 0..15 {
            history.on_changes_at(tick(), vec![remove(111 + i, i as Lamport, 'a')]);
        }
        assert_eq!(history.make_undo_changes(11).unwrap().len(), 5);
        assert_eq!(history.make_undo_changes(12).unwrap().len(), 10);
    }

    #[test]
    fn test_whitespace_starts_a_new_batch() {
        let mut history = History::new();
        let mut tick = ticks(Instant::now());
        history.on_changes_at(tick(), vec![add(111, 0, 'a')]);
        history.on_changes_at(tick(), vec![add(112, 1, ' ')]);
        assert_eq!(history.make_undo_changes(2).unwrap().len(), 1);
        assert_eq!(history.make_undo_changes(3).unwrap().len(), 1);
    }

    #[test]
    fn test_sequential_deletes_batch_without_inserts() {
        let mut history = History::new();
        let mut tick = ticks(Instant::now());
        history.on_changes_at(tick(), vec![add(111, 0, 'a'), add(112, 1, 'b')]);
        history.on_changes_at(tick(), vec![remove(111, 0, 'a')]);
        history.on_changes_at(tick(), vec![remove(112, 1, 'b')]);
        assert_eq!(history.make_undo_changes(2).unwrap().len(), 2);
    }

    #[test]
    fn test_mixed_changes_arriving_together_stay_one_batch() {
        let mut history = History::new();
        history.on_changes_at(
            Instant::now(),
            vec![
                remove(111, 0, 'x'),
                remove(113, 0, 'y'),
                add(112, 0, 'a'),
                add(114, 1, 'b'),
            ],
        );
        assert_eq!(history.make_undo_changes(2).unwrap().len(), 4);
    }

    #[test]
    fn test_cursor_movement_splits_batches() {
        let mut history = History::new();
        let mut tick = ticks(Instant::now());
        history.on_changes_at(tick(), vec![add(111, 0, 'a')]);
        history.on_changes_at(tick(), vec![add(112, 1, 'b')]);
        history.on_cursor_move();
        history.on_changes_at(tick(), vec![add(112, 2, 'c')]);
        assert_eq!(history.make_undo_changes(3).unwrap().len(), 1);
    }

    #[test]
    fn test_time_delay_splits_batches() {
        let mut history = History::new();
        let start = Instant::now();
        history.on_changes_at(start, vec![add(111, 0, 'a')]);
        history.on_changes_at(start + Duration::from_millis(10), vec![add(112, 1, 'b')]);
        history.on_changes_at(start + Duration::from_millis(1200), vec![add(112, 2, 'c')]);
        assert_eq!(history.make_undo_changes(3).unwrap().len(), 1);
        assert_eq!(history.make_undo_changes(4).unwrap().len(), 2);
    }

    #[test]
    fn test_undo_redo_cycles_yield_correct_operations() {
        let mut history = History::new();
        let mut tick = ticks(Instant::now());
        history.on_changes_at(tick(), vec![add(111, 0, 'a')]);
        history.on_changes_at(tick(), vec![remove(111, 1, 'a'), add(112, 1, 'b')]);

        assert_eq!(
            history.make_undo_changes(2).unwrap(),
            vec![add(111, 2, 'a'), remove(112, 1, 'b')]
        );
        assert_eq!(
            history.make_redo_changes(3).unwrap(),
            vec![remove(111, 2, 'a'), add(112, 3, 'b')]
        );
        assert_eq!(
            history.make_undo_changes(4).unwrap(),
            vec![add(111, 4, 'a'), remove(112, 3, 'b')]
        );
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 1);
    }
}
