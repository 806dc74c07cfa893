//! Replica session: one participant's document, history, and clocks.

use crate::crdt::change::{LocalChange, RemoteChange};
use crate::crdt::document::Document;
use crate::crdt::history::History;
use crate::error::Result;
use crate::protocol::serialize::{deserialize_char, serialize_char, CharSerial};
use crate::{Lamport, SiteId};

/// The per-session facade tying a [`Document`] to its [`History`] and the
/// session counters (lamport clock, site id).
///
/// A replica is owned by exactly one editing session and mutated
/// synchronously, one event at a time: a local edit, one delivered remote
/// change, or an undo/redo request. The site id comes from the external init
/// handshake and is stamped into every Identifier this replica mints.
#[derive(Debug, Clone)]
pub struct Replica {
    document: Document,
    history: History,
    lamport: Lamport,
    site: SiteId,
}

/// The outcome of an undo or redo: the records to broadcast and the edits
/// the hosting editor should apply to its buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedBatch {
    /// Ops for the transport to broadcast, in application order.
    pub remote: Vec<RemoteChange>,
    /// Buffer edits for the hosting editor, in application order.
    pub local: Vec<LocalChange>,
}

impl Replica {
    /// Create a replica over an empty document.
    pub fn new(site: SiteId) -> Self {
        Self {
            document: Document::new(),
            history: History::new(),
            lamport: 0,
            site,
        }
    }

    /// Create a replica from the init handshake: the serialized document
    /// state and the site id this session was assigned.
    pub fn init(state: &[CharSerial], site: SiteId) -> Self {
        tracing::debug!("initializing replica for site {} with {} chars", site, state.len());
        Self {
            document: Document::from_chars(state.iter().cloned().map(deserialize_char)),
            history: History::new(),
            lamport: 0,
            site,
        }
    }

    /// Apply a local range replace from the hosting editor.
    ///
    /// Deletes `[from, to)` when the range is non-empty, then inserts the
    /// replacement text at `from`. The generated records are fed to History
    /// for undo batching and returned for broadcast.
    pub fn apply_local(&mut self, change: &LocalChange) -> Result<Vec<RemoteChange>> {
        self.lamport += 1;

        let mut outbound = Vec::new();
        if change.from < change.to {
            let deletion = LocalChange::new(change.from, change.to, "");
            outbound.extend(self.document.local_delete(&deletion)?);
        }
        if !change.text.is_empty() {
            let insertion = LocalChange::insertion(change.from, change.text.clone());
            outbound.extend(
                self.document
                    .local_insert(self.lamport, self.site, &insertion)?,
            );
        }

        self.history.on_changes(outbound.clone());
        Ok(outbound)
    }

    /// Apply one delivered remote change.
    ///
    /// Advances the lamport clock past the sender's, then applies through the
    /// document's idempotent remote path. Remote changes never enter History:
    /// a replica cannot undo another replica's edits.
    pub fn apply_remote(
        &mut self,
        change: &RemoteChange,
        lamport: Lamport,
    ) -> Option<LocalChange> {
        self.lamport = self.lamport.max(lamport) + 1;
        self.apply_change(change)
    }

    /// Undo the latest local batch, if any.
    pub fn undo(&mut self) -> Option<AppliedBatch> {
        let changes = self.history.make_undo_changes(self.lamport + 1)?;
        self.lamport += 1;
        Some(self.apply_batch(changes))
    }

    /// Redo the latest undone batch, if any.
    pub fn redo(&mut self) -> Option<AppliedBatch> {
        let changes = self.history.make_redo_changes(self.lamport + 1)?;
        self.lamport += 1;
        Some(self.apply_batch(changes))
    }

    /// Report a cursor movement; the next edit starts a fresh undo batch.
    pub fn cursor_moved(&mut self) {
        self.history.on_cursor_move();
    }

    /// Current document text.
    pub fn text(&self) -> String {
        self.document.to_string()
    }

    /// The replica-local document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Serialized document state, as handed to late joiners at init.
    pub fn snapshot(&self) -> Vec<CharSerial> {
        self.document.chars().map(serialize_char).collect()
    }

    /// This session's site id.
    pub fn site(&self) -> SiteId {
        self.site
    }

    /// Current lamport clock value.
    pub fn lamport(&self) -> Lamport {
        self.lamport
    }

    fn apply_change(&mut self, change: &RemoteChange) -> Option<LocalChange> {
        match change {
            RemoteChange::Add(ch) => self.document.remote_insert(ch),
            RemoteChange::Remove(ch) => self.document.remote_delete(ch),
        }
    }

    fn apply_batch(&mut self, changes: Vec<RemoteChange>) -> AppliedBatch {
        let mut local = Vec::new();
        for change in &changes {
            local.extend(self.apply_change(change));
        }
        AppliedBatch {
            remote: changes,
            local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crdt::change::TextPoint;

    fn type_at(replica: &mut Replica, line: usize, col: usize, text: &str) -> Vec<RemoteChange> {
        let at = TextPoint::new(line, col);
        replica
            .apply_local(&LocalChange::insertion(at, text))
            .unwrap()
    }

    #[test]
    fn test_local_edit_produces_broadcastable_ops() {
        let mut replica = Replica::new(1);
        let outbound = type_at(&mut replica, 0, 0, "hi");
        assert_eq!(replica.text(), "hi");
        assert_eq!(outbound.len(), 2);
        assert!(outbound.iter().all(RemoteChange::is_addition));
    }

    #[test]
    fn test_range_replace_deletes_then_inserts() {
        let mut replica = Replica::new(1);
        type_at(&mut replica, 0, 0, "abc");
        let change = LocalChange::new(TextPoint::new(0, 1), TextPoint::new(0, 2), "xy");
        let outbound = replica.apply_local(&change).unwrap();
        assert_eq!(replica.text(), "axyc");
        assert_eq!(outbound.len(), 3); // one removal, two additions
        assert_eq!(outbound.iter().filter(|c| c.is_addition()).count(), 2);
    }

    #[test]
    fn test_remote_changes_advance_the_lamport_clock() {
        let mut source = Replica::new(1);
        let mut sink = Replica::new(2);
        let outbound = type_at(&mut source, 0, 0, "a");
        sink.apply_remote(&outbound[0], 40);
        assert_eq!(sink.lamport(), 41);
    }

    #[test]
    fn test_replicas_converge_through_remote_application() {
        let mut source = Replica::new(1);
        let mut sink = Replica::new(2);
        for change in type_at(&mut source, 0, 0, "hello\nworld") {
            let lamport = source.lamport();
            sink.apply_remote(&change, lamport);
        }
        assert_eq!(sink.text(), "hello\nworld");
    }

    #[test]
    fn test_undo_then_redo_restores_text() {
        let mut replica = Replica::new(1);
        type_at(&mut replica, 0, 0, "hello");

        let undone = replica.undo().unwrap();
        assert_eq!(replica.text(), "");
        assert_eq!(undone.remote.len(), 5);

        let redone = replica.redo().unwrap();
        assert_eq!(replica.text(), "hello");
        assert_eq!(redone.remote.len(), 5);
    }

    #[test]
    fn test_undo_with_nothing_to_undo() {
        let mut replica = Replica::new(1);
        assert_eq!(replica.undo(), None);
        assert_eq!(replica.redo(), None);
    }

    #[test]
    fn test_remote_changes_are_not_undoable() {
        let mut source = Replica::new(1);
        let mut sink = Replica::new(2);
        for change in type_at(&mut source, 0, 0, "test") {
            let lamport = source.lamport();
            sink.apply_remote(&change, lamport);
        }
        assert_eq!(sink.text(), "test");
        assert_eq!(sink.undo(), None);
        assert_eq!(sink.text(), "test");
    }

    #[test]
    fn test_init_from_snapshot() {
        let mut source = Replica::new(1);
        type_at(&mut source, 0, 0, "shared\nstate");
        let joiner = Replica::init(&source.snapshot(), 7);
        assert_eq!(joiner.text(), "shared\nstate");
        assert_eq!(joiner.site(), 7);
    }
}
