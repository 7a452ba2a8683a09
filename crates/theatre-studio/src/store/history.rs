//! Linear undo/redo history of the historic partition.
//!
//! Each entry holds a complete historic snapshot. Snapshots share structure
//! with each other and with the live state, so an entry costs roughly the
//! nodes its commit copied.

use std::collections::VecDeque;

use theatre_dataverse::{PathSegment, Value, diff_paths};

/// One undoable step.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    snapshot: Value,
    changed: Vec<Vec<PathSegment>>,
}

impl HistoryEntry {
    /// Historic state this entry restores.
    pub fn snapshot(&self) -> &Value {
        &self.snapshot
    }

    /// Leaf paths that differ between this step and its neighbour.
    pub fn changed_paths(&self) -> &[Vec<PathSegment>] {
        &self.changed
    }
}

#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    max_entries: usize,
}

impl History {
    pub fn new(max_entries: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_entries,
        }
    }

    /// Record a commit that moved the historic partition from `before` to
    /// `after`. Clears the redo stack.
    pub fn record(&mut self, before: &Value, after: &Value) {
        self.redo.clear();
        self.undo.push_back(HistoryEntry {
            snapshot: before.clone(),
            changed: diff_paths(before, after),
        });
        while self.undo.len() > self.max_entries {
            self.undo.pop_front();
        }
    }

    /// Step back from `current`. Returns the state to restore, or `None` at
    /// the oldest entry.
    pub fn undo(&mut self, current: &Value) -> Option<Value> {
        let entry = self.undo.pop_back()?;
        self.redo.push(HistoryEntry {
            snapshot: current.clone(),
            changed: entry.changed.clone(),
        });
        Some(entry.snapshot)
    }

    /// Step forward from `current`. Returns the state to restore, or `None`
    /// at the newest entry.
    pub fn redo(&mut self, current: &Value) -> Option<Value> {
        let entry = self.redo.pop()?;
        self.undo.push_back(HistoryEntry {
            snapshot: current.clone(),
            changed: entry.changed.clone(),
        });
        Some(entry.snapshot)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Undo entries, oldest first.
    pub fn undo_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo.iter()
    }

    /// Redo entries, next-to-redo first.
    pub fn redo_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.redo.iter().rev()
    }
}
