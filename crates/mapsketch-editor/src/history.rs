//! Snapshot undo/redo history for an edit session.
//!
//! The first snapshot is the state at edit-mode entry and is never undone
//! or trimmed away. Every push clears the redo stack.

use std::collections::VecDeque;

/// Undo/redo stacks of full snapshots.
#[derive(Debug, Clone)]
pub struct History<T> {
    undo_stack: VecDeque<T>,
    redo_stack: Vec<T>,
    max_entries: usize,
}

impl<T: Clone> History<T> {
    /// History keeping at most `max_entries` snapshots (baseline included).
    pub fn new(max_entries: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_entries: max_entries.max(2),
        }
    }

    /// Start a session with `initial` as the baseline.
    pub fn begin(&mut self, initial: T) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_stack.push_back(initial);
    }

    /// Record a snapshot taken after a completed mutation.
    pub fn push(&mut self, snapshot: T) {
        self.redo_stack.clear();
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.max_entries {
            // the baseline stays; the oldest edit goes
            self.undo_stack.remove(1);
        }
    }

    /// Step back one snapshot and return the state to restore.
    pub fn undo(&mut self) -> Option<T> {
        if self.undo_stack.len() < 2 {
            return None;
        }
        let top = self.undo_stack.pop_back()?;
        self.redo_stack.push(top);
        self.undo_stack.back().cloned()
    }

    /// Re-apply the most recently undone snapshot.
    pub fn redo(&mut self) -> Option<T> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push_back(snapshot.clone());
        Some(snapshot)
    }

    /// Return to the baseline, discarding every edit and the redo stack.
    pub fn reset_to_initial(&mut self) -> Option<T> {
        if self.undo_stack.len() < 2 && self.redo_stack.is_empty() {
            return None;
        }
        self.undo_stack.truncate(1);
        self.redo_stack.clear();
        self.undo_stack.front().cloned()
    }

    /// Make `current` the new baseline.
    pub fn commit(&mut self, current: T) {
        self.begin(current);
    }

    pub fn current(&self) -> Option<&T> {
        self.undo_stack.back()
    }

    pub fn initial(&self) -> Option<&T> {
        self.undo_stack.front()
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of snapshots that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len().saturating_sub(1)
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new(100)
    }
}
