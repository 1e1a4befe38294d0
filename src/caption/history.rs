use super::entry::CaptionEntry;
use crate::error::{CaptionError, Result};
use std::collections::VecDeque;
use tracing::debug;

/// Full copy of the caption list at one point in time.
///
/// Snapshots are plain deep copies. That keeps undo trivially correct at the
/// cost of O(n) memory per edit, which is fine for caption tracks of a few
/// hundred to a few thousand entries.
pub type Snapshot = Vec<CaptionEntry>;

/// Bounded undo/redo log.
///
/// `past` holds states that can be returned to with [`undo`](Self::undo),
/// most recent last; `future` holds states undone and available to
/// [`redo`](Self::redo), next one last.
#[derive(Debug, Clone)]
pub struct EditHistory {
    past: VecDeque<Snapshot>,
    future: Vec<Snapshot>,
    capacity: usize,
}

impl EditHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(capacity.min(64)),
            future: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record the state as it was before an edit. Any redo branch is
    /// discarded, and the oldest snapshot is evicted once over capacity.
    pub fn snapshot(&mut self, state: &[CaptionEntry]) {
        self.future.clear();
        self.past.push_back(state.to_vec());

        while self.past.len() > self.capacity {
            self.past.pop_front();
            debug!("History over capacity {}, evicted oldest snapshot", self.capacity);
        }
    }

    /// Step back: `current` goes onto the redo branch and the most recent
    /// past state is returned for restoring.
    pub fn undo(&mut self, current: &[CaptionEntry]) -> Result<Snapshot> {
        let previous = self.past.pop_back().ok_or(CaptionError::NothingToUndo)?;
        self.future.push(current.to_vec());
        Ok(previous)
    }

    /// Step forward: `current` goes back onto the past and the next redo
    /// state is returned for restoring.
    pub fn redo(&mut self, current: &[CaptionEntry]) -> Result<Snapshot> {
        let next = self.future.pop().ok_or(CaptionError::NothingToRedo)?;
        self.past.push_back(current.to_vec());
        Ok(next)
    }

    /// Put back a state popped by `undo`/`redo` that the caller refused to
    /// restore, leaving the log exactly as it was.
    pub(crate) fn revert_undo(&mut self, snapshot: Snapshot) {
        self.future.pop();
        self.past.push_back(snapshot);
    }

    pub(crate) fn revert_redo(&mut self, snapshot: Snapshot) {
        self.past.pop_back();
        self.future.push(snapshot);
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(50)
    }
}
