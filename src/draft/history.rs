use std::collections::VecDeque;

use super::form::CountryDraft;

/// Default number of undo snapshots kept per draft.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Bounded stack of pre-mutation draft snapshots.
///
/// Pushing past capacity evicts the oldest snapshot. There is no redo:
/// popping consumes the entry.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: VecDeque<CountryDraft>,
    capacity: usize,
}

impl HistoryStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, snapshot: CountryDraft) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    pub fn pop(&mut self) -> Option<CountryDraft> {
        self.entries.pop_back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
