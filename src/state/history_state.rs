// src/state/history_state.rs
use crate::config::constants::MAX_QUERY_HISTORY_LENGTH;
use crate::config::Query;

/// Submitted queries, newest first, bounded at `MAX_QUERY_HISTORY_LENGTH`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryState {
    entries: Vec<Query>,
}

impl HistoryState {
    pub fn new(mut entries: Vec<Query>) -> Self {
        entries.truncate(MAX_QUERY_HISTORY_LENGTH);
        Self { entries }
    }

    pub fn entries(&self) -> &[Query] {
        &self.entries
    }

    pub fn newest(&self) -> Option<&Query> {
        self.entries.first()
    }

    pub fn get(&self, index: usize) -> Option<&Query> {
        self.entries.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest entries fall off the end once the cap is reached
    pub fn record(&mut self, query: Query) {
        self.entries.insert(0, query);
        self.entries.truncate(MAX_QUERY_HISTORY_LENGTH);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
