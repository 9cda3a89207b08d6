//! # History Engine
//!
//! Bounded undo/redo over full [`DesignState`] snapshots.
//!
//! ```text
//!   past (oldest … newest)        live state        future (newest undo … oldest)
//!   [s1, s2, s3]  ◄── undo ──     current     ── redo ──►  [s5, s4]
//! ```
//!
//! Snapshots are deep copies. A design state is a few hundred bytes (image
//! backgrounds are referenced, not embedded), so 50 of them are cheap.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::design::DesignState;

pub const DEFAULT_MAX_DEPTH: usize = 50;

/// A saved design with a human-readable label.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub state: DesignState,
    pub label: String,
    pub timestamp: DateTime<Utc>,
}

impl HistorySnapshot {
    pub fn new(state: DesignState, label: impl Into<String>) -> Self {
        Self {
            state,
            label: label.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryEngine {
    past: VecDeque<HistorySnapshot>,
    future: Vec<HistorySnapshot>,
    max_depth: usize,
}

impl Default for HistoryEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl HistoryEngine {
    pub fn new(max_depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Record `current` before a mutation.
    ///
    /// Skipped when identical to the newest snapshot. Otherwise the redo
    /// stack is cleared and the oldest entries beyond the depth limit are
    /// evicted. Returns whether a snapshot was recorded.
    pub fn take_snapshot(&mut self, current: &DesignState, label: &str) -> bool {
        if self.past.back().is_some_and(|top| top.state == *current) {
            debug!(label, "history: unchanged, snapshot skipped");
            return false;
        }

        self.past.push_back(HistorySnapshot::new(current.clone(), label));
        self.future.clear();
        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
        debug!(label, depth = self.past.len(), "history: snapshot taken");
        true
    }

    /// Step back. `current` moves onto the redo stack; the returned state is
    /// the one to restore.
    pub fn undo(&mut self, current: &DesignState) -> Option<DesignState> {
        let Some(snapshot) = self.past.pop_back() else {
            debug!("history: nothing to undo");
            return None;
        };
        debug!(label = %snapshot.label, "history: undo");
        self.future
            .push(HistorySnapshot::new(current.clone(), snapshot.label.clone()));
        Some(snapshot.state)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: &DesignState) -> Option<DesignState> {
        let Some(snapshot) = self.future.pop() else {
            debug!("history: nothing to redo");
            return None;
        };
        debug!(label = %snapshot.label, "history: redo");
        self.past
            .push_back(HistorySnapshot::new(current.clone(), snapshot.label.clone()));
        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
        Some(snapshot.state)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.past.len()
    }

    pub fn redo_count(&self) -> usize {
        self.future.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Labels of the undo stack, oldest first.
    pub fn labels(&self) -> Vec<&str> {
        self.past.iter().map(|s| s.label.as_str()).collect()
    }

    /// Every stored state, undo side first.
    pub fn states(&self) -> impl Iterator<Item = &DesignState> {
        self.past.iter().chain(self.future.iter()).map(|s| &s.state)
    }

    /// The snapshot the next undo would restore.
    pub fn peek_undo(&self) -> Option<&HistorySnapshot> {
        self.past.back()
    }
}
