//! Rolling value-copy snapshots taken at the start of each player turn.

use std::collections::VecDeque;

use crate::game::session::BattleState;

#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<BattleState>,
    depth: usize,
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(depth.max(1)),
            depth: depth.max(1),
        }
    }

    /// Record a copy of `state`, evicting the oldest beyond `depth`.
    pub fn push(&mut self, state: &BattleState) {
        if self.snapshots.len() == self.depth {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(state.clone());
    }

    /// Snapshot taken at the start of the previous player turn.
    ///
    /// The current turn's snapshot is discarded so that the restored turn
    /// becomes the most recent entry again.
    pub fn rewind(&mut self) -> Option<BattleState> {
        if self.snapshots.len() < 2 {
            return None;
        }
        self.snapshots.pop_back();
        self.snapshots.back().cloned()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
