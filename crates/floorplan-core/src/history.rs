//! Snapshot-based linear undo/redo over the whole floor plan.

use crate::project::{FloorPlan, RestoreError, Snapshot};
use std::collections::VecDeque;

/// Maximum number of undo states to keep.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Undo/redo stacks of plan snapshots.
///
/// Call [`History::push`] *before* each discrete edit so that undo reverts
/// exactly that edit.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Snapshot>,
    future: VecDeque<Snapshot>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Create an empty history. A limit of zero is treated as one.
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Record the current state and drop any redo states.
    pub fn push(&mut self, plan: &FloorPlan) {
        self.push_past(plan.gather_state());
        self.future.clear();
    }

    /// Restore the most recent past state.
    ///
    /// Returns `Ok(false)` when there is nothing to undo. A stored snapshot
    /// that fails validation is dropped and its error returned; the plan and
    /// the redo stack are unchanged, so the next undo reaches further back.
    pub fn undo(&mut self, plan: &mut FloorPlan) -> Result<bool, RestoreError> {
        let Some(previous) = self.past.pop_back() else {
            return Ok(false);
        };
        let current = plan.gather_state();
        if let Err(err) = plan.restore_state(&previous) {
            log::warn!("Dropping unrestorable undo state: {}", err);
            return Err(err);
        }
        self.future.push_front(current);
        log::debug!("Undo ({} left)", self.past.len());
        Ok(true)
    }

    /// Re-apply the most recently undone state. Unrestorable states are
    /// dropped like in [`History::undo`].
    pub fn redo(&mut self, plan: &mut FloorPlan) -> Result<bool, RestoreError> {
        let Some(next) = self.future.pop_front() else {
            return Ok(false);
        };
        let current = plan.gather_state();
        if let Err(err) = plan.restore_state(&next) {
            log::warn!("Dropping unrestorable redo state: {}", err);
            return Err(err);
        }
        self.push_past(current);
        log::debug!("Redo ({} left)", self.future.len());
        Ok(true)
    }

    fn push_past(&mut self, snapshot: Snapshot) {
        self.past.push_back(snapshot);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Forget everything, e.g. after loading another project.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
