//! The change-operation algebra: merge and delete with recorded diffs.
//!
//! A [`Change`] applies to a graph exactly once, records the observed diff
//! in a [`ChangeRecord`], and can be undone from that record. Re-applying,
//! undoing before apply, and double-undo are contract violations and fail
//! fast.

mod delete;
mod merge;

pub use delete::Delete;
pub use merge::Merge;

use chrono::{DateTime, Utc};
use oxigraph::model::Triple;

use crate::Result;
use crate::graph::MetadataGraph;

/// The added/removed triple diff produced by applying one change.
#[derive(Debug, Clone, Default)]
pub struct ChangeRecord {
    pub added: Vec<Triple>,
    pub removed: Vec<Triple>,
    pub applied_at: Option<DateTime<Utc>>,
}

impl ChangeRecord {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub(crate) fn stamp(&mut self) {
        self.applied_at = Some(Utc::now());
    }
}

/// A change operation over the annotation graph.
///
/// Dispatch is over the closed variant set, not open-ended subclassing;
/// each variant carries its own parameters plus the shared applied flag
/// and record.
#[derive(Debug)]
pub enum Change {
    Merge(Merge),
    Delete(Delete),
}

impl Change {
    /// Perform the mutation exactly once, recording the diff.
    pub fn apply_to(&mut self, graph: &MetadataGraph) -> Result<()> {
        match self {
            Change::Merge(op) => op.apply_to(graph),
            Change::Delete(op) => op.apply_to(graph),
        }
    }

    /// Reverse the recorded diff: remove what was added, re-add what was
    /// removed.
    pub fn undo_from(&mut self, graph: &MetadataGraph) -> Result<()> {
        match self {
            Change::Merge(op) => op.undo_from(graph),
            Change::Delete(op) => op.undo_from(graph),
        }
    }

    pub fn applied(&self) -> bool {
        match self {
            Change::Merge(op) => op.applied(),
            Change::Delete(op) => op.applied(),
        }
    }

    pub fn record(&self) -> &ChangeRecord {
        match self {
            Change::Merge(op) => op.record(),
            Change::Delete(op) => op.record(),
        }
    }
}

impl From<Merge> for Change {
    fn from(op: Merge) -> Self {
        Change::Merge(op)
    }
}

impl From<Delete> for Change {
    fn from(op: Delete) -> Self {
        Change::Delete(op)
    }
}

/// Shared apply/undo state tracking for both variants.
#[derive(Debug, Default)]
pub(crate) struct ChangeState {
    applied: bool,
    undone: bool,
}

impl ChangeState {
    pub(crate) fn applied(&self) -> bool {
        self.applied
    }

    pub(crate) fn begin_apply(&self) -> Result<()> {
        if self.applied {
            return Err(crate::MetadataError::ChangeAlreadyApplied);
        }
        Ok(())
    }

    pub(crate) fn finish_apply(&mut self) {
        self.applied = true;
    }

    pub(crate) fn begin_undo(&self) -> Result<()> {
        if !self.applied {
            return Err(crate::MetadataError::ChangeNotApplied);
        }
        if self.undone {
            return Err(crate::MetadataError::ChangeAlreadyUndone);
        }
        Ok(())
    }

    pub(crate) fn finish_undo(&mut self) {
        self.undone = true;
    }
}
