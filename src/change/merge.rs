//! Merging a candidate sub-graph into the annotation graph.

use oxigraph::model::Triple;

use crate::Result;
use crate::change::{ChangeRecord, ChangeState};
use crate::graph::MetadataGraph;
use crate::reason::Reasoner;

/// Adds every triple of a candidate graph to the target graph.
///
/// The record holds the triples newly present after the call; candidate
/// triples already in the graph contribute nothing to the diff.
///
/// Two modes:
/// - [`Merge::new`] applies unconditionally, even when the result violates
///   the schema. This matches the historical behavior and is kept for
///   compatibility.
/// - [`Merge::guarded`] is the recommended constructor: it runs inference
///   after the tentative add and rolls the merge back atomically when
///   validation reports errors.
#[derive(Debug)]
pub struct Merge {
    candidate: Vec<Triple>,
    guard: Option<Reasoner>,
    state: ChangeState,
    record: ChangeRecord,
}

impl Merge {
    /// Unguarded merge: always applies.
    pub fn new(candidate: Vec<Triple>) -> Self {
        Self {
            candidate,
            guard: None,
            state: ChangeState::default(),
            record: ChangeRecord::default(),
        }
    }

    /// Guarded merge: rejects and rolls back when the merged graph fails
    /// schema validation.
    pub fn guarded(candidate: Vec<Triple>, reasoner: Reasoner) -> Self {
        Self {
            candidate,
            guard: Some(reasoner),
            state: ChangeState::default(),
            record: ChangeRecord::default(),
        }
    }

    pub fn applied(&self) -> bool {
        self.state.applied()
    }

    pub fn record(&self) -> &ChangeRecord {
        &self.record
    }

    pub fn apply_to(&mut self, graph: &MetadataGraph) -> Result<()> {
        self.state.begin_apply()?;

        let added = graph.insert_all(&self.candidate)?;

        if let Some(reasoner) = &self.guard {
            let report = reasoner.infer(graph)?.validate();
            if !report.is_valid() {
                // Atomic rollback: the graph is exactly as it was.
                for triple in &added {
                    graph.remove_triple(triple)?;
                }
                tracing::warn!(
                    errors = report.error_count(),
                    "guarded merge rejected by schema validation"
                );
                return Err(crate::MetadataError::SchemaViolation(report));
            }
        }

        tracing::debug!(added = added.len(), "merge applied");
        self.record.added = added;
        self.record.stamp();
        self.state.finish_apply();
        Ok(())
    }

    pub fn undo_from(&mut self, graph: &MetadataGraph) -> Result<()> {
        self.state.begin_undo()?;
        for triple in &self.record.added {
            graph.remove_triple(triple)?;
        }
        self.state.finish_undo();
        Ok(())
    }
}
