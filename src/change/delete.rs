//! Reference-counted deletion of a resource and its orphaned dependents.

use std::collections::HashSet;

use oxigraph::model::{NamedNode, Term};

use crate::Result;
use crate::change::{ChangeRecord, ChangeState};
use crate::graph::MetadataGraph;

/// Removes a resource's outgoing triples, optionally cascading to resources
/// it referenced that nothing else references anymore.
///
/// This is a single-pass prune, not a mark-and-sweep: each cascade step
/// re-checks incoming references against the graph as it stands
/// mid-mutation. A visited set across the whole call tree keeps
/// self-references and cycles from recursing forever.
#[derive(Debug)]
pub struct Delete {
    target: NamedNode,
    recursive: bool,
    state: ChangeState,
    record: ChangeRecord,
}

impl Delete {
    pub fn new(target: NamedNode, recursive: bool) -> Self {
        Self {
            target,
            recursive,
            state: ChangeState::default(),
            record: ChangeRecord::default(),
        }
    }

    pub fn target(&self) -> &NamedNode {
        &self.target
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn applied(&self) -> bool {
        self.state.applied()
    }

    pub fn record(&self) -> &ChangeRecord {
        &self.record
    }

    /// Deleting a resource absent from the graph is a no-op that still
    /// counts as applied.
    pub fn apply_to(&mut self, graph: &MetadataGraph) -> Result<()> {
        self.state.begin_apply()?;

        let target = self.target.clone();
        let mut visited = HashSet::new();
        self.delete_single(&target, graph, &mut visited)?;

        tracing::debug!(
            target = %self.target,
            recursive = self.recursive,
            removed = self.record.removed.len(),
            "delete applied"
        );
        self.record.stamp();
        self.state.finish_apply();
        Ok(())
    }

    fn delete_single(
        &mut self,
        resource: &NamedNode,
        graph: &MetadataGraph,
        visited: &mut HashSet<NamedNode>,
    ) -> Result<()> {
        if !visited.insert(resource.clone()) {
            return Ok(());
        }
        if !graph.contains_resource(resource)? {
            return Ok(());
        }

        // Everything the resource points to, before its triples go away.
        let related: Vec<NamedNode> = graph
            .objects_of(resource, None)?
            .into_iter()
            .filter_map(|term| match term {
                Term::NamedNode(node) => Some(node),
                _ => None,
            })
            .collect();

        let removed = graph.remove_matching(Some(resource), None, None)?;
        self.record.removed.extend(removed);

        if self.recursive {
            for orphan_candidate in related {
                if visited.contains(&orphan_candidate) {
                    continue;
                }
                // Still referenced by a surviving subject: keep it, and keep
                // its own outgoing triples.
                if graph.subjects_referencing(&orphan_candidate)?.is_empty() {
                    self.delete_single(&orphan_candidate, graph, visited)?;
                }
            }
        }

        Ok(())
    }

    /// Re-add the removed triples from the recorded diff.
    pub fn undo_from(&mut self, graph: &MetadataGraph) -> Result<()> {
        self.state.begin_undo()?;
        graph.insert_all(&self.record.removed)?;
        self.state.finish_undo();
        Ok(())
    }
}
