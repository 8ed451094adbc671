//! The metadata service: the load point collaborators talk to.

use std::path::Path;

use oxigraph::model::NamedNode;
use oxigraph::sparql::QuerySolution;

use crate::Result;
use crate::change::Change;
use crate::config::ProjectLayout;
use crate::graph::MetadataGraph;
use crate::query::QueryEngine;
use crate::reason::{InferredView, Reasoner};
use crate::schema::SchemaModel;

/// One project's metadata: the annotation graph plus the schema constraining
/// it.
///
/// Construction reads the project layout from disk; afterwards everything is
/// in memory and synchronous. Persistence back to storage happens only when
/// a collaborator asks for it via [`save_annotations`] or
/// [`export_annotations`].
///
/// [`save_annotations`]: MetadataService::save_annotations
/// [`export_annotations`]: MetadataService::export_annotations
pub struct MetadataService {
    layout: ProjectLayout,
    schema: SchemaModel,
    graph: MetadataGraph,
}

impl MetadataService {
    /// Open (or initialize) the metadata service for a project root.
    ///
    /// Ontology files under the project's schema directory are unioned into
    /// the schema; the annotations file is loaded into the graph. Missing
    /// pieces are created empty; an unreadable root or malformed file fails
    /// with no partial state retained.
    pub fn open(project_root: impl AsRef<Path>) -> Result<Self> {
        let layout = ProjectLayout::discover(project_root)?;
        layout.ensure()?;

        let schema_paths = layout.schema_paths()?;
        let schema = SchemaModel::load(&schema_paths)?;

        let mut graph = MetadataGraph::new()?;
        graph.load_file(&layout.annotations_file)?;

        tracing::info!(
            root = %layout.root.display(),
            schema_files = schema_paths.len(),
            annotations = graph.len()?,
            "metadata service opened"
        );

        Ok(Self {
            layout,
            schema,
            graph,
        })
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn graph(&self) -> &MetadataGraph {
        &self.graph
    }

    pub fn schema(&self) -> &SchemaModel {
        &self.schema
    }

    /// Union an external triple file directly into the live graph — an
    /// unguarded merge of the whole file's contents. Returns the number of
    /// newly present triples.
    pub fn import_metadata(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let added = self.graph.load_file(path)?;
        tracing::info!(path = %path.display(), added, "imported metadata file");
        Ok(added)
    }

    /// Re-union an additional ontology file into the schema.
    pub fn import_schema(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.schema.import(path.as_ref())
    }

    /// Apply a change operation to the annotation graph.
    pub fn apply(&self, change: &mut Change) -> Result<()> {
        change.apply_to(&self.graph)
    }

    /// Undo a previously applied change from its recorded diff.
    pub fn undo(&self, change: &mut Change) -> Result<()> {
        change.undo_from(&self.graph)
    }

    /// A reasoning context bound to this service's schema.
    pub fn reasoner(&self) -> Result<Reasoner> {
        Reasoner::bind_schema(&self.schema)
    }

    /// Inferred view of the current annotations under this service's schema.
    pub fn inferred<'a>(&'a self, reasoner: &'a Reasoner) -> Result<InferredView<'a>> {
        reasoner.infer(&self.graph)
    }

    /// The query surface over the current annotations.
    pub fn query(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.graph)
    }

    /// PREFIX declarations for every namespace the graph knows.
    pub fn prefix_header(&self) -> String {
        self.query().prefix_header()
    }

    pub fn select(&self, query: &str) -> Result<Vec<QuerySolution>> {
        self.query().select(query)
    }

    pub fn construct(&self, query: &str) -> Result<MetadataGraph> {
        self.query().construct(query)
    }

    /// Collect the distinct subjects whose literals contain `needle`
    /// (case-insensitive).
    pub fn search(&self, needle: &str) -> Result<Vec<NamedNode>> {
        self.query().literal_search(needle).collect()
    }

    pub fn available_types(&self) -> Result<Vec<NamedNode>> {
        self.query().available_types()
    }

    /// Persist the annotation graph back to the project's annotations file.
    pub fn save_annotations(&self) -> Result<()> {
        self.graph.write_to(&self.layout.annotations_file)?;
        tracing::info!(
            path = %self.layout.annotations_file.display(),
            triples = self.graph.len()?,
            "annotations saved"
        );
        Ok(())
    }

    /// Serialize the annotation graph to an arbitrary path; the format is
    /// chosen by file extension.
    pub fn export_annotations(&self, path: impl AsRef<Path>) -> Result<()> {
        self.graph.write_to(path.as_ref())
    }
}

impl std::fmt::Debug for MetadataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataService")
            .field("root", &self.layout.root)
            .field("graph", &self.graph)
            .field("schema", &self.schema)
            .finish()
    }
}
