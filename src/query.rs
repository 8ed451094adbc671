//! SPARQL execution and literal search over the annotation graph.

use std::collections::HashSet;

use oxigraph::model::vocab::rdf;
use oxigraph::model::{GraphNameRef, NamedNode, Subject, Term};
use oxigraph::sparql::{QueryResults, QuerySolution};
use oxigraph::store::QuadIter;
use thiserror::Error;

use crate::Result;
use crate::error::MetadataError;
use crate::graph::{MetadataGraph, STD_PREFIXES};
use crate::schema::SchemaModel;

/// Read-only query surface over one graph.
///
/// The base vocabulary prefixes (rdf/rdfs/owl/xsd) are prepended to every
/// query; project prefixes are available through [`QueryEngine::prefix_header`]
/// for callers building their own query text.
pub struct QueryEngine<'a> {
    graph: &'a MetadataGraph,
}

impl<'a> QueryEngine<'a> {
    pub fn new(graph: &'a MetadataGraph) -> Self {
        Self { graph }
    }

    /// The graph's registered namespaces as SPARQL PREFIX declarations.
    pub fn prefix_header(&self) -> String {
        self.graph.namespaces().prefix_header()
    }

    /// Execute a SELECT query, materializing the bindings in result order.
    /// The order is whatever the engine yields; sort explicitly if you need
    /// stability across runs.
    pub fn select(&self, query: &str) -> Result<Vec<QuerySolution>> {
        let full = with_std_prefixes(query);
        let results = self.graph.store().query(full.as_str())?;
        match results {
            QueryResults::Solutions(solutions) => {
                let mut bindings = Vec::new();
                for solution in solutions {
                    bindings.push(solution?);
                }
                Ok(bindings)
            }
            _ => Err(MetadataError::UnexpectedResultForm("SELECT solutions")),
        }
    }

    /// Execute a CONSTRUCT query into a new graph; the store is not mutated.
    pub fn construct(&self, query: &str) -> Result<MetadataGraph> {
        let full = with_std_prefixes(query);
        let results = self.graph.store().query(full.as_str())?;
        match results {
            QueryResults::Graph(triples) => {
                let mut derived = MetadataGraph::new()?;
                derived
                    .namespaces_mut()
                    .merge(self.graph.namespaces());
                for triple in triples {
                    derived.insert_triple(&triple?)?;
                }
                Ok(derived)
            }
            _ => Err(MetadataError::UnexpectedResultForm("CONSTRUCT graph")),
        }
    }

    /// Lazy full-text search over literal values: yields every distinct
    /// subject with at least one non-`rdf:type` triple whose literal object
    /// case-insensitively contains `needle`. One pass per call, no caching;
    /// call again to restart.
    pub fn literal_search(&self, needle: &str) -> LiteralSearch {
        LiteralSearch {
            quads: self.graph.store().quads_for_pattern(
                None,
                None,
                None,
                Some(GraphNameRef::DefaultGraph),
            ),
            needle: needle.to_lowercase(),
            seen: HashSet::new(),
        }
    }

    /// All distinct types asserted in the graph, excluding the ontology
    /// language's own vocabulary.
    pub fn available_types(&self) -> Result<Vec<NamedNode>> {
        let mut seen = HashSet::new();
        let mut types = Vec::new();
        for quad in self.graph.store().quads_for_pattern(
            None,
            Some(rdf::TYPE),
            None,
            Some(GraphNameRef::DefaultGraph),
        ) {
            let quad = quad?;
            if let Term::NamedNode(class) = quad.object {
                if !SchemaModel::is_builtin(class.as_str()) && seen.insert(class.clone()) {
                    types.push(class);
                }
            }
        }
        Ok(types)
    }

    /// Sub-graph of every subject whose literals match `filter`, carrying
    /// all of the subject's outgoing triples (types included). An empty
    /// filter returns a copy of the whole graph.
    pub fn annotations_matching(&self, filter: &str) -> Result<MetadataGraph> {
        if filter.is_empty() {
            return self.graph.duplicate();
        }

        let mut matched = MetadataGraph::new()?;
        matched.namespaces_mut().merge(self.graph.namespaces());
        for subject in self.literal_search(filter) {
            let subject = subject?;
            for triple in self.graph.triples_with_subject(&subject)? {
                matched.insert_triple(&triple)?;
            }
        }
        Ok(matched)
    }
}

/// Lazy, restartable literal-search cursor. See
/// [`QueryEngine::literal_search`].
pub struct LiteralSearch {
    quads: QuadIter<'static>,
    needle: String,
    seen: HashSet<NamedNode>,
}

impl Iterator for LiteralSearch {
    type Item = Result<NamedNode>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let quad = match self.quads.next()? {
                Ok(quad) => quad,
                Err(e) => return Some(Err(e.into())),
            };
            if quad.predicate.as_ref() == rdf::TYPE {
                continue;
            }
            let Term::Literal(literal) = &quad.object else {
                continue;
            };
            if !literal.value().to_lowercase().contains(&self.needle) {
                continue;
            }
            let Subject::NamedNode(subject) = quad.subject else {
                continue;
            };
            if self.seen.insert(subject.clone()) {
                return Some(Ok(subject));
            }
        }
    }
}

/// Prepend the base vocabulary prefixes, skipping any the query text
/// already declares itself.
fn with_std_prefixes(query: &str) -> String {
    let mut header = String::new();
    for line in STD_PREFIXES.lines() {
        let label = line.split_whitespace().nth(1).unwrap_or("");
        let declared = query.contains(&format!("PREFIX {}", label))
            || query.contains(&format!("prefix {}", label));
        if !declared {
            header.push_str(line);
            header.push('\n');
        }
    }
    format!("{}{}", header, query)
}

// =============================================================================
// Typed binding extraction
// =============================================================================

/// Errors raised when pulling typed values out of a solution.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BindingError {
    #[error("variable '{0}' not found in bindings")]
    NotFound(String),

    #[error("expected {expected} for '{var}', got {actual}")]
    TypeMismatch {
        var: String,
        expected: String,
        actual: String,
    },
}

/// Typed accessor over one SPARQL solution, so display collaborators never
/// pattern-match raw terms.
pub struct TypedBinding<'a> {
    solution: &'a QuerySolution,
}

impl<'a> TypedBinding<'a> {
    pub fn new(solution: &'a QuerySolution) -> Self {
        Self { solution }
    }

    pub fn variables(&self) -> Vec<String> {
        self.solution
            .variables()
            .iter()
            .map(|v| v.as_str().to_string())
            .collect()
    }

    pub fn get_term(&self, var: &str) -> std::result::Result<&Term, BindingError> {
        self.solution
            .get(var)
            .ok_or_else(|| BindingError::NotFound(var.to_string()))
    }

    /// Extract an IRI binding.
    pub fn get_iri(&self, var: &str) -> std::result::Result<String, BindingError> {
        match self.get_term(var)? {
            Term::NamedNode(node) => Ok(node.as_str().to_string()),
            term => Err(BindingError::TypeMismatch {
                var: var.to_string(),
                expected: "IRI".to_string(),
                actual: term_type_name(term),
            }),
        }
    }

    /// Extract a literal binding's lexical value.
    pub fn get_literal(&self, var: &str) -> std::result::Result<String, BindingError> {
        match self.get_term(var)? {
            Term::Literal(literal) => Ok(literal.value().to_string()),
            term => Err(BindingError::TypeMismatch {
                var: var.to_string(),
                expected: "literal".to_string(),
                actual: term_type_name(term),
            }),
        }
    }

    pub fn get_literal_opt(
        &self,
        var: &str,
    ) -> std::result::Result<Option<String>, BindingError> {
        match self.solution.get(var) {
            None => Ok(None),
            Some(Term::Literal(literal)) => Ok(Some(literal.value().to_string())),
            Some(term) => Err(BindingError::TypeMismatch {
                var: var.to_string(),
                expected: "literal".to_string(),
                actual: term_type_name(term),
            }),
        }
    }
}

fn term_type_name(term: &Term) -> String {
    match term {
        Term::NamedNode(_) => "IRI".to_string(),
        Term::BlankNode(_) => "blank node".to_string(),
        Term::Literal(_) => "literal".to_string(),
        _ => "other term".to_string(),
    }
}
