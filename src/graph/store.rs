//! The mutable annotation graph and its low-level primitives.

use std::collections::HashSet;

use oxigraph::model::{GraphName, GraphNameRef, NamedNode, Subject, Term, Triple};
use oxigraph::store::Store;

use crate::Result;
use crate::graph::namespaces::NamespaceRegistry;

/// The mutable fact graph backing a metadata service.
///
/// Triples live in the default graph of an in-memory [`Store`]. The type
/// exposes the primitives the change algebra and query engine are built on:
/// pattern removal, object/subject lookups and set difference. There is no
/// internal locking; callers serialize change application (one operation
/// fully applied before the next begins).
pub struct MetadataGraph {
    store: Store,
    namespaces: NamespaceRegistry,
}

impl MetadataGraph {
    pub fn new() -> Result<Self> {
        Ok(Self {
            store: Store::new()?,
            namespaces: NamespaceRegistry::new(),
        })
    }

    /// Build a graph from Turtle text, harvesting its `@prefix` bindings.
    pub fn from_turtle(turtle: &str) -> Result<Self> {
        let mut graph = Self::new()?;
        graph.load_turtle(turtle)?;
        Ok(graph)
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    pub fn register_namespace(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.namespaces.register(prefix, iri);
    }

    pub(crate) fn namespaces_mut(&mut self) -> &mut NamespaceRegistry {
        &mut self.namespaces
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.store.len()?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// All triples currently in the graph.
    pub fn triples(&self) -> Result<Vec<Triple>> {
        let mut triples = Vec::new();
        for quad in self.store.iter() {
            let quad = quad?;
            triples.push(Triple::new(quad.subject, quad.predicate, quad.object));
        }
        Ok(triples)
    }

    /// Whether the resource occurs in the graph, in subject or object position.
    pub fn contains_resource(&self, resource: &NamedNode) -> Result<bool> {
        let as_subject = self
            .store
            .quads_for_pattern(
                Some(resource.as_ref().into()),
                None,
                None,
                Some(GraphNameRef::DefaultGraph),
            )
            .next()
            .transpose()?
            .is_some();
        if as_subject {
            return Ok(true);
        }
        let as_object = self
            .store
            .quads_for_pattern(
                None,
                None,
                Some(resource.as_ref().into()),
                Some(GraphNameRef::DefaultGraph),
            )
            .next()
            .transpose()?
            .is_some();
        Ok(as_object)
    }

    pub fn contains_triple(&self, triple: &Triple) -> Result<bool> {
        let quad = triple.clone().in_graph(GraphName::DefaultGraph);
        Ok(self.store.contains(&quad)?)
    }

    /// Insert a single triple; returns whether it was newly added.
    pub fn insert_triple(&self, triple: &Triple) -> Result<bool> {
        let quad = triple.clone().in_graph(GraphName::DefaultGraph);
        let newly_added = !self.store.contains(&quad)?;
        self.store.insert(&quad)?;
        Ok(newly_added)
    }

    /// Remove a single triple; returns whether it was present.
    pub fn remove_triple(&self, triple: &Triple) -> Result<bool> {
        let quad = triple.clone().in_graph(GraphName::DefaultGraph);
        let was_present = self.store.contains(&quad)?;
        self.store.remove(&quad)?;
        Ok(was_present)
    }

    /// Insert every triple not already present; duplicates contribute nothing.
    /// Returns the triples that were actually added.
    pub fn insert_all(&self, triples: &[Triple]) -> Result<Vec<Triple>> {
        let mut added = Vec::new();
        for triple in triples {
            if self.insert_triple(triple)? {
                added.push(triple.clone());
            }
        }
        Ok(added)
    }

    /// Remove every triple matching the pattern; an unspecified slot is a
    /// wildcard. Returns the removed triples.
    pub fn remove_matching(
        &self,
        subject: Option<&NamedNode>,
        predicate: Option<&NamedNode>,
        object: Option<&Term>,
    ) -> Result<Vec<Triple>> {
        let quads: Vec<_> = self
            .store
            .quads_for_pattern(
                subject.map(|s| s.as_ref().into()),
                predicate.map(|p| p.as_ref()),
                object.map(|o| o.as_ref()),
                Some(GraphNameRef::DefaultGraph),
            )
            .collect::<std::result::Result<_, _>>()?;

        let mut removed = Vec::with_capacity(quads.len());
        for quad in quads {
            self.store.remove(&quad)?;
            removed.push(Triple::new(quad.subject, quad.predicate, quad.object));
        }
        Ok(removed)
    }

    /// All distinct objects of triples matching (subject, predicate?).
    pub fn objects_of(
        &self,
        subject: &NamedNode,
        predicate: Option<&NamedNode>,
    ) -> Result<Vec<Term>> {
        let mut seen = HashSet::new();
        let mut objects = Vec::new();
        for quad in self.store.quads_for_pattern(
            Some(subject.as_ref().into()),
            predicate.map(|p| p.as_ref()),
            None,
            Some(GraphNameRef::DefaultGraph),
        ) {
            let quad = quad?;
            if seen.insert(quad.object.clone()) {
                objects.push(quad.object);
            }
        }
        Ok(objects)
    }

    /// All triples whose subject is the given resource.
    pub fn triples_with_subject(&self, subject: &NamedNode) -> Result<Vec<Triple>> {
        let mut triples = Vec::new();
        for quad in self.store.quads_for_pattern(
            Some(subject.as_ref().into()),
            None,
            None,
            Some(GraphNameRef::DefaultGraph),
        ) {
            let quad = quad?;
            triples.push(Triple::new(quad.subject, quad.predicate, quad.object));
        }
        Ok(triples)
    }

    /// All distinct subjects holding a triple whose object is the given
    /// resource, via any predicate. This is the reference-count primitive
    /// recursive deletion depends on.
    pub fn subjects_referencing(&self, object: &NamedNode) -> Result<Vec<Subject>> {
        let mut seen = HashSet::new();
        let mut subjects = Vec::new();
        for quad in self.store.quads_for_pattern(
            None,
            None,
            Some(object.as_ref().into()),
            Some(GraphNameRef::DefaultGraph),
        ) {
            let quad = quad?;
            if seen.insert(quad.subject.clone()) {
                subjects.push(quad.subject);
            }
        }
        Ok(subjects)
    }

    /// Triples present in `self` but not in `other`.
    pub fn difference(&self, other: &MetadataGraph) -> Result<Vec<Triple>> {
        let mut diff = Vec::new();
        for quad in self.store.iter() {
            let quad = quad?;
            if !other.store.contains(&quad)? {
                diff.push(Triple::new(quad.subject, quad.predicate, quad.object));
            }
        }
        Ok(diff)
    }

    /// Deep copy: a new graph with the same triples and namespace bindings.
    pub fn duplicate(&self) -> Result<Self> {
        let copy = Self::new()?;
        for quad in self.store.iter() {
            copy.store.insert(&quad?)?;
        }
        Ok(Self {
            store: copy.store,
            namespaces: self.namespaces.clone(),
        })
    }
}

impl std::fmt::Debug for MetadataGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataGraph")
            .field("triples", &self.store.len().unwrap_or(0))
            .field("namespaces", &self.namespaces.len())
            .finish()
    }
}
