//! The ontology model: a union of loaded schema files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use oxigraph::io::RdfFormat;
use oxigraph::model::vocab::{rdf, rdfs};
use oxigraph::model::{GraphNameRef, NamedNode, Subject, Term, Triple};
use oxigraph::store::Store;

use crate::graph::format_for_path;
use crate::graph::namespaces::OWL_NS;
use crate::Result;

const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
const OWL_DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";

/// Union of ontology-defining triples: classes, property declarations and
/// their domain/range constraints.
///
/// Read-mostly: loaded once at service construction, mutated only through
/// explicit [`SchemaModel::import`] calls that re-union additional files.
/// Files loaded more than once collapse into the same triple set.
pub struct SchemaModel {
    store: Store,
    sources: Vec<PathBuf>,
}

impl SchemaModel {
    /// Empty default schema, used when a project has no ontology files.
    pub fn empty() -> Result<Self> {
        Ok(Self {
            store: Store::new()?,
            sources: Vec::new(),
        })
    }

    /// Union the given ontology files into one schema.
    pub fn load(paths: &[PathBuf]) -> Result<Self> {
        let mut schema = Self::empty()?;
        for path in paths {
            schema.import(path)?;
        }
        Ok(schema)
    }

    /// Build a schema from Turtle text.
    pub fn from_turtle(turtle: &str) -> Result<Self> {
        let schema = Self::empty()?;
        schema
            .store
            .load_from_reader(RdfFormat::Turtle, turtle.as_bytes())?;
        Ok(schema)
    }

    /// Re-union an additional ontology file into the schema.
    pub fn import(&mut self, path: &Path) -> Result<()> {
        let format = format_for_path(path)?;
        let content = std::fs::read_to_string(path)?;
        self.store.load_from_reader(format, content.as_bytes())?;
        self.sources.push(path.to_path_buf());
        tracing::debug!(path = %path.display(), "imported ontology file");
        Ok(())
    }

    /// Paths this schema was unioned from, in load order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.store.len()?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn triples(&self) -> Result<Vec<Triple>> {
        let mut triples = Vec::new();
        for quad in self.store.iter() {
            let quad = quad?;
            triples.push(Triple::new(quad.subject, quad.predicate, quad.object));
        }
        Ok(triples)
    }

    /// Every class the schema declares: subjects typed as `rdfs:Class` or
    /// `owl:Class`, plus anything that appears on either side of
    /// `rdfs:subClassOf`.
    pub fn classes(&self) -> Result<HashSet<NamedNode>> {
        let mut classes = HashSet::new();

        for quad in self.store.quads_for_pattern(
            None,
            Some(rdf::TYPE),
            None,
            Some(GraphNameRef::DefaultGraph),
        ) {
            let quad = quad?;
            let is_class_decl = matches!(
                &quad.object,
                Term::NamedNode(o) if o.as_ref() == rdfs::CLASS || o.as_str() == OWL_CLASS
            );
            if is_class_decl {
                if let Subject::NamedNode(subject) = quad.subject {
                    classes.insert(subject);
                }
            }
        }

        for quad in self.store.quads_for_pattern(
            None,
            Some(rdfs::SUB_CLASS_OF),
            None,
            Some(GraphNameRef::DefaultGraph),
        ) {
            let quad = quad?;
            if let Subject::NamedNode(subject) = quad.subject {
                classes.insert(subject);
            }
            if let Term::NamedNode(object) = quad.object {
                classes.insert(object);
            }
        }

        Ok(classes)
    }

    /// Every property the schema declares: subjects typed as `rdf:Property`
    /// (or the owl property classes), plus subjects carrying a domain or
    /// range constraint.
    pub fn properties(&self) -> Result<HashSet<NamedNode>> {
        let mut properties = HashSet::new();

        for quad in self.store.quads_for_pattern(
            None,
            Some(rdf::TYPE),
            None,
            Some(GraphNameRef::DefaultGraph),
        ) {
            let quad = quad?;
            let is_property_decl = matches!(
                &quad.object,
                Term::NamedNode(o)
                    if o.as_ref() == rdf::PROPERTY
                        || o.as_str() == OWL_OBJECT_PROPERTY
                        || o.as_str() == OWL_DATATYPE_PROPERTY
            );
            if is_property_decl {
                if let Subject::NamedNode(subject) = quad.subject {
                    properties.insert(subject);
                }
            }
        }

        for predicate in [rdfs::DOMAIN, rdfs::RANGE] {
            for quad in self.store.quads_for_pattern(
                None,
                Some(predicate),
                None,
                Some(GraphNameRef::DefaultGraph),
            ) {
                let quad = quad?;
                if let Subject::NamedNode(subject) = quad.subject {
                    properties.insert(subject);
                }
            }
        }

        Ok(properties)
    }

    /// Declared domains of a property.
    pub fn domains_of(&self, property: &NamedNode) -> Result<Vec<NamedNode>> {
        self.constraint_objects(property, rdfs::DOMAIN)
    }

    /// Declared ranges of a property.
    pub fn ranges_of(&self, property: &NamedNode) -> Result<Vec<NamedNode>> {
        self.constraint_objects(property, rdfs::RANGE)
    }

    fn constraint_objects(
        &self,
        property: &NamedNode,
        constraint: oxigraph::model::NamedNodeRef<'_>,
    ) -> Result<Vec<NamedNode>> {
        let mut objects = Vec::new();
        for quad in self.store.quads_for_pattern(
            Some(property.as_ref().into()),
            Some(constraint),
            None,
            Some(GraphNameRef::DefaultGraph),
        ) {
            let quad = quad?;
            if let Term::NamedNode(object) = quad.object {
                objects.push(object);
            }
        }
        Ok(objects)
    }

    /// Transitive `rdfs:subClassOf` closure of a class, excluding the class
    /// itself. Cycle-safe.
    pub fn superclasses_of(&self, class: &NamedNode) -> Result<HashSet<NamedNode>> {
        let mut closure = HashSet::new();
        let mut pending = vec![class.clone()];
        let mut visited = HashSet::new();

        while let Some(current) = pending.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for quad in self.store.quads_for_pattern(
                Some(current.as_ref().into()),
                Some(rdfs::SUB_CLASS_OF),
                None,
                Some(GraphNameRef::DefaultGraph),
            ) {
                let quad = quad?;
                if let Term::NamedNode(parent) = quad.object {
                    if parent != *class {
                        closure.insert(parent.clone());
                    }
                    pending.push(parent);
                }
            }
        }

        Ok(closure)
    }

    /// Whether the IRI belongs to the ontology-language namespace itself.
    pub fn is_builtin(iri: &str) -> bool {
        iri.starts_with(OWL_NS) || iri.starts_with(crate::graph::RDFS_NS)
    }
}

impl std::fmt::Debug for SchemaModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaModel")
            .field("triples", &self.store.len().unwrap_or(0))
            .field("sources", &self.sources)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix foaf: <http://xmlns.com/foaf/0.1/> .

foaf:Agent a rdfs:Class .
foaf:Person a rdfs:Class ; rdfs:subClassOf foaf:Agent .
foaf:name a rdf:Property ; rdfs:domain foaf:Agent .
foaf:knows a rdf:Property ; rdfs:domain foaf:Person ; rdfs:range foaf:Person .
"#;

    fn nn(iri: &str) -> NamedNode {
        NamedNode::new(iri).unwrap()
    }

    #[test]
    fn classes_and_properties_are_discovered() {
        let schema = SchemaModel::from_turtle(FIXTURE).unwrap();

        let classes = schema.classes().unwrap();
        assert!(classes.contains(&nn("http://xmlns.com/foaf/0.1/Person")));
        assert!(classes.contains(&nn("http://xmlns.com/foaf/0.1/Agent")));

        let properties = schema.properties().unwrap();
        assert!(properties.contains(&nn("http://xmlns.com/foaf/0.1/name")));
        assert!(properties.contains(&nn("http://xmlns.com/foaf/0.1/knows")));
    }

    #[test]
    fn superclass_closure_is_transitive_and_cycle_safe() {
        let schema = SchemaModel::from_turtle(
            r#"
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix ex: <http://example.org/> .
ex:C rdfs:subClassOf ex:B .
ex:B rdfs:subClassOf ex:A .
ex:A rdfs:subClassOf ex:C .
"#,
        )
        .unwrap();

        let closure = schema.superclasses_of(&nn("http://example.org/C")).unwrap();
        assert!(closure.contains(&nn("http://example.org/B")));
        assert!(closure.contains(&nn("http://example.org/A")));
        assert!(!closure.contains(&nn("http://example.org/C")));
    }

    #[test]
    fn domains_and_ranges_resolve() {
        let schema = SchemaModel::from_turtle(FIXTURE).unwrap();
        let knows = nn("http://xmlns.com/foaf/0.1/knows");

        assert_eq!(
            schema.domains_of(&knows).unwrap(),
            vec![nn("http://xmlns.com/foaf/0.1/Person")]
        );
        assert_eq!(
            schema.ranges_of(&knows).unwrap(),
            vec![nn("http://xmlns.com/foaf/0.1/Person")]
        );
    }
}
