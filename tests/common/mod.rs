//! Shared fixtures: a small FOAF-flavoured schema and annotation graph.

#![allow(dead_code)]

use metagraph::{MetadataGraph, Reasoner, SchemaModel};
use oxigraph::model::{Literal, NamedNode, Term, Triple};

pub const FOAF_NS: &str = "http://xmlns.com/foaf/0.1/";
pub const EX_NS: &str = "http://example.org/";

pub const SCHEMA_TTL: &str = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
@prefix foaf: <http://xmlns.com/foaf/0.1/> .

foaf:Agent a rdfs:Class .
foaf:Person a rdfs:Class ; rdfs:subClassOf foaf:Agent .
foaf:name a rdf:Property ; rdfs:domain foaf:Person ; rdfs:range xsd:string .
foaf:mbox a rdf:Property ; rdfs:domain foaf:Person ; rdfs:range xsd:string .
foaf:knows a rdf:Property ; rdfs:domain foaf:Person ; rdfs:range foaf:Person .
"#;

pub const ANNOTATIONS_TTL: &str = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix foaf: <http://xmlns.com/foaf/0.1/> .
@prefix ex: <http://example.org/> .

ex:alice a foaf:Person ; foaf:name "Alice" ; foaf:mbox "foo@bar.com" .
ex:bob a foaf:Person ; foaf:name "Bob" ; foaf:knows ex:alice .
"#;

pub fn nn(iri: &str) -> NamedNode {
    NamedNode::new(iri).unwrap()
}

pub fn foaf(local: &str) -> NamedNode {
    nn(&format!("{}{}", FOAF_NS, local))
}

pub fn ex(local: &str) -> NamedNode {
    nn(&format!("{}{}", EX_NS, local))
}

pub fn resource_triple(s: &NamedNode, p: &NamedNode, o: &NamedNode) -> Triple {
    Triple::new(s.clone(), p.clone(), Term::NamedNode(o.clone()))
}

pub fn literal_triple(s: &NamedNode, p: &NamedNode, o: &str) -> Triple {
    Triple::new(s.clone(), p.clone(), Literal::new_simple_literal(o))
}

pub fn schema() -> SchemaModel {
    SchemaModel::from_turtle(SCHEMA_TTL).unwrap()
}

pub fn annotations() -> MetadataGraph {
    MetadataGraph::from_turtle(ANNOTATIONS_TTL).unwrap()
}

pub fn reasoner() -> Reasoner {
    Reasoner::bind_schema(&schema()).unwrap()
}

/// Both graphs hold exactly the same triple set.
pub fn assert_same_triples(left: &MetadataGraph, right: &MetadataGraph) {
    assert!(
        left.difference(right).unwrap().is_empty(),
        "left graph has triples the right graph lacks"
    );
    assert!(
        right.difference(left).unwrap().is_empty(),
        "right graph has triples the left graph lacks"
    );
}
