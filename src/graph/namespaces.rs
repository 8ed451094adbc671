//! Namespace prefix registry and SPARQL prefix rendering.

use indexmap::IndexMap;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

/// PREFIX declarations for the base ontology vocabulary, auto-prepended to
/// every query the engine executes.
pub const STD_PREFIXES: &str = concat!(
    "PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>\n",
    "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>\n",
    "PREFIX owl: <http://www.w3.org/2002/07/owl#>\n",
    "PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>"
);

/// Ordered prefix -> namespace IRI map attached to a graph.
///
/// Seeded with the rdf/rdfs/owl/xsd vocabulary and extended with prefixes
/// harvested while parsing Turtle files. Registration order is preserved so
/// rendered headers are stable.
#[derive(Debug, Clone)]
pub struct NamespaceRegistry {
    map: IndexMap<String, String>,
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        let mut map = IndexMap::new();
        map.insert("rdf".to_string(), RDF_NS.to_string());
        map.insert("rdfs".to_string(), RDFS_NS.to_string());
        map.insert("owl".to_string(), OWL_NS.to_string());
        map.insert("xsd".to_string(), XSD_NS.to_string());
        Self { map }
    }
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prefix binding. Re-registering a prefix replaces the IRI.
    pub fn register(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.map.insert(prefix.into(), iri.into());
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.map.get(prefix).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(p, i)| (p.as_str(), i.as_str()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Render all known bindings as SPARQL PREFIX declarations, one per line.
    pub fn prefix_header(&self) -> String {
        self.map
            .iter()
            .map(|(prefix, iri)| format!("PREFIX {}: <{}>", prefix, iri))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Merge bindings from another registry; the other registry wins on
    /// conflicting prefixes.
    pub fn merge(&mut self, other: &NamespaceRegistry) {
        for (prefix, iri) in other.iter() {
            self.register(prefix, iri);
        }
    }
}

/// Extract `@prefix` bindings from Turtle text.
///
/// Only line-leading declarations are recognized; that covers every file this
/// crate writes and the common hand-authored layout.
pub fn extract_turtle_prefixes(content: &str) -> Vec<(String, String)> {
    let mut prefixes = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        let rest = match trimmed
            .strip_prefix("@prefix")
            .or_else(|| trimmed.strip_prefix("PREFIX"))
        {
            Some(rest) => rest,
            None => continue,
        };
        let parts: Vec<&str> = rest.trim().split_whitespace().collect();
        if parts.len() >= 2 {
            let prefix = parts[0].trim_end_matches(':');
            let iri = parts[1].trim_matches(&['<', '>', '.'][..]);
            prefixes.push((prefix.to_string(), iri.to_string()));
        }
    }

    prefixes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_base_vocabulary() {
        let ns = NamespaceRegistry::new();
        assert_eq!(ns.get("rdf"), Some(RDF_NS));
        assert_eq!(ns.get("owl"), Some(OWL_NS));
        assert_eq!(ns.len(), 4);
    }

    #[test]
    fn prefix_header_renders_all_bindings() {
        let mut ns = NamespaceRegistry::new();
        ns.register("foaf", "http://xmlns.com/foaf/0.1/");

        let header = ns.prefix_header();
        assert!(header.contains("PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>"));
        assert!(header.contains("PREFIX foaf: <http://xmlns.com/foaf/0.1/>"));
        assert_eq!(header.lines().count(), 5);
    }

    #[test]
    fn extracts_turtle_prefixes() {
        let turtle = r#"
@prefix foaf: <http://xmlns.com/foaf/0.1/> .
@prefix ex: <http://example.org/> .
ex:alice a foaf:Person .
        "#;

        let prefixes = extract_turtle_prefixes(turtle);
        assert_eq!(prefixes.len(), 2);
        assert_eq!(prefixes[0], ("foaf".into(), "http://xmlns.com/foaf/0.1/".into()));
        assert_eq!(prefixes[1], ("ex".into(), "http://example.org/".into()));
    }

    #[test]
    fn reregistering_prefix_replaces_binding() {
        let mut ns = NamespaceRegistry::new();
        ns.register("ex", "http://example.org/v1#");
        ns.register("ex", "http://example.org/v2#");
        assert_eq!(ns.get("ex"), Some("http://example.org/v2#"));
    }
}
