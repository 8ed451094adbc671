//! Reading and writing triple files.
//!
//! Formats are delegated to `oxigraph::io`; the core only needs
//! "parse file -> triple set" and "triple set -> file".

use std::fs;
use std::path::Path;

use oxigraph::io::RdfFormat;

use crate::error::MetadataError;
use crate::graph::namespaces::extract_turtle_prefixes;
use crate::graph::store::MetadataGraph;
use crate::Result;

/// Map a file extension to its RDF serialization.
pub fn format_for_path(path: &Path) -> Result<RdfFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "ttl" | "turtle" => Ok(RdfFormat::Turtle),
        "rdf" | "owl" | "xml" => Ok(RdfFormat::RdfXml),
        "nt" | "ntriples" => Ok(RdfFormat::NTriples),
        _ => Err(MetadataError::UnsupportedFormat(
            path.display().to_string(),
        )),
    }
}

impl MetadataGraph {
    /// Union Turtle text into the graph, harvesting its prefix bindings.
    pub fn load_turtle(&mut self, turtle: &str) -> Result<()> {
        self.store()
            .load_from_reader(RdfFormat::Turtle, turtle.as_bytes())?;
        for (prefix, iri) in extract_turtle_prefixes(turtle) {
            self.namespaces_mut().register(prefix, iri);
        }
        Ok(())
    }

    /// Union a triple file into the graph; the serialization is chosen by
    /// file extension. Returns the number of newly present triples.
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let format = format_for_path(path)?;
        let before = self.len()?;
        let content = fs::read_to_string(path)?;
        if format == RdfFormat::Turtle {
            self.load_turtle(&content)?;
        } else {
            self.store()
                .load_from_reader(format, content.as_bytes())?;
        }
        Ok(self.len()? - before)
    }

    /// Serialize the whole graph to a file; the serialization is chosen by
    /// file extension.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let format = format_for_path(path)?;
        let mut buffer = Vec::new();
        self.store().dump_to_writer(format, &mut buffer)?;
        fs::write(path, buffer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_chosen_by_extension() {
        assert_eq!(
            format_for_path(Path::new("a/annotations.ttl")).unwrap(),
            RdfFormat::Turtle
        );
        assert_eq!(
            format_for_path(Path::new("schema.owl")).unwrap(),
            RdfFormat::RdfXml
        );
        assert_eq!(
            format_for_path(Path::new("dump.nt")).unwrap(),
            RdfFormat::NTriples
        );
        assert!(format_for_path(Path::new("notes.txt")).is_err());
    }

    #[test]
    fn load_turtle_registers_prefixes() {
        let mut graph = MetadataGraph::new().unwrap();
        graph
            .load_turtle(
                r#"
@prefix ex: <http://example.org/> .
ex:alice ex:knows ex:bob .
                "#,
            )
            .unwrap();

        assert_eq!(graph.len().unwrap(), 1);
        assert_eq!(graph.namespaces().get("ex"), Some("http://example.org/"));
    }
}
