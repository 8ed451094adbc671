//! Graph storage: the mutable fact graph, namespace registry and file I/O.

pub mod io;
pub mod namespaces;
pub mod store;

pub use io::format_for_path;
pub use namespaces::{NamespaceRegistry, OWL_NS, RDF_NS, RDFS_NS, STD_PREFIXES, XSD_NS};
pub use store::MetadataGraph;
