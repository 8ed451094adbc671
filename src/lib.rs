//! Project metadata as an RDF triple graph.
//!
//! The crate wires five pieces together:
//!
//! - [`graph::MetadataGraph`] — the mutable fact graph and its low-level
//!   add/remove/diff primitives, over an in-memory oxigraph store.
//! - [`schema::SchemaModel`] — the union of a project's ontology files.
//! - [`reason::Reasoner`] — schema-bound inference and advisory validation.
//! - [`change`] — the merge/delete operation algebra with recorded diffs
//!   and undo.
//! - [`query::QueryEngine`] — SPARQL SELECT/CONSTRUCT plus literal search.
//!
//! [`service::MetadataService`] is the entry point collaborators use:
//!
//! ```rust,ignore
//! let mut service = MetadataService::open("/path/to/project")?;
//! let mut change = Change::from(Delete::new(resource, true));
//! service.apply(&mut change)?;
//! service.save_annotations()?;
//! ```
//!
//! Everything is synchronous and single-threaded by design: one change is
//! fully applied before the next begins, and queries do not run against a
//! graph mid-mutation.

pub mod change;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod query;
pub mod reason;
pub mod schema;
pub mod service;

pub use change::{Change, ChangeRecord, Delete, Merge};
pub use config::ProjectLayout;
pub use error::{MetadataError, Result};
pub use graph::{MetadataGraph, NamespaceRegistry, STD_PREFIXES};
pub use logging::{LogFormat, LogOutput, LoggingConfig, init_logging};
pub use query::{LiteralSearch, QueryEngine, TypedBinding};
pub use reason::{InferredView, Reasoner, ValidationReport, Violation};
pub use schema::SchemaModel;
pub use service::MetadataService;
