//! Error types for the metadata engine.

use crate::reason::ValidationReport;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Errors produced by the metadata engine.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid project layout: {0}")]
    Layout(String),

    #[error("invalid metadata configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("unsupported RDF format for '{0}'")]
    UnsupportedFormat(String),

    #[error("failed to load RDF data: {0}")]
    Load(#[from] oxigraph::store::LoaderError),

    #[error("failed to serialize RDF data: {0}")]
    Serialize(#[from] oxigraph::store::SerializerError),

    #[error("graph storage error: {0}")]
    Storage(#[from] oxigraph::store::StorageError),

    #[error("query failed: {0}")]
    Query(#[from] oxigraph::sparql::EvaluationError),

    #[error("query returned an unexpected result form: expected {0}")]
    UnexpectedResultForm(&'static str),

    #[error("binding error: {0}")]
    Binding(#[from] crate::query::BindingError),

    #[error("schema validation failed: {0}")]
    SchemaViolation(ValidationReport),

    #[error("change operation was already applied")]
    ChangeAlreadyApplied,

    #[error("change operation was not applied yet")]
    ChangeNotApplied,

    #[error("change operation was already undone")]
    ChangeAlreadyUndone,
}
