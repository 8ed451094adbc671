//! Project layout: where a project keeps its metadata on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::Result;
use crate::error::MetadataError;

const METADATA_DIR: &str = "metadata";
const SCHEMA_SUBDIR: &str = "schemata";
const ANNOTATIONS_FILE: &str = "annotations.ttl";
const LAYOUT_FILE: &str = "metadata.toml";

const SCHEMA_EXTENSIONS: &[&str] = &["ttl", "turtle", "rdf", "owl", "nt"];

/// Resolved on-disk layout of one project's metadata.
///
/// Defaults to `<root>/metadata/schemata/` for ontology files and
/// `<root>/metadata/annotations.ttl` for the annotation graph; a
/// `metadata.toml` at the project root may override either location.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub schema_dir: PathBuf,
    pub annotations_file: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct PartialLayout {
    schema_dir: Option<PathBuf>,
    annotations_file: Option<PathBuf>,
}

fn load_layout_file(path: &Path) -> Result<PartialLayout> {
    let raw = fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

impl ProjectLayout {
    /// Resolve the layout for a project root. The root itself must exist;
    /// everything underneath it may be created later by [`ensure`].
    ///
    /// [`ensure`]: ProjectLayout::ensure
    pub fn discover(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(MetadataError::Layout(format!(
                "project root '{}' does not exist",
                root.display()
            )));
        }

        let overrides = {
            let layout_file = root.join(LAYOUT_FILE);
            if layout_file.is_file() {
                load_layout_file(&layout_file)?
            } else {
                PartialLayout::default()
            }
        };

        let metadata_dir = root.join(METADATA_DIR);
        let schema_dir = overrides
            .schema_dir
            .map(|p| if p.is_absolute() { p } else { root.join(p) })
            .unwrap_or_else(|| metadata_dir.join(SCHEMA_SUBDIR));
        let annotations_file = overrides
            .annotations_file
            .map(|p| if p.is_absolute() { p } else { root.join(p) })
            .unwrap_or_else(|| metadata_dir.join(ANNOTATIONS_FILE));

        Ok(Self {
            root: root.to_path_buf(),
            schema_dir,
            annotations_file,
        })
    }

    /// Create missing layout pieces: the schema directory and an empty
    /// annotations file.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.schema_dir)?;
        if let Some(parent) = self.annotations_file.parent() {
            fs::create_dir_all(parent)?;
        }
        if !self.annotations_file.exists() {
            fs::write(&self.annotations_file, "")?;
            tracing::info!(
                path = %self.annotations_file.display(),
                "created empty annotations file"
            );
        }
        Ok(())
    }

    /// Ontology files found under the schema directory, in sorted order so
    /// the schema union is deterministic.
    pub fn schema_paths(&self) -> Result<Vec<PathBuf>> {
        if !self.schema_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(&self.schema_dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .map(|ext| SCHEMA_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();

        paths.sort();
        Ok(paths)
    }
}
