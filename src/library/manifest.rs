//! JSON manifest library.
//!
//! Stands in for a host library: a JSON file listing items together with
//! the remote trailers their provider published. The file is re-read on
//! every query so a long-running daemon always sees the latest snapshot.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{first_trailer_url, ItemQuery, Library};
use crate::domain::LibraryItem;

/// On-disk manifest schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest format version
    pub version: u32,

    /// All library items
    #[serde(default)]
    pub items: Vec<LibraryItem>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

impl Manifest {
    /// Create a new empty manifest
    pub fn new() -> Self {
        Self {
            version: 1,
            items: Vec::new(),
        }
    }

    /// Parse a manifest, resolving relative item folders against `base_dir`
    pub fn from_json(content: &str, base_dir: &Path) -> Result<Self> {
        let mut manifest: Manifest =
            serde_json::from_str(content).context("Failed to parse manifest JSON")?;

        for item in &mut manifest.items {
            if item.containing_folder.is_relative() {
                item.containing_folder = base_dir.join(&item.containing_folder);
            }
        }

        Ok(manifest)
    }

    /// Write the manifest as pretty JSON
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write manifest: {}", path.display()))?;

        Ok(())
    }
}

/// [`Library`] backed by a manifest file
#[derive(Debug, Clone)]
pub struct ManifestLibrary {
    path: PathBuf,
}

impl ManifestLibrary {
    /// Open a manifest library (the file is read lazily)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to the manifest file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current manifest from disk
    pub fn load(&self) -> Result<Manifest> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read manifest: {}", self.path.display()))?;

        let base_dir = self.path.parent().unwrap_or(Path::new("."));
        Manifest::from_json(&content, base_dir)
            .with_context(|| format!("Invalid manifest: {}", self.path.display()))
    }
}

impl Library for ManifestLibrary {
    fn candidate_items(&self, query: &ItemQuery) -> Result<Vec<LibraryItem>> {
        Ok(self
            .load()?
            .items
            .into_iter()
            .filter(|item| query.matches(item))
            .collect())
    }

    fn resolve_trailer_url(&self, item: &LibraryItem) -> Result<Option<String>> {
        Ok(first_trailer_url(item))
    }
}
