//! Catalog document access trait and errors.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::Catalog;

/// Errors that can occur reading or replacing a catalog document.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The document exists but could not be parsed.
    #[error("Malformed catalog document {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// Failed to read the document.
    #[error("Failed to read catalog document {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the staging copy or rename it over the original.
    #[error("Failed to replace catalog document {path}")]
    ReplaceFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the catalog.
    #[error("Failed to serialize catalog for {path}: {reason}")]
    SerializeFailed { path: PathBuf, reason: String },
}

/// Structured access to per-category catalog documents.
///
/// Replacements must be atomic from the caller's perspective: a reader never
/// observes a partially written document, even across interruption.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Returns the store implementation name.
    fn name(&self) -> &str;

    /// Loads the document at `path`. A missing document is `Ok(None)`.
    async fn load(&self, path: &Path) -> Result<Option<Catalog>, CatalogError>;

    /// Replaces the document at `path` with `catalog`, atomically.
    ///
    /// Creates the document if it does not exist yet.
    async fn replace(&self, path: &Path, catalog: &Catalog) -> Result<(), CatalogError>;
}
