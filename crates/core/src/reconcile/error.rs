//! Error types for the reconcile module.

use thiserror::Error;

use crate::catalog::CatalogError;

/// Errors that can occur while reconciling one category.
///
/// All of these are scoped to a single category: the source document is left
/// unmodified and the run carries on with other categories.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Reading, parsing, or replacing a catalog document failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A computed patch addressed an entry outside the staging copy.
    #[error("Patch addressed entry {index} but the catalog has {entry_count} entries")]
    PatchTargetMissing { index: usize, entry_count: usize },
}
