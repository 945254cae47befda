//! Reconciliation of device-side user state into source catalogs.
//!
//! Target devices accumulate state the canonical tree knows nothing about:
//! favorites, hidden flags, play counts, scraper identifiers. Before a
//! transfer overwrites the device's documents, that state is merged back
//! into the source catalog, category by category, without ever clearing a
//! populated source value.

mod engine;
mod error;
mod types;

pub use engine::{apply_patches, compute_patches, ReconcileEngine};
pub use error::ReconcileError;
pub use types::{EntryPatch, FieldUpdate, ReconcileOutcome};
