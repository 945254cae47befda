//! Types for the reconcile module.

use crate::catalog::CatalogEntry;

/// A single field value to copy onto a source entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Favorite(bool),
    Hidden(bool),
    Playcount(u64),
    Crc32(String),
    CheevosId(u64),
    CheevosHash(String),
}

impl FieldUpdate {
    /// Applies this update to a source entry.
    pub fn apply(&self, entry: &mut CatalogEntry) {
        match self {
            FieldUpdate::Favorite(v) => entry.favorite = Some(*v),
            FieldUpdate::Hidden(v) => entry.hidden = Some(*v),
            FieldUpdate::Playcount(v) => entry.playcount = Some(*v),
            FieldUpdate::Crc32(v) => entry.crc32 = Some(v.clone()),
            FieldUpdate::CheevosId(v) => entry.cheevos_id = Some(*v),
            FieldUpdate::CheevosHash(v) => entry.cheevos_hash = Some(v.clone()),
        }
    }
}

/// All updates for one source entry, addressed by its index.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPatch {
    /// Index into the source catalog's entry list.
    pub entry_index: usize,
    /// Field updates to apply, none of which remove or blank a value.
    pub updates: Vec<FieldUpdate>,
}

/// What one category's reconciliation did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    /// Entries found in the device snapshot.
    pub snapshot_entries: usize,
    /// Snapshot entries that matched a source entry.
    pub matched_entries: usize,
    /// Individual field values copied onto the source catalog.
    pub fields_updated: usize,
    /// Whether the source document was rewritten.
    pub written: bool,
}
