//! Reconciliation engine implementation.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::{find_entry, normalize, Catalog, CatalogStore, PreservedField};

use super::error::ReconcileError;
use super::types::{EntryPatch, FieldUpdate, ReconcileOutcome};

/// Merges device-side user state back into source catalog documents.
///
/// The merge is one-directional and loss-avoiding: a field travels device ->
/// source only when the device value is populated (true, non-zero,
/// non-empty), so an empty or false device value can never blank out
/// authoritative source content. Updates for a category are computed as one
/// batch, applied to a staging copy, and the document is replaced atomically
/// only when the whole batch succeeded and changed something.
pub struct ReconcileEngine<S: CatalogStore> {
    store: Arc<S>,
    fields: BTreeSet<PreservedField>,
}

impl<S: CatalogStore> ReconcileEngine<S> {
    /// Creates an engine reconciling the given preserved-field set.
    pub fn new(store: Arc<S>, fields: impl IntoIterator<Item = PreservedField>) -> Self {
        Self {
            store,
            fields: fields.into_iter().collect(),
        }
    }

    /// Reconciles one category's source document against a device snapshot.
    ///
    /// A missing source document or missing snapshot is a no-op success:
    /// there is nothing to merge, and absence is normal for freshly added
    /// categories or never-scraped devices.
    pub async fn reconcile_category(
        &self,
        category: &str,
        source_doc: &Path,
        snapshot_doc: &Path,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let Some(snapshot) = self.store.load(snapshot_doc).await? else {
            debug!(category, path = %snapshot_doc.display(), "No device snapshot, skipping");
            return Ok(ReconcileOutcome::default());
        };

        let Some(source) = self.store.load(source_doc).await? else {
            debug!(category, path = %source_doc.display(), "No source catalog, skipping");
            return Ok(ReconcileOutcome::default());
        };

        let (patches, matched_entries) = compute_patches(&source, &snapshot, &self.fields);

        let mut outcome = ReconcileOutcome {
            snapshot_entries: snapshot.len(),
            matched_entries,
            fields_updated: 0,
            written: false,
        };

        if patches.is_empty() {
            debug!(category, "Catalog already up to date");
            return Ok(outcome);
        }

        // Batch apply on a staging copy; the original is only replaced once
        // every patch has landed.
        let mut staged = source.clone();
        outcome.fields_updated = apply_patches(&mut staged, &patches)?;
        self.store.replace(source_doc, &staged).await?;
        outcome.written = true;

        info!(
            category,
            entries = patches.len(),
            fields = outcome.fields_updated,
            "Merged device state into source catalog"
        );

        Ok(outcome)
    }
}

/// Computes the batch of patches for one category.
///
/// Returns the patches plus the number of snapshot entries that matched a
/// source entry. Snapshot entries with neither a usable path nor name are
/// skipped; unmatched entries produce no mutation.
pub fn compute_patches(
    source: &Catalog,
    snapshot: &Catalog,
    fields: &BTreeSet<PreservedField>,
) -> (Vec<EntryPatch>, usize) {
    let mut patches = Vec::new();
    let mut matched = 0;

    for candidate in &snapshot.entries {
        if normalize(&candidate.path).is_empty() && normalize(&candidate.name).is_empty() {
            continue;
        }
        let Some(entry_index) = find_entry(source, &candidate.path, &candidate.name) else {
            continue;
        };
        matched += 1;

        let current = &source.entries[entry_index];
        let mut updates = Vec::new();

        for field in fields {
            match field {
                PreservedField::Favorite => {
                    if candidate.favorite == Some(true) && current.favorite != Some(true) {
                        updates.push(FieldUpdate::Favorite(true));
                    }
                }
                PreservedField::Hidden => {
                    if candidate.hidden == Some(true) && current.hidden != Some(true) {
                        updates.push(FieldUpdate::Hidden(true));
                    }
                }
                PreservedField::Playcount => {
                    if let Some(count) = candidate.playcount.filter(|c| *c > 0) {
                        if current.playcount != Some(count) {
                            updates.push(FieldUpdate::Playcount(count));
                        }
                    }
                }
                PreservedField::Crc32 => {
                    if let Some(crc) = populated(&candidate.crc32) {
                        if current.crc32.as_deref() != Some(crc) {
                            updates.push(FieldUpdate::Crc32(crc.to_string()));
                        }
                    }
                }
                PreservedField::CheevosId => {
                    // Zero is the scraper's placeholder, treated as empty.
                    if let Some(id) = candidate.cheevos_id.filter(|id| *id > 0) {
                        if current.cheevos_id != Some(id) {
                            updates.push(FieldUpdate::CheevosId(id));
                        }
                    }
                }
                PreservedField::CheevosHash => {
                    if let Some(hash) = populated(&candidate.cheevos_hash) {
                        if current.cheevos_hash.as_deref() != Some(hash) {
                            updates.push(FieldUpdate::CheevosHash(hash.to_string()));
                        }
                    }
                }
            }
        }

        if !updates.is_empty() {
            patches.push(EntryPatch {
                entry_index,
                updates,
            });
        }
    }

    (patches, matched)
}

/// Applies a batch of patches to a staging catalog.
///
/// Returns the number of field values written. Fails without partial effect
/// being visible to callers: the staging copy is discarded on error.
pub fn apply_patches(catalog: &mut Catalog, patches: &[EntryPatch]) -> Result<usize, ReconcileError> {
    let mut fields_updated = 0;
    for patch in patches {
        let entry_count = catalog.entries.len();
        let entry = catalog.entries.get_mut(patch.entry_index).ok_or(
            ReconcileError::PatchTargetMissing {
                index: patch.entry_index,
                entry_count,
            },
        )?;
        for update in &patch.updates {
            update.apply(entry);
            fields_updated += 1;
        }
    }
    Ok(fields_updated)
}

fn populated(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
