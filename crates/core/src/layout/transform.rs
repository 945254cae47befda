//! Layout transitions between device and canonical layouts.

use std::path::Path;

use tokio::fs;
use tracing::{debug, warn};

use super::types::{LayoutRules, LayoutWarning};

/// Applies layout transitions for one device.
///
/// All transitions are best-effort: a single failed rename or move is
/// reported as a warning and skipped, never aborting the run. Transitions
/// are no-ops when the category is already in the goal state, and a
/// category with no alias or relocations configured is untouched.
pub struct LayoutTransformer {
    rules: LayoutRules,
}

impl LayoutTransformer {
    /// Creates a transformer for the given layout rules.
    pub fn new(rules: LayoutRules) -> Self {
        Self { rules }
    }

    /// The rules this transformer applies.
    pub fn rules(&self) -> &LayoutRules {
        &self.rules
    }

    /// Device layout -> canonical layout.
    ///
    /// Auxiliary folders and the catalog document move back under the
    /// category folder first (it is still device-named at that point), then
    /// the folder itself is renamed to its canonical name.
    pub async fn to_canonical(&self, category: &str) -> Vec<LayoutWarning> {
        let mut warnings = Vec::new();
        let device_dir = self.rules.device_category_dir(category);

        for (canonical, shared_name) in &self.rules.media_folders {
            if let Some(from) = self.rules.device_aux_dir(category, shared_name) {
                let to = self.rules.canonical_aux_dir(&device_dir, canonical);
                self.relocate(category, "reverse-relocate-auxiliary", &from, &to, &mut warnings)
                    .await;
            }
        }

        if self.rules.metadata_root.is_some() {
            let from = self.rules.device_catalog_path(category);
            let to = self.rules.canonical_catalog_path(&device_dir);
            self.relocate(category, "reverse-relocate-metadata", &from, &to, &mut warnings)
                .await;
        }

        self.unrename(category, &mut warnings).await;

        warnings
    }

    /// Canonical layout -> device layout. Exact inverse of [`to_canonical`].
    ///
    /// [`to_canonical`]: LayoutTransformer::to_canonical
    pub async fn to_device(&self, category: &str) -> Vec<LayoutWarning> {
        let mut warnings = Vec::new();

        self.rename_to_device(category, &mut warnings).await;

        let device_dir = self.rules.device_category_dir(category);

        if self.rules.metadata_root.is_some() {
            let from = self.rules.canonical_catalog_path(&device_dir);
            let to = self.rules.device_catalog_path(category);
            self.relocate(category, "relocate-metadata", &from, &to, &mut warnings)
                .await;
        }

        for (canonical, shared_name) in &self.rules.media_folders {
            if let Some(to) = self.rules.device_aux_dir(category, shared_name) {
                let from = self.rules.canonical_aux_dir(&device_dir, canonical);
                self.relocate(category, "relocate-auxiliary", &from, &to, &mut warnings)
                    .await;
            }
        }

        warnings
    }

    /// Renames the category folder from its device alias to its canonical
    /// name. No-op when no alias is configured or already canonical.
    async fn unrename(&self, category: &str, warnings: &mut Vec<LayoutWarning>) {
        let from = self.rules.device_category_dir(category);
        let to = self.rules.canonical_category_dir(category);
        self.rename_category(category, "unrename-to-canonical", &from, &to, warnings)
            .await;
    }

    /// Renames the category folder from its canonical name to the device
    /// alias. No-op when no alias is configured.
    async fn rename_to_device(&self, category: &str, warnings: &mut Vec<LayoutWarning>) {
        let from = self.rules.canonical_category_dir(category);
        let to = self.rules.device_category_dir(category);
        self.rename_category(category, "rename-to-device", &from, &to, warnings)
            .await;
    }

    async fn rename_category(
        &self,
        category: &str,
        operation: &str,
        from: &Path,
        to: &Path,
        warnings: &mut Vec<LayoutWarning>,
    ) {
        if from == to {
            return;
        }
        if !exists(from).await {
            // Already in the goal state, or the category simply is not on
            // the device yet.
            debug!(category, operation, from = %from.display(), "Nothing to rename");
            return;
        }
        if exists(to).await {
            push_warning(
                warnings,
                category,
                operation,
                format!(
                    "both {} and {} exist, leaving folder in place",
                    from.display(),
                    to.display()
                ),
            );
            return;
        }
        if let Err(e) = fs::rename(from, to).await {
            push_warning(
                warnings,
                category,
                operation,
                format!("rename {} -> {} failed: {e}", from.display(), to.display()),
            );
        } else {
            debug!(category, operation, from = %from.display(), to = %to.display(), "Renamed");
        }
    }

    async fn relocate(
        &self,
        category: &str,
        operation: &str,
        from: &Path,
        to: &Path,
        warnings: &mut Vec<LayoutWarning>,
    ) {
        if from == to {
            return;
        }
        if !exists(from).await {
            debug!(category, operation, from = %from.display(), "Nothing to move");
            return;
        }
        if exists(to).await {
            push_warning(
                warnings,
                category,
                operation,
                format!(
                    "destination {} already exists, leaving {} in place",
                    to.display(),
                    from.display()
                ),
            );
            return;
        }
        if let Some(parent) = to.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                push_warning(
                    warnings,
                    category,
                    operation,
                    format!("creating {} failed: {e}", parent.display()),
                );
                return;
            }
        }
        if let Err(e) = fs::rename(from, to).await {
            push_warning(
                warnings,
                category,
                operation,
                format!("move {} -> {} failed: {e}", from.display(), to.display()),
            );
        } else {
            debug!(category, operation, from = %from.display(), to = %to.display(), "Moved");
        }
    }
}

fn push_warning(
    warnings: &mut Vec<LayoutWarning>,
    category: &str,
    operation: &str,
    detail: String,
) {
    let warning = LayoutWarning {
        category: category.to_string(),
        operation: operation.to_string(),
        detail,
    };
    warn!("{warning}");
    warnings.push(warning);
}

async fn exists(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}
