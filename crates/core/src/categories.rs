//! Category discovery and resolution.
//!
//! A category is one media classification mapped to one top-level folder
//! under the source root (a console/system name). Which categories a run
//! processes is a pure function of what exists on disk, what the device
//! configuration excludes, and what the user explicitly asked for.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// One category targeted by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Canonical name, equal to the source folder name.
    pub name: String,
    /// Category folder under the source root.
    pub source_path: PathBuf,
    /// Canonical category folder under the device's target root.
    pub target_path: PathBuf,
}

impl Category {
    /// Builds a category rooted at the given source and target roots.
    pub fn new(name: impl Into<String>, source_root: &Path, target_root: &Path) -> Self {
        let name = name.into();
        Self {
            source_path: source_root.join(&name),
            target_path: target_root.join(&name),
            name,
        }
    }
}

/// Resolves the category names a run will process.
///
/// Explicit targets win: they are taken in the given order (first occurrence
/// kept) and are not subject to exclusion, so a user can sync an excluded
/// category by naming it. Otherwise every discovered subdirectory not in the
/// exclude set is taken, sorted.
pub fn resolve_categories(
    source_subdirs: &[String],
    excluded: &BTreeSet<String>,
    explicit_targets: &[String],
) -> Vec<String> {
    if !explicit_targets.is_empty() {
        let mut seen = BTreeSet::new();
        return explicit_targets
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect();
    }

    let mut names: Vec<String> = source_subdirs
        .iter()
        .filter(|name| !excluded.contains(name.as_str()))
        .cloned()
        .collect();
    names.sort();
    names
}

/// Lists the subdirectory names of `source_root`.
///
/// Hidden directories are skipped; plain files are ignored.
pub async fn discover_source_subdirs(source_root: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(source_root).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }
    Ok(names)
}
