//! Entry matching between two independently maintained catalog documents.
//!
//! The matching keys are unreliable: paths can be empty or duplicated and
//! names drift between scrapes. Lookup is by normalized-path equality first,
//! falling back to normalized-name equality when the path is empty or finds
//! nothing. The first match wins when duplicates exist; duplicates are a
//! documented limitation of the documents, not something we correct.

use super::types::Catalog;

/// Collapses internal whitespace runs and trims the ends.
///
/// Matching is whitespace-normalized but case-sensitive.
pub fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Looks up a candidate record in `catalog` by path, then by name.
///
/// Returns the index of the first matching entry, or `None`. No side
/// effects; the numeric identifier plays no part here.
pub fn find_entry(catalog: &Catalog, path: &str, name: &str) -> Option<usize> {
    let path = normalize(path);
    if !path.is_empty() {
        if let Some(idx) = catalog
            .entries
            .iter()
            .position(|e| normalize(&e.path) == path)
        {
            return Some(idx);
        }
    }

    let name = normalize(name);
    if name.is_empty() {
        return None;
    }
    catalog
        .entries
        .iter()
        .position(|e| normalize(&e.name) == name)
}
