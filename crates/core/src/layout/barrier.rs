//! Durability barrier between layout phases.
//!
//! Correctness of the pipeline depends on observed filesystem state, not
//! program memory, and removable flash media may expose directory renames
//! inconsistently until flushed. After every phase that renames or moves
//! directories, the affected directories are fsynced before the next phase
//! reads the tree.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::{debug, warn};

/// Flushes the given directories to stable storage.
///
/// Duplicates are collapsed; missing directories are skipped. Flush
/// failures are logged and do not abort the run, since some filesystems
/// reject fsync on directories.
pub async fn commit_dirs(dirs: impl IntoIterator<Item = PathBuf>) {
    let unique: BTreeSet<PathBuf> = dirs.into_iter().collect();

    let result = tokio::task::spawn_blocking(move || {
        for dir in unique {
            match std::fs::File::open(&dir) {
                Ok(file) => {
                    if let Err(e) = file.sync_all() {
                        warn!("Failed to flush {}: {e}", dir.display());
                    } else {
                        debug!("Flushed {}", dir.display());
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to open {} for flushing: {e}", dir.display()),
            }
        }
    })
    .await;

    if let Err(e) = result {
        warn!("Durability barrier task failed: {e}");
    }
}
