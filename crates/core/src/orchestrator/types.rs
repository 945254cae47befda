//! Types for the orchestrator module.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::ConfigError;
use crate::layout::LayoutWarning;
use crate::reconcile::ReconcileOutcome;
use crate::transfer::TransferOutcome;

/// Fatal failures that abort a run before any category is touched.
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A filesystem precondition does not hold.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

/// Violated preconditions, checked before any mutation.
#[derive(Debug, Error)]
pub enum PreconditionError {
    /// The canonical source tree is not there.
    #[error("Source root not found: {path}")]
    SourceRootMissing { path: PathBuf },

    /// The device is not mounted where configured.
    #[error("Target root not found: {path}")]
    TargetRootMissing { path: PathBuf },

    /// The source root exists but cannot be listed.
    #[error("Failed to list source root {path}")]
    SourceRootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The device does not have the configured minimum free space.
    #[error("Insufficient free space on {path}: need {required} bytes, have {available}")]
    InsufficientSpace {
        path: PathBuf,
        required: u64,
        available: u64,
    },
}

/// Free-space collaborator.
///
/// Querying filesystem capacity is platform-specific and outside this
/// crate's remit; callers plug in whatever probe their platform offers.
/// `None` means "unknown", which skips the free-space precondition.
pub trait SpaceProbe: Send + Sync {
    /// Available bytes on the filesystem holding `path`, if known.
    fn available_bytes(&self, path: &Path) -> Option<u64>;
}

/// Probe that never knows; the free-space check is skipped.
#[derive(Debug, Default)]
pub struct NoopSpaceProbe;

impl SpaceProbe for NoopSpaceProbe {
    fn available_bytes(&self, _path: &Path) -> Option<u64> {
        None
    }
}

/// Everything that happened to one category during a run.
#[derive(Debug, Clone, Default)]
pub struct CategoryReport {
    pub category: String,
    /// Reconciliation result, if the phase ran and succeeded.
    pub reconcile: Option<ReconcileOutcome>,
    /// Reconciliation failure, scoped to this category.
    pub reconcile_error: Option<String>,
    /// Transfer outcome, if the transfer ran and completed.
    pub transfer: Option<TransferOutcome>,
    /// Fatal transfer failure, scoped to this category.
    pub transfer_error: Option<String>,
    /// Non-fatal layout transition problems.
    pub layout_warnings: Vec<LayoutWarning>,
    /// Time spent on this category across phases.
    pub duration_ms: u64,
}

impl CategoryReport {
    /// Creates an empty report for a category.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    /// Whether this category failed.
    ///
    /// Layout warnings and partial-transfer warnings do not fail a
    /// category; reconciliation and fatal transfer errors do.
    pub fn failed(&self) -> bool {
        self.reconcile_error.is_some() || self.transfer_error.is_some()
    }
}

/// Summary of one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub device: String,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub categories: Vec<CategoryReport>,
}

impl RunReport {
    /// Categories that completed without category-scoped errors.
    pub fn succeeded(&self) -> impl Iterator<Item = &CategoryReport> {
        self.categories.iter().filter(|c| !c.failed())
    }

    /// Categories that failed.
    pub fn failed(&self) -> impl Iterator<Item = &CategoryReport> {
        self.categories.iter().filter(|c| c.failed())
    }

    /// Whether every category succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.categories.iter().all(|c| !c.failed())
    }

    /// Process exit code: 0 when everything succeeded, 1 otherwise.
    ///
    /// Fatal pre-run failures never reach a report; they exit with their
    /// own distinct code.
    pub fn exit_code(&self) -> i32 {
        if self.all_succeeded() {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_failed_flags() {
        let mut report = CategoryReport::new("snes");
        assert!(!report.failed());

        report.layout_warnings.push(LayoutWarning {
            category: "snes".to_string(),
            operation: "unrename-to-canonical".to_string(),
            detail: "collision".to_string(),
        });
        assert!(!report.failed());

        report.transfer_error = Some("destination unreachable".to_string());
        assert!(report.failed());
    }

    #[test]
    fn test_run_report_exit_code() {
        let mut run = RunReport {
            device: "pocket".to_string(),
            dry_run: false,
            started_at: Utc::now(),
            duration_ms: 0,
            categories: vec![CategoryReport::new("snes"), CategoryReport::new("gba")],
        };
        assert!(run.all_succeeded());
        assert_eq!(run.exit_code(), 0);

        run.categories[1].reconcile_error = Some("malformed document".to_string());
        assert_eq!(run.exit_code(), 1);
        assert_eq!(run.succeeded().count(), 1);
        assert_eq!(run.failed().count(), 1);
    }

    #[test]
    fn test_noop_probe_reports_unknown() {
        assert!(NoopSpaceProbe.available_bytes(Path::new("/")).is_none());
    }
}
