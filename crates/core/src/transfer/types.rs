//! Types for the transfer module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One category's bulk-copy job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Category name, for logging and failure scoping.
    pub category: String,
    /// Source directory (the canonical category folder).
    pub source: PathBuf,
    /// Destination directory on the device.
    pub destination: PathBuf,
    /// Exclude patterns passed to the tool.
    pub excludes: Vec<String>,
    /// Delete destination files with no source counterpart.
    pub purge: bool,
    /// Simulate only, leaving the destination unchanged.
    pub dry_run: bool,
}

/// A completed (possibly imperfect) transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferOutcome {
    /// Every file copied cleanly.
    Completed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stats: Option<TransferStats>,
    },
    /// The tool finished but reported file-level errors (vanished files,
    /// permission problems). Post-processing continues.
    CompletedWithWarnings {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stats: Option<TransferStats>,
        detail: String,
    },
}

impl TransferOutcome {
    /// Transfer statistics, when the tool reported them.
    pub fn stats(&self) -> Option<&TransferStats> {
        match self {
            TransferOutcome::Completed { stats } => stats.as_ref(),
            TransferOutcome::CompletedWithWarnings { stats, .. } => stats.as_ref(),
        }
    }

    /// Whether the transfer finished without file-level warnings.
    pub fn is_clean(&self) -> bool {
        matches!(self, TransferOutcome::Completed { .. })
    }
}

/// Statistics parsed from the tool's output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStats {
    /// Files actually copied (not just examined).
    pub files_transferred: u64,
    /// Bytes actually copied.
    pub bytes_transferred: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let clean = TransferOutcome::Completed {
            stats: Some(TransferStats {
                files_transferred: 3,
                bytes_transferred: 1024,
            }),
        };
        assert!(clean.is_clean());
        assert_eq!(clean.stats().unwrap().files_transferred, 3);

        let warned = TransferOutcome::CompletedWithWarnings {
            stats: None,
            detail: "some files vanished".to_string(),
        };
        assert!(!warned.is_clean());
        assert!(warned.stats().is_none());
    }
}
