//! Error types for the transfer module.

use thiserror::Error;

/// Fatal transfer failures.
///
/// These are category-scoped: the category's post-processing is skipped and
/// the failure recorded, while the run proceeds to the next category.
/// File-level problems are not errors; they surface as
/// [`TransferOutcome::CompletedWithWarnings`].
///
/// [`TransferOutcome::CompletedWithWarnings`]: super::TransferOutcome::CompletedWithWarnings
#[derive(Debug, Error)]
pub enum TransferError {
    /// The bulk-copy tool binary was not found.
    #[error("Transfer tool not found: {path}")]
    ToolNotFound { path: String },

    /// Spawning the tool failed.
    #[error("Failed to spawn transfer tool")]
    SpawnFailed(#[source] std::io::Error),

    /// The tool ran past the configured timeout and was killed.
    #[error("Transfer timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The tool exited with a failure status.
    #[error("Transfer failed (exit code {code:?}): {detail}")]
    Failed { code: Option<i32>, detail: String },

    /// I/O error talking to the tool.
    #[error("I/O error during transfer: {0}")]
    Io(#[from] std::io::Error),
}
