//! Trait definitions for the transfer module.

use async_trait::async_trait;

use super::error::TransferError;
use super::types::{TransferOutcome, TransferRequest};

/// A bulk-copy collaborator moving one category's files to the device.
///
/// Implementations must distinguish "completed with file-level warnings
/// only" from "failed entirely"; the former is an `Ok` outcome.
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Returns the name of this transfer implementation.
    fn name(&self) -> &str;

    /// Copies one category according to the request.
    async fn transfer(&self, request: TransferRequest) -> Result<TransferOutcome, TransferError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct NoopTransfer;

    #[async_trait]
    impl Transfer for NoopTransfer {
        fn name(&self) -> &str {
            "noop"
        }

        async fn transfer(
            &self,
            _request: TransferRequest,
        ) -> Result<TransferOutcome, TransferError> {
            Ok(TransferOutcome::Completed { stats: None })
        }
    }

    #[tokio::test]
    async fn test_noop_transfer() {
        let transfer = NoopTransfer;
        let request = TransferRequest {
            category: "snes".to_string(),
            source: PathBuf::from("/src/snes"),
            destination: PathBuf::from("/dst/snes"),
            excludes: vec![],
            purge: false,
            dry_run: false,
        };
        let outcome = transfer.transfer(request).await.unwrap();
        assert!(outcome.is_clean());
    }
}
