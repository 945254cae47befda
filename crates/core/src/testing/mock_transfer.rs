//! Mock transfer for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transfer::{
    Transfer, TransferError, TransferOutcome, TransferRequest, TransferStats,
};

/// Mock implementation of the Transfer trait.
///
/// Provides controllable behavior for testing:
/// - Track transfer requests for assertions
/// - Simulate fatal failures for chosen categories
/// - Simulate partial-transfer warnings for chosen categories
#[derive(Debug, Default)]
pub struct MockTransfer {
    /// Recorded requests, in invocation order.
    requests: Arc<RwLock<Vec<TransferRequest>>>,
    /// Categories that fail fatally, with the failure detail.
    failures: Arc<RwLock<HashMap<String, String>>>,
    /// Categories that complete with file-level warnings.
    warnings: Arc<RwLock<HashMap<String, String>>>,
}

impl MockTransfer {
    /// Create a new mock transfer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded requests.
    pub async fn recorded_requests(&self) -> Vec<TransferRequest> {
        self.requests.read().await.clone()
    }

    /// Get the number of transfers performed.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Make the given category fail fatally.
    pub async fn fail_category(&self, category: &str, detail: &str) {
        self.failures
            .write()
            .await
            .insert(category.to_string(), detail.to_string());
    }

    /// Make the given category complete with a warning.
    pub async fn warn_category(&self, category: &str, detail: &str) {
        self.warnings
            .write()
            .await
            .insert(category.to_string(), detail.to_string());
    }
}

#[async_trait]
impl Transfer for MockTransfer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transfer(&self, request: TransferRequest) -> Result<TransferOutcome, TransferError> {
        let category = request.category.clone();
        self.requests.write().await.push(request);

        if let Some(detail) = self.failures.read().await.get(&category) {
            return Err(TransferError::Failed {
                code: Some(12),
                detail: detail.clone(),
            });
        }

        if let Some(detail) = self.warnings.read().await.get(&category) {
            return Ok(TransferOutcome::CompletedWithWarnings {
                stats: Some(TransferStats::default()),
                detail: detail.clone(),
            });
        }

        Ok(TransferOutcome::Completed {
            stats: Some(TransferStats {
                files_transferred: 1,
                bytes_transferred: 1024,
            }),
        })
    }
}
