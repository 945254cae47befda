//! Transfer module invoking the bulk-copy collaborator.
//!
//! The collaborator is invoked once per category, not once for the whole
//! tree, so each category gets its own exclude list and its failures stay
//! isolated. The `Transfer` trait is the seam; `RsyncTransfer` is the
//! production implementation, classifying rsync's exit status into clean
//! completion, completion with file-level warnings, or fatal failure.

mod config;
mod error;
mod rsync;
mod traits;
mod types;

pub use config::RsyncConfig;
pub use error::TransferError;
pub use rsync::RsyncTransfer;
pub use traits::Transfer;
pub use types::{TransferOutcome, TransferRequest, TransferStats};
