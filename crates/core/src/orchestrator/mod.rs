//! Run orchestrator for full synchronization runs.
//!
//! The orchestrator sequences the phases of one run:
//! - **Preconditions**: fatal, checked before any mutation
//! - **Reconciliation**: parallel per category - IO-bound
//! - **Layout + transfer**: reverse transforms for every category, a
//!   durability barrier, then per-category transfer and forward transforms

mod config;
mod runner;
mod types;

pub use config::RunOptions;
pub use runner::SyncRunner;
pub use types::{
    CategoryReport, NoopSpaceProbe, PreconditionError, RunError, RunReport, SpaceProbe,
};
