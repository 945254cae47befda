//! Layout transforms between canonical and device on-disk layouts.
//!
//! Each target device imposes its own arrangement: renamed category
//! folders, auxiliary media gathered under a shared root, catalog documents
//! segregated under a metadata root. Transfers require the canonical
//! layout, so the pipeline reverses the device layout before copying and
//! reapplies it afterwards. Every transition is reversible and best-effort.

mod barrier;
mod transform;
mod types;

pub use barrier::commit_dirs;
pub use transform::LayoutTransformer;
pub use types::{LayoutRules, LayoutWarning};
