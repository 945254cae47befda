//! Mock free-space probe for testing.

use std::path::Path;

use crate::orchestrator::SpaceProbe;

/// Probe reporting a fixed figure for every path.
#[derive(Debug, Default)]
pub struct MockSpaceProbe {
    available: Option<u64>,
}

impl MockSpaceProbe {
    /// Probe reporting the given available bytes.
    pub fn with_available(bytes: u64) -> Self {
        Self {
            available: Some(bytes),
        }
    }

    /// Probe that does not know, like the no-op default.
    pub fn unknown() -> Self {
        Self::default()
    }
}

impl SpaceProbe for MockSpaceProbe {
    fn available_bytes(&self, _path: &Path) -> Option<u64> {
        self.available
    }
}
