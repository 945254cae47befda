//! Configuration for the transfer module.

use serde::{Deserialize, Serialize};

/// Configuration for the rsync-based transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsyncConfig {
    /// Path to the rsync binary.
    #[serde(default = "default_rsync_path")]
    pub rsync_path: String,

    /// Base option string passed through to the tool, whitespace-separated.
    #[serde(default = "default_options")]
    pub options: String,

    /// Use checksum-based change detection instead of size+mtime.
    #[serde(default = "default_true")]
    pub checksum: bool,

    /// Maximum seconds for one category's transfer.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_rsync_path() -> String {
    "rsync".to_string()
}

fn default_options() -> String {
    "-rtu".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    3600
}

impl Default for RsyncConfig {
    fn default() -> Self {
        Self {
            rsync_path: default_rsync_path(),
            options: default_options(),
            checksum: true,
            timeout_secs: default_timeout(),
        }
    }
}

impl RsyncConfig {
    /// Sets the rsync binary path.
    pub fn with_rsync_path(mut self, path: impl Into<String>) -> Self {
        self.rsync_path = path.into();
        self
    }

    /// Sets the base option string.
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = options.into();
        self
    }

    /// Enables or disables checksum-based change detection.
    pub fn with_checksum(mut self, enabled: bool) -> Self {
        self.checksum = enabled;
        self
    }

    /// Sets the per-category timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}
