//! Per-run options for the orchestrator.

/// What one invocation was asked to do.
///
/// These come from the command line; everything durable lives in the
/// configuration file.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Device id selecting the layout rules and exclusions.
    pub device: String,
    /// Explicit category list; empty means all non-excluded categories.
    pub categories: Vec<String>,
    /// Simulate the transfer step, leaving destination files unchanged.
    /// Reconciliation still runs; merging device state is always safe.
    pub dry_run: bool,
    /// Skip the reconciliation phase entirely.
    pub skip_reconcile: bool,
    /// Delete destination files with no source counterpart.
    pub purge: bool,
    /// Also copy the device's BIOS folder.
    pub include_bios: bool,
}

impl RunOptions {
    /// Creates options for a device with everything else at defaults.
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            categories: Vec::new(),
            dry_run: false,
            skip_reconcile: false,
            purge: false,
            include_bios: false,
        }
    }

    /// Restricts the run to the given categories.
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// Enables dry-run mode.
    pub fn with_dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Skips reconciliation.
    pub fn with_skip_reconcile(mut self, enabled: bool) -> Self {
        self.skip_reconcile = enabled;
        self
    }

    /// Enables purge (delete extraneous destination files).
    pub fn with_purge(mut self, enabled: bool) -> Self {
        self.purge = enabled;
        self
    }

    /// Includes the BIOS folder copy.
    pub fn with_bios(mut self, enabled: bool) -> Self {
        self.include_bios = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RunOptions::new("pocket");
        assert_eq!(options.device, "pocket");
        assert!(options.categories.is_empty());
        assert!(!options.dry_run);
        assert!(!options.purge);
    }

    #[test]
    fn test_builder() {
        let options = RunOptions::new("pocket")
            .with_categories(vec!["snes".to_string()])
            .with_dry_run(true)
            .with_skip_reconcile(true)
            .with_purge(true)
            .with_bios(true);
        assert_eq!(options.categories, vec!["snes"]);
        assert!(options.dry_run);
        assert!(options.skip_reconcile);
        assert!(options.purge);
        assert!(options.include_bios);
    }
}
