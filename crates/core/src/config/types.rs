use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::catalog::PreservedField;
use crate::transfer::RsyncConfig;

use super::ConfigError;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub paths: PathsConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub transfer: RsyncConfig,
    pub devices: BTreeMap<String, DeviceConfig>,
}

impl Config {
    /// Looks up the configuration for a device id.
    pub fn device(&self, id: &str) -> Result<&DeviceConfig, ConfigError> {
        self.devices
            .get(id)
            .ok_or_else(|| ConfigError::UnknownDevice(id.to_string()))
    }
}

/// Filesystem locations shared by every device
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Root of the canonical catalog tree, one subdirectory per category.
    pub source_root: PathBuf,

    /// Directory receiving timestamped run logs.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// File name of the per-category catalog document.
    #[serde(default = "default_catalog_filename")]
    pub catalog_filename: String,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_catalog_filename() -> String {
    "gamelist.json".to_string()
}

/// Reconciliation and precondition settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Minimum free bytes required on the target before a run starts.
    /// Zero disables the check.
    #[serde(default)]
    pub min_free_bytes: u64,

    /// The fields copied device -> source during reconciliation.
    #[serde(default = "default_preserved_fields")]
    pub preserved_fields: Vec<PreservedField>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            min_free_bytes: 0,
            preserved_fields: default_preserved_fields(),
        }
    }
}

fn default_preserved_fields() -> Vec<PreservedField> {
    PreservedField::ALL.to_vec()
}

/// Layout rules and exclusions for one target device
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Mount point of the device's catalog tree.
    pub target_root: PathBuf,

    /// Device-shared root for auxiliary media folders, relative to
    /// `target_root`. When absent, auxiliary folders stay under their
    /// category folders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_root: Option<PathBuf>,

    /// Device-shared root for catalog documents, relative to `target_root`.
    /// When absent, documents stay inside their category folders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_root: Option<PathBuf>,

    /// Categories never synced to this device (unless explicitly requested).
    #[serde(default)]
    pub exclude: BTreeSet<String>,

    /// BIOS folder name under both roots, copied only on request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bios_dir: Option<String>,

    /// Transfer exclude patterns applied to every category.
    #[serde(default)]
    pub file_excludes: Vec<String>,

    /// Canonical category name -> folder name the device expects.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,

    /// Canonical auxiliary folder name -> folder name under the shared
    /// media root. Differing names are renamed during relocation.
    #[serde(default)]
    pub media_folders: BTreeMap<String, String>,

    /// Extra transfer exclude patterns for specific categories.
    #[serde(default)]
    pub category_file_excludes: BTreeMap<String, Vec<String>>,
}

impl DeviceConfig {
    /// Transfer exclude patterns for one category: global plus per-category.
    pub fn transfer_excludes(&self, category: &str) -> Vec<String> {
        let mut patterns = self.file_excludes.clone();
        if let Some(extra) = self.category_file_excludes.get(category) {
            patterns.extend(extra.iter().cloned());
        }
        patterns
    }
}
