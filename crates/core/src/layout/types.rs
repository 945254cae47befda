//! Types for the layout module.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::DeviceConfig;

/// How one device arranges category folders, auxiliary media, and catalog
/// documents relative to the canonical layout.
///
/// Canonical layout: `<target_root>/<category>/` holds the items, auxiliary
/// folders under their canonical names, and the catalog document. Device
/// layout: the category folder may carry an alias, auxiliary folders may
/// live under a shared media root (possibly under a different name), and
/// the catalog document may live under a shared metadata root.
#[derive(Debug, Clone)]
pub struct LayoutRules {
    /// Mount point of the device tree.
    pub target_root: PathBuf,
    /// Shared auxiliary-media root, relative to `target_root`.
    pub media_root: Option<PathBuf>,
    /// Shared catalog-document root, relative to `target_root`.
    pub metadata_root: Option<PathBuf>,
    /// File name of the catalog document.
    pub catalog_filename: String,
    /// Canonical category name -> device folder name.
    pub aliases: BTreeMap<String, String>,
    /// Canonical auxiliary folder name -> name under the shared media root.
    pub media_folders: BTreeMap<String, String>,
}

impl LayoutRules {
    /// Builds layout rules from a device configuration.
    pub fn from_device(device: &DeviceConfig, catalog_filename: &str) -> Self {
        Self {
            target_root: device.target_root.clone(),
            media_root: device.media_root.clone(),
            metadata_root: device.metadata_root.clone(),
            catalog_filename: catalog_filename.to_string(),
            aliases: device.aliases.clone(),
            media_folders: device.media_folders.clone(),
        }
    }

    /// The folder name the device uses for a category.
    pub fn device_name<'a>(&'a self, category: &'a str) -> &'a str {
        self.aliases.get(category).map(String::as_str).unwrap_or(category)
    }

    /// Category folder under its canonical name.
    pub fn canonical_category_dir(&self, category: &str) -> PathBuf {
        self.target_root.join(category)
    }

    /// Category folder under the device's name for it.
    pub fn device_category_dir(&self, category: &str) -> PathBuf {
        self.target_root.join(self.device_name(category))
    }

    /// Auxiliary folder location in canonical layout, inside `category_dir`.
    ///
    /// Takes the category directory explicitly because during reverse
    /// transforms the folder is still under its device name.
    pub fn canonical_aux_dir(&self, category_dir: &Path, canonical: &str) -> PathBuf {
        category_dir.join(canonical)
    }

    /// Auxiliary folder location under the shared media root, or `None`
    /// when this device keeps media inside category folders.
    pub fn device_aux_dir(&self, category: &str, shared_name: &str) -> Option<PathBuf> {
        self.media_root.as_ref().map(|root| {
            self.target_root
                .join(root)
                .join(self.device_name(category))
                .join(shared_name)
        })
    }

    /// Catalog document location in canonical layout, inside `category_dir`.
    pub fn canonical_catalog_path(&self, category_dir: &Path) -> PathBuf {
        category_dir.join(&self.catalog_filename)
    }

    /// Catalog document location in device layout.
    ///
    /// Under the shared metadata root when the device segregates documents,
    /// otherwise inside the device-named category folder.
    pub fn device_catalog_path(&self, category: &str) -> PathBuf {
        match &self.metadata_root {
            Some(root) => self
                .target_root
                .join(root)
                .join(self.device_name(category))
                .join(&self.catalog_filename),
            None => self.device_category_dir(category).join(&self.catalog_filename),
        }
    }
}

/// A non-fatal problem during a layout transition.
///
/// A failed rename or move leaves data discoverable, only mis-placed, so
/// these never abort a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutWarning {
    pub category: String,
    pub operation: String,
    pub detail: String,
}

impl std::fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.category, self.operation, self.detail)
    }
}
