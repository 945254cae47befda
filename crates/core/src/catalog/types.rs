//! Types for the catalog module.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single item in a category's catalog document.
///
/// Only the fields this program reconciles are modeled; everything else the
/// document carries is kept in `extra` and survives a read-modify-write
/// round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Scraper-assigned numeric identifier. Zero or absent is a placeholder.
    /// Unstable across scrapes, never used for matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Item path, relative to the category folder. Primary matching key.
    /// May be empty; duplicates are tolerated.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Display name. Secondary matching key.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// User flag: marked as favorite on the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,

    /// User flag: hidden from the device's game list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,

    /// Number of times the item was launched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playcount: Option<u64>,

    /// CRC32 of the item file as recorded by the device's scraper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crc32: Option<String>,

    /// RetroAchievements game identifier. Zero is a placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheevos_id: Option<u64>,

    /// RetroAchievements hash of the item file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheevos_hash: Option<String>,

    /// Every other field the document carries. Preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogEntry {
    /// Creates an entry with just the matching keys set.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether the numeric identifier is a placeholder (absent or zero).
    pub fn has_placeholder_id(&self) -> bool {
        matches!(self.id, None | Some(0))
    }
}

/// One category's catalog: an ordered list of entries.
///
/// Insertion order is preserved on rewrite but carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The fields considered safe to copy device -> source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreservedField {
    Favorite,
    Hidden,
    Playcount,
    Crc32,
    CheevosId,
    CheevosHash,
}

impl PreservedField {
    /// Every preserved field, in document order.
    pub const ALL: [PreservedField; 6] = [
        PreservedField::Favorite,
        PreservedField::Hidden,
        PreservedField::Playcount,
        PreservedField::Crc32,
        PreservedField::CheevosId,
        PreservedField::CheevosHash,
    ];
}
