//! JSON-backed catalog store.

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::store::{CatalogError, CatalogStore};
use super::types::Catalog;

/// Catalog store reading and writing pretty-printed JSON documents.
///
/// Writes go to a sibling temporary file which is flushed to stable storage
/// and then renamed over the original, so an interrupted run never leaves a
/// truncated document behind.
#[derive(Debug, Default)]
pub struct JsonCatalogStore;

impl JsonCatalogStore {
    /// Creates a new JSON catalog store.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CatalogStore for JsonCatalogStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn load(&self, path: &Path) -> Result<Option<Catalog>, CatalogError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CatalogError::ReadFailed {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let catalog = serde_json::from_slice(&bytes).map_err(|e| CatalogError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Some(catalog))
    }

    async fn replace(&self, path: &Path, catalog: &Catalog) -> Result<(), CatalogError> {
        let rendered =
            serde_json::to_vec_pretty(catalog).map_err(|e| CatalogError::SerializeFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp);

        let replace_failed = |source| CatalogError::ReplaceFailed {
            path: path.to_path_buf(),
            source,
        };

        let mut file = fs::File::create(&tmp).await.map_err(replace_failed)?;
        file.write_all(&rendered).await.map_err(replace_failed)?;
        // The rename must not be reordered before the data reaches the disk.
        file.sync_all().await.map_err(replace_failed)?;
        drop(file);

        if let Err(e) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(replace_failed(e));
        }

        Ok(())
    }
}
