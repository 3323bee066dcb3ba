//! Flat-file persistence for business records and panel configurations.
//!
//! # Layout
//!
//! ```text
//! {data_dir}/
//! ├── businesses.json        - id → business record
//! └── configs/
//!     ├── {business_id}.json - panel configuration
//!     └── ...
//! ```
//!
//! Every write replaces the whole file: the new content goes to a sibling
//! `*.tmp` file that is then renamed over the original. Nothing coordinates
//! writers across processes.

mod businesses;
mod configs;
mod editing;
mod sync;

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

pub use businesses::{BusinessMap, BusinessStore};
pub use configs::ConfigStore;
pub use sync::sync_configs;

/// Errors raised by the JSON stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file exists but does not hold the expected JSON.
    #[error("Corrupt JSON in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A file or directory a command depends on does not exist.
    #[error("Not found: {0}")]
    Missing(PathBuf),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Both stores rooted at one data directory.
#[derive(Debug)]
pub struct DataStore {
    businesses: BusinessStore,
    configs: ConfigStore,
}

impl DataStore {
    /// File name of the master record file inside the data directory.
    pub const BUSINESSES_FILE: &'static str = "businesses.json";
    /// Directory holding per-business configs inside the data directory.
    pub const CONFIGS_DIR: &'static str = "configs";

    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            businesses: BusinessStore::new(data_dir.join(Self::BUSINESSES_FILE)),
            configs: ConfigStore::new(data_dir.join(Self::CONFIGS_DIR)),
        }
    }

    #[must_use]
    pub const fn businesses(&self) -> &BusinessStore {
        &self.businesses
    }

    #[must_use]
    pub const fn configs(&self) -> &ConfigStore {
        &self.configs
    }
}

/// Read and parse a JSON file. `Ok(None)` when the file does not exist.
async fn read_json<T>(path: &Path) -> Result<Option<T>, StoreError>
where
    T: serde::de::DeserializeOwned,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

/// Pretty-print `value` to `path` via a temporary file and rename.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }

    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let value: Option<serde_json::Value> =
            read_json(&dir.path().join("nope.json")).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_write_creates_parents_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("x.json");
        write_json(&path, &serde_json::json!({"a": 1})).await.unwrap();

        let value: serde_json::Value = read_json(&path).await.unwrap().unwrap();
        assert_eq!(value["a"], 1);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let err = read_json::<serde_json::Value>(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
