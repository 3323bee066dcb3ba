//! `configs/{id}.json`: one panel configuration per business.

use std::io;
use std::path::{Path, PathBuf};

use qwerty_town_core::{BusinessId, PanelConfig};

use super::{StoreError, read_json, write_json};

#[derive(Debug)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the config file for a business.
    #[must_use]
    pub fn path_for(&self, id: &BusinessId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Load a business's config, `None` if it was never saved.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file cannot be read or parsed.
    pub async fn load(&self, id: &BusinessId) -> Result<Option<PanelConfig>, StoreError> {
        read_json(&self.path_for(id)).await
    }

    /// Write a config, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file cannot be written.
    pub async fn save(&self, config: &PanelConfig) -> Result<(), StoreError> {
        write_json(&self.path_for(&config.business_id), config).await
    }

    /// Every `*.json` file in the configs directory as `(file stem, path)`,
    /// sorted by stem.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Missing` if the directory does not exist.
    pub async fn list(&self) -> Result<Vec<(String, PathBuf)>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::Missing(self.dir.clone()));
            }
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                files.push((stem.to_string(), path.clone()));
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("configs"));
        let id = BusinessId::parse("blue-cup").unwrap();
        assert!(store.load(&id).await.unwrap().is_none());

        let mut config = PanelConfig::for_business(id.clone());
        config.panels.insert("map".to_string(), false);
        store.save(&config).await.unwrap();

        assert_eq!(store.load(&id).await.unwrap(), Some(config));
        assert!(dir.path().join("configs/blue-cup.json").exists());
    }

    #[tokio::test]
    async fn test_list_filters_non_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let stems: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|(stem, _)| stem)
            .collect();
        assert_eq!(stems, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_list_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("configs"));
        assert!(matches!(
            store.list().await.unwrap_err(),
            StoreError::Missing(_)
        ));
    }
}
