//! `businesses.json`: the master map of business records.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use qwerty_town_core::{Business, BusinessId};

use super::{StoreError, read_json, write_json};

/// All records keyed by id, as stored on disk.
pub type BusinessMap = BTreeMap<BusinessId, Business>;

/// Store for the master records file.
///
/// Read-modify-write cycles made through one `BusinessStore` are serialized
/// by an async mutex; plain reads never wait for it.
#[derive(Debug)]
pub struct BusinessStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl BusinessStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the records file exists yet.
    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Load every record. A missing file reads as an empty map.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file cannot be read or parsed.
    pub async fn load_all(&self) -> Result<BusinessMap, StoreError> {
        Ok(read_json(&self.path).await?.unwrap_or_default())
    }

    /// Look up one record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file cannot be read or parsed.
    pub async fn get(&self, id: &BusinessId) -> Result<Option<Business>, StoreError> {
        Ok(self.load_all().await?.remove(id))
    }

    /// Add or overwrite a record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file cannot be read, parsed or written.
    pub async fn insert(&self, business: Business) -> Result<(), StoreError> {
        self.modify_all(|map| {
            map.insert(business.id.clone(), business);
            (true, ())
        })
        .await
    }

    /// Mutate one record in place.
    ///
    /// Returns `Ok(None)` when no record has this id. The file is only
    /// rewritten when the closure actually changed the record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file cannot be read, parsed or written.
    pub async fn update<R>(
        &self,
        id: &BusinessId,
        f: impl FnOnce(&mut Business) -> R,
    ) -> Result<Option<(Business, R)>, StoreError> {
        self.modify_all(|map| {
            let Some(business) = map.get_mut(id) else {
                return (false, None);
            };
            let before = business.clone();
            let result = f(business);
            let changed = *business != before;
            (changed, Some((business.clone(), result)))
        })
        .await
    }

    /// Run `f` over the whole map under the write lock.
    ///
    /// `f` returns whether it changed anything alongside its output; the
    /// file is only rewritten when it did.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file cannot be read, parsed or written.
    pub async fn modify_all<R>(
        &self,
        f: impl FnOnce(&mut BusinessMap) -> (bool, R),
    ) -> Result<R, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load_all().await?;
        let (changed, output) = f(&mut map);
        if changed {
            write_json(&self.path, &map).await?;
        }
        Ok(output)
    }
}
