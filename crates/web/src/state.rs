//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::db::CompanyRepository;
use crate::services::{FusionBrainClient, FusionBrainError, UploadDir};
use crate::store::DataStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the data files, the optional database and the optional logo generator.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    store: DataStore,
    uploads: UploadDir,
    pool: Option<PgPool>,
    fusion_brain: Option<FusionBrainClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `pool` - `PostgreSQL` pool, when the companies table is enabled
    ///
    /// # Errors
    ///
    /// Returns an error if the Fusion Brain client cannot be built.
    pub fn new(config: SiteConfig, pool: Option<PgPool>) -> Result<Self, FusionBrainError> {
        let store = DataStore::new(&config.data_dir);
        let uploads = UploadDir::new(config.upload_dir.clone());
        let fusion_brain = config
            .fusion_brain
            .as_ref()
            .map(FusionBrainClient::new)
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                uploads,
                pool,
                fusion_brain,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// JSON data files.
    #[must_use]
    pub fn store(&self) -> &DataStore {
        &self.inner.store
    }

    #[must_use]
    pub fn uploads(&self) -> &UploadDir {
        &self.inner.uploads
    }

    /// `PostgreSQL` pool, if the companies table is enabled.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Repository over the companies table, if enabled.
    #[must_use]
    pub fn companies(&self) -> Option<CompanyRepository<'_>> {
        self.pool().map(CompanyRepository::new)
    }

    /// Logo generator, if configured.
    #[must_use]
    pub fn fusion_brain(&self) -> Option<&FusionBrainClient> {
        self.inner.fusion_brain.as_ref()
    }
}
