//! Subcommand implementations.

pub mod backfill;
pub mod migrate;
pub mod sync;

use std::path::PathBuf;

use qwerty_town_web::config::{ConfigError, SiteConfig};
use qwerty_town_web::db::RepositoryError;
use qwerty_town_web::store::StoreError;
use secrecy::SecretString;

/// Errors raised by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Data directory from the flag, or from the site configuration.
fn data_dir(flag: Option<PathBuf>) -> Result<PathBuf, CommandError> {
    match flag {
        Some(dir) => Ok(dir),
        None => Ok(SiteConfig::from_env()?.data_dir),
    }
}

/// Database URL from the site configuration.
fn database_url() -> Result<SecretString, CommandError> {
    SiteConfig::from_env()?
        .database_url
        .ok_or(CommandError::MissingEnvVar("SITE_DATABASE_URL"))
}
