//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 8000)
//! - `SITE_BASE_URL` - Public URL of the site, falls back to `MAIN_PATH`
//!   (default: <http://localhost:8000>)
//! - `SITE_DATA_DIR` - Directory holding `businesses.json` and `configs/` (default: data)
//! - `SITE_STATIC_DIR` - Bundled assets (default: crates/web/static)
//! - `SITE_UPLOAD_DIR` - Uploaded and generated images (default: data/uploads)
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string, falls back to
//!   `DATABASE_URL`. Enables the `companies` table when set.
//! - `YANDEX_MAPS_API_KEY` - Key for the map panel
//! - `FUSION_BRAIN_API_KEY` / `FUSION_BRAIN_SECRET_KEY` - Enable logo generation
//!   (set both or neither)
//! - `FUSION_BRAIN_URL` - API base (default: <https://api-key.fusionbrain.ai/>)
//! - `FUSION_BRAIN_POLL_ATTEMPTS` - Status polls before giving up (default: 10)
//! - `FUSION_BRAIN_POLL_DELAY_SECS` - Delay between polls (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default Fusion Brain API base URL.
pub const DEFAULT_FUSION_BRAIN_URL: &str = "https://api-key.fusionbrain.ai/";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, used for absolute links
    pub base_url: Url,
    /// Holds `businesses.json` and the `configs/` directory
    pub data_dir: PathBuf,
    /// Bundled CSS/JS/images served under `/static`
    pub static_dir: PathBuf,
    /// Uploaded and generated images served under `/uploads`
    pub upload_dir: PathBuf,
    /// `PostgreSQL` URL for the `companies` table (contains password)
    pub database_url: Option<SecretString>,
    /// Yandex Maps JavaScript API key for the map panel
    pub yandex_maps_api_key: Option<String>,
    /// Logo generation API, when configured
    pub fusion_brain: Option<FusionBrainConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Fusion Brain image generation API configuration.
///
/// Implements `Debug` manually to redact the key pair.
#[derive(Clone)]
pub struct FusionBrainConfig {
    pub base_url: Url,
    pub api_key: SecretString,
    pub secret_key: SecretString,
    /// Number of status polls before the job counts as timed out
    pub poll_attempts: u32,
    /// Delay between status polls
    pub poll_delay: Duration,
}

impl std::fmt::Debug for FusionBrainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FusionBrainConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .field("poll_attempts", &self.poll_attempts)
            .field("poll_delay", &self.poll_delay)
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed, if only half of the
    /// Fusion Brain key pair is set, or if a key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`SiteConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parse_or("SITE_HOST", "127.0.0.1")?;
        let port = env.parse_or("SITE_PORT", "8000")?;
        let base_url = env
            .get("SITE_BASE_URL")
            .or_else(|| env.get("MAIN_PATH"))
            .unwrap_or_else(|| "http://localhost:8000".to_string());
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_BASE_URL".to_string(), e.to_string()))?;

        let data_dir = PathBuf::from(env.get_or("SITE_DATA_DIR", "data"));
        let static_dir = PathBuf::from(env.get_or("SITE_STATIC_DIR", "crates/web/static"));
        let upload_dir = env
            .get("SITE_UPLOAD_DIR")
            .map_or_else(|| data_dir.join("uploads"), PathBuf::from);

        let database_url = env
            .get("SITE_DATABASE_URL")
            .or_else(|| env.get("DATABASE_URL"))
            .map(SecretString::from);

        Ok(Self {
            host,
            port,
            base_url,
            data_dir,
            static_dir,
            upload_dir,
            database_url,
            yandex_maps_api_key: env.get("YANDEX_MAPS_API_KEY"),
            fusion_brain: FusionBrainConfig::from_env(&env)?,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Defaults rooted at `data_dir`, with every integration off.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in defaults stop parsing.
    pub fn local(data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let data_dir = data_dir.into();
        let mut config = Self::from_lookup(|_| None)?;
        config.upload_dir = data_dir.join("uploads");
        config.data_dir = data_dir;
        Ok(config)
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Absolute URL for a site path, e.g. `/business/abc`.
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_or_else(|_| path.to_string(), String::from)
    }
}

impl FusionBrainConfig {
    fn from_env(env: &Env<'_>) -> Result<Option<Self>, ConfigError> {
        let api_key = env.get("FUSION_BRAIN_API_KEY");
        let secret_key = env.get("FUSION_BRAIN_SECRET_KEY");

        let (api_key, secret_key) = match (api_key, secret_key) {
            (None, None) => return Ok(None),
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar(
                    "FUSION_BRAIN_SECRET_KEY".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar("FUSION_BRAIN_API_KEY".to_string()));
            }
            (Some(api), Some(secret)) => (api, secret),
        };
        reject_placeholder(&api_key, "FUSION_BRAIN_API_KEY")?;
        reject_placeholder(&secret_key, "FUSION_BRAIN_SECRET_KEY")?;

        let base_url = Url::parse(&env.get_or("FUSION_BRAIN_URL", DEFAULT_FUSION_BRAIN_URL))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("FUSION_BRAIN_URL".to_string(), e.to_string())
            })?;
        let poll_attempts = env.parse_or("FUSION_BRAIN_POLL_ATTEMPTS", "10")?;
        let poll_delay = Duration::from_secs(env.parse_or("FUSION_BRAIN_POLL_DELAY_SECS", "10")?);

        Ok(Some(Self {
            base_url,
            api_key: SecretString::from(api_key),
            secret_key: SecretString::from(secret_key),
            poll_attempts,
            poll_delay,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable; blank values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_or(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Reject values that look like a template placeholder rather than a real key.
fn reject_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<SiteConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        SiteConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8000");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.upload_dir, PathBuf::from("data/uploads"));
        assert!(config.database_url.is_none());
        assert!(config.fusion_brain.is_none());
    }

    #[test]
    fn test_main_path_fallback() {
        let config = load(&[("MAIN_PATH", "https://qwerty.town/")]).unwrap();
        assert_eq!(
            config.absolute_url("/business/abc"),
            "https://qwerty.town/business/abc"
        );
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/qt")]).unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://localhost/qt"
        );
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("SITE_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(var, _) if var == "SITE_PORT"));
    }

    #[test]
    fn test_fusion_brain_requires_both_keys() {
        let err = load(&[("FUSION_BRAIN_API_KEY", "k3y")]).unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingEnvVar(var) if var == "FUSION_BRAIN_SECRET_KEY")
        );
    }

    #[test]
    fn test_fusion_brain_placeholder_rejected() {
        let err = load(&[
            ("FUSION_BRAIN_API_KEY", "your-api-key"),
            ("FUSION_BRAIN_SECRET_KEY", "A1b2C3d4"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_fusion_brain_loaded() {
        let config = load(&[
            ("FUSION_BRAIN_API_KEY", "A1b2C3d4"),
            ("FUSION_BRAIN_SECRET_KEY", "Z9y8X7w6"),
            ("FUSION_BRAIN_POLL_ATTEMPTS", "3"),
            ("FUSION_BRAIN_POLL_DELAY_SECS", "0"),
        ])
        .unwrap();
        let fb = config.fusion_brain.unwrap();
        assert_eq!(fb.base_url.as_str(), DEFAULT_FUSION_BRAIN_URL);
        assert_eq!(fb.poll_attempts, 3);
        assert_eq!(fb.poll_delay, Duration::ZERO);
    }

    #[test]
    fn test_fusion_brain_debug_redacts_secrets() {
        let config = load(&[
            ("FUSION_BRAIN_API_KEY", "super_secret_api"),
            ("FUSION_BRAIN_SECRET_KEY", "super_secret_pair"),
        ])
        .unwrap();
        let debug_output = format!("{:?}", config.fusion_brain.unwrap());
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api"));
        assert!(!debug_output.contains("super_secret_pair"));
    }
}
