//! Integration tests for Qwerty Town.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p qwerty-town-integration-tests
//! ```
//!
//! Each test builds the full router in-process over a temporary data
//! directory and drives it with `tower::ServiceExt::oneshot`. No database
//! is needed; the companies table stays disabled.
//!
//! # Test Categories
//!
//! - `registration` - Multipart registration and logo generation
//! - `panel_config` - Config and menu API round trips
//! - `pages` - Server-rendered pages
//! - `sync` - Config → record reconciliation over real files

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::path::Path;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use http_body_util::BodyExt;
use secrecy::SecretString;
use tempfile::TempDir;
use tower::ServiceExt;

use qwerty_town_core::{Business, BusinessId, NewBusiness};
use qwerty_town_web::config::{FusionBrainConfig, SiteConfig};
use qwerty_town_web::state::AppState;
use qwerty_town_web::store::DataStore;

/// Boundary used by [`Multipart`] bodies.
pub const BOUNDARY: &str = "qwerty-town-test-boundary";

/// A router over a throwaway data directory.
pub struct TestContext {
    pub dir: TempDir,
    pub state: AppState,
    app: Router,
}

/// Response status, headers and collected body.
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl TestContext {
    /// Site with every optional integration disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Site with logo generation pointed at `base_url`.
    #[must_use]
    pub fn with_fusion_brain(base_url: &str) -> Self {
        let base_url = url::Url::parse(&format!("{base_url}/")).unwrap();
        Self::with_config(move |config| {
            config.fusion_brain = Some(FusionBrainConfig {
                base_url,
                api_key: SecretString::from("test-api".to_string()),
                secret_key: SecretString::from("test-secret".to_string()),
                poll_attempts: 2,
                poll_delay: std::time::Duration::from_millis(5),
            });
        })
    }

    fn with_config(customize: impl FnOnce(&mut SiteConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::local(dir.path()).unwrap();
        config.static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../web/static");
        customize(&mut config);

        let state = AppState::new(config, None).unwrap();
        let app = qwerty_town_web::app(state.clone());
        Self { dir, state, app }
    }

    #[must_use]
    pub fn store(&self) -> &DataStore {
        self.state.store()
    }

    /// Insert a record directly into `businesses.json`.
    pub async fn seed_business(&self, id: &str, name: &str) -> Business {
        let new = NewBusiness::parse(name, "cafe", "1 Main St", "+7 900 000 00 00", "hi@example.com", None)
            .unwrap();
        let business = Business::register(BusinessId::parse(id).unwrap(), new, None, Utc::now());
        self.store().businesses().insert(business.clone()).await.unwrap();
        business
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        TestResponse {
            status,
            content_type,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn send_json(&self, method: Method, uri: &str, body: &serde_json::Value) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_multipart(&self, uri: &str, form: Multipart) -> TestResponse {
        let request = Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(form.finish()))
            .unwrap();
        self.send(request).await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// The required registration fields with valid values.
#[must_use]
pub fn registration_form() -> Multipart {
    Multipart::new()
        .text("business_name", "Blue Cup")
        .text("business_type", "cafe")
        .text("address", "1 Main St")
        .text("phone", "+7 900 000 00 00")
        .text("email", "hello@bluecup.example")
}
