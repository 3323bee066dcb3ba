//! HTTP route handlers for the directory site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (database ping when enabled)
//! GET  /                                - Directory index
//!
//! # Businesses
//! GET  /business/register               - Registration form
//! POST /business/register               - Register (multipart), returns JSON
//! POST /business/generate-logo          - Generate a logo, returns its path
//! GET  /business/{id}                   - Public business page
//! GET  /business/{id}/constructor       - Panel constructor
//!
//! # JSON API
//! GET  /api/businesses                  - All records
//! GET  /api/business/{id}               - One record
//! GET  /api/business/{id}/config        - Panel configuration
//! POST /api/business/{id}/config        - Save panel configuration
//! PUT  /api/business/{id}/menu          - Save menu
//! ```

pub mod api;
pub mod business;
pub mod health;
pub mod home;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use crate::services::uploads::MAX_UPLOAD_SIZE;
use crate::state::AppState;

/// Room for the text fields of the registration form on top of the logo.
const FORM_OVERHEAD: usize = 64 * 1024;

/// Create the business page routes router.
pub fn business_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/register",
            get(business::register_page)
                .post(business::register)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + FORM_OVERHEAD)),
        )
        .route("/generate-logo", post(business::generate_logo))
        .route("/{id}", get(business::show))
        .route("/{id}/constructor", get(business::constructor))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/businesses", get(api::businesses::list))
        .route("/business/{id}", get(api::businesses::show))
        .route(
            "/business/{id}/config",
            get(api::businesses::config).post(api::businesses::save_config),
        )
        .route("/business/{id}/menu", put(api::businesses::save_menu))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/", get(home::index))
        .nest("/business", business_routes())
        .nest("/api", api_routes())
}
