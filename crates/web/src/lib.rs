//! Qwerty Town directory site.
//!
//! This crate provides the web server as a library, allowing it to be
//! tested in-process and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod filters;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::services::uploads::UPLOADS_URL_PREFIX;
use crate::state::AppState;

/// Build the full application router.
///
/// Serves bundled assets under `/static` and uploaded images under
/// `/uploads`. CORS is permissive; the API has no authentication.
pub fn app(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config().static_dir);
    let upload_dir = ServeDir::new(&state.config().upload_dir);

    routes::routes()
        .nest_service("/static", static_dir)
        .nest_service(UPLOADS_URL_PREFIX, upload_dir)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
