//! Directory index page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use qwerty_town_core::Business;

use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Directory index template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    /// Registered businesses, sorted by name.
    pub businesses: Vec<Business>,
}

/// Display the directory index.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<IndexTemplate> {
    let mut businesses: Vec<Business> = state
        .store()
        .businesses()
        .load_all()
        .await?
        .into_values()
        .collect();
    businesses.sort_by_cached_key(|b| b.name.to_lowercase());

    Ok(IndexTemplate { businesses })
}
