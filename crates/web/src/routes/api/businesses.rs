//! Business records and panel configurations as JSON.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use qwerty_town_core::{Business, Menu, MenuSync, PanelConfig, PanelConfigUpdate};

use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::routes::business::{load_business, parse_id};
use crate::state::AppState;
use crate::store::BusinessMap;

/// Answer to a configuration save.
#[derive(Debug, Serialize)]
pub struct ConfigSaved {
    pub status: &'static str,
    pub config: PanelConfig,
    /// What happened to the record's menu.
    pub menu_sync: MenuSync,
}

/// Answer to a menu save.
#[derive(Debug, Serialize)]
pub struct MenuSaved {
    pub status: &'static str,
    pub menu: Menu,
}

/// All records keyed by id.
///
/// GET /api/businesses
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<BusinessMap>> {
    Ok(Json(state.store().businesses().load_all().await?))
}

/// One record.
///
/// GET /api/business/{id}
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Business>> {
    Ok(Json(load_business(&state, &id).await?))
}

/// Panel configuration, with the record's menu embedded when the saved
/// config has none.
///
/// GET /api/business/{id}/config
#[instrument(skip(state))]
pub async fn config(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PanelConfig>> {
    let business = load_business(&state, &id).await?;
    Ok(Json(state.store().panel_config(&business).await?))
}

/// Merge and save a panel configuration, mirroring its menu into the record.
///
/// POST /api/business/{id}/config
#[instrument(skip(state, update))]
pub async fn save_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<PanelConfigUpdate>,
) -> Result<Json<ConfigSaved>> {
    let id = parse_id(&id)?;
    update.validate()?;

    let (config, menu_sync) = state
        .store()
        .save_panel_config(&id, update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("business {id}")))?;

    Ok(Json(ConfigSaved {
        status: "success",
        config,
        menu_sync,
    }))
}

/// Replace a record's menu, mirroring it into the config.
///
/// PUT /api/business/{id}/menu
#[instrument(skip(state, menu))]
pub async fn save_menu(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(menu): JsonBody<Menu>,
) -> Result<Json<MenuSaved>> {
    let id = parse_id(&id)?;
    menu.validate()?;

    let business = state
        .store()
        .save_menu(&id, menu)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("business {id}")))?;

    Ok(Json(MenuSaved {
        status: "success",
        menu: business.menu,
    }))
}
