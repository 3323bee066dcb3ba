//! Business pages: registration, logo generation, public page and the
//! panel constructor.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, State, multipart::MultipartError},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use qwerty_town_core::{
    Business, BusinessId, BusinessType, Menu, NewBusiness, PanelConfig, PanelKind,
};

use crate::db::NewCompany;
use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::filters;
use crate::services::ImageKind;
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Registration form template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub business_types: Vec<BusinessType>,
    /// Whether the "generate logo" button is offered.
    pub logo_generation: bool,
}

/// Public business page template.
#[derive(Template, WebTemplate)]
#[template(path = "business.html")]
pub struct BusinessTemplate {
    pub business: Business,
    /// Enabled sections in display order.
    pub sections: Vec<PanelKind>,
    /// Menu shown in the menu section.
    pub menu: Menu,
    pub yandex_maps_api_key: Option<String>,
}

/// One row of the constructor's panel list.
pub struct PanelEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub enabled: bool,
}

/// Panel constructor template.
#[derive(Template, WebTemplate)]
#[template(path = "constructor.html")]
pub struct ConstructorTemplate {
    pub business: Business,
    /// Every known panel in display order.
    pub panels: Vec<PanelEntry>,
    /// Current configuration, embedded as JSON for the constructor script.
    pub config: PanelConfig,
    /// Absolute link to the public page.
    pub public_url: String,
}

// =============================================================================
// Registration
// =============================================================================

/// JSON answer to a successful registration.
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub business_id: BusinessId,
}

#[derive(Debug, Default)]
struct RegistrationForm {
    business_name: String,
    business_type: String,
    address: String,
    phone: String,
    email: String,
    description: Option<String>,
    generated_logo: Option<String>,
    logo: Option<UploadedFile>,
}

#[derive(Debug)]
struct UploadedFile {
    file_name: String,
    bytes: Bytes,
}

impl RegistrationForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "logo" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                // Browsers send an unnamed empty part when no file was chosen
                if !file_name.is_empty() {
                    form.logo = Some(UploadedFile { file_name, bytes });
                }
                continue;
            }

            let value = field.text().await.map_err(bad_multipart)?;
            match name.as_str() {
                "business_name" => form.business_name = value,
                "business_type" => form.business_type = value,
                "address" => form.address = value,
                "phone" => form.phone = value,
                "email" => form.email = value,
                "description" => form.description = Some(value),
                "generated_logo" => {
                    form.generated_logo = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                }
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

fn bad_multipart(err: MultipartError) -> AppError {
    AppError::BadRequest(err.body_text())
}

/// Display the registration form.
///
/// GET /business/register
pub async fn register_page(State(state): State<AppState>) -> RegisterTemplate {
    RegisterTemplate {
        business_types: vec![
            BusinessType::Cafe,
            BusinessType::Restaurant,
            BusinessType::Bar,
            BusinessType::Shop,
            BusinessType::Other,
        ],
        logo_generation: state.fusion_brain().is_some(),
    }
}

/// Register a business.
///
/// POST /business/register
///
/// Stores the logo (uploaded file, previously generated image, or the
/// default), inserts the `companies` row when the database is enabled, and
/// adds the record to `businesses.json`.
#[instrument(skip(state, multipart))]
pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RegistrationResponse>> {
    let form = RegistrationForm::from_multipart(multipart).await?;
    let new = NewBusiness::parse(
        &form.business_name,
        &form.business_type,
        &form.address,
        &form.phone,
        &form.email,
        form.description.as_deref(),
    )?;

    let id = BusinessId::generate();

    let logo = if let Some(file) = &form.logo {
        Some(
            state
                .uploads()
                .save_logo(id.as_str(), &file.file_name, &file.bytes)
                .await?,
        )
    } else if let Some(path) = form.generated_logo {
        if state.uploads().resolve(ImageKind::Logo, &path).await.is_none() {
            return Err(AppError::BadRequest(format!(
                "generated logo {path} does not exist"
            )));
        }
        Some(path)
    } else {
        None
    };

    let mut business = Business::register(id.clone(), new, logo, Utc::now());

    if let Some(companies) = state.companies() {
        let company = companies.create(&NewCompany::from(&business)).await?;
        business.company_id = Some(company.id);
    }

    state.store().businesses().insert(business).await?;
    tracing::info!(business_id = %id, "Business registered");

    Ok(Json(RegistrationResponse {
        status: "success",
        message: "Business registered",
        business_id: id,
    }))
}

// =============================================================================
// Logo generation
// =============================================================================

/// Logo generation request body.
#[derive(Debug, Deserialize)]
pub struct LogoRequest {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub business_type: String,
}

/// Logo generation response body.
#[derive(Debug, Serialize)]
pub struct LogoResponse {
    pub logo_path: String,
}

/// Generate a logo from a description.
///
/// POST /business/generate-logo
///
/// Blocks until the image is ready or the polling budget runs out. The
/// returned path is meant to be sent back as `generated_logo` on
/// registration.
#[instrument(skip(state, request), fields(business_type = %request.business_type))]
pub async fn generate_logo(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LogoRequest>,
) -> Result<Json<LogoResponse>> {
    let client = state
        .fusion_brain()
        .ok_or(AppError::Unavailable("logo generation is not configured"))?;

    let business_type = request.business_type.parse().unwrap_or_default();
    let name = Uuid::new_v4().to_string();
    let logo_path = client
        .generate_logo(state.uploads(), &request.description, business_type, &name)
        .await?;

    tracing::info!(logo = %logo_path, "Logo generated");
    Ok(Json(LogoResponse { logo_path }))
}

// =============================================================================
// Business pages
// =============================================================================

/// Parse a path id, treating malformed ids as unknown.
///
/// # Errors
///
/// Returns `AppError::NotFound` for ids that cannot name a record.
pub fn parse_id(raw: &str) -> Result<BusinessId> {
    BusinessId::parse(raw).map_err(|_| AppError::NotFound(format!("business {raw}")))
}

/// Load a record or fail with 404.
pub async fn load_business(state: &AppState, raw_id: &str) -> Result<Business> {
    let id = parse_id(raw_id)?;
    state
        .store()
        .businesses()
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("business {id}")))
}

/// Display a business page with its enabled sections.
///
/// GET /business/{id}
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<BusinessTemplate> {
    let business = load_business(&state, &id).await?;
    let config = state.store().panel_config(&business).await?;
    let menu = config.menu.clone().unwrap_or_else(|| business.menu.clone());

    Ok(BusinessTemplate {
        sections: config.layout(),
        menu,
        yandex_maps_api_key: state.config().yandex_maps_api_key.clone(),
        business,
    })
}

/// Display the panel constructor for a business.
///
/// GET /business/{id}/constructor
#[instrument(skip(state))]
pub async fn constructor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ConstructorTemplate> {
    let business = load_business(&state, &id).await?;
    let config = state.store().panel_config(&business).await?;

    let panels = config
        .all_panels()
        .into_iter()
        .map(|(kind, enabled)| PanelEntry {
            id: kind.as_str(),
            label: kind.label(),
            enabled,
        })
        .collect();
    let public_url = state
        .config()
        .absolute_url(&format!("/business/{}", business.id));

    Ok(ConstructorTemplate {
        panels,
        config,
        public_url,
        business,
    })
}
