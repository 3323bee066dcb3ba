//! Fusion Brain image generation client.
//!
//! Generation is asynchronous on the API side: a job is started with
//! [`FusionBrainClient::generate`] and its status polled with
//! [`FusionBrainClient::check_generation`] until the images are ready.

use std::time::Duration;

use qwerty_town_core::BusinessType;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::uploads::{ImageKind, UploadDir, UploadError};
use crate::config::FusionBrainConfig;

/// Side length of generated images, in pixels.
const IMAGE_SIZE: u32 = 1024;

/// Descriptions shorter than this get the generic prompt.
const MIN_DESCRIPTION_LENGTH: usize = 10;

const GENERIC_LOGO_PROMPT: &str = "A modern minimalist logo for a business";

/// Errors that can occur when talking to the Fusion Brain API.
#[derive(Debug, Error)]
pub enum FusionBrainError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Endpoint URL could not be built from the base URL.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// Credentials cannot be sent as header values.
    #[error("invalid credentials: {0}")]
    Credentials(String),

    /// The account has no pipelines.
    #[error("no generation pipeline available")]
    NoPipeline,

    /// The job finished with status `FAIL`.
    #[error("generation failed: {0}")]
    Failed(String),

    /// The job finished but returned no images.
    #[error("generation returned no images")]
    EmptyResult,

    /// The job did not finish within the polling budget.
    #[error("generation did not finish after {attempts} status checks")]
    TimedOut { attempts: u32 },

    /// The generated image could not be stored.
    #[error(transparent)]
    Storage(#[from] UploadError),
}

#[derive(Debug, Deserialize)]
struct Pipeline {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    uuid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    status: String,
    #[serde(default)]
    result: Option<GenerationResult>,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerationResult {
    #[serde(default)]
    files: Vec<String>,
}

/// Fusion Brain API client.
#[derive(Clone)]
pub struct FusionBrainClient {
    client: reqwest::Client,
    base_url: Url,
    poll_attempts: u32,
    poll_delay: Duration,
}

impl FusionBrainClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the keys are not valid header values or the HTTP
    /// client fails to build.
    pub fn new(config: &FusionBrainConfig) -> Result<Self, FusionBrainError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Key",
            secret_header("Key", config.api_key.expose_secret())?,
        );
        headers.insert(
            "X-Secret",
            secret_header("Secret", config.secret_key.expose_secret())?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            poll_attempts: config.poll_attempts,
            poll_delay: config.poll_delay,
        })
    }

    /// Id of the first pipeline available to the account.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or no pipeline is listed.
    pub async fn get_pipeline(&self) -> Result<String, FusionBrainError> {
        let response = self
            .client
            .get(self.endpoint("key/api/v1/pipelines")?)
            .send()
            .await?;
        let pipelines: Vec<Pipeline> = check_status(response).await?.json().await?;

        pipelines
            .into_iter()
            .next()
            .map(|p| p.id)
            .ok_or(FusionBrainError::NoPipeline)
    }

    /// Start a single 1024x1024 generation job and return its uuid.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the job.
    pub async fn generate(&self, prompt: &str, pipeline_id: &str) -> Result<String, FusionBrainError> {
        let params = serde_json::json!({
            "type": "GENERATE",
            "numImages": 1,
            "width": IMAGE_SIZE,
            "height": IMAGE_SIZE,
            "generateParams": {
                "query": prompt
            }
        });

        let form = Form::new()
            .text("pipeline_id", pipeline_id.to_string())
            .part(
                "params",
                Part::text(params.to_string()).mime_str("application/json")?,
            );

        let response = self
            .client
            .post(self.endpoint("key/api/v1/pipeline/run")?)
            .multipart(form)
            .send()
            .await?;
        let run: RunResponse = check_status(response).await?.json().await?;

        tracing::debug!(uuid = %run.uuid, "Generation job started");
        Ok(run.uuid)
    }

    /// Poll a job until it is done and return its base64 images.
    ///
    /// # Errors
    ///
    /// Returns `Failed` when the job fails, `TimedOut` when it is still
    /// running after the configured number of polls, and `EmptyResult` when
    /// it finishes without images.
    pub async fn check_generation(&self, uuid: &str) -> Result<Vec<String>, FusionBrainError> {
        let url = self.endpoint(&format!("key/api/v1/pipeline/status/{uuid}"))?;

        for attempt in 1..=self.poll_attempts {
            let response = self.client.get(url.clone()).send().await?;
            let status: StatusResponse = check_status(response).await?.json().await?;

            match status.status.as_str() {
                "DONE" => {
                    let files = status.result.map(|r| r.files).unwrap_or_default();
                    if files.is_empty() {
                        return Err(FusionBrainError::EmptyResult);
                    }
                    return Ok(files);
                }
                "FAIL" => {
                    return Err(FusionBrainError::Failed(
                        status.error_description.unwrap_or_default(),
                    ));
                }
                other => {
                    tracing::debug!(uuid, attempt, status = other, "Generation still running");
                }
            }

            if attempt < self.poll_attempts {
                tokio::time::sleep(self.poll_delay).await;
            }
        }

        Err(FusionBrainError::TimedOut {
            attempts: self.poll_attempts,
        })
    }

    /// Generate a logo and store it under `logos/{name}.png`.
    ///
    /// Returns the public path of the stored image.
    ///
    /// # Errors
    ///
    /// Returns any error from the generation steps or from storing the file.
    pub async fn generate_logo(
        &self,
        uploads: &UploadDir,
        description: &str,
        business_type: BusinessType,
        name: &str,
    ) -> Result<String, FusionBrainError> {
        let pipeline_id = self.get_pipeline().await?;
        let prompt = create_logo_prompt(description, business_type);
        let uuid = self.generate(&prompt, &pipeline_id).await?;
        let files = self.check_generation(&uuid).await?;
        let first = files.first().ok_or(FusionBrainError::EmptyResult)?;

        save_generated_image(uploads, first, name, ImageKind::Logo).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, FusionBrainError> {
        Ok(self.base_url.join(path)?)
    }
}

/// Decode a generated image and store it as `{kind dir}/{name}.png`.
///
/// # Errors
///
/// Returns `Storage` if the data is not valid base64 or cannot be written.
pub async fn save_generated_image(
    uploads: &UploadDir,
    base64_data: &str,
    name: &str,
    kind: ImageKind,
) -> Result<String, FusionBrainError> {
    Ok(uploads.save_generated(kind, name, base64_data).await?)
}

/// Build the text prompt for a logo.
#[must_use]
pub fn create_logo_prompt(description: &str, business_type: BusinessType) -> String {
    let description = description.trim();
    if description.chars().count() < MIN_DESCRIPTION_LENGTH {
        return GENERIC_LOGO_PROMPT.to_string();
    }

    format!(
        "Create a modern professional logo for a {kind}. \
         Take the following description into account: {description}. \
         The logo should be minimalist, memorable and suitable for use at different sizes. \
         Follow modern design trends.",
        kind = business_type.label().to_lowercase(),
    )
}

fn secret_header(scheme: &str, secret: &str) -> Result<HeaderValue, FusionBrainError> {
    let mut value = HeaderValue::from_str(&format!("{scheme} {secret}"))
        .map_err(|e| FusionBrainError::Credentials(e.to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FusionBrainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(FusionBrainError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use base64::Engine;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, poll_attempts: u32) -> FusionBrainClient {
        FusionBrainClient::new(&FusionBrainConfig {
            base_url: Url::parse(&format!("{}/", server.uri())).unwrap(),
            api_key: SecretString::from("api-123".to_string()),
            secret_key: SecretString::from("secret-456".to_string()),
            poll_attempts,
            poll_delay: Duration::from_millis(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_pipeline_sends_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/key/api/v1/pipelines"))
            .and(header("X-Key", "Key api-123"))
            .and(header("X-Secret", "Secret secret-456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "pipe-1", "name": "Kandinsky"},
                {"id": "pipe-2", "name": "Other"}
            ])))
            .mount(&server)
            .await;

        let id = client(&server, 1).get_pipeline().await.unwrap();
        assert_eq!(id, "pipe-1");
    }

    #[tokio::test]
    async fn test_get_pipeline_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/key/api/v1/pipelines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = client(&server, 1).get_pipeline().await.unwrap_err();
        assert!(matches!(err, FusionBrainError::NoPipeline));
    }

    #[tokio::test]
    async fn test_generate_posts_multipart_params() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/key/api/v1/pipeline/run"))
            .and(body_string_contains("pipe-1"))
            .and(body_string_contains("\"type\":\"GENERATE\""))
            .and(body_string_contains("a blue cup"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"uuid": "job-1", "status": "INITIAL"})),
            )
            .mount(&server)
            .await;

        let uuid = client(&server, 1).generate("a blue cup", "pipe-1").await.unwrap();
        assert_eq!(uuid, "job-1");
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/key/api/v1/pipeline/run"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = client(&server, 1).generate("x", "p").await.unwrap_err();
        assert!(matches!(err, FusionBrainError::Api { status: 401, ref message } if message == "bad key"));
    }

    #[tokio::test]
    async fn test_check_generation_done() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/key/api/v1/pipeline/status/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uuid": "job-1",
                "status": "DONE",
                "result": {"files": ["aGVsbG8="], "censored": false}
            })))
            .mount(&server)
            .await;

        let files = client(&server, 3).check_generation("job-1").await.unwrap();
        assert_eq!(files, vec!["aGVsbG8=".to_string()]);
    }

    #[tokio::test]
    async fn test_check_generation_fail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/key/api/v1/pipeline/status/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uuid": "job-1",
                "status": "FAIL",
                "errorDescription": "censored"
            })))
            .mount(&server)
            .await;

        let err = client(&server, 3).check_generation("job-1").await.unwrap_err();
        assert!(matches!(err, FusionBrainError::Failed(ref reason) if reason == "censored"));
    }

    #[tokio::test]
    async fn test_check_generation_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/key/api/v1/pipeline/status/job-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"uuid": "job-1", "status": "PROCESSING"})),
            )
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server, 3).check_generation("job-1").await.unwrap_err();
        assert!(matches!(err, FusionBrainError::TimedOut { attempts: 3 }));
    }

    #[tokio::test]
    async fn test_generate_logo_stores_png() {
        let server = MockServer::start().await;
        let image = base64::engine::general_purpose::STANDARD.encode(b"png-bytes");
        Mock::given(method("GET"))
            .and(path("/key/api/v1/pipelines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "pipe-1"}])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/key/api/v1/pipeline/run"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"uuid": "job-9"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/key/api/v1/pipeline/status/job-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "DONE",
                "result": {"files": [image]}
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path().to_path_buf());
        let logo = client(&server, 2)
            .generate_logo(&uploads, "Cozy coffee shop by the river", BusinessType::Cafe, "tmp-1")
            .await
            .unwrap();

        assert_eq!(logo, "/uploads/logos/tmp-1.png");
        assert_eq!(std::fs::read(dir.path().join("logos/tmp-1.png")).unwrap(), b"png-bytes");
    }

    #[test]
    fn test_short_description_uses_generic_prompt() {
        assert_eq!(create_logo_prompt("cafe", BusinessType::Cafe), GENERIC_LOGO_PROMPT);
        assert_eq!(create_logo_prompt("   ", BusinessType::Bar), GENERIC_LOGO_PROMPT);
    }

    #[test]
    fn test_prompt_mentions_type_and_description() {
        let prompt = create_logo_prompt("Family bakery with sourdough bread", BusinessType::Shop);
        assert!(prompt.contains("logo for a shop"));
        assert!(prompt.contains("Family bakery with sourdough bread"));
    }
}
