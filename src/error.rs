use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failure of a remote collaborator.
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
}

/// Failure of a pipeline operation.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Invalid voice selector: {0}")]
    InvalidVoiceSelector(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(#[source] BackendError),

    #[error("Artifact write failed: {0}")]
    StorageWriteFailed(#[source] BackendError),

    #[error("Catalog write failed: {0}")]
    CatalogWriteFailed(#[source] BackendError),

    #[error("No record for key {0}")]
    NotFound(String),

    #[error("Catalog read failed: {0}")]
    CatalogReadFailed(#[source] BackendError),
}

impl PipelineError {
    /// The collaborator failure behind this error, if any.
    pub fn backend(&self) -> Option<&BackendError> {
        match self {
            PipelineError::SynthesisFailed(e)
            | PipelineError::StorageWriteFailed(e)
            | PipelineError::CatalogWriteFailed(e)
            | PipelineError::CatalogReadFailed(e) => Some(e),
            PipelineError::InvalidVoiceSelector(_)
            | PipelineError::InvalidRequest(_)
            | PipelineError::NotFound(_) => None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Voice listing failed: {0}")]
    VoiceListing(#[source] BackendError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        let backend = match self {
            AppError::Pipeline(e) => e.backend(),
            AppError::VoiceListing(e) => Some(e),
            AppError::BadRequest(_) | AppError::NotFound(_) => None,
        };
        // Misconfigured service endpoint
        if let Some(BackendError::InvalidEndpoint(_)) = backend {
            return (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR");
        }

        match self {
            AppError::Pipeline(e) => match e {
                PipelineError::InvalidVoiceSelector(_) => {
                    (StatusCode::BAD_REQUEST, "INVALID_VOICE_SELECTOR")
                }
                PipelineError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                PipelineError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                PipelineError::SynthesisFailed(_) => (StatusCode::BAD_GATEWAY, "SYNTHESIS_FAILED"),
                PipelineError::StorageWriteFailed(_) => {
                    (StatusCode::BAD_GATEWAY, "STORAGE_WRITE_FAILED")
                }
                PipelineError::CatalogWriteFailed(_) => {
                    (StatusCode::BAD_GATEWAY, "CATALOG_WRITE_FAILED")
                }
                PipelineError::CatalogReadFailed(_) => {
                    (StatusCode::BAD_GATEWAY, "CATALOG_READ_FAILED")
                }
            },
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::VoiceListing(_) => (StatusCode::BAD_GATEWAY, "VOICE_LISTING_FAILED"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("Request failed: {} - {}", code, message);
        } else {
            tracing::warn!("Request rejected: {} - {}", code, message);
        }

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}
