use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use crate::backends::memory::MemoryArtifactStore;
use crate::config::Config;
use crate::pipeline::SynthesisPipeline;

pub struct AppState {
    pub pipeline: SynthesisPipeline,
    /// Set in local mode so stored audio can be served from `/memory/`.
    pub local_objects: Option<Arc<MemoryArtifactStore>>,
}

impl AppState {
    pub fn new(pipeline: SynthesisPipeline) -> Self {
        Self {
            pipeline,
            local_objects: None,
        }
    }

    pub fn with_local_objects(mut self, store: Arc<MemoryArtifactStore>) -> Self {
        self.local_objects = Some(store);
        self
    }
}

/// Router settings that do not belong to the pipeline.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub cors_origins: Vec<String>,
    pub public_dir: PathBuf,
    pub well_known_dir: PathBuf,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            public_dir: "public".into(),
            well_known_dir: ".well-known".into(),
        }
    }
}

impl From<&Config> for RouterOptions {
    fn from(config: &Config) -> Self {
        Self {
            cors_origins: config.cors_origins.clone(),
            public_dir: config.public_dir.clone(),
            well_known_dir: config.well_known_dir.clone(),
        }
    }
}

pub fn create_router(state: Arc<AppState>, options: &RouterOptions) -> Router {
    Router::new()
        .route("/tts", post(handlers::synthesize))
        .route("/records/:id", get(handlers::get_record))
        .route("/audio/:id", get(handlers::audio_page))
        .route("/listVoices/:languageCode", get(handlers::list_voices))
        .route("/listLanguages", get(handlers::list_languages))
        .route("/health", get(handlers::health))
        .route("/memory/:name", get(handlers::local_object))
        .nest_service("/public", ServeDir::new(&options.public_dir))
        .nest_service("/.well-known", ServeDir::new(&options.well_known_dir))
        .layer(cors_layer(&options.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([header::CONTENT_LENGTH, header::CONTENT_TYPE])
}
