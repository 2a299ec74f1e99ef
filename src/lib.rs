pub mod api;
pub mod backends;
pub mod config;
pub mod error;
pub mod pipeline;

use std::sync::Arc;

use backends::google::{
    FirestoreCatalog, GcsArtifactStore, GoogleSpeechSynthesizer, MetadataTokenProvider,
    StaticTokenProvider, TokenProvider,
};
use api::routes::AppState;
use backends::memory::{MemoryArtifactStore, MemoryCatalog, LOCAL_BUCKET};
use backends::{ArtifactStore, MetadataCatalog};
use config::{Config, StorageBackend};
use error::ConfigError;
use pipeline::SynthesisPipeline;

/// Build the pipeline and its long-lived collaborator clients.
pub fn build_state(config: &Config) -> Result<AppState, ConfigError> {
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    let tokens: Arc<dyn TokenProvider> = match &config.access_token {
        Some(token) => Arc::new(StaticTokenProvider::new(token.clone())),
        None => {
            tracing::info!("No GOOGLE_ACCESS_TOKEN set, using the metadata server");
            Arc::new(MetadataTokenProvider::new(http.clone()))
        }
    };

    let synthesizer = Arc::new(GoogleSpeechSynthesizer::new(
        http.clone(),
        config.tts_endpoint.clone(),
        tokens.clone(),
    ));

    let mut local_objects = None;
    let (store, catalog): (Arc<dyn ArtifactStore>, Arc<dyn MetadataCatalog>) =
        match &config.storage {
            StorageBackend::Google(google) => {
                tracing::info!(
                    "Storing audio in gs://{} and records in {}/{}",
                    google.bucket,
                    google.project_id,
                    google.collection
                );
                let store: Arc<dyn ArtifactStore> = Arc::new(GcsArtifactStore::new(
                    http.clone(),
                    google.storage_endpoint.clone(),
                    google.bucket.clone(),
                    tokens.clone(),
                ));
                let catalog: Arc<dyn MetadataCatalog> = Arc::new(FirestoreCatalog::new(
                    http,
                    &google.firestore_endpoint,
                    &google.project_id,
                    &google.collection,
                    tokens,
                ));
                (store, catalog)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage, artifacts are lost on restart");
                let memory = Arc::new(MemoryArtifactStore::new(
                    LOCAL_BUCKET,
                    config.public_base_url.clone(),
                ));
                local_objects = Some(memory.clone());
                let store: Arc<dyn ArtifactStore> = memory;
                let catalog: Arc<dyn MetadataCatalog> = Arc::new(MemoryCatalog::new());
                (store, catalog)
            }
        };

    let pipeline = SynthesisPipeline::new(synthesizer, store, catalog, config.pipeline_options());
    let state = AppState::new(pipeline);

    Ok(match local_objects {
        Some(memory) => state.with_local_objects(memory),
        None => state,
    })
}
