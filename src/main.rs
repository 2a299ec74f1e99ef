use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tts_artifact_server::api::routes::{create_router, RouterOptions};
use tts_artifact_server::build_state;
use tts_artifact_server::config::Config;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Configuration from environment
    let config = Config::from_env().expect("Invalid configuration");
    let addr = config.socket_addr().expect("Invalid address");

    tracing::info!("TTS Artifact Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!("Playback URLs under {}", config.public_base_url);

    // Create app state with the pipeline and its shared clients
    let state = Arc::new(build_state(&config).expect("Failed to create backends"));

    // Create router
    let app = create_router(state, &RouterOptions::from(&config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
