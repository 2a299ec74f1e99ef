use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::header,
    response::Html,
    Json,
};

use super::{page, HealthResponse, LanguagesResponse, SynthesizeResponse, VoicesResponse};
use crate::api::routes::AppState;
use crate::backends::content_type_for;
use crate::error::AppError;
use crate::pipeline::{ContentKey, SynthesisRecord, SynthesisRequest};

pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SynthesisRequest>, JsonRejection>,
) -> Result<Json<SynthesizeResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let outcome = state.pipeline.synthesize(request).await?;

    Ok(Json(SynthesizeResponse {
        audio_url: outcome.playback_url,
        record: outcome.record,
    }))
}

pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SynthesisRecord>, AppError> {
    let key = parse_key(&id)?;
    let record = state.pipeline.lookup(&key).await?;
    Ok(Json(record))
}

pub async fn audio_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let key = parse_key(&id)?;
    let record = state.pipeline.lookup(&key).await?;
    Ok(Html(page::render(&record)))
}

pub async fn list_voices(
    State(state): State<Arc<AppState>>,
    Path(language_code): Path<String>,
) -> Result<Json<VoicesResponse>, AppError> {
    let language_code = language_code.trim();
    if language_code.is_empty() {
        return Err(AppError::BadRequest("languageCode is required".into()));
    }

    let voices = state
        .pipeline
        .synthesizer()
        .list_voices(Some(language_code))
        .await
        .map_err(AppError::VoiceListing)?;

    Ok(Json(VoicesResponse { voices }))
}

pub async fn list_languages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LanguagesResponse>, AppError> {
    let voices = state
        .pipeline
        .synthesizer()
        .list_voices(None)
        .await
        .map_err(AppError::VoiceListing)?;

    let languages: BTreeSet<String> = voices
        .into_iter()
        .flat_map(|voice| voice.language_codes)
        .collect();

    Ok(Json(LanguagesResponse {
        languages: languages.into_iter().collect(),
    }))
}

/// Serve audio written by the in-memory store.
pub async fn local_object(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<([(header::HeaderName, &'static str); 1], Vec<u8>), AppError> {
    let bytes = state
        .local_objects
        .as_ref()
        .and_then(|store| store.public_object(&name))
        .ok_or_else(|| AppError::NotFound(format!("No stored object '{}'", name)))?;

    Ok(([(header::CONTENT_TYPE, content_type_for(&name))], bytes))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn parse_key(id: &str) -> Result<ContentKey, AppError> {
    ContentKey::parse(id).ok_or_else(|| AppError::BadRequest(format!("Invalid audio id '{}'", id)))
}
