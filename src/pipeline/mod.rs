pub mod key;
pub mod record;
pub mod voice;

use std::sync::Arc;

use crate::backends::{ArtifactStore, AudioEncoding, MetadataCatalog, SpeechSynthesizer};
use crate::error::PipelineError;

pub use key::{compute_key, ContentKey};
pub use record::{SynthesisRecord, SynthesisRequest, MAX_TEXT_CHARS};
pub use voice::VoiceSelector;

/// Which request text is sent to the speech service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpokenText {
    /// Speak the translated text when present, otherwise the native text.
    #[default]
    PreferTarget,
    /// Always speak the native text.
    Source,
}

impl SpokenText {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "prefer_target" | "target" => Some(SpokenText::PreferTarget),
            "source" => Some(SpokenText::Source),
            _ => None,
        }
    }

    fn select<'a>(&self, request: &'a SynthesisRequest) -> &'a str {
        match self {
            SpokenText::PreferTarget => request
                .text_translated
                .as_deref()
                .unwrap_or(&request.text_native),
            SpokenText::Source => &request.text_native,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Base address used to build playback URLs.
    pub public_base_url: String,
    pub spoken_text: SpokenText,
    /// Return an existing record with matching content instead of
    /// synthesizing again.
    pub reuse_existing: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:8080".to_string(),
            spoken_text: SpokenText::default(),
            reuse_existing: false,
        }
    }
}

/// Result of a successful synthesis.
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub playback_url: String,
    pub record: SynthesisRecord,
}

pub struct SynthesisPipeline {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn ArtifactStore>,
    catalog: Arc<dyn MetadataCatalog>,
    options: PipelineOptions,
}

impl SynthesisPipeline {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        store: Arc<dyn ArtifactStore>,
        catalog: Arc<dyn MetadataCatalog>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            synthesizer,
            store,
            catalog,
            options,
        }
    }

    pub fn synthesizer(&self) -> &Arc<dyn SpeechSynthesizer> {
        &self.synthesizer
    }

    pub async fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisOutcome, PipelineError> {
        // 1. Validate
        let voice = VoiceSelector::parse(&request.voice_name)
            .ok_or_else(|| PipelineError::InvalidVoiceSelector(request.voice_name.clone()))?;
        validate_text("textNative", Some(&request.text_native))?;
        validate_text("textTranslated", request.text_translated.as_deref())?;

        // 2. Derive the key
        let key = compute_key(voice.name(), &request.text_native);
        let file_name = key.file_name();

        if self.options.reuse_existing {
            if let Some(record) = self.existing_record(&key, &request).await {
                tracing::debug!("Reusing existing record {}", key);
                return Ok(self.outcome(record));
            }
        }

        // 3. Synthesize
        let text = self.options.spoken_text.select(&request);
        tracing::debug!("Synthesizing {} chars with {}", text.chars().count(), voice);
        let audio = self
            .synthesizer
            .synthesize(voice.language_code(), voice.name(), text, AudioEncoding::Mp3)
            .await
            .map_err(PipelineError::SynthesisFailed)?;

        // 4. Store and publish the artifact
        tracing::debug!("Writing {} bytes to {}", audio.len(), file_name);
        let stored = self
            .store
            .write_object(&file_name, audio)
            .await
            .map_err(PipelineError::StorageWriteFailed)?;
        self.store
            .set_public(&file_name)
            .await
            .map_err(PipelineError::StorageWriteFailed)?;

        // 5. Record metadata
        let record = SynthesisRecord {
            key: key.clone(),
            voice_name: request.voice_name,
            text_native: request.text_native,
            text_translated: request.text_translated,
            file_name: file_name.clone(),
            audio_ref: stored.reference,
            url: stored.public_url,
        };

        if let Err(e) = self.catalog.put(&key, &record).await {
            self.discard_artifact(&file_name).await;
            return Err(PipelineError::CatalogWriteFailed(e));
        }

        tracing::info!("Synthesized {} with {}", file_name, voice);

        // 6. Compose the result
        Ok(self.outcome(record))
    }

    pub async fn lookup(&self, key: &ContentKey) -> Result<SynthesisRecord, PipelineError> {
        self.catalog
            .get(key)
            .await
            .map_err(PipelineError::CatalogReadFailed)?
            .ok_or_else(|| PipelineError::NotFound(key.to_string()))
    }

    /// Caller-facing playback URL for a stored artifact.
    pub fn playback_url(&self, file_name: &str) -> String {
        format!(
            "{}/audio/{}",
            self.options.public_base_url.trim_end_matches('/'),
            file_name
        )
    }

    fn outcome(&self, record: SynthesisRecord) -> SynthesisOutcome {
        SynthesisOutcome {
            playback_url: self.playback_url(&record.file_name),
            record,
        }
    }

    async fn existing_record(
        &self,
        key: &ContentKey,
        request: &SynthesisRequest,
    ) -> Option<SynthesisRecord> {
        match self.catalog.get(key).await {
            Ok(Some(record)) if record.same_content(request) => Some(record),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Catalog lookup for {} failed, synthesizing anyway: {}", key, e);
                None
            }
        }
    }

    async fn discard_artifact(&self, file_name: &str) {
        match self.store.delete_object(file_name).await {
            Ok(()) => tracing::warn!("Catalog write failed, removed artifact {}", file_name),
            Err(e) => tracing::error!(
                "Catalog write failed and artifact {} could not be removed: {}",
                file_name,
                e
            ),
        }
    }
}

fn validate_text(field: &str, text: Option<&str>) -> Result<(), PipelineError> {
    let Some(text) = text else {
        return Ok(());
    };

    if text.trim().is_empty() {
        return Err(PipelineError::InvalidRequest(format!(
            "{} cannot be empty",
            field
        )));
    }

    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(PipelineError::InvalidRequest(format!(
            "{} too long (max {} chars)",
            field, MAX_TEXT_CHARS
        )));
    }

    Ok(())
}
