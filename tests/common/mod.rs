#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tts_artifact_server::api::routes::{create_router, AppState, RouterOptions};
use tts_artifact_server::backends::memory::{MemoryArtifactStore, MemoryCatalog};
use tts_artifact_server::backends::{
    ArtifactStore, AudioEncoding, MetadataCatalog, ObjectAttributes, SpeechSynthesizer,
    StoredObject, VoiceDescription,
};
use tts_artifact_server::error::BackendError;
use tts_artifact_server::pipeline::{
    ContentKey, PipelineOptions, SynthesisPipeline, SynthesisRecord,
};

/// Ordered log of collaborator calls shared by the recording doubles.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

fn upstream_error() -> BackendError {
    BackendError::Api {
        status: 503,
        body: "unavailable".into(),
    }
}

pub struct RecordingSynthesizer {
    pub log: CallLog,
    pub fail: bool,
    pub voices: Vec<VoiceDescription>,
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynthesizer {
    async fn synthesize(
        &self,
        language_code: &str,
        voice_name: &str,
        text: &str,
        _encoding: AudioEncoding,
    ) -> Result<Vec<u8>, BackendError> {
        self.log
            .push(format!("synthesize {} {} {}", language_code, voice_name, text));
        if self.fail {
            return Err(upstream_error());
        }
        Ok(format!("mp3:{}", text).into_bytes())
    }

    async fn list_voices(
        &self,
        language_code: Option<&str>,
    ) -> Result<Vec<VoiceDescription>, BackendError> {
        if self.fail {
            return Err(upstream_error());
        }
        Ok(self
            .voices
            .iter()
            .filter(|v| language_code.map_or(true, |code| v.language_codes.iter().any(|c| c == code)))
            .cloned()
            .collect())
    }
}

pub struct RecordingStore {
    pub log: CallLog,
    pub inner: MemoryArtifactStore,
    pub fail_write: bool,
    pub fail_public: bool,
    pub fail_delete: bool,
}

#[async_trait]
impl ArtifactStore for RecordingStore {
    async fn write_object(&self, name: &str, bytes: Vec<u8>) -> Result<StoredObject, BackendError> {
        self.log.push(format!("write_object {}", name));
        if self.fail_write {
            return Err(upstream_error());
        }
        self.inner.write_object(name, bytes).await
    }

    async fn set_public(&self, name: &str) -> Result<(), BackendError> {
        self.log.push(format!("set_public {}", name));
        if self.fail_public {
            return Err(upstream_error());
        }
        self.inner.set_public(name).await
    }

    async fn get_attributes(&self, name: &str) -> Result<ObjectAttributes, BackendError> {
        self.inner.get_attributes(name).await
    }

    async fn delete_object(&self, name: &str) -> Result<(), BackendError> {
        self.log.push(format!("delete_object {}", name));
        if self.fail_delete {
            return Err(upstream_error());
        }
        self.inner.delete_object(name).await
    }
}

pub struct RecordingCatalog {
    pub log: CallLog,
    pub inner: MemoryCatalog,
    pub fail_put: bool,
    pub fail_get: bool,
}

#[async_trait]
impl MetadataCatalog for RecordingCatalog {
    async fn put(&self, key: &ContentKey, record: &SynthesisRecord) -> Result<(), BackendError> {
        self.log.push(format!("put {}", key));
        if self.fail_put {
            return Err(upstream_error());
        }
        self.inner.put(key, record).await
    }

    async fn get(&self, key: &ContentKey) -> Result<Option<SynthesisRecord>, BackendError> {
        self.log.push(format!("get {}", key));
        if self.fail_get {
            return Err(upstream_error());
        }
        self.inner.get(key).await
    }
}

#[derive(Default)]
pub struct Failures {
    pub synthesize: bool,
    pub write: bool,
    pub public: bool,
    pub delete: bool,
    pub put: bool,
    pub get: bool,
}

pub struct Harness {
    pub log: CallLog,
    pub synthesizer: Arc<RecordingSynthesizer>,
    pub store: Arc<RecordingStore>,
    pub catalog: Arc<RecordingCatalog>,
}

impl Harness {
    pub fn new(failures: Failures) -> Self {
        let log = CallLog::default();
        Self {
            synthesizer: Arc::new(RecordingSynthesizer {
                log: log.clone(),
                fail: failures.synthesize,
                voices: sample_voices(),
            }),
            store: Arc::new(RecordingStore {
                log: log.clone(),
                inner: MemoryArtifactStore::new("test-bucket", "https://cdn.test"),
                fail_write: failures.write,
                fail_public: failures.public,
                fail_delete: failures.delete,
            }),
            catalog: Arc::new(RecordingCatalog {
                log: log.clone(),
                inner: MemoryCatalog::new(),
                fail_put: failures.put,
                fail_get: failures.get,
            }),
            log,
        }
    }

    pub fn pipeline(&self, options: PipelineOptions) -> SynthesisPipeline {
        SynthesisPipeline::new(
            self.synthesizer.clone(),
            self.store.clone(),
            self.catalog.clone(),
            options,
        )
    }

    pub fn router(&self) -> axum::Router {
        let state = Arc::new(AppState::new(self.pipeline(PipelineOptions {
            public_base_url: "http://localhost:8080".into(),
            ..PipelineOptions::default()
        })));
        create_router(state, &RouterOptions::default())
    }
}

pub fn sample_voices() -> Vec<VoiceDescription> {
    vec![
        VoiceDescription {
            name: "en-US-Neural2-A".into(),
            language_codes: vec!["en-US".into()],
            ssml_gender: "MALE".into(),
            natural_sample_rate_hertz: 24000,
        },
        VoiceDescription {
            name: "fr-FR-Neural2-A".into(),
            language_codes: vec!["fr-FR".into()],
            ssml_gender: "FEMALE".into(),
            natural_sample_rate_hertz: 24000,
        },
        VoiceDescription {
            name: "en-GB-Neural2-B".into(),
            language_codes: vec!["en-GB".into(), "en-US".into()],
            ssml_gender: "MALE".into(),
            natural_sample_rate_hertz: 24000,
        },
    ]
}
