//! Remote collaborators of the synthesis pipeline.
//!
//! Each trait is implemented once against Google Cloud REST APIs
//! ([`google`]) and, for storage and metadata, once in process
//! ([`memory`]). Implementations must be safe to share between requests.

pub mod google;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::pipeline::{ContentKey, SynthesisRecord};

/// Output encoding requested from the speech service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    Mp3,
    Linear16,
    OggOpus,
}

impl AudioEncoding {
    /// Name used by the Text-to-Speech API.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "MP3",
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::OggOpus => "OGG_OPUS",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "audio/mpeg",
            AudioEncoding::Linear16 => "audio/wav",
            AudioEncoding::OggOpus => "audio/ogg",
        }
    }
}

/// MIME type for a stored object, picked from its file extension.
pub fn content_type_for(name: &str) -> &'static str {
    if name.ends_with(".mp3") {
        AudioEncoding::Mp3.content_type()
    } else if name.ends_with(".wav") {
        AudioEncoding::Linear16.content_type()
    } else if name.ends_with(".ogg") {
        AudioEncoding::OggOpus.content_type()
    } else {
        "application/octet-stream"
    }
}

/// One voice offered by the speech service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceDescription {
    pub name: String,
    #[serde(default)]
    pub language_codes: Vec<String>,
    #[serde(default)]
    pub ssml_gender: String,
    #[serde(default)]
    pub natural_sample_rate_hertz: u32,
}

/// Where a written object lives.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    /// Provider reference, e.g. `gs://bucket/name`.
    pub reference: String,
    pub public_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectAttributes {
    pub public_url: String,
    pub bucket_name: String,
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with the named voice and return encoded audio.
    async fn synthesize(
        &self,
        language_code: &str,
        voice_name: &str,
        text: &str,
        encoding: AudioEncoding,
    ) -> Result<Vec<u8>, BackendError>;

    /// List available voices, optionally restricted to one language code.
    async fn list_voices(
        &self,
        language_code: Option<&str>,
    ) -> Result<Vec<VoiceDescription>, BackendError>;
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write `bytes` under `name`, replacing any existing object.
    async fn write_object(&self, name: &str, bytes: Vec<u8>) -> Result<StoredObject, BackendError>;

    /// Make the object readable by anyone.
    async fn set_public(&self, name: &str) -> Result<(), BackendError>;

    async fn get_attributes(&self, name: &str) -> Result<ObjectAttributes, BackendError>;

    async fn delete_object(&self, name: &str) -> Result<(), BackendError>;
}

#[async_trait]
pub trait MetadataCatalog: Send + Sync {
    /// Store `record` under `key`, replacing any existing record.
    async fn put(&self, key: &ContentKey, record: &SynthesisRecord) -> Result<(), BackendError>;

    /// `Ok(None)` when no record exists for `key`.
    async fn get(&self, key: &ContentKey) -> Result<Option<SynthesisRecord>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_content_type_from_extension() {
        assert_eq!(content_type_for("x.mp3"), "audio/mpeg");
        assert_eq!(content_type_for("x.ogg"), "audio/ogg");
        assert_eq!(content_type_for("x.bin"), "application/octet-stream");
    }
}
