use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{check_status, endpoint_url, TokenProvider};
use crate::backends::{AudioEncoding, SpeechSynthesizer, VoiceDescription};
use crate::error::BackendError;

#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    #[serde(rename = "audioContent")]
    audio_content: String,
}

#[derive(Debug, Deserialize)]
struct ListVoicesResponse {
    #[serde(default)]
    voices: Vec<VoiceDescription>,
}

/// Google Cloud Text-to-Speech v1 over REST.
pub struct GoogleSpeechSynthesizer {
    http: reqwest::Client,
    endpoint: String,
    tokens: Arc<dyn TokenProvider>,
}

impl GoogleSpeechSynthesizer {
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeechSynthesizer {
    async fn synthesize(
        &self,
        language_code: &str,
        voice_name: &str,
        text: &str,
        encoding: AudioEncoding,
    ) -> Result<Vec<u8>, BackendError> {
        let token = self.tokens.get_token().await?;
        let body = json!({
            "input": { "text": text },
            "voice": { "languageCode": language_code, "name": voice_name },
            "audioConfig": { "audioEncoding": encoding.as_api_str() }
        });

        let response = self
            .http
            .post(endpoint_url(&self.endpoint, &["v1", "text:synthesize"])?)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let parsed: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(format!("Invalid synthesize response: {e}")))?;

        let audio = base64::engine::general_purpose::STANDARD
            .decode(&parsed.audio_content)
            .map_err(|e| BackendError::Decode(format!("Invalid base64 audio: {e}")))?;

        debug!("Received {} bytes of audio from {}", audio.len(), voice_name);
        Ok(audio)
    }

    async fn list_voices(
        &self,
        language_code: Option<&str>,
    ) -> Result<Vec<VoiceDescription>, BackendError> {
        let token = self.tokens.get_token().await?;

        let mut request = self
            .http
            .get(endpoint_url(&self.endpoint, &["v1", "voices"])?)
            .bearer_auth(token);
        if let Some(code) = language_code {
            request = request.query(&[("languageCode", code)]);
        }

        let response = check_status(request.send().await?).await?;
        let parsed: ListVoicesResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(format!("Invalid voices response: {e}")))?;

        Ok(parsed.voices)
    }
}
