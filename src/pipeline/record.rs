use serde::{Deserialize, Serialize};

use super::key::ContentKey;

/// Longest text accepted in either text field, in characters.
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Body of a synthesis request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub voice_name: String,
    #[serde(alias = "text")]
    pub text_native: String,
    #[serde(default)]
    pub text_translated: Option<String>,
}

/// Persisted description of one synthesis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRecord {
    pub key: ContentKey,
    pub voice_name: String,
    pub text_native: String,
    pub text_translated: Option<String>,
    pub file_name: String,
    pub audio_ref: String,
    pub url: String,
}

impl SynthesisRecord {
    /// True when the record was produced from the same voice and texts.
    pub fn same_content(&self, request: &SynthesisRequest) -> bool {
        self.voice_name == request.voice_name
            && self.text_native == request.text_native
            && self.text_translated == request.text_translated
    }
}
