pub mod handlers;
pub mod page;
pub mod routes;

use serde::Serialize;

use crate::backends::VoiceDescription;
use crate::pipeline::SynthesisRecord;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeResponse {
    pub audio_url: String,
    pub record: SynthesisRecord,
}

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceDescription>,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
