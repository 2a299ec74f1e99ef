//! Google Cloud REST backends: Text-to-Speech, Cloud Storage and Firestore.

pub mod auth;
pub mod firestore;
pub mod storage;
pub mod tts;

pub use auth::{MetadataTokenProvider, StaticTokenProvider, TokenProvider};
pub use firestore::FirestoreCatalog;
pub use storage::GcsArtifactStore;
pub use tts::GoogleSpeechSynthesizer;

use reqwest::Url;

use crate::error::BackendError;

pub const DEFAULT_TTS_ENDPOINT: &str = "https://texttospeech.googleapis.com";
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.googleapis.com";
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com";

/// Turn a non-success response into `BackendError::Api`, keeping the body.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(BackendError::Api { status, body })
}

/// Append path segments to a service endpoint, percent-encoding each one.
pub(crate) fn endpoint_url(endpoint: &str, segments: &[&str]) -> Result<Url, BackendError> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| BackendError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| BackendError::InvalidEndpoint(endpoint.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_segments_to_bare_host() {
        let url = endpoint_url("https://storage.googleapis.com", &["storage", "v1", "b"]).unwrap();
        assert_eq!(url.as_str(), "https://storage.googleapis.com/storage/v1/b");
    }

    #[test]
    fn keeps_endpoint_path_prefix() {
        let url = endpoint_url("http://localhost:9000/emulator/", &["v1", "voices"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/emulator/v1/voices");
    }

    #[test]
    fn encodes_reserved_characters_in_segments() {
        let url = endpoint_url("http://localhost", &["o", "a/b c?.mp3"]).unwrap();
        assert_eq!(url.path(), "/o/a%2Fb%20c%3F.mp3");
    }

    #[test]
    fn rejects_unparseable_endpoint() {
        let err = endpoint_url("not a url", &["v1"]).unwrap_err();
        assert!(matches!(err, BackendError::InvalidEndpoint(_)));
    }
}
