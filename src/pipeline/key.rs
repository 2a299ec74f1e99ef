use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// File extension of every stored artifact.
pub const AUDIO_EXTENSION: &str = "mp3";

const KEY_LEN: usize = 64;

/// Lowercase hex SHA-256 digest identifying one (voice, text) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKey(String);

impl ContentKey {
    /// Parse a key from a route id. Accepts the bare digest or the artifact
    /// file name (`<digest>.mp3`).
    pub fn parse(id: &str) -> Option<Self> {
        let digest = id
            .strip_suffix(&format!(".{}", AUDIO_EXTENSION))
            .unwrap_or(id);

        let valid = digest.len() == KEY_LEN
            && digest
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));

        valid.then(|| Self(digest.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the artifact stored under this key.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, AUDIO_EXTENSION)
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the content key for a voice and text.
///
/// The digest covers `voice` immediately followed by `text`, with no
/// delimiter, so pairs that concatenate to the same string share a key.
pub fn compute_key(voice: &str, text: &str) -> ContentKey {
    let mut hasher = Sha256::new();
    hasher.update(voice.as_bytes());
    hasher.update(text.as_bytes());
    ContentKey(format!("{:x}", hasher.finalize()))
}
