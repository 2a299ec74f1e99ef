use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // language-region-suffix, e.g. en-US-Neural2-A
    static ref VOICE_REGEX: Regex = Regex::new(r"^([^-]+)-([^-]+)-([^-].*)$").unwrap();
}

/// A voice name that has been checked to carry a language-region prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSelector {
    name: String,
    language_len: usize,
}

impl VoiceSelector {
    /// Returns `None` when the name has fewer than three non-empty
    /// hyphen-delimited segments.
    pub fn parse(name: &str) -> Option<Self> {
        let caps = VOICE_REGEX.captures(name)?;
        let region = caps.get(2)?;

        Some(Self {
            name: name.to_string(),
            language_len: region.end(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Language-region code, e.g. `en-US`.
    pub fn language_code(&self) -> &str {
        &self.name[..self.language_len]
    }

    /// Provider-specific part after the language-region code, e.g. `Neural2-A`.
    pub fn suffix(&self) -> &str {
        &self.name[self.language_len + 1..]
    }
}

impl fmt::Display for VoiceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
