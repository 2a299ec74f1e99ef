use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::backends::google::{
    DEFAULT_FIRESTORE_ENDPOINT, DEFAULT_STORAGE_ENDPOINT, DEFAULT_TTS_ENDPOINT,
};
use crate::error::ConfigError;
use crate::pipeline::{PipelineOptions, SpokenText};

const DEFAULT_CORS_ORIGINS: &str =
    "https://chat.openai.com,http://localhost:3000,http://localhost:8080";

/// Where artifacts and records are kept.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    Google(GoogleSettings),
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoogleSettings {
    pub project_id: String,
    pub bucket: String,
    pub collection: String,
    pub storage_endpoint: String,
    pub firestore_endpoint: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub public_base_url: String,
    pub cors_origins: Vec<String>,
    pub storage: StorageBackend,
    pub tts_endpoint: String,
    /// Static bearer token; the metadata server is used when absent.
    pub access_token: Option<String>,
    pub spoken_text: SpokenText,
    pub reuse_existing: bool,
    pub http_timeout: Duration,
    pub public_dir: PathBuf,
    pub well_known_dir: PathBuf,
}

impl Config {
    /// Read configuration from the process environment, loading `.env`
    /// first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port_raw = var("PORT", "8080");
        let port = port_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "PORT",
            value: port_raw.clone(),
        })?;

        let storage = match var("STORAGE_BACKEND", "google").as_str() {
            "google" => StorageBackend::Google(GoogleSettings {
                project_id: lookup("GOOGLE_PROJECT_ID")
                    .filter(|v| !v.is_empty())
                    .ok_or(ConfigError::Missing("GOOGLE_PROJECT_ID"))?,
                bucket: lookup("FIREBASE_STORAGE_BUCKET")
                    .filter(|v| !v.is_empty())
                    .ok_or(ConfigError::Missing("FIREBASE_STORAGE_BUCKET"))?,
                collection: var("FIRESTORE_COLLECTION", "audio"),
                storage_endpoint: var("STORAGE_ENDPOINT", DEFAULT_STORAGE_ENDPOINT),
                firestore_endpoint: var("FIRESTORE_ENDPOINT", DEFAULT_FIRESTORE_ENDPOINT),
            }),
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let spoken_raw = var("SPOKEN_TEXT", "prefer_target");
        let spoken_text = SpokenText::parse(&spoken_raw).ok_or(ConfigError::Invalid {
            name: "SPOKEN_TEXT",
            value: spoken_raw.clone(),
        })?;

        let reuse_raw = var("REUSE_EXISTING", "false");
        let reuse_existing = parse_bool(&reuse_raw).ok_or(ConfigError::Invalid {
            name: "REUSE_EXISTING",
            value: reuse_raw.clone(),
        })?;

        let timeout_raw = var("HTTP_TIMEOUT_SECS", "30");
        let timeout_secs: u64 = timeout_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "HTTP_TIMEOUT_SECS",
            value: timeout_raw.clone(),
        })?;

        let cors_origins = var("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            public_base_url: var("PUBLIC_BASE_URL", "http://localhost:8080"),
            cors_origins,
            storage,
            tts_endpoint: var("TTS_ENDPOINT", DEFAULT_TTS_ENDPOINT),
            access_token: lookup("GOOGLE_ACCESS_TOKEN").filter(|v| !v.is_empty()),
            spoken_text,
            reuse_existing,
            http_timeout: Duration::from_secs(timeout_secs),
            public_dir: var("PUBLIC_DIR", "public").into(),
            well_known_dir: var("WELL_KNOWN_DIR", ".well-known").into(),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Invalid {
            name: "HOST",
            value: addr,
        })
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            public_base_url: self.public_base_url.clone(),
            spoken_text: self.spoken_text,
            reuse_existing: self.reuse_existing,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
