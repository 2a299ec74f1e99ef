use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{check_status, endpoint_url, TokenProvider};
use crate::backends::MetadataCatalog;
use crate::error::BackendError;
use crate::pipeline::{ContentKey, SynthesisRecord};

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Firestore v1 collection holding one document per content key.
pub struct FirestoreCatalog {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    collection: String,
    tokens: Arc<dyn TokenProvider>,
}

impl FirestoreCatalog {
    pub fn new(
        http: reqwest::Client,
        endpoint: &str,
        project_id: &str,
        collection: &str,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
            project_id: project_id.to_string(),
            collection: collection.to_string(),
            tokens,
        }
    }

    fn document_url(&self, key: &ContentKey) -> Result<Url, BackendError> {
        endpoint_url(
            &self.endpoint,
            &[
                "v1",
                "projects",
                &self.project_id,
                "databases",
                "(default)",
                "documents",
                &self.collection,
                key.as_str(),
            ],
        )
    }
}

#[async_trait]
impl MetadataCatalog for FirestoreCatalog {
    async fn put(&self, key: &ContentKey, record: &SynthesisRecord) -> Result<(), BackendError> {
        let token = self.tokens.get_token().await?;
        let fields = encode_fields(record)?;

        let response = self
            .http
            .patch(self.document_url(key)?)
            .bearer_auth(token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn get(&self, key: &ContentKey) -> Result<Option<SynthesisRecord>, BackendError> {
        let token = self.tokens.get_token().await?;
        let response = self
            .http
            .get(self.document_url(key)?)
            .bearer_auth(token)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: Document = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(format!("Invalid Firestore document: {e}")))?;

        decode_fields(document.fields).map(Some)
    }
}

/// Convert a record into Firestore typed fields.
fn encode_fields(record: &SynthesisRecord) -> Result<Map<String, Value>, BackendError> {
    let Value::Object(plain) =
        serde_json::to_value(record).map_err(|e| BackendError::Decode(e.to_string()))?
    else {
        return Err(BackendError::Decode("record is not an object".to_string()));
    };

    plain
        .into_iter()
        .map(|(name, value)| {
            let typed = match value {
                Value::String(s) => json!({ "stringValue": s }),
                Value::Null => json!({ "nullValue": null }),
                other => {
                    return Err(BackendError::Decode(format!(
                        "unsupported field type for {name}: {other}"
                    )))
                }
            };
            Ok((name, typed))
        })
        .collect()
}

/// Convert Firestore typed fields back into a record.
fn decode_fields(fields: Map<String, Value>) -> Result<SynthesisRecord, BackendError> {
    let plain: Map<String, Value> = fields
        .into_iter()
        .map(|(name, typed)| {
            let value = match typed.get("stringValue") {
                Some(s) => s.clone(),
                None => Value::Null,
            };
            (name, value)
        })
        .collect();

    serde_json::from_value(Value::Object(plain))
        .map_err(|e| BackendError::Decode(format!("Invalid record fields: {e}")))
}
