use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{check_status, endpoint_url, TokenProvider};
use crate::backends::{content_type_for, ArtifactStore, ObjectAttributes, StoredObject};
use crate::error::BackendError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectResource {
    bucket: String,
    name: String,
    media_link: String,
}

/// Cloud Storage JSON API v1 bucket (also serves Firebase Storage buckets).
pub struct GcsArtifactStore {
    http: reqwest::Client,
    endpoint: String,
    bucket: String,
    tokens: Arc<dyn TokenProvider>,
}

impl GcsArtifactStore {
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            tokens,
        }
    }

    fn object_url(&self, name: &str) -> Result<Url, BackendError> {
        endpoint_url(
            &self.endpoint,
            &["storage", "v1", "b", &self.bucket, "o", name],
        )
    }

    fn reference(&self, name: &str) -> String {
        format!("gs://{}/{}", self.bucket, name)
    }
}

#[async_trait]
impl ArtifactStore for GcsArtifactStore {
    async fn write_object(&self, name: &str, bytes: Vec<u8>) -> Result<StoredObject, BackendError> {
        let token = self.tokens.get_token().await?;
        let size = bytes.len();

        let response = self
            .http
            .post(endpoint_url(
                &self.endpoint,
                &["upload", "storage", "v1", "b", &self.bucket, "o"],
            )?)
            .query(&[("uploadType", "media"), ("name", name)])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type_for(name))
            .body(bytes)
            .send()
            .await?;
        let object: ObjectResource = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(format!("Invalid object resource: {e}")))?;

        debug!("Uploaded {} bytes to gs://{}/{}", size, object.bucket, object.name);

        Ok(StoredObject {
            reference: self.reference(&object.name),
            public_url: object.media_link,
        })
    }

    async fn set_public(&self, name: &str) -> Result<(), BackendError> {
        let token = self.tokens.get_token().await?;
        let acl_url = endpoint_url(
            &self.endpoint,
            &["storage", "v1", "b", &self.bucket, "o", name, "acl"],
        )?;
        let response = self
            .http
            .post(acl_url)
            .bearer_auth(token)
            .json(&json!({ "entity": "allUsers", "role": "READER" }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn get_attributes(&self, name: &str) -> Result<ObjectAttributes, BackendError> {
        let token = self.tokens.get_token().await?;
        let response = self
            .http
            .get(self.object_url(name)?)
            .bearer_auth(token)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(BackendError::ObjectNotFound(self.reference(name)));
        }

        let object: ObjectResource = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(format!("Invalid object resource: {e}")))?;

        Ok(ObjectAttributes {
            public_url: object.media_link,
            bucket_name: object.bucket,
        })
    }

    async fn delete_object(&self, name: &str) -> Result<(), BackendError> {
        let token = self.tokens.get_token().await?;
        let response = self
            .http
            .delete(self.object_url(name)?)
            .bearer_auth(token)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(BackendError::ObjectNotFound(self.reference(name)));
        }
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::google::StaticTokenProvider;
    use wiremock::matchers::{body_bytes, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> GcsArtifactStore {
        GcsArtifactStore::new(
            reqwest::Client::new(),
            server.uri(),
            "voices.appspot.com",
            Arc::new(StaticTokenProvider::new("token")),
        )
    }

    fn object_json() -> serde_json::Value {
        json!({
            "bucket": "voices.appspot.com",
            "name": "abc.mp3",
            "mediaLink": "https://storage.googleapis.com/download/storage/v1/b/voices.appspot.com/o/abc.mp3?alt=media"
        })
    }

    #[tokio::test]
    async fn write_uploads_media() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/storage/v1/b/voices.appspot.com/o"))
            .and(query_param("uploadType", "media"))
            .and(query_param("name", "abc.mp3"))
            .and(header("content-type", "audio/mpeg"))
            .and(body_bytes(vec![1u8, 2, 3]))
            .respond_with(ResponseTemplate::new(200).set_body_json(object_json()))
            .expect(1)
            .mount(&server)
            .await;

        let stored = store(&server)
            .write_object("abc.mp3", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(stored.reference, "gs://voices.appspot.com/abc.mp3");
        assert!(stored.public_url.ends_with("/o/abc.mp3?alt=media"));
    }

    #[tokio::test]
    async fn set_public_grants_all_users_read() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/b/voices.appspot.com/o/abc.mp3/acl"))
            .and(body_json(json!({ "entity": "allUsers", "role": "READER" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        store(&server).set_public("abc.mp3").await.unwrap();
    }

    #[tokio::test]
    async fn attributes_read_media_link_and_bucket() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/voices.appspot.com/o/abc.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(object_json()))
            .mount(&server)
            .await;

        let attrs = store(&server).get_attributes("abc.mp3").await.unwrap();
        assert_eq!(attrs.bucket_name, "voices.appspot.com");
        assert!(attrs.public_url.starts_with("https://storage.googleapis.com/"));
    }

    #[tokio::test]
    async fn missing_object_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/storage/v1/b/voices.appspot.com/o/gone.mp3"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = store(&server).delete_object("gone.mp3").await.unwrap_err();
        assert!(matches!(err, BackendError::ObjectNotFound(_)));
    }

    #[tokio::test]
    async fn upload_failure_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/storage/v1/b/voices.appspot.com/o"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = store(&server)
            .write_object("abc.mp3", vec![1])
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn object_names_are_path_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/voices.appspot.com/o/clips%2Fa%20b.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(object_json()))
            .expect(1)
            .mount(&server)
            .await;

        store(&server).get_attributes("clips/a b.mp3").await.unwrap();
    }
}
