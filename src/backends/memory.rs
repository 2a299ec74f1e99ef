//! In-process storage and catalog, used for local runs and tests.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{ArtifactStore, MetadataCatalog, ObjectAttributes, StoredObject};
use crate::error::BackendError;
use crate::pipeline::{ContentKey, SynthesisRecord};

/// Bucket name used by the server's local mode; objects are served under `/memory/`.
pub const LOCAL_BUCKET: &str = "memory";

#[derive(Default)]
struct Objects {
    data: HashMap<String, Vec<u8>>,
    public: HashSet<String>,
}

/// Object store kept in memory. URLs point below `base_url`.
pub struct MemoryArtifactStore {
    bucket: String,
    base_url: String,
    objects: RwLock<Objects>,
}

impl MemoryArtifactStore {
    pub fn new(bucket: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            base_url: base_url.into(),
            objects: RwLock::new(Objects::default()),
        }
    }

    pub fn object(&self, name: &str) -> Option<Vec<u8>> {
        self.objects.read().unwrap().data.get(name).cloned()
    }

    /// Object bytes, only once the object has been made public.
    pub fn public_object(&self, name: &str) -> Option<Vec<u8>> {
        let objects = self.objects.read().unwrap();
        if !objects.public.contains(name) {
            return None;
        }
        objects.data.get(name).cloned()
    }

    pub fn is_public(&self, name: &str) -> bool {
        self.objects.read().unwrap().public.contains(name)
    }

    pub fn len(&self) -> usize {
        self.objects.read().unwrap().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn public_url(&self, name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.bucket,
            name
        )
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn write_object(&self, name: &str, bytes: Vec<u8>) -> Result<StoredObject, BackendError> {
        self.objects
            .write()
            .unwrap()
            .data
            .insert(name.to_string(), bytes);

        Ok(StoredObject {
            reference: format!("memory://{}/{}", self.bucket, name),
            public_url: self.public_url(name),
        })
    }

    async fn set_public(&self, name: &str) -> Result<(), BackendError> {
        let mut objects = self.objects.write().unwrap();
        if !objects.data.contains_key(name) {
            return Err(BackendError::ObjectNotFound(name.to_string()));
        }
        objects.public.insert(name.to_string());
        Ok(())
    }

    async fn get_attributes(&self, name: &str) -> Result<ObjectAttributes, BackendError> {
        if !self.objects.read().unwrap().data.contains_key(name) {
            return Err(BackendError::ObjectNotFound(name.to_string()));
        }

        Ok(ObjectAttributes {
            public_url: self.public_url(name),
            bucket_name: self.bucket.clone(),
        })
    }

    async fn delete_object(&self, name: &str) -> Result<(), BackendError> {
        let mut objects = self.objects.write().unwrap();
        objects.public.remove(name);
        objects
            .data
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| BackendError::ObjectNotFound(name.to_string()))
    }
}

/// Record catalog kept in memory.
#[derive(Default)]
pub struct MemoryCatalog {
    records: RwLock<HashMap<ContentKey, SynthesisRecord>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MetadataCatalog for MemoryCatalog {
    async fn put(&self, key: &ContentKey, record: &SynthesisRecord) -> Result<(), BackendError> {
        self.records
            .write()
            .unwrap()
            .insert(key.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, key: &ContentKey) -> Result<Option<SynthesisRecord>, BackendError> {
        Ok(self.records.read().unwrap().get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::compute_key;

    #[tokio::test]
    async fn write_then_publish() {
        let store = MemoryArtifactStore::new("bucket", "http://localhost:8080/files/");
        let stored = store.write_object("a.mp3", vec![1, 2, 3]).await.unwrap();

        assert_eq!(stored.reference, "memory://bucket/a.mp3");
        assert_eq!(stored.public_url, "http://localhost:8080/files/bucket/a.mp3");
        assert!(!store.is_public("a.mp3"));
        assert_eq!(store.public_object("a.mp3"), None);

        store.set_public("a.mp3").await.unwrap();
        assert!(store.is_public("a.mp3"));
        assert_eq!(store.object("a.mp3"), Some(vec![1, 2, 3]));
        assert_eq!(store.public_object("a.mp3"), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn overwrite_keeps_single_object() {
        let store = MemoryArtifactStore::new("bucket", "http://cdn");
        store.write_object("a.mp3", vec![1]).await.unwrap();
        store.write_object("a.mp3", vec![2]).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.object("a.mp3"), Some(vec![2]));
    }

    #[tokio::test]
    async fn missing_object_errors() {
        let store = MemoryArtifactStore::new("bucket", "http://cdn");

        assert!(matches!(
            store.set_public("nope.mp3").await,
            Err(BackendError::ObjectNotFound(_))
        ));
        assert!(store.get_attributes("nope.mp3").await.is_err());
        assert!(store.delete_object("nope.mp3").await.is_err());
    }

    #[tokio::test]
    async fn attributes_report_bucket() {
        let store = MemoryArtifactStore::new("bucket", "http://cdn");
        store.write_object("a.mp3", vec![1]).await.unwrap();

        let attrs = store.get_attributes("a.mp3").await.unwrap();
        assert_eq!(attrs.bucket_name, "bucket");
        assert_eq!(attrs.public_url, "http://cdn/bucket/a.mp3");
    }

    #[tokio::test]
    async fn catalog_round_trip() {
        let catalog = MemoryCatalog::new();
        let key = compute_key("en-US-Neural2-A", "Hello");
        assert!(catalog.get(&key).await.unwrap().is_none());

        let record = SynthesisRecord {
            key: key.clone(),
            voice_name: "en-US-Neural2-A".into(),
            text_native: "Hello".into(),
            text_translated: None,
            file_name: key.file_name(),
            audio_ref: "memory://bucket/x.mp3".into(),
            url: "http://cdn/bucket/x.mp3".into(),
        };
        catalog.put(&key, &record).await.unwrap();

        assert_eq!(catalog.get(&key).await.unwrap(), Some(record));
    }
}
