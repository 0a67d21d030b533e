use async_trait::async_trait;
use dashmap::DashMap;

use super::{ObjectStorage, public_url};
use crate::error::AppResult;

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Keeps objects in process memory. Used for development and tests.
pub struct MemoryStorage {
    base_url: String,
    objects: DashMap<String, StoredObject>,
}

impl MemoryStorage {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            objects: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<String> {
        tracing::debug!(key, size = bytes.len(), "Storing object in memory");
        self.objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(public_url(&self.base_url, key))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.objects.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_overwrites_and_returns_url() {
        let storage = MemoryStorage::new("http://localhost:9000/moim");
        let url = storage
            .put("member/1/profile", vec![1, 2], "image/png")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:9000/moim/member/1/profile");

        storage
            .put("member/1/profile", vec![3], "image/jpeg")
            .await
            .unwrap();
        let stored = storage.get("member/1/profile").unwrap();
        assert_eq!(stored.bytes, vec![3]);
        assert_eq!(stored.content_type, "image/jpeg");
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let storage = MemoryStorage::new("http://x");
        assert!(storage.delete("nope").await.is_ok());
        assert!(storage.is_empty());
    }
}
