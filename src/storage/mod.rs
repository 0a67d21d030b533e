//! Object storage for uploaded images.
//!
//! Objects are addressed by a slash separated key and exposed under
//! `{public_base_url}/{key}`.

mod memory;
mod s3;

use std::sync::Arc;

use async_trait::async_trait;

pub use memory::MemoryStorage;
pub use s3::S3Storage;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::AppResult;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` under `key`, replacing any previous object, and returns its public URL.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<String>;

    /// Removes the object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// Joins the public base URL and an object key with exactly one slash.
pub fn public_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

/// Key of a member's profile image.
pub fn member_profile_key(member_id: i64) -> String {
    format!("member/{member_id}/profile")
}

/// Key of a club's representative image.
pub fn club_profile_key(club_id: i64) -> String {
    format!("club/{club_id}/profile")
}

/// Builds the configured storage backend.
///
/// # Errors
///
/// `AppError::Storage` when the S3 bucket cannot be reached or created.
pub async fn build_storage(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStorage>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new(&config.public_base_url))),
        StorageBackend::S3 => Ok(Arc::new(S3Storage::connect(config).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_normalizes_slashes() {
        assert_eq!(
            public_url("http://cdn.local/moim/", "/club/1/profile"),
            "http://cdn.local/moim/club/1/profile"
        );
        assert_eq!(public_url("http://cdn", "a"), "http://cdn/a");
    }

    #[test]
    fn test_keys() {
        assert_eq!(member_profile_key(3), "member/3/profile");
        assert_eq!(club_profile_key(9), "club/9/profile");
    }
}
