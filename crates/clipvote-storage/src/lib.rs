//! Object storage for contest videos.
//!
//! Two interchangeable backends sit behind the [`ObjectStore`] trait:
//! an S3-compatible store and a shared-filesystem mount fronted by HTTP.
//! Backend selection is a deploy-time decision (`STORAGE_BACKEND`).
//! Filesystem-only operations (`exists`, `move_object`, `file_path`) are
//! reached through [`StorageManager::fs`] rather than downcasting.

pub mod error;
pub mod fs;
pub mod s3;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

pub use error::{StorageError, StorageResult};
pub use fs::{FsConfig, FsStore};
pub use s3::{S3Config, S3Store};

/// Default expiry for presigned download URLs.
pub const DEFAULT_PRESIGN_EXPIRY: Duration = Duration::from_secs(15 * 60);

/// Capability set common to every storage backend.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under a key, overwriting any previous object.
    async fn put(&self, key: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Fetch the bytes stored under a key.
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Produce a time-limited download URL for a key.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Delete the object stored under a key.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Verify the backend is reachable.
    async fn check_connectivity(&self) -> StorageResult<()>;
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        S3Store::put(self, key, data).await
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        S3Store::get(self, key).await
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        S3Store::presign_get(self, key, expires_in).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        S3Store::delete(self, key).await
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        S3Store::check_connectivity(self).await
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn put(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        FsStore::put(self, key, data).await
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        FsStore::get(self, key).await
    }

    async fn presign_get(&self, key: &str, _expires_in: Duration) -> StorageResult<String> {
        FsStore::presign_get(self, key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        FsStore::delete(self, key).await
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        // The mount either exists or every operation fails loudly.
        if tokio::fs::metadata(self.base_path()).await.is_ok() {
            Ok(())
        } else {
            Err(StorageError::config_error("storage mount not accessible"))
        }
    }
}

/// Facade over the configured backend.
#[derive(Clone)]
pub struct StorageManager {
    provider: Arc<dyn ObjectStore>,
    fs: Option<Arc<FsStore>>,
    presign_expiry: Duration,
}

impl StorageManager {
    /// Wrap an S3 backend.
    pub fn s3(store: S3Store) -> Self {
        Self {
            provider: Arc::new(store),
            fs: None,
            presign_expiry: DEFAULT_PRESIGN_EXPIRY,
        }
    }

    /// Wrap a filesystem backend.
    pub fn filesystem(store: FsStore) -> Self {
        let store = Arc::new(store);
        Self {
            provider: store.clone(),
            fs: Some(store),
            presign_expiry: DEFAULT_PRESIGN_EXPIRY,
        }
    }

    /// Select the backend from `STORAGE_BACKEND` (`s3` default, or `fs`).
    pub async fn from_env() -> StorageResult<Self> {
        let backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "s3".to_string());
        match backend.as_str() {
            "fs" => Ok(Self::filesystem(FsStore::from_env().await?)),
            "s3" => Ok(Self::s3(S3Store::from_env()?)),
            other => Err(StorageError::config_error(format!(
                "unknown storage backend: {}",
                other
            ))),
        }
    }

    /// Override the presigned-URL expiry.
    pub fn with_presign_expiry(mut self, expiry: Duration) -> Self {
        self.presign_expiry = expiry;
        self
    }

    pub async fn put(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        self.provider.put(key, data).await
    }

    pub async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.provider.get(key).await
    }

    pub async fn presign_get(&self, key: &str) -> StorageResult<String> {
        self.provider.presign_get(key, self.presign_expiry).await
    }

    pub async fn delete(&self, key: &str) -> StorageResult<()> {
        self.provider.delete(key).await
    }

    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.provider.check_connectivity().await
    }

    /// Filesystem-specific operations, when that backend is configured.
    pub fn fs(&self) -> Option<&FsStore> {
        self.fs.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fs_capability_exposed_only_for_fs_backend() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(FsConfig {
            base_path: dir.path().to_path_buf(),
            base_url: String::new(),
        })
        .await
        .unwrap();

        let manager = StorageManager::filesystem(store);
        assert!(manager.fs().is_some());

        let s3 = S3Store::new(S3Config {
            endpoint_url: String::new(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            bucket_name: "bucket".to_string(),
            region: "us-east-1".to_string(),
        });
        let manager = StorageManager::s3(s3);
        assert!(manager.fs().is_none());
    }

    #[tokio::test]
    async fn test_manager_delegates_to_backend() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(FsConfig {
            base_path: dir.path().to_path_buf(),
            base_url: "http://files.local".to_string(),
        })
        .await
        .unwrap();

        let manager = StorageManager::filesystem(store);
        manager.put("original/3.mp4", b"abc".to_vec()).await.unwrap();
        assert_eq!(manager.get("original/3.mp4").await.unwrap(), b"abc");
        assert_eq!(
            manager.presign_get("original/3.mp4").await.unwrap(),
            "http://files.local/api/files/original/3.mp4"
        );
        manager.delete("original/3.mp4").await.unwrap();
        assert!(matches!(
            manager.get("original/3.mp4").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
