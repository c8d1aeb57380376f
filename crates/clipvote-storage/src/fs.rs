//! Shared-filesystem object store backend.
//!
//! Objects live under a mounted base directory, keyed by their relative
//! path (`original/7.mp4`). Downloads are served by an HTTP frontend at
//! `{base_url}/api/files/{key}`.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Configuration for the filesystem backend.
#[derive(Debug, Clone)]
pub struct FsConfig {
    /// Mount path, e.g. `/mnt/shared-files`
    pub base_path: PathBuf,
    /// Base URL of the HTTP frontend serving the files
    pub base_url: String,
}

impl FsConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            base_path: std::env::var("FS_BASE_PATH")
                .map_err(|_| StorageError::config_error("FS_BASE_PATH not set"))?
                .into(),
            base_url: std::env::var("FS_BASE_URL").unwrap_or_default(),
        })
    }
}

/// Object store backed by a shared filesystem mount.
#[derive(Debug, Clone)]
pub struct FsStore {
    base_path: PathBuf,
    base_url: String,
}

impl FsStore {
    /// Create a new store, ensuring the base directory exists.
    pub async fn new(config: FsConfig) -> StorageResult<Self> {
        fs::create_dir_all(&config.base_path).await?;
        Ok(Self {
            base_path: config.base_path,
            base_url: config.base_url,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        Self::new(FsConfig::from_env()?).await
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }

    /// Write bytes, overwriting any existing file (last writer wins).
    pub async fn put(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        debug!("Writing {} bytes to {}", data.len(), path.display());
        fs::write(&path, data).await?;
        Ok(())
    }

    /// Read a file as bytes.
    pub async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(key))
            }
            Err(e) => Err(StorageError::DownloadFailed(e.to_string())),
        }
    }

    /// Return a download URL served by the HTTP frontend.
    ///
    /// Unlike the S3 backend, existence is verified; a missing key fails
    /// with `NotFound`.
    pub async fn presign_get(&self, key: &str) -> StorageResult<String> {
        if self.base_url.is_empty() {
            return Err(StorageError::PresignFailed(
                "FS_BASE_URL not configured for URL generation".to_string(),
            ));
        }
        if !self.exists(key).await {
            return Err(StorageError::not_found(key));
        }
        Ok(format!("{}/api/files/{}", self.base_url, key))
    }

    /// Delete a file.
    pub async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(key))
            }
            Err(e) => Err(StorageError::delete_failed(e.to_string())),
        }
    }

    /// Check whether a key exists.
    pub async fn exists(&self, key: &str) -> bool {
        fs::metadata(self.path_for(key)).await.is_ok()
    }

    /// Full path of a key under an optional subdirectory.
    pub fn file_path(&self, key: &str, subdir: &str) -> PathBuf {
        if subdir.is_empty() {
            self.path_for(key)
        } else {
            self.base_path.join(subdir).join(key)
        }
    }

    /// Move a stored object to `{subdir}/{dst_key}` within the mount.
    pub async fn move_object(
        &self,
        src_key: &str,
        dst_key: &str,
        subdir: &str,
    ) -> StorageResult<()> {
        let src = self.path_for(src_key);
        if fs::metadata(&src).await.is_err() {
            return Err(StorageError::not_found(src_key));
        }

        let dst = self.file_path(dst_key, subdir);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::rename(&src, &dst).await?;
        debug!("Moved {} -> {}", src.display(), dst.display());
        Ok(())
    }

    /// Base directory of the mount.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store(dir: &TempDir) -> FsStore {
        FsStore::new(FsConfig {
            base_path: dir.path().to_path_buf(),
            base_url: "http://files.local".to_string(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;

        store.put("original/1.mp4", b"bytes".to_vec()).await.unwrap();
        assert_eq!(store.get("original/1.mp4").await.unwrap(), b"bytes");
        assert!(store.exists("original/1.mp4").await);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;

        store.put("original/1.mp4", b"old".to_vec()).await.unwrap();
        store.put("original/1.mp4", b"new".to_vec()).await.unwrap();
        assert_eq!(store.get("original/1.mp4").await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;

        assert!(matches!(
            store.get("original/404.mp4").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_presign_verifies_existence() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;

        assert!(matches!(
            store.presign_get("processed/9.mp4").await,
            Err(StorageError::NotFound(_))
        ));

        store.put("processed/9.mp4", b"x".to_vec()).await.unwrap();
        let url = store.presign_get("processed/9.mp4").await.unwrap();
        assert_eq!(url, "http://files.local/api/files/processed/9.mp4");
    }

    #[tokio::test]
    async fn test_move_object() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;

        store.put("temp/5.mp4", b"x".to_vec()).await.unwrap();
        store.move_object("temp/5.mp4", "5.mp4", "processed").await.unwrap();

        assert!(!store.exists("temp/5.mp4").await);
        assert!(store.exists("processed/5.mp4").await);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;

        assert!(matches!(
            store.delete("original/404.mp4").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
