//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use findesk_core::StorageBackend;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3-compatible, local filesystem) must implement this
/// trait. Operations are key-addressed and treated as atomic: they either
/// fully succeed or fail with a [`StorageError`]. The completion engine
/// relies on that to order its steps (never delete the inbox copy before the
/// archive copy succeeded).
///
/// **Key format:** see the crate root documentation (`inbox/...` for
/// transient files, `archive/{company_id}/...` for permanent copies).
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload data under the given storage key and return the public URL.
    async fn upload(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String>;

    /// Download a file by its storage key.
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file by its storage key. Deleting a missing key is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the size in bytes of an object, if it exists.
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;

    /// Copy a file from one key to another and return the destination URL.
    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<String>;

    /// Get the storage backend type.
    fn backend_type(&self) -> StorageBackend;
}
