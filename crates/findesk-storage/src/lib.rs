//! Findesk Storage Library
//!
//! Storage abstraction and backend implementations (S3-compatible, local
//! filesystem) for workflow files and company document archives.
//!
//! # Storage key format
//!
//! - **Inbox (transient)**: `inbox/{timestamp}_{sanitized_filename}`
//! - **Archive (permanent)**: `archive/{company_id}/{folder_path}/{timestamp}_{sanitized_filename}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized
//! in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use findesk_core::StorageBackend;
pub use keys::{archive_key, inbox_key};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
