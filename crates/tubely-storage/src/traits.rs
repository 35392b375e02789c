//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use std::io;
use std::pin::Pin;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;
use tubely_core::AppError;

use crate::keys::StorageKey;
use crate::limit;
use crate::StorageBackend;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[source] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<io::Error> for StorageError {
    /// A read that tripped a [`crate::BoundedReader`] surfaces as an io error;
    /// recover the size limit from it instead of reporting a generic IO failure.
    fn from(err: io::Error) -> Self {
        match limit::exceeded_limit(&err) {
            Some(limit) => StorageError::PayloadTooLarge { limit },
            None => StorageError::IoError(err),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::PayloadTooLarge { limit } => AppError::PayloadTooLarge { limit },
            StorageError::IoError(e) => AppError::Io(e),
            StorageError::BackendError(msg) => AppError::StorageBackend(msg),
            StorageError::NotFound(key) => {
                AppError::Internal(format!("Stored object missing: {}", key))
            }
            StorageError::InvalidKey(msg) => {
                AppError::Internal(format!("Invalid storage key: {}", msg))
            }
            StorageError::ConfigError(msg) => {
                AppError::Internal(format!("Storage misconfigured: {}", msg))
            }
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte stream handed to [`Storage::put`]. Consumed until EOF.
pub type UploadReader<'a> = Pin<Box<dyn AsyncRead + Send + Unpin + 'a>>;

/// Outcome of a successful put.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Backend-relative key the bytes were written under
    pub key: String,
    /// Externally addressable URL for the object
    pub url: String,
    pub size_bytes: u64,
}

/// Storage abstraction trait
///
/// The upload pipeline only talks to this trait, so it is unaware of whether
/// bytes land on local disk or in a remote object store.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist the stream under `key` and return where it can be fetched from.
    ///
    /// Implementations stream the reader rather than collecting it in memory,
    /// except where the backend needs a seekable body. On error nothing is left
    /// behind under `key`.
    async fn put(
        &self,
        key: &StorageKey,
        content_type: &str,
        reader: UploadReader<'_>,
    ) -> StorageResult<StoredObject>;

    /// Delete a file by its storage key
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Public URL an object stored under `storage_key` is served from
    fn public_url(&self, storage_key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
