//! Tubely Storage Library
//!
//! Storage abstraction for uploaded assets and its two implementations: the
//! local filesystem and S3 (or any `object_store` backend).
//!
//! # Storage key format
//!
//! Keys are flat, opaque file names: 32 random bytes encoded as unpadded
//! URL-safe base64, followed by `.` and an extension taken from the content
//! type (`<token>.jpeg`, `<token>.mp4`). Keys never contain `/` or `..`.

pub mod factory;
pub mod keys;
pub mod limit;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{EntropySource, KeyGenerator, StorageKey};
pub use limit::BoundedReader;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject, UploadReader};
pub use tubely_core::StorageBackend;
