//! Tubely Core Library
//!
//! Domain models, the request-level error taxonomy, and configuration shared by
//! every Tubely crate.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, UploadServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    extension_for, AssetClass, AssetPolicy, Record, THUMBNAIL_MAX_BYTES, VIDEO_MAX_BYTES,
};
pub use storage_types::StorageBackend;
