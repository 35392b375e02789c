//! Error types module
//!
//! Every request-level failure of the upload pipeline is a variant of
//! [`AppError`]. Variants are listed in the order the pipeline checks them, so
//! the first failing check decides which one a caller sees.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for caller errors worth noticing (forged sizes, probing)
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "RECORD_NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Malformed upload payload: {0}")]
    MalformedUploadPayload(String),

    #[error("Unsupported media type '{content_type}', allowed: {}", allowed.join(", "))]
    UnsupportedMediaType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Payload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },

    #[error("IO error: {0}")]
    Io(#[source] io::Error),

    #[error("Storage backend error: {0}")]
    StorageBackend(String),

    #[error("Metadata update failed: {0}")]
    MetadataUpdateFailed(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidIdentifier(format!("UUID parsing error: {}", err))
    }
}

/// Whole mebibytes render as "N MB"; anything else as an exact byte count.
fn display_limit(limit: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if limit >= MIB && limit % MIB == 0 {
        format!("{} MB", limit / MIB)
    } else {
        format!("{} bytes", limit)
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidIdentifier(_) => (
            400,
            "INVALID_ID",
            false,
            Some("Check the record ID in the request path"),
            false,
            LogLevel::Debug,
        ),
        AppError::MissingCredential(_) => (
            401,
            "MISSING_CREDENTIAL",
            false,
            Some("Send an Authorization: Bearer <token> header"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidCredential(_) => (
            401,
            "INVALID_CREDENTIAL",
            false,
            Some("Refresh the access token or re-authenticate"),
            false,
            LogLevel::Debug,
        ),
        AppError::RecordNotFound(_) => (
            404,
            "RECORD_NOT_FOUND",
            false,
            Some("Verify the record ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Forbidden(_) => (
            403,
            "FORBIDDEN",
            false,
            Some("Only the owner of a record can upload its assets"),
            false,
            LogLevel::Warn,
        ),
        AppError::MalformedUploadPayload(_) => (
            400,
            "MALFORMED_UPLOAD",
            false,
            Some("Send a multipart/form-data body with the expected file field"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedMediaType { .. } => (
            415,
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Upload a file with one of the allowed content types"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge { .. } => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size below the limit for this asset class"),
            false,
            LogLevel::Warn,
        ),
        AppError::Io(_) => (
            500,
            "IO_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::StorageBackend(_) => (
            502,
            "STORAGE_BACKEND_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::MetadataUpdateFailed(_) => (
            500,
            "METADATA_UPDATE_FAILED",
            true,
            Some("Retry the upload; the previous attempt was not recorded"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidIdentifier(_) => "InvalidIdentifier",
            AppError::MissingCredential(_) => "MissingCredential",
            AppError::InvalidCredential(_) => "InvalidCredential",
            AppError::RecordNotFound(_) => "RecordNotFound",
            AppError::Forbidden(_) => "Forbidden",
            AppError::MalformedUploadPayload(_) => "MalformedUploadPayload",
            AppError::UnsupportedMediaType { .. } => "UnsupportedMediaType",
            AppError::PayloadTooLarge { .. } => "PayloadTooLarge",
            AppError::Io(_) => "Io",
            AppError::StorageBackend(_) => "StorageBackend",
            AppError::MetadataUpdateFailed(_) => "MetadataUpdateFailed",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidIdentifier(_) => "Invalid ID".to_string(),
            AppError::MissingCredential(ref msg) => msg.clone(),
            AppError::InvalidCredential(ref msg) => msg.clone(),
            AppError::RecordNotFound(ref msg) => msg.clone(),
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::MalformedUploadPayload(ref msg) => msg.clone(),
            AppError::UnsupportedMediaType {
                content_type,
                allowed,
            } => format!(
                "Unsupported content type '{}'. Allowed: {}",
                content_type,
                allowed.join(", ")
            ),
            AppError::PayloadTooLarge { limit } => format!(
                "File size exceeds maximum allowed size of {}",
                display_limit(*limit)
            ),
            AppError::Io(_) => "Failed to write file".to_string(),
            AppError::StorageBackend(_) => "Failed to upload to storage".to_string(),
            AppError::MetadataUpdateFailed(_) => "Couldn't update record".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_invalid_identifier() {
        let err = AppError::from(uuid::Uuid::parse_str("not-a-uuid").unwrap_err());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_ID");
        assert_eq!(err.client_message(), "Invalid ID");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_credentials_share_status() {
        let missing = AppError::MissingCredential("Couldn't find JWT".to_string());
        let invalid = AppError::InvalidCredential("Couldn't validate JWT".to_string());
        assert_eq!(missing.http_status_code(), 401);
        assert_eq!(invalid.http_status_code(), 401);
        assert_ne!(missing.error_code(), invalid.error_code());
        assert!(!missing.is_recoverable());
    }

    #[test]
    fn test_error_metadata_forbidden() {
        let err = AppError::Forbidden("Not the owner".to_string());
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_unsupported_media_type() {
        let err = AppError::UnsupportedMediaType {
            content_type: "image/gif".to_string(),
            allowed: vec!["image/jpeg".to_string(), "image/png".to_string()],
        };
        assert_eq!(err.http_status_code(), 415);
        assert_eq!(
            err.client_message(),
            "Unsupported content type 'image/gif'. Allowed: image/jpeg, image/png"
        );
    }

    #[test]
    fn test_error_metadata_payload_too_large() {
        let err = AppError::PayloadTooLarge { limit: 10 << 20 };
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert_eq!(
            err.client_message(),
            "File size exceeds maximum allowed size of 10 MB"
        );
    }

    #[test]
    fn test_payload_too_large_message_for_sub_mebibyte_limits() {
        let err = AppError::PayloadTooLarge { limit: 1_000 };
        assert_eq!(
            err.client_message(),
            "File size exceeds maximum allowed size of 1000 bytes"
        );

        let err = AppError::PayloadTooLarge { limit: (1 << 20) + 1 };
        assert_eq!(
            err.client_message(),
            "File size exceeds maximum allowed size of 1048577 bytes"
        );

        let err = AppError::PayloadTooLarge { limit: 1 << 30 };
        assert_eq!(
            err.client_message(),
            "File size exceeds maximum allowed size of 1024 MB"
        );
    }

    #[test]
    fn test_error_metadata_persistence_failures_are_sensitive() {
        let io_err = AppError::from(io::Error::new(io::ErrorKind::Other, "disk full"));
        let backend = AppError::StorageBackend("503 Slow Down".to_string());
        let metadata = AppError::MetadataUpdateFailed("connection reset".to_string());

        assert_eq!(io_err.http_status_code(), 500);
        assert_eq!(backend.http_status_code(), 502);
        assert_eq!(metadata.http_status_code(), 500);
        for err in [&io_err, &backend, &metadata] {
            assert!(err.is_sensitive());
            assert!(err.is_recoverable());
            assert_eq!(err.log_level(), LogLevel::Error);
        }
        assert_eq!(io_err.client_message(), "Failed to write file");
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::Io(io::Error::new(io::ErrorKind::Other, "disk full"));
        let details = err.detailed_message();
        assert!(details.starts_with("IO error: disk full"));
        assert!(details.contains("Caused by: disk full"));
    }

    #[test]
    fn test_error_codes_are_unique() {
        let errors = [
            AppError::InvalidIdentifier(String::new()),
            AppError::MissingCredential(String::new()),
            AppError::InvalidCredential(String::new()),
            AppError::RecordNotFound(String::new()),
            AppError::Forbidden(String::new()),
            AppError::MalformedUploadPayload(String::new()),
            AppError::UnsupportedMediaType {
                content_type: String::new(),
                allowed: Vec::new(),
            },
            AppError::PayloadTooLarge { limit: 0 },
            AppError::Io(io::Error::new(io::ErrorKind::Other, "x")),
            AppError::StorageBackend(String::new()),
            AppError::MetadataUpdateFailed(String::new()),
            AppError::Internal(String::new()),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.error_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
