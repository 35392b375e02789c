use std::io;

use async_trait::async_trait;
use axum::body::Body;
use futures::TryStreamExt;
use http::header::CONTENT_LENGTH;
use tokio_util::io::StreamReader;
use tubely_core::AppError;
use tubely_storage::UploadReader;

/// The file part of an upload, not yet read.
pub struct UploadFile<'a> {
    pub declared_content_type: Option<String>,
    pub declared_size: Option<u64>,
    pub body: UploadReader<'a>,
}

/// Source of the single file an upload request carries.
///
/// Opening is deferred until the pipeline has authenticated the caller and
/// checked ownership, so rejected requests never have their body read.
#[async_trait]
pub trait UploadPayload: Send {
    async fn open_file<'a>(&'a mut self, field_name: &str) -> Result<UploadFile<'a>, AppError>;
}

/// Marker for a body that broke off mid-stream (client disconnect, bad framing).
#[derive(Debug, thiserror::Error)]
#[error("upload body could not be read: {0}")]
pub struct PayloadStreamError(pub String);

/// Returns true if `err` came from reading the client's upload body.
pub fn is_payload_stream_error(err: &io::Error) -> bool {
    err.get_ref()
        .map(|inner| inner.is::<PayloadStreamError>())
        .unwrap_or(false)
}

/// `multipart/form-data` request body, parsed lazily as a stream.
pub struct MultipartPayload {
    multipart: Result<multer::Multipart<'static>, String>,
}

impl MultipartPayload {
    /// Wrap a request body. A missing or invalid boundary is only reported
    /// when the file is opened.
    pub fn from_request(content_type: Option<&str>, body: Body) -> Self {
        let multipart = content_type
            .ok_or_else(|| "Missing Content-Type header".to_string())
            .and_then(|content_type| {
                multer::parse_boundary(content_type)
                    .map_err(|e| format!("Invalid multipart request: {}", e))
            })
            .map(|boundary| multer::Multipart::new(body.into_data_stream(), boundary));

        Self { multipart }
    }
}

#[async_trait]
impl UploadPayload for MultipartPayload {
    async fn open_file<'a>(&'a mut self, field_name: &str) -> Result<UploadFile<'a>, AppError> {
        let multipart = self
            .multipart
            .as_mut()
            .map_err(|e| AppError::MalformedUploadPayload(e.clone()))?;

        // Fields before the file (e.g. text inputs) are skipped unread.
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            AppError::MalformedUploadPayload(format!("Failed to read multipart: {}", e))
        })? {
            if field.name() != Some(field_name) {
                continue;
            }

            let declared_content_type = field.content_type().map(|m| m.to_string());
            let declared_size = field
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());

            let stream = field.map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    PayloadStreamError(e.to_string()),
                )
            });

            return Ok(UploadFile {
                declared_content_type,
                declared_size,
                body: Box::pin(StreamReader::new(Box::pin(stream))),
            });
        }

        Err(AppError::MalformedUploadPayload(format!(
            "Couldn't find '{}' file field",
            field_name
        )))
    }
}
