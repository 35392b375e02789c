use crate::keys::StorageKey;
use crate::traits::{Storage, StorageError, StorageResult, StoredObject, UploadReader};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::io::{self, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Size of the buffers the spool is read back into.
const SPOOL_CHUNK_BYTES: u64 = 8 * 1024 * 1024;

/// S3 storage implementation
///
/// Uploads are spooled to an anonymous temporary file first because the put
/// needs a complete, rewindable body. The spool has no name on disk, so it is
/// reclaimed on every exit path, including a crash mid-upload.
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    spool_dir: Option<PathBuf>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `spool_dir` - Directory for temporary spool files; OS temp dir when `None`
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        spool_dir: Option<PathBuf>,
    ) -> StorageResult<Self> {
        // Credentials come from the standard AWS_* environment variables.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::with_store(
            Arc::new(store),
            bucket,
            region,
            endpoint_url,
            spool_dir,
        ))
    }

    /// Build on top of an existing object store (any `object_store` backend).
    pub fn with_store(
        store: Arc<dyn ObjectStore>,
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        spool_dir: Option<PathBuf>,
    ) -> Self {
        S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
            spool_dir,
        }
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style: {endpoint}/{bucket}/{key}
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    fn open_spool(&self) -> io::Result<std::fs::File> {
        match &self.spool_dir {
            Some(dir) => tempfile::tempfile_in(dir),
            None => tempfile::tempfile(),
        }
    }
}

/// Read the whole spool back as a put body.
///
/// The body is held in memory, so one call allocates `size` bytes.
async fn read_spool(file: &mut tokio::fs::File, size: u64) -> io::Result<PutPayload> {
    let mut chunks = Vec::new();
    let mut remaining = size;
    while remaining > 0 {
        let len = remaining.min(SPOOL_CHUNK_BYTES) as usize;
        let mut chunk = vec![0u8; len];
        file.read_exact(&mut chunk).await?;
        chunks.push(Bytes::from(chunk));
        remaining -= len as u64;
    }
    Ok(chunks.into_iter().collect())
}

#[async_trait]
impl Storage for S3Storage {
    async fn put(
        &self,
        key: &StorageKey,
        content_type: &str,
        mut reader: UploadReader<'_>,
    ) -> StorageResult<StoredObject> {
        let key = key.as_filename();
        let location = Path::from(key.clone());
        let start = std::time::Instant::now();

        let mut spool = tokio::fs::File::from_std(self.open_spool()?);
        let size = tokio::io::copy(&mut reader, &mut spool).await?;
        spool.flush().await?;
        spool.seek(SeekFrom::Start(0)).await?;
        let payload = read_spool(&mut spool, size).await?;
        drop(spool);

        tracing::debug!(
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload spooled"
        );

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let result: ObjectResult<_> = self.store.put_opts(&location, payload, opts).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::BackendError(e.to_string())
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(StoredObject {
            key,
            url,
            size_bytes: size,
        })
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let location = Path::from(storage_key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {
                tracing::info!(
                    bucket = %self.bucket,
                    key = %storage_key,
                    "S3 delete successful"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    "S3 delete failed"
                );
                Err(StorageError::BackendError(e.to_string()))
            }
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let location = Path::from(storage_key.to_string());

        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn public_url(&self, storage_key: &str) -> String {
        self.generate_url(storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
