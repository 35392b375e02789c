//! Upload pipeline
//!
//! Drives one upload through authentication, record ownership, validation,
//! key assignment, persistence and the metadata update, in that order. The
//! record location is only written after the storage backend has accepted
//! every byte.

mod payload;
mod stage;

pub use payload::{
    is_payload_stream_error, MultipartPayload, PayloadStreamError, UploadFile, UploadPayload,
};
pub use stage::UploadStage;

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tubely_core::{extension_for, AppError, AssetClass, AssetPolicy, Record};
use tubely_db::RecordRepository;
use tubely_storage::{BoundedReader, KeyGenerator, Storage, StorageError};
use uuid::Uuid;

use crate::auth::{bearer_token, IdentityVerifier};
use crate::validation::UploadValidator;
use stage::StageTracker;

/// A failed upload and the last stage it reached.
#[derive(Debug, Error)]
#[error("upload failed at {stage}: {error}")]
pub struct UploadFailure {
    pub stage: UploadStage,
    #[source]
    pub error: AppError,
}

/// Where one asset class is validated against and written to.
#[derive(Clone)]
pub struct AssetTarget {
    pub policy: AssetPolicy,
    pub storage: Arc<dyn Storage>,
}

pub struct UploadPipeline {
    verifier: Arc<dyn IdentityVerifier>,
    records: Arc<dyn RecordRepository>,
    keys: KeyGenerator,
    thumbnails: AssetTarget,
    videos: AssetTarget,
}

impl UploadPipeline {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        records: Arc<dyn RecordRepository>,
        keys: KeyGenerator,
        thumbnails: AssetTarget,
        videos: AssetTarget,
    ) -> Self {
        Self {
            verifier,
            records,
            keys,
            thumbnails,
            videos,
        }
    }

    pub fn target(&self, class: AssetClass) -> &AssetTarget {
        match class {
            AssetClass::Thumbnail => &self.thumbnails,
            AssetClass::Video => &self.videos,
        }
    }

    /// Run one upload to completion.
    ///
    /// `payload` is opened only once the caller is known to own the record,
    /// so unauthorized requests never have their body read.
    #[tracing::instrument(skip_all, fields(asset_class = %class, record_id = %raw_record_id))]
    pub async fn upload(
        &self,
        class: AssetClass,
        raw_record_id: &str,
        authorization: Option<&str>,
        payload: &mut (dyn UploadPayload + '_),
    ) -> Result<Record, UploadFailure> {
        let started = Instant::now();
        let mut stages = StageTracker::new();

        macro_rules! fail {
            ($err:expr) => {
                return Err(UploadFailure {
                    stage: stages.current(),
                    error: $err,
                })
            };
        }

        let record_id = match Uuid::parse_str(raw_record_id) {
            Ok(id) => id,
            Err(_) => fail!(AppError::InvalidIdentifier(raw_record_id.to_string())),
        };

        let user_id = match bearer_token(authorization) {
            Ok(token) => match self.verifier.authenticate(token).await {
                Ok(user_id) => user_id,
                Err(e) => fail!(e),
            },
            Err(e) => fail!(e),
        };

        let mut record = match self.records.get_record(record_id).await {
            Ok(Some(record)) => record,
            Ok(None) => fail!(AppError::RecordNotFound(record_id.to_string())),
            Err(e) => fail!(AppError::Internal(format!("Couldn't load record: {}", e))),
        };
        stages.advance(UploadStage::RecordLoaded);

        if !record.is_owned_by(user_id) {
            tracing::warn!(%user_id, owner_id = %record.user_id, "Upload attempted by non-owner");
            fail!(AppError::Forbidden(
                "You are not the owner of this record".to_string()
            ));
        }
        stages.advance(UploadStage::OwnershipVerified);

        let target = self.target(class);
        let file = match payload.open_file(class.form_field()).await {
            Ok(file) => file,
            Err(e) => fail!(e),
        };
        let media_type = match UploadValidator::validate(
            file.declared_content_type.as_deref(),
            file.declared_size,
            &target.policy,
        ) {
            Ok(media_type) => media_type,
            Err(e) => fail!(e),
        };
        stages.advance(UploadStage::Validated);

        let key = self.keys.new_key(extension_for(&media_type));
        stages.advance(UploadStage::KeyAssigned);

        let body = BoundedReader::new(file.body, target.policy.max_bytes);
        let stored = match target
            .storage
            .put(&key, media_type.essence_str(), Box::pin(body))
            .await
        {
            Ok(stored) => stored,
            Err(e) => fail!(storage_failure(e)),
        };
        stages.advance(UploadStage::Persisted);

        record.set_location(class, stored.url.clone());
        let updated = match self.records.update_record(&record).await {
            Ok(updated) => updated,
            Err(e) => {
                // The stored object is left in place without a referencing record.
                tracing::warn!(
                    key = %stored.key,
                    url = %stored.url,
                    error = %e,
                    "Record update failed after persisting upload; object orphaned"
                );
                fail!(AppError::MetadataUpdateFailed(e.to_string()))
            }
        };
        stages.advance(UploadStage::MetadataUpdated);
        stages.advance(UploadStage::Complete);

        tracing::info!(
            %user_id,
            key = %stored.key,
            size_bytes = stored.size_bytes,
            duration_ms = started.elapsed().as_millis() as u64,
            "Upload complete"
        );

        Ok(updated)
    }
}

/// A broken client body is the caller's fault, not a storage failure.
fn storage_failure(err: StorageError) -> AppError {
    match err {
        StorageError::IoError(e) if is_payload_stream_error(&e) => {
            AppError::MalformedUploadPayload(e.to_string())
        }
        other => AppError::from(other),
    }
}
