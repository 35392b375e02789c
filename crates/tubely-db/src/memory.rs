use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tubely_core::Record;
use uuid::Uuid;

use crate::record::{RecordRepository, RepositoryError};

/// Record store kept in process memory. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryRecordRepository {
    records: RwLock<HashMap<Uuid, Record>>,
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    async fn get_record(&self, id: Uuid) -> Result<Option<Record>, RepositoryError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn update_record(&self, record: &Record) -> Result<Record, RepositoryError> {
        let mut records = self.records.write().await;
        let stored = records
            .get_mut(&record.id)
            .ok_or(RepositoryError::NotFound(record.id))?;

        stored.title = record.title.clone();
        stored.description = record.description.clone();
        if record.thumbnail_url.is_some() {
            stored.thumbnail_url = record.thumbnail_url.clone();
        }
        if record.video_url.is_some() {
            stored.video_url = record.video_url.clone();
        }
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn create_record(&self, record: &Record) -> Result<Record, RepositoryError> {
        self.records.write().await.insert(record.id, record.clone());
        tracing::debug!(record_id = %record.id, "Record created in memory");
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubely_core::AssetClass;

    #[tokio::test]
    async fn test_get_missing_record() {
        let repo = InMemoryRecordRepository::new();
        assert!(repo.get_record(Uuid::new_v4()).await.unwrap().is_none());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_sets_location_and_bumps_updated_at() {
        let repo = InMemoryRecordRepository::new();
        let record = repo
            .create_record(&Record::new(Uuid::new_v4(), "Boots", ""))
            .await
            .unwrap();

        let mut changed = record.clone();
        changed.set_location(AssetClass::Thumbnail, "http://localhost:8091/assets/a.png".into());
        let updated = repo.update_record(&changed).await.unwrap();

        assert_eq!(
            updated.thumbnail_url.as_deref(),
            Some("http://localhost:8091/assets/a.png")
        );
        assert!(updated.updated_at >= record.updated_at);
        assert_eq!(repo.get_record(record.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_stale_copy_does_not_clear_other_location() {
        let repo = InMemoryRecordRepository::new();
        let record = repo
            .create_record(&Record::new(Uuid::new_v4(), "Boots", ""))
            .await
            .unwrap();

        // Two uploads load the record before either writes back.
        let mut thumbnail_copy = record.clone();
        let mut video_copy = record.clone();
        thumbnail_copy.set_location(AssetClass::Thumbnail, "thumb-url".into());
        video_copy.set_location(AssetClass::Video, "video-url".into());

        repo.update_record(&thumbnail_copy).await.unwrap();
        let last = repo.update_record(&video_copy).await.unwrap();

        assert_eq!(last.thumbnail_url.as_deref(), Some("thumb-url"));
        assert_eq!(last.video_url.as_deref(), Some("video-url"));
    }

    #[tokio::test]
    async fn test_update_unknown_record_fails() {
        let repo = InMemoryRecordRepository::new();
        let record = Record::new(Uuid::new_v4(), "Ghost", "");
        let err = repo.update_record(&record).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(id) if id == record.id));
    }
}
