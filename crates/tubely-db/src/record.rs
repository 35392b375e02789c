use async_trait::async_trait;
use tubely_core::Record;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Record not found: {0}")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Access to the records the upload pipeline updates
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Fetch a record; `Ok(None)` when no record has this id
    async fn get_record(&self, id: Uuid) -> Result<Option<Record>, RepositoryError>;

    /// Write back title, description and asset locations; returns the stored record.
    ///
    /// A location that is `None` in `record` leaves the stored value untouched,
    /// so concurrent uploads of different asset classes cannot erase each other.
    /// Two writes to the same location are last-write-wins.
    async fn update_record(&self, record: &Record) -> Result<Record, RepositoryError>;

    /// Insert a new record
    async fn create_record(&self, record: &Record) -> Result<Record, RepositoryError>;
}
