use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use tubely_core::Record;
use uuid::Uuid;

use crate::record::{RecordRepository, RepositoryError};

const RECORD_COLUMNS: &str =
    "id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    thumbnail_url: Option<String>,
    video_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RecordRow> for Record {
    fn from(row: RecordRow) -> Self {
        Record {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            thumbnail_url: row.thumbnail_url,
            video_url: row.video_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Postgres-backed record store
#[derive(Clone)]
pub struct PgRecordRepository {
    pool: PgPool,
}

impl PgRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordRepository for PgRecordRepository {
    #[tracing::instrument(skip(self), fields(db.table = "records", db.operation = "select", db.record_id = %id))]
    async fn get_record(&self, id: Uuid) -> Result<Option<Record>, RepositoryError> {
        let row = sqlx::query_as::<Postgres, RecordRow>(&format!(
            "SELECT {} FROM records WHERE id = $1",
            RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Record::from))
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "records", db.operation = "update", db.record_id = %record.id))]
    async fn update_record(&self, record: &Record) -> Result<Record, RepositoryError> {
        let row = sqlx::query_as::<Postgres, RecordRow>(&format!(
            r#"
            UPDATE records
            SET title = $2,
                description = $3,
                thumbnail_url = COALESCE($4, thumbnail_url),
                video_url = COALESCE($5, video_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.thumbnail_url)
        .bind(&record.video_url)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Record::from)
            .ok_or(RepositoryError::NotFound(record.id))
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "records", db.operation = "insert", db.record_id = %record.id))]
    async fn create_record(&self, record: &Record) -> Result<Record, RepositoryError> {
        let row = sqlx::query_as::<Postgres, RecordRow>(&format!(
            r#"
            INSERT INTO records
                (id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.thumbnail_url)
        .bind(&record.video_url)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
