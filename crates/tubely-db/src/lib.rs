//! Record store for Tubely
//!
//! The upload pipeline only reads a record and writes it back; both operations
//! sit behind [`RecordRepository`] so the pipeline runs against Postgres in
//! production and an in-memory map in development and tests.

pub mod memory;
pub mod postgres;
pub mod record;

pub use memory::InMemoryRecordRepository;
pub use postgres::PgRecordRepository;
pub use record::{RecordRepository, RepositoryError};
