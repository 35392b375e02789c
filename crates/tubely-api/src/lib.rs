//! Tubely API Library
//!
//! HTTP surface of the upload service: authentication, validation, the upload
//! pipeline, and application setup.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod validation;

pub use error::{ErrorResponse, HttpAppError};
pub use pipeline::{UploadFailure, UploadPipeline, UploadStage};
pub use state::AppState;
