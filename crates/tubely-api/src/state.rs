//! Application state shared by all handlers.

use std::sync::Arc;

use tubely_core::Config;

use crate::pipeline::UploadPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<UploadPipeline>,
}
