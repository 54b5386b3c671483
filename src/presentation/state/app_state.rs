use std::sync::Arc;

use crate::application::ports::StagingStore;
use crate::application::services::TranscriptionOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<TranscriptionOrchestrator>,
    pub staging_store: Arc<dyn StagingStore>,
    pub max_upload_bytes: usize,
}
