use std::sync::Arc;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::AudioAsset;

/// Outcome of the single hosted-engine call made per request.
#[derive(Debug)]
pub enum PrimaryOutcome {
    Transcript(String),
    Empty,
    Failed(PrimaryTranscriptionError),
}

#[derive(Debug, thiserror::Error)]
#[error("primary transcription failed: {0}")]
pub struct PrimaryTranscriptionError(#[from] pub TranscriptionError);

pub struct PrimaryTranscriber {
    engine: Arc<dyn TranscriptionEngine>,
    prompt: String,
}

impl PrimaryTranscriber {
    pub fn new(engine: Arc<dyn TranscriptionEngine>, prompt: impl Into<String>) -> Self {
        Self {
            engine,
            prompt: prompt.into(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub async fn transcribe(&self, asset: &AudioAsset) -> PrimaryOutcome {
        match self.engine.transcribe(asset, &self.prompt).await {
            Ok(text) if text.is_empty() => PrimaryOutcome::Empty,
            Ok(text) => PrimaryOutcome::Transcript(text),
            Err(e) => PrimaryOutcome::Failed(PrimaryTranscriptionError(e)),
        }
    }
}
