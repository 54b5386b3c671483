use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::AudioChunk;

use super::transcription_engine::TranscriptionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeTask {
    Transcribe,
    Translate,
}

/// Per-call decoding options for the local model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// `None` lets the model detect the spoken language.
    pub language: Option<String>,
    pub task: DecodeTask,
    pub initial_prompt: String,
}

impl DecodeOptions {
    pub fn transcribe(language: Option<String>, initial_prompt: impl Into<String>) -> Self {
        Self {
            language,
            task: DecodeTask::Transcribe,
            initial_prompt: initial_prompt.into(),
        }
    }
}

/// Speech-to-text model executed in-process.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    async fn transcribe(
        &self,
        chunk: &AudioChunk,
        options: &DecodeOptions,
    ) -> Result<String, TranscriptionError>;
}

/// Builds a [`SpeechModel`]. Loading is expensive and is expected to happen
/// at most once per process.
#[async_trait]
pub trait SpeechModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn SpeechModel>, TranscriptionError>;
}
