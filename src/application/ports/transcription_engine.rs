use async_trait::async_trait;

use crate::domain::AudioAsset;

/// Hosted speech-to-text engine reached over the network.
///
/// Implementations return the engine's text verbatim. A missing or null
/// text field is reported as an empty string, never as an error.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(&self, audio: &AudioAsset, prompt: &str)
    -> Result<String, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("api rejected credentials: {0}")]
    Unauthorized(String),
    #[error("malformed api response: {0}")]
    MalformedResponse(String),
}
