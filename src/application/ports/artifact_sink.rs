use crate::domain::{AudioChunk, RequestId};

/// Optional debugging output for the fallback path.
pub trait ArtifactSink: Send + Sync {
    fn store_chunk(&self, request_id: &RequestId, chunk: &AudioChunk)
    -> Result<(), ArtifactSinkError>;

    fn store_transcript(&self, request_id: &RequestId, text: &str)
    -> Result<(), ArtifactSinkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactSinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("wav encoding failed: {0}")]
    Encoding(String),
}
