use std::time::Duration;

use crate::domain::{PipelineRequest, TranscriptionResult};

use super::fallback_transcriber::{FallbackError, FallbackTranscriber};
use super::primary_transcriber::{PrimaryOutcome, PrimaryTranscriber};
use super::transcript_preview::preview_transcript;

/// Runs the hosted engine once and, when it yields nothing usable, the
/// chunked local fallback once. Primary and fallback text are never mixed.
pub struct TranscriptionOrchestrator {
    primary: PrimaryTranscriber,
    fallback: FallbackTranscriber,
    deadline: Option<Duration>,
}

impl TranscriptionOrchestrator {
    pub fn new(primary: PrimaryTranscriber, fallback: FallbackTranscriber) -> Self {
        Self {
            primary,
            fallback,
            deadline: None,
        }
    }

    /// Bounds the whole pipeline. On expiry the in-flight transcriber call
    /// is dropped.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[tracing::instrument(skip_all, fields(pipeline_id = %request.id, filename = %request.asset.filename))]
    pub async fn transcribe(
        &self,
        request: &PipelineRequest,
    ) -> Result<TranscriptionResult, PipelineFailure> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run(request))
                .await
                .map_err(|_| {
                    tracing::error!(deadline_ms = deadline.as_millis() as u64, "Pipeline deadline exceeded");
                    PipelineFailure::DeadlineExceeded(deadline)
                })?,
            None => self.run(request).await,
        }
    }

    async fn run(&self, request: &PipelineRequest) -> Result<TranscriptionResult, PipelineFailure> {
        tracing::info!(bytes = request.asset.size_bytes(), format = %request.asset.format, "Starting primary transcription");

        match self.primary.transcribe(&request.asset).await {
            PrimaryOutcome::Transcript(text) => {
                tracing::info!(
                    source = "primary",
                    transcript = %preview_transcript(&text),
                    "Transcription completed"
                );
                return Ok(TranscriptionResult::primary(text));
            }
            PrimaryOutcome::Empty => {
                tracing::info!(reason = "empty_transcript", "Primary engine returned no text, falling back");
            }
            PrimaryOutcome::Failed(e) => {
                tracing::warn!(reason = "engine_error", error = %e, "Primary engine failed, falling back");
            }
        }

        let result = self.fallback.transcribe(request).await.map_err(|e| {
            tracing::error!(error = %e, "Fallback transcription failed");
            PipelineFailure::Fallback(e)
        })?;

        tracing::info!(
            source = "fallback",
            chunks = result.partials.len(),
            transcript = %preview_transcript(&result.text),
            "Transcription completed"
        );

        Ok(result)
    }
}

/// Error surfaced to the HTTP boundary. Its message is returned to the
/// caller verbatim.
#[derive(Debug, thiserror::Error)]
pub enum PipelineFailure {
    #[error("{0}")]
    Fallback(#[from] FallbackError),
    #[error("transcription did not finish within {0:?}")]
    DeadlineExceeded(Duration),
}
