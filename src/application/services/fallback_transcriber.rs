use std::sync::Arc;

use crate::application::ports::{
    ArtifactSink, AudioDecoderError, DecodeOptions, TranscriptionError,
};
use crate::domain::{PipelineRequest, TranscriptionResult};

use super::audio_segmenter::AudioSegmenter;
use super::shared_speech_model::SharedSpeechModel;

/// Chunked transcription through the local model.
pub struct FallbackTranscriber {
    segmenter: Arc<AudioSegmenter>,
    model: Arc<SharedSpeechModel>,
    options: DecodeOptions,
    artifacts: Option<Arc<dyn ArtifactSink>>,
}

impl FallbackTranscriber {
    pub fn new(
        segmenter: Arc<AudioSegmenter>,
        model: Arc<SharedSpeechModel>,
        options: DecodeOptions,
    ) -> Self {
        Self {
            segmenter,
            model,
            options,
            artifacts: None,
        }
    }

    pub fn with_artifacts(mut self, artifacts: Arc<dyn ArtifactSink>) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    /// Transcribes every chunk strictly in index order. Any chunk failure
    /// aborts the whole attempt; no partial transcript is returned.
    #[tracing::instrument(skip_all, fields(pipeline_id = %request.id))]
    pub async fn transcribe(
        &self,
        request: &PipelineRequest,
    ) -> Result<TranscriptionResult, FallbackError> {
        let segmenter = Arc::clone(&self.segmenter);
        let asset = request.asset.clone();
        let segments = tokio::task::spawn_blocking(move || segmenter.segment(&asset))
            .await
            .map_err(|e| FallbackError::Worker(e.to_string()))??;

        if segments.is_empty() {
            tracing::warn!(filename = %request.asset.filename, "No audio to transcribe");
            return Err(FallbackError::EmptyAudio);
        }

        let model = self
            .model
            .get()
            .await
            .map_err(FallbackError::ModelUnavailable)?;

        let total = segments.len();
        let mut partials = Vec::with_capacity(total);

        for chunk in &segments {
            tracing::debug!(
                chunk = chunk.index + 1,
                total,
                start_ms = chunk.start().as_millis() as u64,
                duration_ms = chunk.duration().as_millis() as u64,
                "Processing chunk"
            );

            if let Some(artifacts) = &self.artifacts {
                if let Err(e) = artifacts.store_chunk(&request.id, &chunk) {
                    tracing::warn!(error = %e, chunk = chunk.index, "Failed to write chunk artifact");
                }
            }

            let text = model
                .transcribe(&chunk, &self.options)
                .await
                .map_err(|source| FallbackError::ChunkTranscription {
                    index: chunk.index,
                    source,
                })?;

            tracing::debug!(chunk = chunk.index + 1, chars = text.len(), "Chunk transcribed");
            partials.push(text);
        }

        let result = TranscriptionResult::fallback(partials);

        if let Some(artifacts) = &self.artifacts {
            if let Err(e) = artifacts.store_transcript(&request.id, &result.text) {
                tracing::warn!(error = %e, "Failed to write transcript artifact");
            }
        }

        tracing::info!(
            chunks = total,
            chars = result.text.len(),
            "Fallback transcription completed"
        );

        Ok(result)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
    #[error(transparent)]
    Decode(#[from] AudioDecoderError),
    #[error("audio contains no samples to transcribe")]
    EmptyAudio,
    #[error("local model unavailable: {0}")]
    ModelUnavailable(#[source] TranscriptionError),
    #[error("chunk {index} failed: {source}")]
    ChunkTranscription {
        index: usize,
        #[source]
        source: TranscriptionError,
    },
    #[error("fallback worker failed: {0}")]
    Worker(String),
}
