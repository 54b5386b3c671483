use std::fs;
use std::path::{Path, PathBuf};

use crate::application::ports::{ArtifactSink, ArtifactSinkError};
use crate::domain::{AudioChunk, RequestId};

pub const TRANSCRIPT_FILE_NAME: &str = "fallback_transcript.txt";

/// Writes fallback chunks as 16-bit WAV files and the joined transcript as
/// text, one directory per request.
pub struct WavArtifactSink {
    base_dir: PathBuf,
}

impl WavArtifactSink {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn request_dir(&self, request_id: &RequestId) -> PathBuf {
        self.base_dir.join(request_id.to_string())
    }

    pub fn chunk_path(&self, request_id: &RequestId, index: usize) -> PathBuf {
        self.request_dir(request_id)
            .join(format!("chunk_{:04}.wav", index))
    }

    fn ensure_dir(path: &Path) -> Result<(), ArtifactSinkError> {
        fs::create_dir_all(path)?;
        Ok(())
    }
}

impl ArtifactSink for WavArtifactSink {
    fn store_chunk(
        &self,
        request_id: &RequestId,
        chunk: &AudioChunk,
    ) -> Result<(), ArtifactSinkError> {
        Self::ensure_dir(&self.request_dir(request_id))?;

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: chunk.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let path = self.chunk_path(request_id, chunk.index);
        let mut writer = hound::WavWriter::create(&path, spec)
            .map_err(|e| ArtifactSinkError::Encoding(e.to_string()))?;
        for sample in &chunk.samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(value)
                .map_err(|e| ArtifactSinkError::Encoding(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| ArtifactSinkError::Encoding(e.to_string()))?;

        tracing::debug!(path = %path.display(), "Chunk artifact written");
        Ok(())
    }

    fn store_transcript(&self, request_id: &RequestId, text: &str) -> Result<(), ArtifactSinkError> {
        let dir = self.request_dir(request_id);
        Self::ensure_dir(&dir)?;
        fs::write(dir.join(TRANSCRIPT_FILE_NAME), text)?;
        Ok(())
    }
}
