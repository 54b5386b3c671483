use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{AudioDecoder, AudioDecoderError};
use crate::domain::{AudioAsset, AudioChunk, DecodedAudio};

pub const DEFAULT_CHUNK_DURATION: Duration = Duration::from_secs(30);

/// Splits recordings into fixed-length chunks for the fallback path.
pub struct AudioSegmenter {
    decoder: Arc<dyn AudioDecoder>,
    chunk_duration: Duration,
}

impl AudioSegmenter {
    pub fn new(decoder: Arc<dyn AudioDecoder>, chunk_duration: Duration) -> Self {
        Self {
            decoder,
            chunk_duration,
        }
    }

    pub fn chunk_duration(&self) -> Duration {
        self.chunk_duration
    }

    /// Decodes the asset and returns its chunk plan. A zero-byte asset
    /// yields no chunks without touching the decoder.
    pub fn segment(&self, asset: &AudioAsset) -> Result<AudioSegments, AudioDecoderError> {
        if asset.is_empty() {
            return Ok(AudioSegments::new(DecodedAudio::empty(0), self.chunk_duration));
        }

        let audio = self.decoder.decode(&asset.data, asset.format)?;
        let segments = AudioSegments::new(audio, self.chunk_duration);

        tracing::debug!(
            filename = %asset.filename,
            duration_ms = segments.audio().duration().as_millis() as u64,
            chunks = segments.len(),
            "Audio segmented"
        );

        Ok(segments)
    }
}

/// Decoded audio plus a chunk length. Iterating is lazy and can be
/// repeated; each pass yields the same chunks in index order.
#[derive(Debug, Clone)]
pub struct AudioSegments {
    audio: DecodedAudio,
    chunk_samples: usize,
}

impl AudioSegments {
    pub fn new(audio: DecodedAudio, chunk_duration: Duration) -> Self {
        let chunk_samples =
            (chunk_duration.as_nanos() * audio.sample_rate as u128 / 1_000_000_000) as usize;
        Self {
            audio,
            chunk_samples: chunk_samples.max(1),
        }
    }

    pub fn audio(&self) -> &DecodedAudio {
        &self.audio
    }

    pub fn chunk_samples(&self) -> usize {
        self.chunk_samples
    }

    pub fn len(&self) -> usize {
        self.audio.samples.len().div_ceil(self.chunk_samples)
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_empty()
    }

    pub fn iter(&self) -> AudioChunkIter<'_> {
        AudioChunkIter {
            segments: self,
            next_index: 0,
        }
    }
}

impl<'a> IntoIterator for &'a AudioSegments {
    type Item = AudioChunk;
    type IntoIter = AudioChunkIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct AudioChunkIter<'a> {
    segments: &'a AudioSegments,
    next_index: usize,
}

impl Iterator for AudioChunkIter<'_> {
    type Item = AudioChunk;

    fn next(&mut self) -> Option<Self::Item> {
        let samples = &self.segments.audio.samples;
        let start = self.next_index.checked_mul(self.segments.chunk_samples)?;
        if start >= samples.len() {
            return None;
        }
        let end = (start + self.segments.chunk_samples).min(samples.len());

        let chunk = AudioChunk::new(
            self.next_index,
            start,
            self.segments.audio.sample_rate,
            samples[start..end].to_vec(),
        );
        self.next_index += 1;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.segments.len().saturating_sub(self.next_index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AudioChunkIter<'_> {}
