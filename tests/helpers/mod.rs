#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use switchscribe::application::ports::{
    AudioDecoder, AudioDecoderError, DecodeOptions, SpeechModel, SpeechModelLoader,
    TranscriptionEngine, TranscriptionError,
};
use switchscribe::application::services::{
    AudioSegmenter, DEFAULT_CHUNK_DURATION, FallbackTranscriber, PrimaryTranscriber,
    SharedSpeechModel, TranscriptionOrchestrator,
};
use switchscribe::domain::{AudioAsset, AudioChunk, AudioFormat, DecodedAudio};

pub const SAMPLE_RATE: u32 = 16_000;
pub const PRIMARY_PROMPT: &str = "code-switching between english and spanish";
pub const FALLBACK_PROMPT: &str = "english and spanish";

pub enum EngineReply {
    Text(&'static str),
    Failure,
}

/// Hosted engine stand-in that counts calls.
pub struct FakeEngine {
    reply: EngineReply,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeEngine {
    pub fn new(reply: EngineReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(reply: EngineReply, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay: Some(delay),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptionEngine for FakeEngine {
    async fn transcribe(
        &self,
        _audio: &AudioAsset,
        prompt: &str,
    ) -> Result<String, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.reply {
            EngineReply::Text(text) => Ok(text.to_string()),
            EngineReply::Failure => Err(TranscriptionError::ApiRequestFailed(
                "status 503: upstream unavailable".to_string(),
            )),
        }
    }
}

/// Local model stand-in. Each chunk transcribes to `[index:duration_ms]`
/// unless `fail_at` names its index.
pub struct FakeSpeechModel {
    fail_at: Option<usize>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<(usize, DecodeOptions)>>,
}

impl FakeSpeechModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fail_at: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_at(index: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_at: Some(index),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_indices(&self) -> Vec<usize> {
        self.seen.lock().unwrap().iter().map(|(i, _)| *i).collect()
    }
}

pub fn chunk_label(chunk: &AudioChunk) -> String {
    format!("[{}:{}ms]", chunk.index, chunk.duration().as_millis())
}

#[async_trait]
impl SpeechModel for FakeSpeechModel {
    async fn transcribe(
        &self,
        chunk: &AudioChunk,
        options: &DecodeOptions,
    ) -> Result<String, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((chunk.index, options.clone()));
        if self.fail_at == Some(chunk.index) {
            return Err(TranscriptionError::TranscriptionFailed(format!(
                "decoder exploded on chunk {}",
                chunk.index
            )));
        }
        Ok(chunk_label(chunk))
    }
}

/// Hands out a fixed model and counts how often it was asked to.
pub struct FakeLoader {
    model: Option<Arc<dyn SpeechModel>>,
    delay: Duration,
    pub loads: AtomicUsize,
}

impl FakeLoader {
    pub fn new(model: Arc<dyn SpeechModel>) -> Arc<Self> {
        Arc::new(Self {
            model: Some(model),
            delay: Duration::ZERO,
            loads: AtomicUsize::new(0),
        })
    }

    pub fn slow(model: Arc<dyn SpeechModel>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            model: Some(model),
            delay,
            loads: AtomicUsize::new(0),
        })
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            model: None,
            delay: Duration::ZERO,
            loads: AtomicUsize::new(0),
        })
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechModelLoader for FakeLoader {
    async fn load(&self) -> Result<Arc<dyn SpeechModel>, TranscriptionError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.model
            .clone()
            .ok_or_else(|| TranscriptionError::ModelLoadFailed("weights missing".to_string()))
    }
}

/// Decoder that ignores the bytes and yields `millis` of silence.
pub struct FakeDecoder {
    millis: u64,
}

impl FakeDecoder {
    pub fn with_duration_ms(millis: u64) -> Arc<Self> {
        Arc::new(Self { millis })
    }
}

impl AudioDecoder for FakeDecoder {
    fn decode(&self, _data: &[u8], _format: AudioFormat) -> Result<DecodedAudio, AudioDecoderError> {
        let samples = (self.millis * SAMPLE_RATE as u64 / 1000) as usize;
        Ok(DecodedAudio::new(vec![0.0; samples], SAMPLE_RATE))
    }
}

pub struct BrokenDecoder;

impl AudioDecoder for BrokenDecoder {
    fn decode(&self, _data: &[u8], _format: AudioFormat) -> Result<DecodedAudio, AudioDecoderError> {
        Err(AudioDecoderError::DecodingFailed("probe: malformed header".to_string()))
    }
}

pub fn build_wav(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let num_samples = samples.len() as u32;
    let byte_rate = sample_rate * 2;
    let data_size = num_samples * 2;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&file_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes()); // block align
    wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        wav.extend_from_slice(&s.to_le_bytes());
    }
    wav
}

pub fn silent_wav(seconds: u32) -> Vec<u8> {
    build_wav(SAMPLE_RATE, &vec![0i16; (SAMPLE_RATE * seconds) as usize])
}

pub fn asset(bytes: &[u8]) -> AudioAsset {
    AudioAsset::new("clip.wav", bytes.to_vec())
}

pub fn segmenter(decoder: Arc<dyn AudioDecoder>) -> Arc<AudioSegmenter> {
    Arc::new(AudioSegmenter::new(decoder, DEFAULT_CHUNK_DURATION))
}

pub fn fallback(
    decoder: Arc<dyn AudioDecoder>,
    loader: Arc<dyn SpeechModelLoader>,
) -> FallbackTranscriber {
    FallbackTranscriber::new(
        segmenter(decoder),
        Arc::new(SharedSpeechModel::new(loader)),
        DecodeOptions::transcribe(None, FALLBACK_PROMPT),
    )
}

pub fn orchestrator(
    engine: Arc<dyn TranscriptionEngine>,
    decoder: Arc<dyn AudioDecoder>,
    loader: Arc<dyn SpeechModelLoader>,
) -> TranscriptionOrchestrator {
    TranscriptionOrchestrator::new(
        PrimaryTranscriber::new(engine, PRIMARY_PROMPT),
        fallback(decoder, loader),
    )
}
