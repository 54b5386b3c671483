mod audio_segmenter;
mod fallback_transcriber;
mod primary_transcriber;
mod shared_speech_model;
mod transcript_preview;
mod transcription_orchestrator;

pub use audio_segmenter::{AudioChunkIter, AudioSegmenter, AudioSegments, DEFAULT_CHUNK_DURATION};
pub use fallback_transcriber::{FallbackError, FallbackTranscriber};
pub use primary_transcriber::{PrimaryOutcome, PrimaryTranscriber, PrimaryTranscriptionError};
pub use shared_speech_model::SharedSpeechModel;
pub use transcript_preview::preview_transcript;
pub use transcription_orchestrator::{PipelineFailure, TranscriptionOrchestrator};
