pub mod audio_decoder;
mod azure_whisper_engine;
mod candle_whisper_engine;
mod openai_whisper_engine;
mod transcription_engine_factory;

pub use audio_decoder::{SymphoniaAudioDecoder, TARGET_SAMPLE_RATE};
pub use azure_whisper_engine::AzureWhisperEngine;
pub use candle_whisper_engine::{CandleWhisperEngine, CandleWhisperLoader, DEFAULT_LOCAL_MODEL};
pub use openai_whisper_engine::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiWhisperEngine};
pub use transcription_engine_factory::TranscriptionEngineFactory;
