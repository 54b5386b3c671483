mod artifact_sink;
mod audio_decoder;
mod speech_model;
mod staging_store;
mod transcription_engine;

pub use artifact_sink::{ArtifactSink, ArtifactSinkError};
pub use audio_decoder::{AudioDecoder, AudioDecoderError};
pub use speech_model::{DecodeOptions, DecodeTask, SpeechModel, SpeechModelLoader};
pub use staging_store::{StagingStore, StagingStoreError};
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
