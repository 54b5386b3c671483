mod audio_asset;
mod audio_chunk;
mod audio_format;
mod decoded_audio;
mod pipeline_request;
mod request_id;
mod storage_path;
mod transcription_result;

pub use audio_asset::AudioAsset;
pub use audio_chunk::AudioChunk;
pub use audio_format::AudioFormat;
pub use decoded_audio::DecodedAudio;
pub use pipeline_request::PipelineRequest;
pub use request_id::RequestId;
pub use storage_path::StoragePath;
pub use transcription_result::{TranscriptSource, TranscriptionResult};
