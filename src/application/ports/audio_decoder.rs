use crate::domain::{AudioFormat, DecodedAudio};

/// Turns an encoded upload into mono PCM at a uniform sample rate.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, data: &[u8], format: AudioFormat) -> Result<DecodedAudio, AudioDecoderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioDecoderError {
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
}
