use super::audio_asset::AudioAsset;
use super::request_id::RequestId;

/// One upload. Owns exactly one asset and is never mutated once built.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub id: RequestId,
    pub asset: AudioAsset,
}

impl PipelineRequest {
    pub fn new(id: RequestId, asset: AudioAsset) -> Self {
        Self { id, asset }
    }
}
