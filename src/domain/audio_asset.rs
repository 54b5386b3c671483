use bytes::Bytes;

use super::audio_format::AudioFormat;
use super::storage_path::StoragePath;

/// Raw uploaded recording, owned by a single request for the lifetime of
/// its pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAsset {
    pub filename: String,
    pub format: AudioFormat,
    pub data: Bytes,
    pub location: Option<StoragePath>,
}

impl AudioAsset {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let filename = filename.into();
        Self {
            format: AudioFormat::from_filename(&filename),
            filename,
            data: data.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: StoragePath) -> Self {
        self.location = Some(location);
        self
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
