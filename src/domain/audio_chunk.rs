use std::ops::Range;
use std::time::Duration;

use super::decoded_audio::samples_to_duration;

/// A bounded time-slice of a decoded recording. `index` is 0-based and
/// defines the order in which chunk transcripts are joined.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    pub index: usize,
    pub start_sample: usize,
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl AudioChunk {
    pub fn new(index: usize, start_sample: usize, sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            index,
            start_sample,
            sample_rate,
            samples,
        }
    }

    pub fn sample_range(&self) -> Range<usize> {
        self.start_sample..self.start_sample + self.samples.len()
    }

    pub fn start(&self) -> Duration {
        samples_to_duration(self.start_sample, self.sample_rate)
    }

    pub fn duration(&self) -> Duration {
        samples_to_duration(self.samples.len(), self.sample_rate)
    }

    pub fn end(&self) -> Duration {
        samples_to_duration(self.sample_range().end, self.sample_rate)
    }
}
