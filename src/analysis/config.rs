//! Analysis configuration

use super::traits::KeyTuning;

/// Default window length: 30 seconds at 44.1kHz
pub const DEFAULT_CHUNK_SIZE_SAMPLES: usize = 1_323_000;

/// Configuration for a chunked analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Samples per analysis window; the last window may be shorter
    pub chunk_size_samples: usize,

    /// Parameters passed through to the key estimator
    pub key_tuning: KeyTuning,
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self {
            chunk_size_samples: DEFAULT_CHUNK_SIZE_SAMPLES,
            key_tuning: KeyTuning::default(),
        }
    }

    /// Set the window length in samples
    pub fn with_chunk_size(mut self, samples: usize) -> Self {
        self.chunk_size_samples = samples;
        self
    }

    pub fn with_key_tuning(mut self, tuning: KeyTuning) -> Self {
        self.key_tuning = tuning;
        self
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new()
    }
}
