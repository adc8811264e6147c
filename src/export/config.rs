//! Export configuration

use crate::model::AudioFormat;

/// Default encoder quality for lossy formats
pub const DEFAULT_QUALITY: u8 = 80;

/// Options for writing decoded audio back to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Output format (None = infer from the output path extension)
    pub format: Option<AudioFormat>,

    /// Bits per sample (None = keep the source bit depth)
    pub bit_depth: Option<u16>,

    /// Channels to write (None = all channels)
    pub channels: Option<usize>,

    /// Encoder quality 0-100. Lossless formats ignore it.
    pub quality: u8,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self {
            format: None,
            bit_depth: None,
            channels: None,
            quality: DEFAULT_QUALITY,
        }
    }

    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_bit_depth(mut self, bit_depth: u16) -> Self {
        self.bit_depth = Some(bit_depth);
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = Some(channels);
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.min(100);
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new()
    }
}
