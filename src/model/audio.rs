use crate::error::{Error, Result};

/// Bit depth reported for audio that came out of a compressed decoder
pub const COMPRESSED_BIT_DEPTH: u16 = 32;

/// Decoded audio: one normalized `f32` buffer per channel
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Per-channel samples in [-1, 1], all of equal length
    pub channel_data: Vec<Vec<f32>>,

    /// Number of channels (always `channel_data.len()`)
    pub num_channels: usize,

    /// Duration in seconds
    pub duration: f64,

    /// Bit depth of the source. Informational once samples are floats.
    pub bit_depth: u16,
}

impl AudioData {
    /// Build audio data from per-channel buffers, checking that every channel
    /// has the same length. Duration is derived from the sample count.
    pub fn new(sample_rate: u32, channel_data: Vec<Vec<f32>>, bit_depth: u16) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::malformed("sample rate must be positive"));
        }
        if channel_data.is_empty() {
            return Err(Error::malformed("audio must have at least one channel"));
        }
        check_channel_lengths(&channel_data)?;

        let samples = channel_data[0].len();
        Ok(Self {
            sample_rate,
            num_channels: channel_data.len(),
            duration: samples as f64 / sample_rate as f64,
            channel_data,
            bit_depth,
        })
    }

    /// Number of samples per channel
    pub fn sample_count(&self) -> usize {
        self.channel_data.first().map(Vec::len).unwrap_or(0)
    }

    /// First channel, the one analysis runs on
    pub fn primary_channel(&self) -> &[f32] {
        self.channel_data.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Fail with `ChannelLengthMismatch` on the first channel whose length differs
/// from channel 0.
pub fn check_channel_lengths<S: AsRef<[f32]>>(channels: &[S]) -> Result<()> {
    let expected = channels.first().map(|c| c.as_ref().len()).unwrap_or(0);
    for (channel, data) in channels.iter().enumerate().skip(1) {
        let actual = data.as_ref().len();
        if actual != expected {
            return Err(Error::ChannelLengthMismatch {
                channel,
                expected,
                actual,
            });
        }
    }
    Ok(())
}
