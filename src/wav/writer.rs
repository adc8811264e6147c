//! RIFF/WAVE writer
//!
//! Emits a canonical 44-byte header (`RIFF`, `fmt ` with format tag 1, `data`)
//! followed by interleaved PCM. No extension chunks are written.

use super::codec::{write_sample, BitDepth};
use super::reader::WAVE_FORMAT_PCM;
use crate::error::{Error, Result};
use crate::model::check_channel_lengths;

/// Size of the canonical PCM WAV header
pub const WAV_HEADER_SIZE: usize = 44;

/// Parameters for [`encode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub sample_rate: u32,
    /// Bits per sample (default 16)
    pub bit_depth: u16,
    /// Channels to write; `None` writes every channel supplied
    pub channels: Option<usize>,
}

impl EncodeOptions {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            bit_depth: 16,
            channels: None,
        }
    }

    pub fn with_bit_depth(mut self, bit_depth: u16) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = Some(channels);
        self
    }
}

/// Encode per-channel buffers as a PCM WAV file
pub fn encode<S: AsRef<[f32]>>(channel_data: &[S], options: &EncodeOptions) -> Result<Vec<u8>> {
    let depth = BitDepth::try_from(options.bit_depth)?;
    let available = channel_data.len();
    let channels = options.channels.unwrap_or(available);
    if channels == 0 || channels > available {
        return Err(Error::ChannelCount {
            requested: channels,
            available,
        });
    }
    let channel_data = &channel_data[..channels];
    check_channel_lengths(channel_data)?;

    let samples = channel_data[0].as_ref().len();
    let bytes_per_sample = depth.bytes_per_sample();
    let block_align = channels * bytes_per_sample;
    let data_size = samples * block_align;

    let (Ok(riff_size), Ok(block_align_u16), Ok(channels_u16)) = (
        u32::try_from(data_size + WAV_HEADER_SIZE - 8),
        u16::try_from(block_align),
        u16::try_from(channels),
    ) else {
        return Err(Error::malformed(format!(
            "{} channels x {} samples does not fit in a RIFF container",
            channels, samples
        )));
    };
    let data_size_u32 = riff_size - 36;
    let byte_rate = options.sample_rate.saturating_mul(block_align as u32);

    let mut buffer = Vec::with_capacity(WAV_HEADER_SIZE + data_size);
    buffer.extend_from_slice(b"RIFF");
    buffer.extend_from_slice(&riff_size.to_le_bytes());
    buffer.extend_from_slice(b"WAVE");

    buffer.extend_from_slice(b"fmt ");
    buffer.extend_from_slice(&16u32.to_le_bytes());
    buffer.extend_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
    buffer.extend_from_slice(&channels_u16.to_le_bytes());
    buffer.extend_from_slice(&options.sample_rate.to_le_bytes());
    buffer.extend_from_slice(&byte_rate.to_le_bytes());
    buffer.extend_from_slice(&block_align_u16.to_le_bytes());
    buffer.extend_from_slice(&depth.bits().to_le_bytes());

    buffer.extend_from_slice(b"data");
    buffer.extend_from_slice(&data_size_u32.to_le_bytes());

    buffer.resize(WAV_HEADER_SIZE + data_size, 0);
    let payload = &mut buffer[WAV_HEADER_SIZE..];
    for (index, frame) in payload.chunks_exact_mut(block_align).enumerate() {
        for (channel, dst) in frame.chunks_exact_mut(bytes_per_sample).enumerate() {
            write_sample(dst, channel_data[channel].as_ref()[index], depth);
        }
    }

    log::debug!(
        "Encoded WAV: {} Hz, {} channel(s), {}-bit, {} bytes",
        options.sample_rate,
        channels,
        depth.bits(),
        buffer.len()
    );
    Ok(buffer)
}
