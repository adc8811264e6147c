//! RIFF/WAVE reader
//!
//! Validates the container framing, reads the `fmt ` parameters and
//! de-interleaves the `data` payload into per-channel float buffers.

use super::chunk::{find_chunk_descriptor, CHUNK_HEADER_SIZE, RIFF_PREAMBLE_SIZE};
use super::codec::{decode_raw, BitDepth};
use crate::error::{Error, Result};
use crate::model::AudioData;

/// Format tag for uncompressed linear PCM
pub const WAVE_FORMAT_PCM: u16 = 1;

/// Parameters read from the `fmt ` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub format_tag: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub bit_depth: u16,
}

/// Decode a complete WAV file held in memory
pub fn decode(buffer: &[u8]) -> Result<AudioData> {
    check_magic(buffer)?;

    let format = read_format(buffer)?;
    if format.format_tag != WAVE_FORMAT_PCM {
        return Err(Error::UnsupportedCodec {
            format_tag: format.format_tag,
        });
    }
    if format.num_channels == 0 {
        return Err(Error::malformed("fmt chunk declares zero channels"));
    }
    if format.sample_rate == 0 {
        return Err(Error::malformed("fmt chunk declares a zero sample rate"));
    }
    let depth = BitDepth::try_from(format.bit_depth)?;

    let data = find_chunk_descriptor(buffer, b"data")
        .ok_or_else(|| Error::malformed("missing data chunk"))?;
    let start = data.payload_offset();
    let declared_end = start.saturating_add(data.size as usize);
    let end = declared_end.min(buffer.len());
    if end < declared_end {
        log::warn!(
            "data chunk declares {} bytes but only {} are present, truncating",
            data.size,
            end.saturating_sub(start)
        );
    }
    let payload = buffer.get(start..end).unwrap_or(&[]);

    let channel_data = decode_pcm(payload, format.num_channels as usize, depth);
    log::debug!(
        "Decoded WAV: {} Hz, {} channel(s), {}-bit, {} samples per channel",
        format.sample_rate,
        format.num_channels,
        format.bit_depth,
        channel_data[0].len()
    );

    AudioData::new(format.sample_rate, channel_data, format.bit_depth)
}

fn check_magic(buffer: &[u8]) -> Result<()> {
    if buffer.get(0..4) != Some(b"RIFF".as_slice()) {
        return Err(Error::malformed("missing RIFF header"));
    }
    if buffer.get(8..RIFF_PREAMBLE_SIZE) != Some(b"WAVE".as_slice()) {
        return Err(Error::malformed("missing WAVE form type"));
    }
    Ok(())
}

/// Read the `fmt ` chunk. Offsets are relative to the chunk header.
pub fn read_format(buffer: &[u8]) -> Result<WavFormat> {
    let fmt = find_chunk_descriptor(buffer, b"fmt ")
        .ok_or_else(|| Error::malformed("missing fmt chunk"))?;
    let base = fmt.offset;
    let header = buffer
        .get(base..base + CHUNK_HEADER_SIZE + 16)
        .ok_or_else(|| Error::malformed("fmt chunk is truncated"))?;

    let u16_at = |at: usize| u16::from_le_bytes([header[at], header[at + 1]]);
    let u32_at = |at: usize| {
        u32::from_le_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]])
    };

    Ok(WavFormat {
        format_tag: u16_at(8),
        num_channels: u16_at(10),
        sample_rate: u32_at(12),
        bit_depth: u16_at(22),
    })
}

/// Split an interleaved payload into one buffer per channel. Trailing bytes
/// that do not form a whole frame are ignored.
pub fn decode_pcm(payload: &[u8], num_channels: usize, depth: BitDepth) -> Vec<Vec<f32>> {
    if num_channels == 0 {
        return Vec::new();
    }
    let width = depth.bytes_per_sample();
    let frame_size = width * num_channels;
    let frames = payload.len() / frame_size;

    let mut channels: Vec<Vec<f32>> = (0..num_channels)
        .map(|_| Vec::with_capacity(frames))
        .collect();
    for frame in payload.chunks_exact(frame_size) {
        for (channel, raw) in channels.iter_mut().zip(frame.chunks_exact(width)) {
            channel.push(decode_raw(raw, depth));
        }
    }
    channels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(format_tag: u16, channels: u16, bits: u16, payload: &[u8]) -> Vec<u8> {
        let block_align = channels * bits / 8;
        let mut buf = Vec::new();
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(b"WAVE");
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&format_tag.to_le_bytes());
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&8000u32.to_le_bytes());
        buf.extend_from_slice(&(8000 * block_align as u32).to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn test_missing_riff_magic() {
        let mut buf = wav_bytes(1, 1, 16, &[0, 0]);
        buf[0..4].copy_from_slice(b"RIFX");
        let err = decode(&buf).unwrap_err();
        assert!(matches!(err, Error::MalformedContainer { reason } if reason.contains("RIFF")));
    }

    #[test]
    fn test_missing_wave_magic() {
        let mut buf = wav_bytes(1, 1, 16, &[0, 0]);
        buf[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(
            decode(&buf),
            Err(Error::MalformedContainer { .. })
        ));
    }

    #[test]
    fn test_empty_buffer_is_malformed() {
        assert!(matches!(decode(&[]), Err(Error::MalformedContainer { .. })));
    }

    #[test]
    fn test_float_format_tag_rejected() {
        let buf = wav_bytes(3, 1, 32, &[0, 0, 0, 0]);
        assert!(matches!(
            decode(&buf),
            Err(Error::UnsupportedCodec { format_tag: 3 })
        ));
    }

    #[test]
    fn test_missing_data_chunk() {
        let mut buf = wav_bytes(1, 1, 16, &[]);
        buf.truncate(36);
        let err = decode(&buf).unwrap_err();
        assert!(matches!(err, Error::MalformedContainer { reason } if reason.contains("data")));
    }

    #[test]
    fn test_missing_fmt_chunk() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"RIFF\x0c\x00\x00\x00WAVE");
        buf.extend_from_slice(b"data\x02\x00\x00\x00\x00\x00");
        let err = decode(&buf).unwrap_err();
        assert!(matches!(err, Error::MalformedContainer { reason } if reason.contains("fmt")));
    }

    #[test]
    fn test_unsupported_bit_depth_in_header() {
        let buf = wav_bytes(1, 1, 12, &[0, 0]);
        assert!(matches!(
            decode(&buf),
            Err(Error::UnsupportedBitDepth { bit_depth: 12 })
        ));
    }

    #[test]
    fn test_stereo_deinterleave() {
        // L = 0x4000 (0.5), R = 0xC000 (-0.5), two frames
        let payload = [0x00, 0x40, 0x00, 0xC0, 0x00, 0x40, 0x00, 0xC0];
        let audio = decode(&wav_bytes(1, 2, 16, &payload)).unwrap();
        assert_eq!(audio.num_channels, 2);
        assert_eq!(audio.channel_data[0], vec![0.5, 0.5]);
        assert_eq!(audio.channel_data[1], vec![-0.5, -0.5]);
        assert!((audio.duration - 2.0 / 8000.0).abs() < 1e-12);
    }

    #[test]
    fn test_extension_chunks_skipped() {
        let mut buf = wav_bytes(1, 1, 8, &[128, 255]);
        // splice an odd-sized LIST chunk between fmt and data
        let mut list = b"LIST\x03\x00\x00\x00abc\x00".to_vec();
        let tail = buf.split_off(36);
        buf.append(&mut list);
        buf.extend_from_slice(&tail);

        let audio = decode(&buf).unwrap();
        assert_eq!(audio.channel_data[0], vec![0.0, 127.0 / 128.0]);
        assert_eq!(audio.bit_depth, 8);
    }

    #[test]
    fn test_overlong_data_size_truncated() {
        let mut buf = wav_bytes(1, 1, 16, &[0, 0, 0, 0]);
        buf[40..44].copy_from_slice(&1000u32.to_le_bytes());
        let audio = decode(&buf).unwrap();
        assert_eq!(audio.sample_count(), 2);
    }

    #[test]
    fn test_partial_frame_ignored() {
        let channels = decode_pcm(&[0, 0, 0, 0, 0], 2, BitDepth::Sixteen);
        assert_eq!(channels[0].len(), 1);
        assert_eq!(channels[1].len(), 1);
    }
}
