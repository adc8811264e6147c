//! Compressed audio decoding (MP3, OGG, FLAC) using symphonia

use crate::model::{AudioData, AudioFormat, COMPRESSED_BIT_DEPTH};
use anyhow::{Context, Result};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoder for compressed containers - allows swapping the codec library
pub trait CompressedDecoder {
    /// Decode a whole file held in memory. Results report a bit depth of 32.
    fn decode(&self, bytes: &[u8], format: AudioFormat) -> Result<AudioData>;
}

/// Default compressed decoder backed by symphonia
#[derive(Debug, Clone, Default)]
pub struct SymphoniaDecoder {
    /// Stop after this many seconds (None = decode everything)
    max_seconds: Option<u32>,
}

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only decode the first `seconds` of audio
    pub fn with_max_seconds(mut self, seconds: u32) -> Self {
        self.max_seconds = Some(seconds);
        self
    }
}

impl CompressedDecoder for SymphoniaDecoder {
    fn decode(&self, bytes: &[u8], format: AudioFormat) -> Result<AudioData> {
        log::debug!("Decoding {} bytes of {} with symphonia", bytes.len(), format);

        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

        let mut hint = Hint::new();
        hint.with_extension(format.name());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .with_context(|| format!("Failed to probe {} stream", format))?;

        let mut reader = probed.format;

        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .context("No audio track found")?;

        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .context("No sample rate in audio track")?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .context("Failed to create audio decoder")?;

        let max_samples = self
            .max_seconds
            .map(|s| s as usize * sample_rate as usize);
        let mut channels: Vec<Vec<f32>> = Vec::new();

        loop {
            let packet = match reader.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    log::warn!("Error reading packet: {:?}", e);
                    break;
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(e) => {
                    log::warn!("Error decoding packet: {:?}", e);
                    continue;
                }
            };

            let spec = *decoded.spec();
            let count = spec.channels.count();
            if count == 0 {
                continue;
            }
            if channels.is_empty() {
                channels = vec![Vec::new(); count];
            }

            let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);

            for frame in sample_buf.samples().chunks_exact(count) {
                for (channel, sample) in channels.iter_mut().zip(frame) {
                    channel.push(*sample);
                }
            }

            if let (Some(max), Some(first)) = (max_samples, channels.first()) {
                if first.len() >= max {
                    break;
                }
            }
        }

        if channels.is_empty() {
            anyhow::bail!("No audio decoded from {} stream", format);
        }
        // the last packet may run past the cap
        if let Some(max) = max_samples {
            channels.iter_mut().for_each(|channel| channel.truncate(max));
        }

        let audio = AudioData::new(sample_rate, channels, COMPRESSED_BIT_DEPTH)?;
        log::debug!(
            "Decoded {} channel(s), {} samples ({:.1}s) at {}Hz",
            audio.num_channels,
            audio.sample_count(),
            audio.duration,
            audio.sample_rate
        );
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::wav::{encode, EncodeOptions};

    fn stereo_wav(seconds: usize) -> Vec<u8> {
        let left: Vec<f32> = (0..8000 * seconds).map(|i| (i % 100) as f32 / 200.0).collect();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        encode(&[left, right], &EncodeOptions::new(8000)).unwrap()
    }

    #[test]
    fn test_decodes_every_channel() {
        let audio = SymphoniaDecoder::new()
            .decode(&stereo_wav(3), AudioFormat::Wav)
            .unwrap();
        assert_eq!(audio.num_channels, 2);
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.sample_count(), 24000);
        assert_eq!(audio.bit_depth, COMPRESSED_BIT_DEPTH);
        assert!((audio.channel_data[0][50] - 0.25).abs() < 1e-3);
        assert!((audio.channel_data[1][50] + 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_max_seconds_caps_length_exactly() {
        let audio = SymphoniaDecoder::new()
            .with_max_seconds(1)
            .decode(&stereo_wav(3), AudioFormat::Wav)
            .unwrap();
        assert_eq!(audio.sample_count(), 8000);
        assert_eq!(audio.channel_data[1].len(), 8000);
        assert!((audio.duration - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_garbage_input_fails() {
        let result = SymphoniaDecoder::new().decode(b"definitely not an mp3", AudioFormat::Mp3);
        assert!(result.is_err());
    }
}
