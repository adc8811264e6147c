//! Format dispatch for decoding
//!
//! WAV goes through the in-crate container reader on a worker thread;
//! everything else goes to a [`CompressedDecoder`].

mod compressed;
mod worker;

pub use compressed::{CompressedDecoder, SymphoniaDecoder};
pub use worker::{decode_wav_in_worker, WorkerMessage};

use crate::error::{Error, Result};
use crate::model::{AudioData, AudioFormat};

/// Decode an audio buffer of the given format
pub fn decode_audio(buffer: Vec<u8>, format: AudioFormat) -> Result<AudioData> {
    decode_audio_with(buffer, format, &SymphoniaDecoder::new())
}

/// Decode an audio buffer, routing compressed formats to `compressed`
pub fn decode_audio_with<C: CompressedDecoder + ?Sized>(
    buffer: Vec<u8>,
    format: AudioFormat,
    compressed: &C,
) -> Result<AudioData> {
    match format {
        AudioFormat::Wav => decode_wav_in_worker(buffer),
        AudioFormat::Mp3 | AudioFormat::Ogg | AudioFormat::Flac => compressed
            .decode(&buffer, format)
            .map_err(|e| Error::CompressedDecode {
                format: format.to_string(),
                reason: format!("{:#}", e),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SilenceDecoder;

    impl CompressedDecoder for SilenceDecoder {
        fn decode(&self, bytes: &[u8], _format: AudioFormat) -> anyhow::Result<AudioData> {
            Ok(AudioData::new(8000, vec![vec![0.0; bytes.len()]; 2], 32)?)
        }
    }

    struct FailingDecoder;

    impl CompressedDecoder for FailingDecoder {
        fn decode(&self, _bytes: &[u8], _format: AudioFormat) -> anyhow::Result<AudioData> {
            anyhow::bail!("corrupt frame")
        }
    }

    #[test]
    fn test_compressed_formats_use_decoder() {
        for format in [AudioFormat::Mp3, AudioFormat::Ogg, AudioFormat::Flac] {
            let audio = decode_audio_with(vec![0; 16], format, &SilenceDecoder).unwrap();
            assert_eq!(audio.num_channels, 2);
            assert_eq!(audio.sample_count(), 16);
            assert_eq!(audio.bit_depth, 32);
        }
    }

    #[test]
    fn test_compressed_failure_is_wrapped() {
        let err = decode_audio_with(vec![1, 2, 3], AudioFormat::Flac, &FailingDecoder).unwrap_err();
        match err {
            Error::CompressedDecode { format, reason } => {
                assert_eq!(format, "flac");
                assert!(reason.contains("corrupt frame"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_wav_does_not_touch_compressed_decoder() {
        let err = decode_audio_with(b"RIFF".to_vec(), AudioFormat::Wav, &FailingDecoder).unwrap_err();
        assert!(matches!(err, Error::MalformedContainer { .. }));
    }
}
