//! Writing decoded audio to files

use super::config::ExportOptions;
use crate::error::{Error, Result};
use crate::model::{AudioData, AudioFormat};
use crate::wav::{self, EncodeOptions};
use std::fs;
use std::path::{Path, PathBuf};

/// Encode `audio` and write it to `output_path`, creating parent directories
/// as needed. Only WAV output is supported.
pub fn export_audio_to_file(
    audio: &AudioData,
    output_path: &Path,
    options: &ExportOptions,
) -> Result<PathBuf> {
    let format = match options.format {
        Some(format) => format,
        None => AudioFormat::from_path(output_path)?,
    };

    let bytes = match format {
        AudioFormat::Wav => encode_wav(audio, options)?,
        AudioFormat::Mp3 | AudioFormat::Ogg | AudioFormat::Flac => {
            return Err(Error::UnsupportedFormat {
                format: format.to_string(),
            })
        }
    };

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output_path, &bytes)?;

    log::info!("Exported {} bytes of {} to {:?}", bytes.len(), format, output_path);
    Ok(output_path.to_path_buf())
}

fn encode_wav(audio: &AudioData, options: &ExportOptions) -> Result<Vec<u8>> {
    let bit_depth = options.bit_depth.unwrap_or(audio.bit_depth);
    let channels = options.channels.unwrap_or(audio.num_channels);
    log::debug!(
        "Encoding WAV: {}-bit, {} channel(s) (quality {} ignored)",
        bit_depth,
        channels,
        options.quality
    );

    let encode_options = EncodeOptions::new(audio.sample_rate)
        .with_bit_depth(bit_depth)
        .with_channels(channels);
    wav::encode(&audio.channel_data, &encode_options)
}
