//! Format-independent audio data model
//!
//! Everything downstream of decoding (analysis, export) works on these types,
//! regardless of which container the audio came from.

mod audio;
mod format;

pub use audio::{check_channel_lengths, AudioData, COMPRESSED_BIT_DEPTH};
pub use format::AudioFormat;
