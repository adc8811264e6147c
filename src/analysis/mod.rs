//! Audio analysis layer
//!
//! Tempo and key come from an analysis backend behind the
//! [`AnalysisBackend`]/[`AnalysisSession`] traits. The [`Orchestrator`] runs a
//! backend over long recordings in fixed-size windows and merges the partial
//! estimates into one [`AnalysisResult`].
//!
//! The default backend is powered by stratum-dsp.

mod config;
mod orchestrator;
mod result;
mod stratum;
mod traits;

pub use config::{AnalysisConfig, DEFAULT_CHUNK_SIZE_SAMPLES};
pub use orchestrator::{analyze_signal, Orchestrator, OrchestratorState};
pub use result::{AnalysisResult, Scale};
pub use stratum::{normalize_bpm, StratumBackend, StratumSession};
pub use traits::{AnalysisBackend, AnalysisSession, KeyEstimate, KeyTuning, TempoEstimate};

use crate::decode::{decode_audio_with, CompressedDecoder, SymphoniaDecoder};
use crate::error::Result;
use crate::model::AudioFormat;

/// Decode an audio buffer and analyze its first channel
pub fn analyze_audio<B: AnalysisBackend>(
    buffer: Vec<u8>,
    format: AudioFormat,
    config: &AnalysisConfig,
    backend: &B,
) -> Result<AnalysisResult> {
    analyze_audio_with(buffer, format, config, backend, &SymphoniaDecoder::new())
}

/// Like [`analyze_audio`], with a caller-supplied compressed decoder
pub fn analyze_audio_with<B, C>(
    buffer: Vec<u8>,
    format: AudioFormat,
    config: &AnalysisConfig,
    backend: &B,
    compressed: &C,
) -> Result<AnalysisResult>
where
    B: AnalysisBackend,
    C: CompressedDecoder + ?Sized,
{
    let audio = decode_audio_with(buffer, format, compressed)?;
    log::debug!(
        "Analyzing channel 0 of {} ({:.1}s at {}Hz)",
        format,
        audio.duration,
        audio.sample_rate
    );
    analyze_signal(audio.primary_channel(), audio.sample_rate, config, backend)
}
