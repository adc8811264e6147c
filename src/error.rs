//! Error taxonomy for container handling, decoding and analysis

use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad magic or a required chunk is missing
    #[error("malformed WAV container: {reason}")]
    MalformedContainer { reason: String },

    /// `fmt ` chunk carries a format tag other than 1 (linear PCM)
    #[error("unsupported WAV codec: format tag {format_tag} (only PCM/1 is supported)")]
    UnsupportedCodec { format_tag: u16 },

    #[error("unsupported bit depth: {bit_depth} (expected 8, 16, 24 or 32)")]
    UnsupportedBitDepth { bit_depth: u16 },

    /// Unknown container format at the API boundary
    #[error("unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    /// The decode worker died or hung up before sending its message
    #[error("decode worker failed: {reason}")]
    WorkerFailure { reason: String },

    /// Acquiring the analysis capability failed; the whole run is aborted
    #[error("analysis initialization failed: {reason}")]
    AnalysisInitFailure { reason: String },

    /// A single analysis window failed. Absorbed by the orchestrator.
    #[error("analysis of window {window} failed: {reason}")]
    AnalysisWindowFailure { window: usize, reason: String },

    #[error("channel {channel} has {actual} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    #[error("requested {requested} channels but only {available} are available")]
    ChannelCount { requested: usize, available: usize },

    #[error("analysis chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("failed to decode {format} audio: {reason}")]
    CompressedDecode { format: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedContainer {
            reason: reason.into(),
        }
    }
}
