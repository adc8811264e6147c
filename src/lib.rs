//! keysync - WAV codec and chunked tempo/key analysis
//!
//! This library decodes audio containers into per-channel float buffers,
//! writes them back as PCM WAV, and runs tempo and key analysis over long
//! recordings window by window.

pub mod analysis;
pub mod decode;
pub mod error;
pub mod export;
pub mod model;
pub mod wav;

pub use analysis::{analyze_audio, AnalysisConfig, AnalysisResult, StratumBackend};
pub use decode::decode_audio;
pub use error::{Error, Result};
pub use export::{export_audio_to_file, ExportOptions};
pub use model::{AudioData, AudioFormat};
