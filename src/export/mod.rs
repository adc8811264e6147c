//! Audio export to files

pub mod config;
pub mod pipeline;

pub use config::ExportOptions;
pub use pipeline::export_audio_to_file;
