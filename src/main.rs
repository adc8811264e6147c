use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keysync::analysis::{analyze_audio, AnalysisConfig, AnalysisResult, StratumBackend};
use keysync::{decode_audio, export_audio_to_file, AudioFormat, ExportOptions};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "keysync")]
#[command(about = "Decode audio, convert to WAV and detect tempo and key", long_about = None)]
struct Args {
    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect BPM and key of audio files (directories are searched recursively)
    Analyze {
        /// Audio files or directories
        #[arg(required = true)]
        paths: Vec<String>,

        /// Analysis window length in samples (default: 30s at 44.1kHz)
        #[arg(long, default_value = "1323000")]
        chunk_size: usize,

        /// Minimum BPM for detection range (default: 70)
        #[arg(long, default_value = "70")]
        min_bpm: f32,

        /// Maximum BPM for detection range (default: 170)
        #[arg(long, default_value = "170")]
        max_bpm: f32,

        /// Print one JSON object per file
        #[arg(long)]
        json: bool,
    },

    /// Decode an audio file and write it as PCM WAV
    Convert {
        /// Input audio file (wav, mp3, ogg, flac)
        input: String,

        /// Output WAV file
        output: String,

        /// Output bit depth (default: keep source bit depth)
        #[arg(long)]
        bit_depth: Option<u16>,

        /// Number of channels to keep (default: all)
        #[arg(long)]
        channels: Option<usize>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match args.command {
        Command::Analyze {
            paths,
            chunk_size,
            min_bpm,
            max_bpm,
            json,
        } => {
            let config = AnalysisConfig::new().with_chunk_size(chunk_size);
            let backend = StratumBackend::new().with_bpm_range(min_bpm, max_bpm);
            run_analyze(&paths, &config, &backend, json)
        }
        Command::Convert {
            input,
            output,
            bit_depth,
            channels,
        } => run_convert(&expand(&input), &expand(&output), bit_depth, channels),
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Expand directories into the supported audio files they contain
fn collect_audio_files(paths: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths.iter().map(|p| expand(p)) {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(&path)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        log::warn!("Skipping unreadable entry: {}", e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|p| AudioFormat::from_path(p).is_ok())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path);
        }
    }
    files
}

fn analyze_file(path: &Path, config: &AnalysisConfig, backend: &StratumBackend) -> Result<AnalysisResult> {
    let format = AudioFormat::from_path(path)?;
    let buffer =
        std::fs::read(path).with_context(|| format!("Failed to read audio file: {:?}", path))?;
    let result = analyze_audio(buffer, format, config, backend)
        .with_context(|| format!("Failed to analyze: {:?}", path))?;
    Ok(result)
}

fn run_analyze(paths: &[String], config: &AnalysisConfig, backend: &StratumBackend, json: bool) -> Result<()> {
    let files = collect_audio_files(paths);
    if files.is_empty() {
        anyhow::bail!("No audio files found");
    }
    log::info!("Analyzing {} file(s)", files.len());

    let results: Vec<(PathBuf, Result<AnalysisResult>)> = files
        .into_par_iter()
        .map(|path| {
            let result = analyze_file(&path, config, backend);
            (path, result)
        })
        .collect();

    let mut failures = 0;
    for (path, result) in &results {
        match result {
            Ok(analysis) if json => println!("{}", json_line(path, analysis)?),
            Ok(analysis) => println!("{}: {}", path.display(), analysis),
            Err(e) => {
                failures += 1;
                log::error!("{:#}", e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} file(s) failed", failures, results.len());
    }
    Ok(())
}

/// One JSON object per file; non-UTF-8 paths are written lossily
fn json_line(path: &Path, analysis: &AnalysisResult) -> Result<String> {
    let value = serde_json::json!({
        "file": path.to_string_lossy(),
        "result": serde_json::to_value(analysis)?
    });
    Ok(value.to_string())
}

fn run_convert(input: &Path, output: &Path, bit_depth: Option<u16>, channels: Option<usize>) -> Result<()> {
    let format = AudioFormat::from_path(input)?;
    let buffer =
        std::fs::read(input).with_context(|| format!("Failed to read audio file: {:?}", input))?;
    let audio = decode_audio(buffer, format).with_context(|| format!("Failed to decode: {:?}", input))?;

    log::info!(
        "Decoded {:?}: {} channel(s), {}Hz, {:.1}s",
        input,
        audio.num_channels,
        audio.sample_rate,
        audio.duration
    );

    let mut options = ExportOptions::new().with_format(AudioFormat::Wav);
    if let Some(bits) = bit_depth {
        options = options.with_bit_depth(bits);
    }
    if let Some(count) = channels {
        options = options.with_channels(count);
    }

    let written = export_audio_to_file(&audio, output, &options)
        .with_context(|| format!("Failed to export: {:?}", output))?;
    log::info!("Written to: {:?}", written);
    Ok(())
}
