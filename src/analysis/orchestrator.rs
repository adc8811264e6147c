//! Chunked analysis over long recordings
//!
//! The signal is cut into fixed-size windows which are analyzed one after
//! another. Partial results are merged as they arrive:
//!
//! - tempo: the first window with a usable BPM wins, later windows never
//!   overwrite it
//! - key: running maximum on confidence; ties keep the earlier window
//!
//! Tempo and key are merged independently: an estimator that fails on a
//! window contributes nothing for that window and the run goes on. Only
//! acquiring the backend session is fatal.

use super::config::AnalysisConfig;
use super::result::{AnalysisResult, Scale};
use super::traits::{AnalysisBackend, AnalysisSession, KeyEstimate, SessionGuard, TempoEstimate};
use crate::error::{Error, Result};

/// Lifecycle of one orchestrated run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    Initializing,
    Analyzing { window: usize },
    Finalizing,
    Done,
    Failed,
}

/// Drives an analysis backend over a signal window by window
pub struct Orchestrator<'a, B: AnalysisBackend> {
    backend: &'a B,
    config: AnalysisConfig,
    state: OrchestratorState,
}

impl<'a, B: AnalysisBackend> Orchestrator<'a, B> {
    pub fn new(backend: &'a B, config: AnalysisConfig) -> Self {
        Self {
            backend,
            config,
            state: OrchestratorState::Idle,
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    /// Analyze a mono signal. Returns whatever the windows produced, possibly
    /// nothing; errors only when the backend cannot be acquired.
    pub fn analyze(&mut self, signal: &[f32], sample_rate: u32) -> Result<AnalysisResult> {
        let chunk_size = self.config.chunk_size_samples;
        if chunk_size == 0 {
            return Err(Error::InvalidChunkSize);
        }

        let mut result = AnalysisResult::default();
        let window_count = signal.len().div_ceil(chunk_size);
        if window_count == 0 {
            log::debug!("Empty signal, nothing to analyze");
            self.state = OrchestratorState::Done;
            return Ok(result);
        }

        let mut guard = self.acquire()?;
        log::debug!(
            "Analyzing {} samples at {}Hz in {} window(s) of {} samples",
            signal.len(),
            sample_rate,
            window_count,
            chunk_size
        );

        let mut skipped = 0;
        for (index, window) in signal.chunks(chunk_size).enumerate() {
            self.state = OrchestratorState::Analyzing { window: index };
            let session = guard.session();

            let key = session.estimate_key(window, sample_rate, &self.config.key_tuning);
            let tempo = session.estimate_tempo(window, sample_rate);

            match (tempo, key) {
                (Err(tempo_err), Err(key_err)) => {
                    let failure = Error::AnalysisWindowFailure {
                        window: index,
                        reason: format!("tempo: {:#}; key: {:#}", tempo_err, key_err),
                    };
                    log::warn!("{}, skipping", failure);
                    skipped += 1;
                }
                (tempo, key) => {
                    match tempo {
                        Ok(tempo) => merge_tempo(&mut result, index, tempo),
                        Err(e) => log::warn!("Window {}: tempo estimation failed: {:#}", index, e),
                    }
                    match key {
                        Ok(key) => merge_key(&mut result, index, key),
                        Err(e) => log::warn!("Window {}: key estimation failed: {:#}", index, e),
                    }
                }
            }
        }

        self.state = OrchestratorState::Finalizing;
        drop(guard);
        self.state = OrchestratorState::Done;

        log::info!(
            "Analysis complete: {} ({} of {} window(s) skipped)",
            result,
            skipped,
            window_count
        );
        Ok(result)
    }

    fn acquire(&mut self) -> Result<SessionGuard<B::Session>> {
        self.state = OrchestratorState::Initializing;
        match self.backend.acquire() {
            Ok(session) => Ok(SessionGuard::new(session)),
            Err(e) => {
                self.state = OrchestratorState::Failed;
                log::error!("Failed to initialize analysis backend: {:#}", e);
                Err(Error::AnalysisInitFailure {
                    reason: format!("{:#}", e),
                })
            }
        }
    }
}

/// First window with a usable BPM wins
fn merge_tempo(result: &mut AnalysisResult, index: usize, tempo: TempoEstimate) {
    if result.bpm.is_some() {
        return;
    }
    if let Some(bpm) = tempo.bpm.filter(|bpm| bpm.is_finite() && *bpm > 0.0) {
        log::debug!("Window {}: tempo {:.2} BPM", index, bpm);
        result.set_bpm(bpm);
    }
}

/// Replace the running key when none is set or this one is strictly more confident
fn merge_key(result: &mut AnalysisResult, index: usize, key: KeyEstimate) {
    let Some(name) = key.key.split_whitespace().next() else {
        log::debug!("Window {}: empty key estimate", index);
        return;
    };
    let confidence = if key.confidence.is_finite() {
        key.confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let replaces = match (&result.key, result.confidence) {
        (Some(_), Some(current)) => confidence > current,
        _ => true,
    };
    if replaces {
        let scale = Scale::parse(&key.scale);
        if scale.is_none() {
            log::warn!("Window {}: unrecognized scale {:?}", index, key.scale);
        }
        log::debug!(
            "Window {}: key {} {} (confidence {:.3}) is the new best",
            index,
            name,
            key.scale,
            confidence
        );
        result.set_key(name.to_string(), scale, confidence);
    }
}

/// Analyze `signal` with a fresh orchestrator
pub fn analyze_signal<B: AnalysisBackend>(
    signal: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
    backend: &B,
) -> Result<AnalysisResult> {
    Orchestrator::new(backend, config.clone()).analyze(signal, sample_rate)
}
