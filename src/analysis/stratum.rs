//! Tempo and key estimation using stratum-dsp
//!
//! stratum-dsp computes BPM and key in a single pass, so the tempo estimate
//! that follows a key estimate on the same window reuses that pass.

use super::traits::{AnalysisBackend, AnalysisSession, KeyEstimate, KeyTuning, TempoEstimate};
use anyhow::Result;
use stratum_dsp::{analyze_audio, AnalysisConfig as StratumConfig, Key};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Backend producing stratum-dsp sessions
#[derive(Debug, Clone)]
pub struct StratumBackend {
    /// Minimum BPM for detection range
    min_bpm: f32,
    /// Maximum BPM for detection range
    max_bpm: f32,
}

impl StratumBackend {
    pub fn new() -> Self {
        Self {
            min_bpm: 70.0,
            max_bpm: 170.0,
        }
    }

    /// Create backend with custom BPM range
    pub fn with_bpm_range(mut self, min: f32, max: f32) -> Self {
        self.min_bpm = min;
        self.max_bpm = max;
        self
    }
}

impl Default for StratumBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisBackend for StratumBackend {
    type Session = StratumSession;

    fn acquire(&self) -> Result<StratumSession> {
        if !(self.min_bpm > 0.0 && self.min_bpm < self.max_bpm) {
            anyhow::bail!("Invalid BPM range {}-{}", self.min_bpm, self.max_bpm);
        }
        log::debug!(
            "stratum-dsp session ready (BPM range {}-{})",
            self.min_bpm,
            self.max_bpm
        );
        Ok(StratumSession {
            min_bpm: self.min_bpm,
            max_bpm: self.max_bpm,
            tuning: KeyTuning::default(),
            pending: None,
        })
    }
}

/// One stratum run, kept from a key estimate for the tempo estimate that follows it
struct WindowAnalysis {
    ptr: usize,
    len: usize,
    bpm: f32,
    bpm_confidence: f32,
    key: Key,
    key_confidence: f32,
}

impl WindowAnalysis {
    fn matches(&self, window: &[f32]) -> bool {
        self.ptr == window.as_ptr() as usize && self.len == window.len()
    }
}

/// A stratum-dsp session.
///
/// `estimate_key` always analyzes the window it is given. A following
/// `estimate_tempo` on the same window reuses that run instead of analyzing
/// again; any other call sequence runs stratum afresh.
pub struct StratumSession {
    min_bpm: f32,
    max_bpm: f32,
    tuning: KeyTuning,
    pending: Option<WindowAnalysis>,
}

impl StratumSession {
    fn run(&self, window: &[f32], sample_rate: u32) -> Result<WindowAnalysis> {
        if window.len() < sample_rate as usize {
            anyhow::bail!("Window too short for analysis ({} samples)", window.len());
        }

        // frame/hop sizes also drive onset detection, keep stratum's defaults
        let config = StratumConfig {
            min_bpm: self.min_bpm,
            max_bpm: self.max_bpm,
            center_frequency: self.tuning.tuning_frequency,
            ..StratumConfig::default()
        };

        let result = analyze_audio(window, sample_rate, config)
            .map_err(|e| anyhow::anyhow!("Audio analysis failed: {}", e))?;

        Ok(WindowAnalysis {
            ptr: window.as_ptr() as usize,
            len: window.len(),
            bpm: normalize_bpm(result.bpm, self.min_bpm, self.max_bpm),
            bpm_confidence: result.bpm_confidence,
            key: result.key,
            key_confidence: result.key_confidence,
        })
    }
}

impl AnalysisSession for StratumSession {
    fn estimate_tempo(&mut self, window: &[f32], sample_rate: u32) -> Result<TempoEstimate> {
        let analysis = match self.pending.take() {
            Some(analysis) if analysis.matches(window) => analysis,
            _ => self.run(window, sample_rate)?,
        };
        Ok(TempoEstimate {
            bpm: (analysis.bpm > 0.0).then_some(analysis.bpm),
            confidence: Some(analysis.bpm_confidence),
        })
    }

    fn estimate_key(
        &mut self,
        window: &[f32],
        sample_rate: u32,
        tuning: &KeyTuning,
    ) -> Result<KeyEstimate> {
        self.pending = None;
        if &self.tuning != tuning {
            self.tuning = tuning.clone();
        }
        let analysis = self.run(window, sample_rate)?;
        let (key, scale) = split_key(&analysis.key);
        let estimate = KeyEstimate {
            key: key.to_string(),
            scale: scale.to_string(),
            confidence: analysis.key_confidence,
        };
        self.pending = Some(analysis);
        Ok(estimate)
    }

    fn shutdown(&mut self) {
        self.pending = None;
    }
}

/// Pull a BPM estimate into `[min_bpm, max_bpm]` by doubling or halving
pub fn normalize_bpm(bpm: f32, min_bpm: f32, max_bpm: f32) -> f32 {
    let mut bpm = bpm;
    if min_bpm > 0.0 && max_bpm > 0.0 && bpm > 0.0 {
        // Double BPM if below minimum
        while bpm < min_bpm && bpm * 2.0 <= max_bpm {
            bpm *= 2.0;
            log::debug!("BPM doubled to {:.1} (was below minimum {})", bpm, min_bpm);
        }
        // Halve BPM if above maximum
        while bpm > max_bpm && bpm / 2.0 >= min_bpm {
            bpm /= 2.0;
            log::debug!("BPM halved to {:.1} (was above maximum {})", bpm, max_bpm);
        }
    }
    bpm
}

/// Split a stratum key into pitch class name and scale name
fn split_key(key: &Key) -> (&'static str, &'static str) {
    match key {
        Key::Major(i) => (NOTE_NAMES[*i as usize % 12], "major"),
        Key::Minor(i) => (NOTE_NAMES[*i as usize % 12], "minor"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(frequency: f32, seconds: usize) -> Vec<f32> {
        (0..44100 * seconds)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * frequency * i as f32 / 44100.0).sin())
            .collect()
    }

    fn silence(window: &mut [f32]) {
        window.iter_mut().for_each(|s| *s = 0.0);
    }

    #[test]
    fn test_key_then_tempo_share_one_run() {
        let mut session = StratumBackend::new().acquire().unwrap();
        let window = tone(440.0, 3);

        session.estimate_key(&window, 44100, &KeyTuning::default()).unwrap();
        assert!(session.pending.is_some());

        session.estimate_tempo(&window, 44100).unwrap();
        assert!(session.pending.is_none());
    }

    #[test]
    fn test_buffer_changed_in_place_is_analyzed_again() {
        let mut session = StratumBackend::new().acquire().unwrap();
        let mut window = tone(440.0, 3);
        session.estimate_key(&window, 44100, &KeyTuning::default()).unwrap();
        session.estimate_tempo(&window, 44100).unwrap();

        // Same address and length, different samples
        silence(&mut window);
        assert!(session
            .estimate_key(&window, 44100, &KeyTuning::default())
            .is_err());
        assert!(session.estimate_tempo(&window, 44100).is_err());
    }

    #[test]
    fn test_repeated_tempo_calls_are_not_cached() {
        let mut session = StratumBackend::new().acquire().unwrap();
        let mut window = tone(440.0, 3);
        session.estimate_tempo(&window, 44100).unwrap();

        silence(&mut window);
        assert!(session.estimate_tempo(&window, 44100).is_err());
    }

    #[test]
    fn test_normalize_bpm_into_range() {
        assert_eq!(normalize_bpm(60.0, 70.0, 170.0), 120.0);
        assert_eq!(normalize_bpm(240.0, 70.0, 170.0), 120.0);
        assert_eq!(normalize_bpm(128.0, 70.0, 170.0), 128.0);
        assert_eq!(normalize_bpm(0.0, 70.0, 170.0), 0.0);
    }

    #[test]
    fn test_split_key() {
        assert_eq!(split_key(&Key::Major(10)), ("A#", "major"));
        assert_eq!(split_key(&Key::Minor(9)), ("A", "minor"));
    }

    #[test]
    fn test_short_window_is_an_error() {
        let mut session = StratumBackend::new().acquire().unwrap();
        let window = vec![0.0f32; 1000];
        assert!(session.estimate_tempo(&window, 44100).is_err());
        assert!(session
            .estimate_key(&window, 44100, &KeyTuning::default())
            .is_err());
    }

    #[test]
    fn test_invalid_bpm_range_fails_acquire() {
        assert!(StratumBackend::new().with_bpm_range(150.0, 90.0).acquire().is_err());
    }
}
