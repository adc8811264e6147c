//! Analysis capability trait definitions and data structures

use anyhow::Result;

/// Source of analysis sessions - allows swapping the tempo/key engine.
///
/// A backend is owned by the caller and handed to the orchestrator, which
/// acquires one session per run and releases it when the run ends.
pub trait AnalysisBackend {
    type Session: AnalysisSession;

    /// Acquire a session. Failure here aborts the whole run.
    fn acquire(&self) -> Result<Self::Session>;
}

/// An initialized analysis engine, valid until `shutdown` is called
pub trait AnalysisSession {
    /// Estimate the tempo of one window of mono samples
    fn estimate_tempo(&mut self, window: &[f32], sample_rate: u32) -> Result<TempoEstimate>;

    /// Estimate the musical key of one window of mono samples
    fn estimate_key(
        &mut self,
        window: &[f32],
        sample_rate: u32,
        tuning: &KeyTuning,
    ) -> Result<KeyEstimate>;

    /// Release engine resources. Called exactly once per session.
    fn shutdown(&mut self) {}
}

/// Tempo estimate for a single window
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TempoEstimate {
    /// Beats per minute (None when no tempo could be found)
    pub bpm: Option<f32>,
    /// Optional estimator confidence (0.0-1.0)
    pub confidence: Option<f32>,
}

/// Key estimate for a single window
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEstimate {
    /// Pitch class name, possibly followed by qualifier text (e.g. "A#" or "F# major")
    pub key: String,
    /// Scale name as reported by the engine ("major", "Minor", ...)
    pub scale: String,
    /// Key strength (0.0-1.0)
    pub confidence: f32,
}

/// Hints handed to the key estimator.
///
/// A backend reads the fields its engine supports and ignores the rest.
/// [`StratumBackend`](super::StratumBackend) only uses `tuning_frequency`,
/// since stratum-dsp shares its frame and hop sizes with tempo detection and
/// has a single key profile.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyTuning {
    /// Reference pitch for A4 in Hz
    pub tuning_frequency: f32,
    /// Analysis frame size in samples (hint)
    pub frame_size: usize,
    /// Hop between frames in samples (hint)
    pub hop_size: usize,
    /// Key profile name (hint, engine specific)
    pub profile: String,
}

impl Default for KeyTuning {
    fn default() -> Self {
        Self {
            tuning_frequency: 440.0,
            frame_size: 4096,
            hop_size: 4096,
            profile: "bgate".to_string(),
        }
    }
}

/// Releases a session when dropped, on success, error and unwind alike
pub(crate) struct SessionGuard<S: AnalysisSession> {
    session: S,
}

impl<S: AnalysisSession> SessionGuard<S> {
    pub(crate) fn new(session: S) -> Self {
        Self { session }
    }

    pub(crate) fn session(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: AnalysisSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        log::debug!("Releasing analysis session");
        self.session.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingSession(Rc<Cell<usize>>);

    impl AnalysisSession for CountingSession {
        fn estimate_tempo(&mut self, _window: &[f32], _sample_rate: u32) -> Result<TempoEstimate> {
            Ok(TempoEstimate::default())
        }

        fn estimate_key(
            &mut self,
            _window: &[f32],
            _sample_rate: u32,
            _tuning: &KeyTuning,
        ) -> Result<KeyEstimate> {
            anyhow::bail!("no key")
        }

        fn shutdown(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_key_tuning_defaults() {
        let tuning = KeyTuning::default();
        assert_eq!(tuning.tuning_frequency, 440.0);
        assert_eq!(tuning.frame_size, 4096);
        assert_eq!(tuning.hop_size, 4096);
        assert_eq!(tuning.profile, "bgate");
    }

    #[test]
    fn test_guard_shuts_session_down_once() {
        let released = Rc::new(Cell::new(0));
        {
            let mut guard = SessionGuard::new(CountingSession(released.clone()));
            assert!(guard.session().estimate_tempo(&[], 44100).is_ok());
            assert_eq!(released.get(), 0);
        }
        assert_eq!(released.get(), 1);
    }
}
