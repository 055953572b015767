// Recording session state and the in-memory emotion log

use crate::models::{Emotion, EmotionSample};
use chrono::{DateTime, Local};
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
}

/// Idle/recording toggle plus the log collected while recording.
///
/// The log only grows while recording, and is emptied exactly when a new
/// recording starts. It is kept after stopping so it can be plotted.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    log: Vec<EmotionSample>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    /// Enters recording and discards the previous session's log
    pub fn start(&mut self) {
        let discarded = self.log.len();
        self.log.clear();
        self.state = SessionState::Recording;
        info!("Recording started ({} previous entries discarded)", discarded);
    }

    pub fn stop(&mut self) {
        self.state = SessionState::Idle;
        info!("Recording stopped with {} entries", self.log.len());
    }

    /// Appends a sample if recording. Returns whether it was stored.
    ///
    /// A wall clock that steps backwards is clamped to the previous timestamp.
    pub fn record(&mut self, at: DateTime<Local>, emotion: Emotion) -> bool {
        if !self.is_recording() {
            return false;
        }

        let at = match self.log.last() {
            Some(last) if at < last.at => last.at,
            _ => at,
        };
        self.log.push(EmotionSample::new(at, emotion));
        true
    }

    pub fn log(&self) -> &[EmotionSample] {
        &self.log
    }
}
