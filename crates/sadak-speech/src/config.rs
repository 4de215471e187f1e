//! Speech pipeline configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chunker::DEFAULT_MAX_CHUNK_CHARS;

/// Tunables for the playback controller.
///
/// The defaults are the timings the dashboard has always used; most callers
/// never change them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Maximum characters per chunk handed to the engine.
    pub max_chunk_chars: usize,

    /// How long to wait for the voice list before speaking anyway.
    pub voices_ready_timeout: Duration,

    /// Per-utterance bound before the engine is considered hung.
    pub watchdog_timeout: Duration,

    /// Backoff when the engine still reports residual speech.
    pub busy_retry_delay: Duration,

    /// Pause after recovery before the next chunk is dispatched.
    pub resume_delay: Duration,

    /// Speaking rate multiplier.
    pub rate: f32,

    /// Pitch multiplier.
    pub pitch: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            voices_ready_timeout: Duration::from_millis(1000),
            watchdog_timeout: Duration::from_millis(15_000),
            busy_retry_delay: Duration::from_millis(250),
            resume_delay: Duration::from_millis(100),
            rate: 1.0,
            pitch: 1.0,
        }
    }
}
