//! Speech engine port: the capability the controller drives.
//!
//! A [`SpeechEngine`] renders one [`Utterance`] at a time and reports the
//! outcome asynchronously through [`EngineEvent`]s on a broadcast channel.
//! Events carry the [`UtteranceId`] they belong to; the controller ignores
//! events for utterances it has already detached, which is how stale
//! completions from a cancelled or timed-out utterance are kept from ending
//! the next one.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::{EngineErrorKind, SpeechError};

/// A synthesis voice reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceDescriptor {
    /// Engine-specific voice identifier.
    pub id: String,

    /// Locale tag, e.g. `"ne-NP"`.
    pub locale: String,

    /// Human-readable display name.
    pub name: String,
}

impl VoiceDescriptor {
    pub fn new(id: impl Into<String>, locale: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            locale: locale.into(),
            name: name.into(),
        }
    }

    /// `"Name (locale)"`, the form used in diagnostics.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.locale)
    }
}

/// Identifies one utterance handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtteranceId(pub u64);

impl std::fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One unit of text submitted to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    /// Locale the text should be rendered in.
    pub locale: String,
    /// Selected voice; `None` lets the engine use its default.
    pub voice: Option<VoiceDescriptor>,
    pub rate: f32,
    pub pitch: f32,
    /// 0.0 (silent) to 1.0.
    pub volume: f32,
}

impl Utterance {
    /// A zero-volume, empty utterance used to prime gesture-gated engines.
    #[must_use]
    pub fn silent(id: UtteranceId) -> Self {
        Self {
            id,
            text: String::new(),
            locale: String::new(),
            voice: None,
            rate: 1.0,
            pitch: 1.0,
            volume: 0.0,
        }
    }

    /// Whether this utterance produces no audible output.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.volume <= 0.0 || self.text.is_empty()
    }
}

/// Notifications emitted by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The set of available voices changed.
    VoicesChanged,

    /// The utterance finished playing.
    Ended { utterance: UtteranceId },

    /// The utterance failed.
    Failed {
        utterance: UtteranceId,
        error: EngineErrorKind,
    },
}

/// Backend-agnostic speech synthesis engine.
///
/// Implementations must be `Send + Sync` so a single engine can be shared by
/// the controller task and the voice directory's listener.
///
/// `speak` only starts playback; completion is reported later through an
/// [`EngineEvent`] on the channel returned by [`subscribe`](Self::subscribe).
pub trait SpeechEngine: Send + Sync {
    /// Begin speaking `utterance`.
    fn speak(&self, utterance: Utterance) -> Result<(), SpeechError>;

    /// Stop the current utterance and flush anything the engine has queued.
    fn cancel(&self);

    /// Wake a paused engine. Harmless when not paused.
    fn resume(&self);

    /// Whether the engine is currently producing audio.
    fn is_speaking(&self) -> bool;

    /// Current list of available voices (may be empty while loading).
    fn voices(&self) -> Vec<VoiceDescriptor>;

    /// Subscribe to engine notifications.
    fn subscribe(&self) -> broadcast::Receiver<EngineEvent>;
}
