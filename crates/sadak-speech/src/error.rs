//! Speech output error types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use sadak_core::CoreError;

/// Error codes a speech engine reports for a failed utterance.
///
/// These mirror the failure classes platform synthesizers expose
/// (gesture-gated playback, busy audio device, unsupported language, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineErrorKind {
    /// Playback refused until the user has interacted with the application.
    NotAllowed,
    /// The utterance was interrupted by a newer `speak` or a `cancel`.
    Interrupted,
    /// The utterance was removed from the engine queue before it started.
    Canceled,
    /// The audio output device is busy.
    AudioBusy,
    /// The audio output device failed.
    AudioHardware,
    /// The synthesizer is not available on this platform.
    SynthesisUnavailable,
    /// The synthesizer failed while rendering the text.
    SynthesisFailed,
    /// No synthesis support for the requested language.
    LanguageUnavailable,
    /// The requested voice is not available.
    VoiceUnavailable,
    /// The text exceeds what the engine accepts in one utterance.
    TextTooLong,
    /// Anything else, with the engine's own description.
    Other(String),
}

impl EngineErrorKind {
    /// Whether the engine refused playback because no user gesture unlocked audio.
    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(self, Self::NotAllowed)
    }
}

impl std::fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAllowed => f.write_str("not-allowed"),
            Self::Interrupted => f.write_str("interrupted"),
            Self::Canceled => f.write_str("canceled"),
            Self::AudioBusy => f.write_str("audio-busy"),
            Self::AudioHardware => f.write_str("audio-hardware"),
            Self::SynthesisUnavailable => f.write_str("synthesis-unavailable"),
            Self::SynthesisFailed => f.write_str("synthesis-failed"),
            Self::LanguageUnavailable => f.write_str("language-unavailable"),
            Self::VoiceUnavailable => f.write_str("voice-unavailable"),
            Self::TextTooLong => f.write_str("text-too-long"),
            Self::Other(detail) => write!(f, "other: {detail}"),
        }
    }
}

/// Errors that can occur in the speech output pipeline.
///
/// Only [`SpeechError::ControllerClosed`] and [`SpeechError::Settings`] are
/// ever returned to callers. The rest are recovered inside the controller
/// and exist so that every recovery path is logged with a typed cause.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// No voice matches the target non-English locale.
    #[error("No synthesis voice available for '{locale}'")]
    VoiceUnavailable { locale: String },

    /// The engine refuses to speak without a prior user gesture.
    #[error("Speech playback requires a user gesture; voice output disabled for this session")]
    PermissionDenied,

    /// The engine reported a failure for the active utterance.
    #[error("Speech engine error: {0}")]
    Engine(EngineErrorKind),

    /// The engine rejected the `speak` call outright.
    #[error("Speech engine rejected utterance: {0}")]
    Rejected(String),

    /// Neither completion nor error arrived within the watchdog bound.
    #[error("Speech engine hung (no completion within {}ms)", .timeout.as_millis())]
    Hang { timeout: Duration },

    /// The playback controller task has stopped.
    #[error("Speech controller is no longer running")]
    ControllerClosed,

    /// Reading or persisting user settings failed.
    #[error(transparent)]
    Settings(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_not_allowed_is_a_permission_error() {
        assert!(EngineErrorKind::NotAllowed.is_permission_denied());
        assert!(!EngineErrorKind::AudioBusy.is_permission_denied());
        assert!(!EngineErrorKind::Other("not-allowed".into()).is_permission_denied());
    }

    #[test]
    fn engine_error_codes_use_platform_spelling() {
        assert_eq!(EngineErrorKind::NotAllowed.to_string(), "not-allowed");
        assert_eq!(EngineErrorKind::TextTooLong.to_string(), "text-too-long");
        let json = serde_json::to_string(&EngineErrorKind::AudioBusy).unwrap();
        assert_eq!(json, "\"audio-busy\"");
    }

    #[test]
    fn hang_message_reports_bound_in_millis() {
        let err = SpeechError::Hang {
            timeout: Duration::from_secs(15),
        };
        assert_eq!(
            err.to_string(),
            "Speech engine hung (no completion within 15000ms)"
        );
    }
}
