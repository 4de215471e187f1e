//! Process-wide flags that gate speech output.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use sadak_core::Settings;

/// Shared voice-output flags and the current language.
///
/// Cloning is cheap and every clone observes the same state. The controller
/// reads these at dispatch time, so a change made between two chunks applies
/// to the second one.
#[derive(Debug, Clone)]
pub struct SpeechContext {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    voice_enabled: AtomicBool,
    audio_unlocked: AtomicBool,
    language: RwLock<String>,
}

impl SpeechContext {
    pub fn new(voice_enabled: bool, language: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                voice_enabled: AtomicBool::new(voice_enabled),
                audio_unlocked: AtomicBool::new(false),
                language: RwLock::new(language.into()),
            }),
        }
    }

    /// Build a context from stored settings. Audio starts locked.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.effective_voice_enabled(),
            settings.effective_language(),
        )
    }

    pub fn voice_enabled(&self) -> bool {
        self.inner.voice_enabled.load(Ordering::SeqCst)
    }

    pub fn set_voice_enabled(&self, enabled: bool) {
        let old = self.inner.voice_enabled.swap(enabled, Ordering::SeqCst);
        if old != enabled {
            tracing::debug!(old, new = enabled, "Voice output flag changed");
        }
    }

    pub fn audio_unlocked(&self) -> bool {
        self.inner.audio_unlocked.load(Ordering::SeqCst)
    }

    /// Record the first user gesture. Returns `true` only on the call that
    /// actually unlocked audio.
    pub fn unlock_audio(&self) -> bool {
        !self.inner.audio_unlocked.swap(true, Ordering::SeqCst)
    }

    pub fn language(&self) -> String {
        self.inner
            .language
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_language(&self, code: impl Into<String>) {
        let code = code.into();
        let mut guard = self
            .inner
            .language
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(old = %*guard, new = %code, "Speech language changed");
        *guard = code;
    }

    /// Whether a `speak` request should be accepted at all.
    pub fn can_speak(&self) -> bool {
        self.audio_unlocked() && self.voice_enabled()
    }
}
