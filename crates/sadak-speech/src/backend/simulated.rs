//! In-process speech engine that "speaks" by sleeping.
//!
//! Playback time is proportional to text length. Completion and
//! cancellation are reported through the same [`EngineEvent`] channel a
//! platform synthesizer would use, which makes this engine suitable for
//! driving the controller end to end without an audio device.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::broadcast;

use crate::engine::{EngineEvent, SpeechEngine, Utterance, UtteranceId, VoiceDescriptor};
use crate::error::{EngineErrorKind, SpeechError};

const EVENT_CAPACITY: usize = 64;
const DEFAULT_CHARS_PER_SECOND: u64 = 15;

/// Voices a typical desktop platform ships with. No Nepali voice.
pub fn default_voices() -> Vec<VoiceDescriptor> {
    [
        ("en-US", "Samantha"),
        ("en-GB", "Daniel"),
        ("hi-IN", "Lekha"),
        ("es-ES", "Monica"),
        ("fr-FR", "Thomas"),
        ("de-DE", "Anna"),
        ("ja-JP", "Kyoko"),
        ("ko-KR", "Yuna"),
        ("zh-CN", "Tingting"),
    ]
    .into_iter()
    .map(|(locale, name)| VoiceDescriptor::new(format!("sim.{locale}.{name}"), locale, name))
    .collect()
}

/// Timed, in-process [`SpeechEngine`].
pub struct SimulatedEngine {
    shared: Arc<Shared>,
    chars_per_second: u64,
}

struct Shared {
    voices: RwLock<Vec<VoiceDescriptor>>,
    speaking: AtomicBool,
    /// Bumped on every `speak` and `cancel`; a playback task only reports
    /// completion if the generation it started with is still current.
    generation: AtomicU64,
    current: Mutex<Option<UtteranceId>>,
    events: broadcast::Sender<EngineEvent>,
}

impl Shared {
    fn emit(&self, event: EngineEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn take_current(&self) -> Option<UtteranceId> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl SimulatedEngine {
    /// Engine with [`default_voices`].
    pub fn new() -> Self {
        Self::with_voices(default_voices())
    }

    /// Engine with an explicit voice list. An empty list simulates a
    /// platform that loads its voices late.
    pub fn with_voices(voices: Vec<VoiceDescriptor>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                voices: RwLock::new(voices),
                speaking: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                current: Mutex::new(None),
                events,
            }),
            chars_per_second: DEFAULT_CHARS_PER_SECOND,
        }
    }

    /// Override the simulated speaking speed.
    #[must_use]
    pub fn with_chars_per_second(mut self, chars_per_second: u64) -> Self {
        self.chars_per_second = chars_per_second.max(1);
        self
    }

    /// Replace the voice list and notify subscribers.
    pub fn set_voices(&self, voices: Vec<VoiceDescriptor>) {
        publish(&self.shared, voices);
    }

    /// Replace the voice list after `delay`, like a platform that finishes
    /// loading voices in the background.
    pub fn publish_voices_after(&self, voices: Vec<VoiceDescriptor>, delay: Duration) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            publish(&shared, voices);
        });
    }

    /// How long `text` takes to speak.
    pub fn playback_duration(&self, text: &str) -> Duration {
        let chars = u64::try_from(text.chars().count()).unwrap_or(u64::MAX);
        Duration::from_millis(chars.saturating_mul(1000) / self.chars_per_second)
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn publish(shared: &Shared, voices: Vec<VoiceDescriptor>) {
    let count = voices.len();
    *shared.voices.write().unwrap_or_else(PoisonError::into_inner) = voices;
    tracing::debug!(count, "Simulated engine voices published");
    shared.emit(EngineEvent::VoicesChanged);
}

impl SpeechEngine for SimulatedEngine {
    fn speak(&self, utterance: Utterance) -> Result<(), SpeechError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SpeechError::Rejected(format!("no async runtime: {e}")))?;

        let id = utterance.id;
        if utterance.is_silent() {
            self.shared.emit(EngineEvent::Ended { utterance: id });
            return Ok(());
        }

        // A new utterance interrupts whatever is playing.
        if let Some(previous) = self.shared.take_current() {
            self.shared.emit(EngineEvent::Failed {
                utterance: previous,
                error: EngineErrorKind::Interrupted,
            });
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let duration = self.playback_duration(&utterance.text);
        *self
            .shared
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(id);
        self.shared.speaking.store(true, Ordering::SeqCst);

        tracing::info!(
            utterance = %id,
            locale = %utterance.locale,
            voice = utterance.voice.as_ref().map(VoiceDescriptor::label),
            duration_ms = duration.as_millis(),
            text = %utterance.text,
            "Speaking"
        );

        let shared = Arc::clone(&self.shared);
        runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if shared.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            shared.speaking.store(false, Ordering::SeqCst);
            shared.take_current();
            shared.emit(EngineEvent::Ended { utterance: id });
        });

        Ok(())
    }

    fn cancel(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.speaking.store(false, Ordering::SeqCst);
        if let Some(id) = self.shared.take_current() {
            tracing::debug!(utterance = %id, "Simulated playback interrupted");
            self.shared.emit(EngineEvent::Failed {
                utterance: id,
                error: EngineErrorKind::Interrupted,
            });
        }
    }

    fn resume(&self) {}

    fn is_speaking(&self) -> bool {
        self.shared.speaking.load(Ordering::SeqCst)
    }

    fn voices(&self) -> Vec<VoiceDescriptor> {
        self.shared
            .voices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.shared.events.subscribe()
    }
}
