//! Shared fixtures for sadak-speech integration tests.
//!
//! [`ScriptedEngine`] records every utterance and never finishes one on its
//! own: tests decide when (and how) each utterance ends.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sadak_core::{RepositoryError, Settings, SettingsRepository, SettingsService};
use sadak_speech::{
    ChunkOutcome, EngineErrorKind, EngineEvent, SpeechEngine, SpeechError, SpeechEvent,
    Utterance, UtteranceId, VoiceDescriptor,
};
use tokio::sync::{broadcast, mpsc};

const EVENT_WAIT: Duration = Duration::from_secs(60);

pub fn voice(locale: &str) -> VoiceDescriptor {
    VoiceDescriptor::new(format!("test.{locale}"), locale, format!("Test {locale}"))
}

// ── Scripted engine ────────────────────────────────────────────────

pub struct ScriptedEngine {
    spoken: Mutex<Vec<Utterance>>,
    voices: Mutex<Vec<VoiceDescriptor>>,
    speaking: AtomicBool,
    reject_next: AtomicBool,
    cancels: AtomicUsize,
    events: broadcast::Sender<EngineEvent>,
}

impl ScriptedEngine {
    pub fn new(voices: Vec<VoiceDescriptor>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            spoken: Mutex::new(Vec::new()),
            voices: Mutex::new(voices),
            speaking: AtomicBool::new(false),
            reject_next: AtomicBool::new(false),
            cancels: AtomicUsize::new(0),
            events,
        })
    }

    /// Engine with US English and Nepali voices.
    pub fn with_default_voices() -> Arc<Self> {
        Self::new(vec![voice("en-US"), voice("ne-NP")])
    }

    /// Audible utterances, in the order they were handed to the engine.
    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .filter(|u| !u.is_silent())
            .map(|u| u.text.clone())
            .collect()
    }

    pub fn prime_count(&self) -> usize {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.is_silent())
            .count()
    }

    pub fn last_utterance(&self) -> Option<Utterance> {
        self.spoken.lock().unwrap().last().cloned()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn set_speaking(&self, speaking: bool) {
        self.speaking.store(speaking, Ordering::SeqCst);
    }

    pub fn set_voices(&self, voices: Vec<VoiceDescriptor>) {
        *self.voices.lock().unwrap() = voices;
        let _ = self.events.send(EngineEvent::VoicesChanged);
    }

    pub fn fail_next_speak(&self) {
        self.reject_next.store(true, Ordering::SeqCst);
    }

    pub fn finish(&self, utterance: UtteranceId) {
        self.speaking.store(false, Ordering::SeqCst);
        let _ = self.events.send(EngineEvent::Ended { utterance });
    }

    pub fn fail(&self, utterance: UtteranceId, error: EngineErrorKind) {
        self.speaking.store(false, Ordering::SeqCst);
        let _ = self.events.send(EngineEvent::Failed { utterance, error });
    }
}

impl SpeechEngine for ScriptedEngine {
    fn speak(&self, utterance: Utterance) -> Result<(), SpeechError> {
        if self.reject_next.swap(false, Ordering::SeqCst) {
            return Err(SpeechError::Rejected("scripted rejection".to_string()));
        }
        if !utterance.is_silent() {
            self.speaking.store(true, Ordering::SeqCst);
        }
        self.spoken.lock().unwrap().push(utterance);
        Ok(())
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        self.speaking.store(false, Ordering::SeqCst);
    }

    fn resume(&self) {}

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn voices(&self) -> Vec<VoiceDescriptor> {
        self.voices.lock().unwrap().clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}

// ── In-memory settings ─────────────────────────────────────────────

#[derive(Default)]
pub struct MemorySettings {
    stored: Mutex<Settings>,
}

impl MemorySettings {
    pub fn with(settings: Settings) -> Arc<Self> {
        Arc::new(Self {
            stored: Mutex::new(settings),
        })
    }

    pub fn stored(&self) -> Settings {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl SettingsRepository for MemorySettings {
    async fn load(&self) -> Result<Settings, RepositoryError> {
        Ok(self.stored())
    }

    async fn save(&self, settings: &Settings) -> Result<(), RepositoryError> {
        *self.stored.lock().unwrap() = settings.clone();
        Ok(())
    }
}

pub fn settings_service(repo: &Arc<MemorySettings>) -> Arc<SettingsService> {
    Arc::new(SettingsService::new(Arc::clone(repo) as Arc<dyn SettingsRepository>))
}

// ── Event helpers ──────────────────────────────────────────────────

pub async fn next_event(events: &mut mpsc::UnboundedReceiver<SpeechEvent>) -> SpeechEvent {
    tokio::time::timeout(EVENT_WAIT, events.recv())
        .await
        .expect("timed out waiting for speech event")
        .expect("speech event channel closed")
}

/// Skip ahead to the next chunk handed to the engine.
pub async fn next_dispatch(
    events: &mut mpsc::UnboundedReceiver<SpeechEvent>,
) -> (UtteranceId, String, String, Option<VoiceDescriptor>) {
    loop {
        if let SpeechEvent::Dispatched {
            utterance,
            text,
            locale,
            voice,
        } = next_event(events).await
        {
            return (utterance, text, locale, voice);
        }
    }
}

/// Skip ahead to the next finished chunk.
pub async fn next_finished(
    events: &mut mpsc::UnboundedReceiver<SpeechEvent>,
) -> (UtteranceId, ChunkOutcome) {
    loop {
        if let SpeechEvent::Finished { utterance, outcome } = next_event(events).await {
            return (utterance, outcome);
        }
    }
}

/// Drain whatever events are already buffered.
pub fn drain_ready(events: &mut mpsc::UnboundedReceiver<SpeechEvent>) -> Vec<SpeechEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}
