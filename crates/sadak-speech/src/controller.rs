//! Playback controller: serializes chunks through the engine and recovers
//! from every way an utterance can go wrong.
//!
//! ```text
//!   Idle → Dispatching → Speaking → Recovering → Idle
//!    ▲         │  (skip / cancel)       ▲
//!    │         └────────────────────────┘
//!    └── resume delay ── drain next chunk
//! ```
//!
//! The controller runs as a single tokio task that owns the queue, the
//! active utterance and its watchdog. [`SpeechHandle`] is the `Clone + Send
//! + Sync` proxy callers hold; every operation becomes a command on one
//! ordered channel, so a `cancel` always takes effect before text enqueued
//! after it.
//!
//! Completion, engine errors and watchdog expiry all converge on the same
//! recovery path. Events for an utterance that has already been detached
//! are ignored.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, Sleep};

use sadak_core::{SettingsService, SettingsUpdate};

use crate::chunker;
use crate::config::SpeechConfig;
use crate::context::SpeechContext;
use crate::engine::{EngineEvent, SpeechEngine, Utterance, UtteranceId, VoiceDescriptor};
use crate::error::{EngineErrorKind, SpeechError};
use crate::language::LanguageResolver;
use crate::voices::VoiceDirectory;
use crate::watchdog::{self, Watchdog};

/// Characters of the failing text included in error logs.
const ERROR_PREVIEW_CHARS: usize = 100;

// ── Public types ───────────────────────────────────────────────────

/// Where the controller is in the life of the current chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// Nothing in flight.
    Idle,
    /// A chunk has been taken off the queue and is being prepared.
    Dispatching,
    /// The engine is speaking the active utterance.
    Speaking,
    /// The active utterance is being torn down.
    Recovering,
}

/// Why a chunk was dropped without reaching the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No voice for a non-English locale.
    VoiceUnavailable { locale: String },
    /// Voice output was switched off after the chunk was queued.
    VoiceDisabled,
}

/// How a dispatched chunk ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Completed,
    Failed(EngineErrorKind),
    TimedOut,
    Cancelled,
    /// The engine refused the `speak` call itself.
    Rejected,
}

/// Notifications for observers (UI, CLI, tests).
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    PhaseChanged {
        old: PlaybackPhase,
        new: PlaybackPhase,
    },
    Dispatched {
        utterance: UtteranceId,
        text: String,
        locale: String,
        voice: Option<VoiceDescriptor>,
    },
    Skipped {
        text: String,
        reason: SkipReason,
    },
    Finished {
        utterance: UtteranceId,
        outcome: ChunkOutcome,
    },
}

// ── Commands ───────────────────────────────────────────────────────

enum Command {
    /// Append chunks to the queue and try to drain.
    Enqueue(Vec<String>),

    /// Drop everything queued and stop the engine.
    Cancel,

    /// Speak a silent utterance so gesture-gated engines accept later ones.
    PrimeAudio,

    /// Reply once the queue is empty and nothing is in flight.
    WhenIdle(oneshot::Sender<()>),
}

// ── Handle ─────────────────────────────────────────────────────────

/// Cheap, cloneable entry point to a running [`PlaybackController`].
#[derive(Clone)]
pub struct SpeechHandle {
    commands: mpsc::UnboundedSender<Command>,
    phase: watch::Receiver<PlaybackPhase>,
    context: SpeechContext,
    directory: VoiceDirectory,
    max_chunk_chars: usize,
}

impl SpeechHandle {
    /// Queue `text` for speech. Fire-and-forget.
    ///
    /// Ignored unless audio is unlocked and voice output is enabled. Emphasis
    /// marks are stripped and the text is chunked before queueing. Returns the
    /// number of chunks queued.
    pub fn speak(&self, text: &str) -> usize {
        if !self.context.can_speak() {
            tracing::debug!(
                audio_unlocked = self.context.audio_unlocked(),
                voice_enabled = self.context.voice_enabled(),
                "Speech request ignored"
            );
            return 0;
        }

        let chunks = chunker::prepare(text, self.max_chunk_chars);
        if chunks.is_empty() {
            return 0;
        }

        let count = chunks.len();
        if self.send(Command::Enqueue(chunks)) {
            count
        } else {
            0
        }
    }

    /// Stop speaking and discard everything queued.
    pub fn cancel(&self) {
        self.send(Command::Cancel);
    }

    /// Record the first user gesture and prime the engine.
    ///
    /// Returns `true` on the call that unlocked audio; later calls do nothing.
    pub fn unlock_audio(&self) -> bool {
        if !self.context.unlock_audio() {
            return false;
        }
        tracing::info!("Audio unlocked");
        self.send(Command::PrimeAudio);
        true
    }

    /// Wait until the queue is drained and nothing is in flight.
    pub async fn wait_idle(&self) -> Result<(), SpeechError> {
        let (tx, rx) = oneshot::channel();
        if !self.send(Command::WhenIdle(tx)) {
            return Err(SpeechError::ControllerClosed);
        }
        rx.await.map_err(|_| SpeechError::ControllerClosed)
    }

    pub fn phase(&self) -> PlaybackPhase {
        *self.phase.borrow()
    }

    /// Subscribe to phase changes.
    pub fn watch_phase(&self) -> watch::Receiver<PlaybackPhase> {
        self.phase.clone()
    }

    pub fn is_voice_response_enabled(&self) -> bool {
        self.context.voice_enabled()
    }

    pub const fn context(&self) -> &SpeechContext {
        &self.context
    }

    /// Voices currently known to the controller.
    pub fn voices(&self) -> Vec<VoiceDescriptor> {
        self.directory.voices()
    }

    fn send(&self, command: Command) -> bool {
        if self.commands.send(command).is_err() {
            tracing::warn!("{}", SpeechError::ControllerClosed);
            return false;
        }
        true
    }
}

// ── Controller ─────────────────────────────────────────────────────

/// The actor that owns all playback state.
pub struct PlaybackController {
    engine: Arc<dyn SpeechEngine>,
    context: SpeechContext,
    config: SpeechConfig,
    settings: Option<Arc<SettingsService>>,
    directory: VoiceDirectory,
    resolver: LanguageResolver,

    queue: VecDeque<String>,
    active: Option<Utterance>,
    watchdog: Option<Watchdog>,
    /// Pending drain attempt (busy backoff or post-recovery pause).
    retry: Option<Pin<Box<Sleep>>>,
    next_id: u64,

    phase: watch::Sender<PlaybackPhase>,
    events: mpsc::UnboundedSender<SpeechEvent>,
    idle_waiters: Vec<oneshot::Sender<()>>,
}

impl PlaybackController {
    /// Start the controller task.
    ///
    /// `settings` is used to persist voice output being switched off after a
    /// permission error; pass `None` to keep that change in memory only.
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        engine: Arc<dyn SpeechEngine>,
        context: SpeechContext,
        config: SpeechConfig,
        settings: Option<Arc<SettingsService>>,
    ) -> (SpeechHandle, mpsc::UnboundedReceiver<SpeechEvent>) {
        let engine_events = engine.subscribe();
        let directory = VoiceDirectory::spawn(Arc::clone(&engine), config.voices_ready_timeout);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (phase_tx, phase_rx) = watch::channel(PlaybackPhase::Idle);

        let handle = SpeechHandle {
            commands: command_tx,
            phase: phase_rx,
            context: context.clone(),
            directory: directory.clone(),
            max_chunk_chars: config.max_chunk_chars,
        };

        let controller = Self {
            engine,
            context,
            config,
            settings,
            resolver: LanguageResolver::new(directory.clone()),
            directory,
            queue: VecDeque::new(),
            active: None,
            watchdog: None,
            retry: None,
            next_id: 0,
            phase: phase_tx,
            events: event_tx,
            idle_waiters: Vec::new(),
        };

        tokio::spawn(controller.run(command_rx, engine_events));
        (handle, event_rx)
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut engine_events: broadcast::Receiver<EngineEvent>,
    ) {
        tracing::debug!("Speech controller started");
        let mut engine_open = true;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command, &mut commands).await,
                    None => break,
                },
                event = engine_events.recv(), if engine_open => match event {
                    Ok(event) => self.handle_engine_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Speech controller lagged behind engine events");
                    }
                    Err(RecvError::Closed) => {
                        tracing::warn!("Speech engine event channel closed; relying on watchdog");
                        engine_open = false;
                    }
                },
                utterance = watchdog::expired(&mut self.watchdog) => self.on_watchdog(utterance),
                () = retry_elapsed(&mut self.retry) => {
                    self.retry = None;
                    self.drain(&mut commands).await;
                }
            }
            self.notify_idle_waiters();
        }

        self.engine.cancel();
        tracing::debug!("Speech controller stopped");
    }

    async fn handle_command(
        &mut self,
        command: Command,
        commands: &mut mpsc::UnboundedReceiver<Command>,
    ) {
        match command {
            Command::Enqueue(chunks) => {
                tracing::debug!(chunks = chunks.len(), queued = self.queue.len(), "Enqueue");
                self.queue.extend(chunks);
                self.drain(commands).await;
            }
            Command::Cancel => self.cancel(),
            Command::PrimeAudio => self.prime_audio(),
            Command::WhenIdle(reply) => self.idle_waiters.push(reply),
        }
    }

    // ── Draining ───────────────────────────────────────────────────

    async fn drain(&mut self, commands: &mut mpsc::UnboundedReceiver<Command>) {
        if self.phase() != PlaybackPhase::Idle || self.queue.is_empty() {
            return;
        }

        if self.engine.is_speaking() {
            tracing::debug!(
                retry_ms = self.config.busy_retry_delay.as_millis(),
                "Engine still speaking; deferring next chunk"
            );
            self.schedule_drain(self.config.busy_retry_delay);
            return;
        }

        let Some(text) = self.queue.pop_front() else {
            return;
        };
        self.set_phase(PlaybackPhase::Dispatching);
        self.dispatch(text, commands).await;
    }

    async fn dispatch(&mut self, text: String, commands: &mut mpsc::UnboundedReceiver<Command>) {
        if !self.await_voices(commands).await {
            tracing::debug!("Dispatch aborted before reaching the engine");
            return;
        }

        if !self.context.voice_enabled() {
            tracing::debug!("Voice output disabled; dropping chunk");
            self.emit(SpeechEvent::Skipped {
                text,
                reason: SkipReason::VoiceDisabled,
            });
            self.recover();
            return;
        }

        // Read now, not at enqueue time, so a language switch applies to
        // every chunk dispatched after it.
        let code = self.context.language();
        let resolution = self.resolver.resolve(&code);
        if resolution.should_skip() {
            let err = SpeechError::VoiceUnavailable {
                locale: resolution.locale.clone(),
            };
            tracing::warn!(code = %code, error = %err, "Skipping speech chunk");
            self.emit(SpeechEvent::Skipped {
                text,
                reason: SkipReason::VoiceUnavailable {
                    locale: resolution.locale,
                },
            });
            self.recover();
            return;
        }

        let utterance = Utterance {
            id: self.next_utterance_id(),
            text,
            locale: resolution.locale,
            voice: resolution.voice,
            rate: self.config.rate,
            pitch: self.config.pitch,
            volume: 1.0,
        };
        let id = utterance.id;

        self.watchdog = Some(Watchdog::arm(id, self.config.watchdog_timeout));
        self.active = Some(utterance.clone());
        self.set_phase(PlaybackPhase::Speaking);
        self.emit(SpeechEvent::Dispatched {
            utterance: id,
            text: utterance.text.clone(),
            locale: utterance.locale.clone(),
            voice: utterance.voice.clone(),
        });

        self.engine.resume();
        if let Err(err) = self.engine.speak(utterance) {
            tracing::error!(utterance = %id, error = %err, "Critical error in speech processing");
            self.engine.cancel();
            self.finish(ChunkOutcome::Rejected);
        }
    }

    /// Wait for the voice list, still serving commands meanwhile.
    ///
    /// Returns `false` if a cancel (or shutdown) arrived first; the chunk
    /// being dispatched is then dropped.
    async fn await_voices(&mut self, commands: &mut mpsc::UnboundedReceiver<Command>) -> bool {
        if self.directory.is_ready() {
            return true;
        }

        let ready = self.directory.ready();
        tokio::pin!(ready);
        loop {
            tokio::select! {
                () = &mut ready => return true,
                command = commands.recv() => match command {
                    Some(Command::Cancel) => {
                        self.cancel();
                        return false;
                    }
                    Some(Command::Enqueue(chunks)) => self.queue.extend(chunks),
                    Some(Command::PrimeAudio) => {
                        tracing::debug!("Audio prime skipped while dispatching");
                    }
                    Some(Command::WhenIdle(reply)) => self.idle_waiters.push(reply),
                    None => {
                        self.queue.clear();
                        self.recover();
                        return false;
                    }
                },
            }
        }
    }

    // ── Engine outcomes ────────────────────────────────────────────

    async fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::VoicesChanged => {}
            EngineEvent::Ended { utterance } => {
                if self.is_active(utterance) {
                    tracing::debug!(%utterance, "Utterance finished");
                    self.finish(ChunkOutcome::Completed);
                } else {
                    tracing::trace!(%utterance, "Ignoring end of detached utterance");
                }
            }
            EngineEvent::Failed { utterance, error } => {
                if self.is_active(utterance) {
                    self.on_engine_error(error).await;
                } else {
                    tracing::trace!(%utterance, %error, "Ignoring error of detached utterance");
                }
            }
        }
    }

    async fn on_engine_error(&mut self, kind: EngineErrorKind) {
        if let Some(active) = &self.active {
            tracing::error!(
                utterance = %active.id,
                error = %SpeechError::Engine(kind.clone()),
                text = %preview(&active.text),
                lang_requested = %active.locale,
                voice_found = %active
                    .voice
                    .as_ref()
                    .map_or_else(|| "none".to_string(), VoiceDescriptor::label),
                "Speech synthesis error"
            );
        }

        if kind.is_permission_denied() {
            tracing::warn!("{}", SpeechError::PermissionDenied);
            self.context.set_voice_enabled(false);
            if let Some(settings) = &self.settings {
                if let Err(err) = settings.update(SettingsUpdate::voice_enabled(false)).await {
                    tracing::warn!(error = %err, "Failed to persist disabled voice output");
                }
            }
        }

        self.engine.cancel();
        self.finish(ChunkOutcome::Failed(kind));
    }

    fn on_watchdog(&mut self, utterance: UtteranceId) {
        let err = SpeechError::Hang {
            timeout: self.config.watchdog_timeout,
        };
        tracing::warn!(%utterance, error = %err, "Watchdog fired; resetting engine");
        self.engine.cancel();
        self.finish(ChunkOutcome::TimedOut);
    }

    // ── Recovery ───────────────────────────────────────────────────

    fn finish(&mut self, outcome: ChunkOutcome) {
        if let Some(active) = self.active.take() {
            self.emit(SpeechEvent::Finished {
                utterance: active.id,
                outcome,
            });
        }
        self.recover();
    }

    /// Tear down the active utterance and return to `Idle`.
    fn recover(&mut self) {
        self.set_phase(PlaybackPhase::Recovering);
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.disarm();
        }
        if let Some(detached) = self.active.take() {
            tracing::trace!(utterance = %detached.id, "Utterance detached");
        }
        self.set_phase(PlaybackPhase::Idle);

        if !self.queue.is_empty() {
            self.schedule_drain(self.config.resume_delay);
        }
    }

    fn cancel(&mut self) {
        let dropped = self.queue.len();
        self.queue.clear();
        self.retry = None;
        self.engine.cancel();

        if let Some(active) = self.active.take() {
            self.emit(SpeechEvent::Finished {
                utterance: active.id,
                outcome: ChunkOutcome::Cancelled,
            });
        }
        tracing::info!(dropped, "Speech cancelled");

        if self.phase() != PlaybackPhase::Idle {
            self.recover();
        }
    }

    fn prime_audio(&mut self) {
        if self.phase() != PlaybackPhase::Idle || self.engine.is_speaking() {
            tracing::debug!("Engine busy; skipping audio prime");
            return;
        }
        let utterance = Utterance::silent(self.next_utterance_id());
        self.engine.resume();
        if let Err(err) = self.engine.speak(utterance) {
            tracing::debug!(error = %err, "Audio prime rejected");
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn schedule_drain(&mut self, delay: Duration) {
        let deadline = Instant::now() + delay;
        if self
            .retry
            .as_ref()
            .is_some_and(|pending| pending.deadline() <= deadline)
        {
            return;
        }
        self.retry = Some(Box::pin(tokio::time::sleep_until(deadline)));
    }

    fn phase(&self) -> PlaybackPhase {
        *self.phase.borrow()
    }

    fn set_phase(&self, new: PlaybackPhase) {
        let old = self.phase.send_replace(new);
        if old != new {
            tracing::debug!(old = ?old, new = ?new, "Playback phase changed");
            self.emit(SpeechEvent::PhaseChanged { old, new });
        }
    }

    fn emit(&self, event: SpeechEvent) {
        // Observers are optional.
        let _ = self.events.send(event);
    }

    fn is_active(&self, utterance: UtteranceId) -> bool {
        self.active.as_ref().is_some_and(|a| a.id == utterance)
    }

    const fn next_utterance_id(&mut self) -> UtteranceId {
        self.next_id += 1;
        UtteranceId(self.next_id)
    }

    fn is_idle(&self) -> bool {
        self.phase() == PlaybackPhase::Idle && self.queue.is_empty() && self.active.is_none()
    }

    fn notify_idle_waiters(&mut self) {
        if self.idle_waiters.is_empty() || !self.is_idle() {
            return;
        }
        for waiter in self.idle_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }
}

/// Resolves when the pending drain attempt is due; never while none is.
async fn retry_elapsed(slot: &mut Option<Pin<Box<Sleep>>>) {
    match slot {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

fn preview(text: &str) -> String {
    let head: String = text.chars().take(ERROR_PREVIEW_CHARS).collect();
    format!("{head}...")
}
