//! Self-healing speech output for the sadak dashboard.
//!
//! Text handed to [`SpeechHandle::speak`] is stripped of markdown emphasis,
//! split into bounded chunks and queued. A single controller task speaks the
//! chunks one at a time through a [`SpeechEngine`], choosing a voice for the
//! current application language at the moment each chunk is dispatched.
//!
//! Every utterance is guarded by a [`Watchdog`]; a completion, an engine
//! error or a watchdog expiry all lead back to an idle controller that picks
//! up the next chunk, so one bad utterance never stalls the queue.
//!
//! ```text
//!   speak(text) → chunker → queue → controller → engine
//!                                      ▲   │
//!                     voice directory ─┘   └─ watchdog
//! ```
#![deny(unused_crate_dependencies)]

pub mod backend;
pub mod chunker;
pub mod config;
pub mod context;
pub mod controller;
pub mod engine;
pub mod error;
pub mod language;
pub mod service;
pub mod voices;
pub mod watchdog;

pub use backend::SimulatedEngine;
pub use chunker::{DEFAULT_MAX_CHUNK_CHARS, prepare, split, strip_emphasis_marks};
pub use config::SpeechConfig;
pub use context::SpeechContext;
pub use controller::{
    ChunkOutcome, PlaybackController, PlaybackPhase, SkipReason, SpeechEvent, SpeechHandle,
};
pub use engine::{EngineEvent, SpeechEngine, Utterance, UtteranceId, VoiceDescriptor};
pub use error::{EngineErrorKind, SpeechError};
pub use language::{FALLBACK_LOCALE, LanguageResolver, Resolution, locale_for, resolve_in};
pub use service::SpeechService;
pub use voices::VoiceDirectory;
pub use watchdog::Watchdog;

// Used only by integration tests.
#[cfg(test)]
use async_trait as _;
