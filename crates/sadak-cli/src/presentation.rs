//! Terminal formatting for speech events, voices and chunks.

use std::fmt::Write as _;

use sadak_core::Settings;
use sadak_speech::{ChunkOutcome, SkipReason, SpeechEvent, VoiceDescriptor};

/// One line describing a speech event, or `None` for events not worth
/// showing (phase changes are only logged).
pub fn describe_event(event: &SpeechEvent) -> Option<String> {
    match event {
        SpeechEvent::PhaseChanged { .. } => None,
        SpeechEvent::Dispatched {
            utterance,
            text,
            locale,
            voice,
        } => {
            let voice = voice
                .as_ref()
                .map_or_else(|| "default voice".to_string(), VoiceDescriptor::label);
            Some(format!("▶ {utterance} [{locale}, {voice}] {text}"))
        }
        SpeechEvent::Skipped { text, reason } => {
            let why = match reason {
                SkipReason::VoiceUnavailable { locale } => format!("no voice for {locale}"),
                SkipReason::VoiceDisabled => "voice output is off".to_string(),
            };
            Some(format!("⤼ skipped ({why}): {text}"))
        }
        SpeechEvent::Finished { utterance, outcome } => Some(match outcome {
            ChunkOutcome::Completed => format!("✓ {utterance} done"),
            ChunkOutcome::Failed(kind) => format!("✗ {utterance} failed: {kind}"),
            ChunkOutcome::TimedOut => format!("✗ {utterance} timed out; engine reset"),
            ChunkOutcome::Cancelled => format!("■ {utterance} cancelled"),
            ChunkOutcome::Rejected => format!("✗ {utterance} rejected by engine"),
        }),
    }
}

pub fn voices_table(voices: &[VoiceDescriptor]) -> String {
    if voices.is_empty() {
        return "No voices available.".to_string();
    }

    let locale_width = voices
        .iter()
        .map(|v| v.locale.len())
        .max()
        .unwrap_or(0)
        .max("LOCALE".len());
    let name_width = voices
        .iter()
        .map(|v| v.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = format!("{:<locale_width$}  {:<name_width$}  ID\n", "LOCALE", "NAME");
    for voice in voices {
        let _ = writeln!(
            out,
            "{:<locale_width$}  {:<name_width$}  {}",
            voice.locale, voice.name, voice.id
        );
    }
    out
}

pub fn chunk_listing(chunks: &[String]) -> String {
    if chunks.is_empty() {
        return "Nothing to speak.".to_string();
    }
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let _ = writeln!(out, "[{}] ({} chars) {}", i + 1, chunk.chars().count(), chunk);
    }
    out
}

pub fn settings_summary(settings: &Settings) -> String {
    format!(
        "  voice_response_enabled: {}\n  app_language:           {}",
        settings.effective_voice_enabled(),
        settings.effective_language()
    )
}
