//! Resolve command handler.

use sadak_core::is_supported_language;
use sadak_speech::{SpeechEngine, VoiceDescriptor, resolve_in};

use crate::bootstrap::CliContext;

/// Show the locale and voice a language code resolves to on this engine.
pub fn execute(ctx: &CliContext, code: &str) {
    if !is_supported_language(code) {
        println!("'{code}' is not an application language; falling back.");
    }

    let resolution = resolve_in(code, &ctx.engine.voices());
    println!("language: {code}");
    println!("locale:   {}", resolution.locale);
    println!(
        "voice:    {}",
        resolution
            .voice
            .as_ref()
            .map_or_else(|| "none".to_string(), VoiceDescriptor::label)
    );
    if resolution.should_skip() {
        println!("Speech in this language would be skipped (no matching voice).");
    } else if resolution.voice.is_none() {
        println!("Speech would use the engine's default voice.");
    }
}
