//! Speak command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::handlers::{check_language, follow_until_idle};

/// Speak `words` and follow playback until done.
///
/// `lang` overrides the stored language for this invocation only.
pub async fn execute(ctx: &CliContext, words: &[String], lang: Option<&str>) -> Result<()> {
    let (service, mut events) = ctx.start_speech().await?;
    let handle = service.handle();

    if let Some(code) = lang {
        check_language(code)?;
        handle.context().set_language(code);
    }

    // Running the command is the user gesture.
    service.unlock_audio();

    if !handle.is_voice_response_enabled() {
        println!("Voice responses are off. Turn them on with: sadak settings voice on");
        return Ok(());
    }

    let queued = service.speak(&words.join(" "));
    if queued == 0 {
        println!("Nothing to speak.");
        return Ok(());
    }
    tracing::debug!(chunks = queued, "Queued speech");

    follow_until_idle(&service, &mut events).await
}
