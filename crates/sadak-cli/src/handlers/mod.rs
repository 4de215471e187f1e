//! Command handlers.
//!
//! Handlers follow one pattern: `execute(ctx, ...) -> Result<()>`, parse
//! CLI-specific input, call into the speech service or settings service,
//! and format the result for the terminal.

pub mod chunk;
pub mod repl;
pub mod resolve;
pub mod settings;
pub mod speak;
pub mod voices;

use anyhow::Result;
use tokio::sync::mpsc;

use sadak_core::is_supported_language;
use sadak_speech::{SpeechEvent, SpeechService};

use crate::error::CliError;
use crate::presentation::describe_event;

/// Print speech events until the queue is drained. Ctrl-C cancels playback.
pub(crate) async fn follow_until_idle(
    service: &SpeechService,
    events: &mut mpsc::UnboundedReceiver<SpeechEvent>,
) -> Result<()> {
    let handle = service.handle().clone();
    let idle = handle.wait_idle();
    tokio::pin!(idle);

    loop {
        tokio::select! {
            result = &mut idle => {
                result.map_err(CliError::from)?;
                break;
            }
            Some(event) = events.recv() => print_event(&event),
            _ = tokio::signal::ctrl_c() => {
                println!("Cancelling...");
                service.cancel();
            }
        }
    }

    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }
    Ok(())
}

pub(crate) fn print_event(event: &SpeechEvent) {
    if let Some(line) = describe_event(event) {
        println!("{line}");
    }
}

/// Reject language codes the dashboard has no translation for.
pub(crate) fn check_language(code: &str) -> Result<(), CliError> {
    if is_supported_language(code) {
        Ok(())
    } else {
        Err(CliError::Arguments(format!(
            "unsupported language '{code}' (expected one of: {})",
            sadak_core::SUPPORTED_LANGUAGES.join(", ")
        )))
    }
}
