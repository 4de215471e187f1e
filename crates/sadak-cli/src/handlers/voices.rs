//! Voices command handler.

use sadak_speech::SpeechEngine;

use crate::bootstrap::CliContext;
use crate::presentation::voices_table;

pub fn execute(ctx: &CliContext) {
    print!("{}", voices_table(&ctx.engine.voices()));
}
