//! Main commands enum.

use clap::Subcommand;

use crate::settings_commands::SettingsCommand;

/// Available `sadak` commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Speak text through the simulated engine and follow playback
    Speak {
        /// Text to speak (words are joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,
        /// Language code for this invocation only (e.g. "np", "hi")
        #[arg(short, long)]
        lang: Option<String>,
    },

    /// Show how text would be split into speech chunks
    Chunk {
        /// Text to split
        text: String,
        /// Maximum characters per chunk
        #[arg(long, default_value_t = sadak_speech::DEFAULT_MAX_CHUNK_CHARS)]
        max_chars: usize,
    },

    /// Show which locale and voice a language code resolves to
    Resolve {
        /// Application language code (e.g. "np", "mai")
        lang: String,
    },

    /// List the voices the engine offers
    Voices,

    /// Interactive session: each line is spoken, /help for commands
    Repl,

    /// View or change speech settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}
