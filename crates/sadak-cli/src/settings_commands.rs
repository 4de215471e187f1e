//! Settings subcommands.

use clap::{Subcommand, ValueEnum};

/// On/off switch argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub const fn enabled(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Settings command variants.
#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Show current speech settings
    Show,
    /// Turn voice responses on or off
    Voice {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Set the application language used for speech
    Language {
        /// Language code (en, np, hi, es, fr, de, zh, ja, ko, new, mai)
        code: String,
    },
    /// Restore default settings
    Reset,
}
