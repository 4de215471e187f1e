//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Speech output for the Kathmandu road dashboard.
#[derive(Parser)]
#[command(name = "sadak")]
#[command(about = "Self-healing speech output for the Kathmandu road dashboard")]
#[command(version)]
pub struct Cli {
    /// Directory holding settings.json
    #[arg(long = "data-dir", env = "SADAK_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Locales the simulated engine offers (comma-separated, e.g. "en-US,ne-NP")
    #[arg(long = "voice-locales", value_delimiter = ',', global = true)]
    pub voice_locales: Vec<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
