//! `sadak` command-line front end.
//!
//! Wires the JSON settings file and the simulated speech engine into a
//! running speech service, and exposes the pipeline's pieces (chunking,
//! language resolution, voice listing, settings) as subcommands.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only.
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;
pub mod settings_commands;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
pub use settings_commands::{SettingsCommand, Toggle};
