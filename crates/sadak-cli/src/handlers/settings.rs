//! Settings command handler.

use anyhow::Result;

use sadak_core::SettingsUpdate;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::settings_summary;
use crate::settings_commands::SettingsCommand;

pub async fn execute(ctx: &CliContext, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            let settings = ctx.settings.get().await.map_err(CliError::from)?;
            println!("Speech settings ({}):", ctx.settings_path.display());
            println!("{}", settings_summary(&settings));
        }
        SettingsCommand::Voice { state } => {
            let enabled = state.enabled();
            ctx.settings
                .update(SettingsUpdate::voice_enabled(enabled))
                .await
                .map_err(CliError::from)?;
            println!(
                "✓ Voice responses {}.",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        SettingsCommand::Language { code } => {
            let settings = ctx
                .settings
                .update(SettingsUpdate::language(code))
                .await
                .map_err(CliError::from)?;
            println!("✓ Language set to {}.", settings.effective_language());
        }
        SettingsCommand::Reset => {
            let settings = ctx.settings.reset().await.map_err(CliError::from)?;
            println!("✓ Settings reset to defaults.");
            println!("{}", settings_summary(&settings));
        }
    }
    Ok(())
}
