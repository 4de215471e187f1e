//! CLI bootstrap: the composition root.
//!
//! The only place concrete implementations are chosen: the JSON settings
//! file from `sadak-core` and the simulated engine from `sadak-speech`.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use sadak_core::{JsonSettingsRepository, SettingsService, settings_path};
use sadak_speech::backend::{SimulatedEngine, default_voices};
use sadak_speech::{SpeechConfig, SpeechEngine, SpeechEvent, SpeechService, VoiceDescriptor};

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Data directory override (`--data-dir` / `SADAK_DATA_DIR`).
    pub data_dir: Option<PathBuf>,
    /// Locales the simulated engine should offer. Empty means the defaults.
    pub voice_locales: Vec<String>,
    pub speech: SpeechConfig,
}

/// Fully composed context for command handlers.
pub struct CliContext {
    pub settings: Arc<SettingsService>,
    pub settings_path: PathBuf,
    pub engine: Arc<SimulatedEngine>,
    pub speech_config: SpeechConfig,
}

impl CliContext {
    /// Start a speech service on this context's engine and settings.
    pub async fn start_speech(
        &self,
    ) -> Result<(SpeechService, mpsc::UnboundedReceiver<SpeechEvent>), CliError> {
        let engine: Arc<dyn SpeechEngine> = self.engine.clone();
        let started = SpeechService::start(
            engine,
            Arc::clone(&self.settings),
            self.speech_config.clone(),
        )
        .await?;
        Ok(started)
    }
}

/// Wire settings storage and the speech engine together.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let settings_path = settings_path(config.data_dir.as_deref())?;
    tracing::debug!(path = %settings_path.display(), "Using settings file");

    let repo = Arc::new(JsonSettingsRepository::new(settings_path.clone()));
    let settings = Arc::new(SettingsService::new(repo));
    let engine = Arc::new(SimulatedEngine::with_voices(simulated_voices(
        &config.voice_locales,
    )));

    Ok(CliContext {
        settings,
        settings_path,
        engine,
        speech_config: config.speech,
    })
}

fn simulated_voices(locales: &[String]) -> Vec<VoiceDescriptor> {
    let locales: Vec<&str> = locales
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();
    if locales.is_empty() {
        return default_voices();
    }
    locales
        .into_iter()
        .map(|locale| {
            VoiceDescriptor::new(format!("sim.{locale}"), locale, format!("Simulated {locale}"))
        })
        .collect()
}
