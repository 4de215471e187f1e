//! Speech service: the controller wired to persisted user settings.

use std::sync::Arc;

use tokio::sync::mpsc;

use sadak_core::{SettingsService, SettingsUpdate};

use crate::config::SpeechConfig;
use crate::context::SpeechContext;
use crate::controller::{PlaybackController, SpeechEvent, SpeechHandle};
use crate::engine::SpeechEngine;
use crate::error::SpeechError;

/// Speech output backed by stored settings.
///
/// Loads the voice flag and language on start, and writes changes back
/// before applying them so a rejected value never reaches the controller.
pub struct SpeechService {
    handle: SpeechHandle,
    settings: Arc<SettingsService>,
}

impl SpeechService {
    /// Load settings and start the playback controller.
    pub async fn start(
        engine: Arc<dyn SpeechEngine>,
        settings: Arc<SettingsService>,
        config: SpeechConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SpeechEvent>), SpeechError> {
        let stored = settings.get().await?;
        let context = SpeechContext::from_settings(&stored);
        tracing::debug!(
            voice_enabled = context.voice_enabled(),
            language = %context.language(),
            "Starting speech service"
        );

        let (handle, events) =
            PlaybackController::spawn(engine, context, config, Some(Arc::clone(&settings)));
        Ok((Self { handle, settings }, events))
    }

    pub const fn handle(&self) -> &SpeechHandle {
        &self.handle
    }

    /// See [`SpeechHandle::speak`].
    pub fn speak(&self, text: &str) -> usize {
        self.handle.speak(text)
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn unlock_audio(&self) -> bool {
        self.handle.unlock_audio()
    }

    /// Switch voice output on or off and persist the choice. Switching off
    /// also stops anything playing or queued.
    pub async fn set_voice_enabled(&self, enabled: bool) -> Result<(), SpeechError> {
        self.settings
            .update(SettingsUpdate::voice_enabled(enabled))
            .await?;
        self.handle.context().set_voice_enabled(enabled);
        if !enabled {
            self.handle.cancel();
        }
        Ok(())
    }

    /// Change the speech language and persist it. Applies from the next
    /// chunk dispatched.
    pub async fn set_language(&self, code: &str) -> Result<(), SpeechError> {
        self.settings.update(SettingsUpdate::language(code)).await?;
        self.handle.context().set_language(code);
        Ok(())
    }
}
