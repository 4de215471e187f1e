//! Settings service: reads and writes the preferences that gate speech
//! output.
//!
//! Two values matter to the speech pipeline: whether assistant replies are
//! read aloud, and the application language that picks the synthesis
//! locale. Every write is validated first, so an unsupported language code
//! never reaches storage or the speech controller.

use crate::ports::{CoreError, SettingsRepository};
use crate::settings::{Settings, SettingsUpdate, validate_settings};
use std::sync::Arc;

/// Validating front end over a [`SettingsRepository`].
///
/// Shared by the speech service (user toggles, language switches) and the
/// playback controller, which switches voice output off after the engine
/// refuses playback.
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Stored preferences, or the defaults (voice on, English) when none
    /// have been saved yet.
    pub async fn get(&self) -> Result<Settings, CoreError> {
        self.repo.load().await.map_err(CoreError::from)
    }

    /// Apply a partial change on top of what is stored.
    ///
    /// Read-modify-write: fields absent from `update` keep their stored
    /// value. Returns the settings as persisted.
    pub async fn update(&self, update: SettingsUpdate) -> Result<Settings, CoreError> {
        let mut current = self.repo.load().await.map_err(CoreError::from)?;
        current.merge(&update);
        validate_settings(&current)?;
        self.repo.save(&current).await.map_err(CoreError::from)?;

        tracing::debug!(
            voice_response_enabled = current.effective_voice_enabled(),
            app_language = current.effective_language(),
            "Speech preferences updated"
        );
        Ok(current)
    }

    /// Replace the stored preferences wholesale.
    pub async fn save(&self, settings: &Settings) -> Result<(), CoreError> {
        validate_settings(settings)?;
        self.repo.save(settings).await.map_err(CoreError::from)
    }

    /// Forget stored preferences: voice output back on, language back to
    /// English.
    pub async fn reset(&self) -> Result<Settings, CoreError> {
        let defaults = Settings::with_defaults();
        self.repo.save(&defaults).await.map_err(CoreError::from)?;
        Ok(defaults)
    }
}
