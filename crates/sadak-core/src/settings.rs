//! Settings domain types and validation.
//!
//! This module contains the user preferences that gate speech output.
//! These are pure domain types with no infrastructure dependencies.

use serde::{Deserialize, Serialize};

/// Language used when nothing has been stored yet.
pub const DEFAULT_APP_LANGUAGE: &str = "en";

/// Application language codes the dashboard ships translations for.
///
/// `new` (Newari) and `mai` (Maithili) have no dedicated synthesis locale;
/// the speech resolver maps them onto the closest supported one.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "en", "np", "hi", "es", "fr", "de", "zh", "ja", "ko", "new", "mai",
];

/// Application settings structure.
///
/// All fields are optional to support partial updates and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Whether assistant responses are read aloud.
    pub voice_response_enabled: Option<bool>,

    /// Application language code (e.g. `"en"`, `"np"`).
    pub app_language: Option<String>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            voice_response_enabled: Some(true),
            app_language: Some(DEFAULT_APP_LANGUAGE.to_string()),
        }
    }

    /// Get the effective voice flag (voice output is on unless stored as off).
    #[must_use]
    pub fn effective_voice_enabled(&self) -> bool {
        self.voice_response_enabled.unwrap_or(true)
    }

    /// Get the effective language code (with default fallback).
    #[must_use]
    pub fn effective_language(&self) -> &str {
        self.app_language.as_deref().unwrap_or(DEFAULT_APP_LANGUAGE)
    }

    /// Merge another settings into this one, only updating fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref enabled) = other.voice_response_enabled {
            self.voice_response_enabled = *enabled;
        }
        if let Some(ref language) = other.app_language {
            self.app_language.clone_from(language);
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = set field to None/null
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub voice_response_enabled: Option<Option<bool>>,
    pub app_language: Option<Option<String>>,
}

impl SettingsUpdate {
    /// Update that only touches the voice flag.
    #[must_use]
    pub const fn voice_enabled(enabled: bool) -> Self {
        Self {
            voice_response_enabled: Some(Some(enabled)),
            app_language: None,
        }
    }

    /// Update that only touches the language.
    #[must_use]
    pub fn language(code: impl Into<String>) -> Self {
        Self {
            voice_response_enabled: None,
            app_language: Some(Some(code.into())),
        }
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Unsupported language code '{0}' (expected one of: {list})", list = SUPPORTED_LANGUAGES.join(", "))]
    UnsupportedLanguage(String),

    #[error("Language code cannot be empty")]
    EmptyLanguage,
}

/// Check whether `code` is a language the application supports.
#[must_use]
pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(ref code) = settings.app_language {
        if code.trim().is_empty() {
            return Err(SettingsError::EmptyLanguage);
        }
        if !is_supported_language(code) {
            return Err(SettingsError::UnsupportedLanguage(code.clone()));
        }
    }

    Ok(())
}
