//! JSON file implementation of the `SettingsRepository` trait.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::ports::{RepositoryError, SettingsRepository};
use crate::settings::Settings;

/// Stores settings as a single pretty-printed JSON document.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write never leaves a truncated document behind.
pub struct JsonSettingsRepository {
    path: PathBuf,
}

impl JsonSettingsRepository {
    /// Create a repository backed by the file at `path`.
    ///
    /// The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SettingsRepository for JsonSettingsRepository {
    async fn load(&self) -> Result<Settings, RepositoryError> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No settings file, using defaults");
                return Ok(Settings::with_defaults());
            }
            Err(e) => return Err(RepositoryError::Storage(e.to_string())),
        };

        serde_json::from_str(&json).map_err(|e| RepositoryError::Serialization(e.to_string()))
    }

    async fn save(&self, settings: &Settings) -> Result<(), RepositoryError> {
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        tracing::debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_returns_defaults_when_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = JsonSettingsRepository::new(tmp.path().join("settings.json"));

        let settings = repo.load().await.unwrap();
        assert_eq!(settings, Settings::with_defaults());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = JsonSettingsRepository::new(tmp.path().join("settings.json"));

        let settings = Settings {
            voice_response_enabled: Some(false),
            app_language: Some("np".to_string()),
        };

        repo.save(&settings).await.unwrap();
        let loaded = repo.load().await.unwrap();

        assert_eq!(loaded, settings);
        assert!(!repo.temp_path().exists(), "temp file should be renamed away");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_serialization_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let repo = JsonSettingsRepository::new(&path);
        let err = repo.load().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_is_a_storage_error() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = JsonSettingsRepository::new(tmp.path().join("absent").join("settings.json"));

        let err = repo.save(&Settings::with_defaults()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Storage(_)));
    }
}
