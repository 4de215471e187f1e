//! CLI-specific error types and exit codes.

use sadak_core::{CoreError, PathError};
use sadak_speech::SpeechError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid command-line input.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Settings could not be read, validated or written.
    #[error("Settings error: {0}")]
    Settings(String),

    /// Data directory could not be resolved or created.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The speech pipeline stopped unexpectedly.
    #[error("Speech error: {0}")]
    Speech(String),
}

impl CliError {
    /// Map error to a process exit code (sysexits.h where one fits).
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Settings(_) => 74, // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Speech(_) => 1,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Settings(e) => Self::Arguments(e.to_string()),
            CoreError::Repository(e) => Self::Settings(e.to_string()),
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<SpeechError> for CliError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Settings(core) => Self::from(core),
            other => Self::Speech(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sadak_core::{RepositoryError, SettingsError};

    #[test]
    fn test_validation_errors_are_usage_errors() {
        let err = CliError::from(SpeechError::Settings(CoreError::Settings(
            SettingsError::UnsupportedLanguage("xx".into()),
        )));
        assert!(matches!(err, CliError::Arguments(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_path_errors_are_config_errors() {
        let err = CliError::from(PathError::NoDataDir);
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn test_storage_failures_are_settings_errors() {
        let err = CliError::from(CoreError::Repository(RepositoryError::Storage(
            "disk full".into(),
        )));
        assert!(matches!(err, CliError::Settings(_)));
        assert_eq!(err.exit_code(), 74);
    }

    #[test]
    fn test_closed_controller_is_speech_error() {
        let err = CliError::from(SpeechError::ControllerClosed);
        assert_eq!(err.exit_code(), 1);
    }
}
