//! Core domain types and port definitions for sadak.
//!
//! Holds the user preferences that gate speech output (voice flag and
//! application language), the repository port used to persist them, and the
//! data-directory helpers shared by the adapters.
#![deny(unused_crate_dependencies)]

pub mod paths;
pub mod ports;
pub mod repositories;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use paths::{DATA_DIR_ENV, PathError, SETTINGS_FILE_NAME, data_root, settings_path};
pub use ports::{CoreError, RepositoryError, SettingsRepository};
pub use repositories::JsonSettingsRepository;
pub use services::SettingsService;
pub use settings::{
    DEFAULT_APP_LANGUAGE, SUPPORTED_LANGUAGES, Settings, SettingsError, SettingsUpdate,
    is_supported_language, validate_settings,
};
