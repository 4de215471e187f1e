//! Concrete repository implementations.

mod json_settings;

pub use json_settings::JsonSettingsRepository;
