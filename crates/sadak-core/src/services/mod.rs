//! Application services that orchestrate ports and domain rules.

mod settings_service;

pub use settings_service::SettingsService;
