//! End-to-end settings persistence through the JSON repository.

use std::sync::Arc;

use sadak_core::{
    CoreError, JsonSettingsRepository, SettingsError, SettingsService, SettingsUpdate,
    settings_path,
};

fn service_in(dir: &std::path::Path) -> SettingsService {
    let path = settings_path(Some(dir)).unwrap();
    SettingsService::new(Arc::new(JsonSettingsRepository::new(path)))
}

#[tokio::test]
async fn voice_preference_survives_a_new_session() {
    let tmp = tempfile::tempdir().unwrap();

    let first = service_in(tmp.path());
    first.update(SettingsUpdate::voice_enabled(false)).await.unwrap();
    first.update(SettingsUpdate::language("np")).await.unwrap();

    let second = service_in(tmp.path());
    let settings = second.get().await.unwrap();
    assert!(!settings.effective_voice_enabled());
    assert_eq!(settings.effective_language(), "np");
}

#[tokio::test]
async fn rejected_update_leaves_file_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    let service = service_in(tmp.path());
    service.update(SettingsUpdate::language("hi")).await.unwrap();

    let err = service
        .update(SettingsUpdate::language("tlh"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Settings(SettingsError::UnsupportedLanguage(_))
    ));

    let settings = service.get().await.unwrap();
    assert_eq!(settings.effective_language(), "hi");
}

#[tokio::test]
async fn reset_restores_defaults_on_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let service = service_in(tmp.path());
    service.update(SettingsUpdate::voice_enabled(false)).await.unwrap();

    service.reset().await.unwrap();

    let reloaded = service_in(tmp.path()).get().await.unwrap();
    assert!(reloaded.effective_voice_enabled());
    assert_eq!(reloaded.effective_language(), "en");
}
