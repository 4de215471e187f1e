//! Mapping from application language codes to synthesis locales and voices.

use crate::engine::VoiceDescriptor;
use crate::voices::VoiceDirectory;

/// Locale used for any code missing from [`LOCALE_TABLE`].
pub const FALLBACK_LOCALE: &str = "en-US";

/// Application language code → synthesis locale.
///
/// Newari and Maithili have no synthesis support of their own and borrow the
/// closest locale that usually does.
pub const LOCALE_TABLE: &[(&str, &str)] = &[
    ("en", "en-US"),
    ("np", "ne-NP"),
    ("hi", "hi-IN"),
    ("es", "es-ES"),
    ("fr", "fr-FR"),
    ("de", "de-DE"),
    ("zh", "zh-CN"),
    ("ja", "ja-JP"),
    ("ko", "ko-KR"),
    ("new", "ne-NP"),
    ("mai", "hi-IN"),
];

/// Synthesis locale for an application language code.
#[must_use]
pub fn locale_for(code: &str) -> &'static str {
    LOCALE_TABLE
        .iter()
        .find(|(app, _)| *app == code)
        .map_or(FALLBACK_LOCALE, |&(_, locale)| locale)
}

/// Result of resolving a language code against the available voices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Target locale tag.
    pub locale: String,
    /// Best matching voice, if any.
    pub voice: Option<VoiceDescriptor>,
}

impl Resolution {
    /// Whether the target locale is an English variant.
    #[must_use]
    pub fn is_english(&self) -> bool {
        language_subtag(&self.locale) == "en"
    }

    /// A non-English locale without a voice would be rendered in the wrong
    /// accent (or not at all), so its audio is skipped.
    #[must_use]
    pub fn should_skip(&self) -> bool {
        self.voice.is_none() && !self.is_english()
    }
}

/// Resolve `code` against an explicit voice list.
///
/// Prefers an exact locale match, then the first voice sharing the language
/// subtag (`ne-IN` for `ne-NP`). Platforms disagree on `_` versus `-` and on
/// case, so both are normalized before comparing.
#[must_use]
pub fn resolve_in(code: &str, voices: &[VoiceDescriptor]) -> Resolution {
    let locale = locale_for(code);
    let target = normalize(locale);
    let target_lang = language_subtag(&target);

    let voice = voices
        .iter()
        .find(|v| normalize(&v.locale) == target)
        .or_else(|| {
            voices
                .iter()
                .find(|v| language_subtag(&normalize(&v.locale)) == target_lang)
        })
        .cloned();

    Resolution {
        locale: locale.to_string(),
        voice,
    }
}

/// Resolves language codes against a live [`VoiceDirectory`].
#[derive(Clone)]
pub struct LanguageResolver {
    directory: VoiceDirectory,
}

impl LanguageResolver {
    pub const fn new(directory: VoiceDirectory) -> Self {
        Self { directory }
    }

    /// Re-read the engine's voice list and resolve `code` against it.
    pub fn resolve(&self, code: &str) -> Resolution {
        self.directory.refresh();
        let resolution = resolve_in(code, &self.directory.voices());
        tracing::debug!(
            code,
            locale = %resolution.locale,
            voice = resolution.voice.as_ref().map(VoiceDescriptor::label),
            "Resolved speech language"
        );
        resolution
    }
}

fn normalize(locale: &str) -> String {
    locale.replace('_', "-").to_ascii_lowercase()
}

fn language_subtag(locale: &str) -> &str {
    locale.split(['-', '_']).next().unwrap_or(locale)
}
