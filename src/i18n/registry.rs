//! Language registry: metadata for the languages the engine knows by name.
//!
//! The registry does not restrict which codes can be loaded. It supplies the
//! default discovery candidates and the names shown in a language picker.
//! It uses a singleton pattern with `OnceLock` because the table is static.

use std::sync::OnceLock;

/// Metadata for a well-known language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Short language code (e.g., "zh", "en")
    pub code: &'static str,

    /// Native name of the language (e.g., "中文", "日本語")
    pub native_name: &'static str,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All registered codes, in probe order.
    ///
    /// This is the default candidate list for discovery.
    pub fn codes(&self) -> Vec<&'static str> {
        self.languages.iter().map(|lang| lang.code).collect()
    }

    /// Name to show for a code in a language picker.
    ///
    /// Known codes use their native name; anything else is shown as the
    /// upper-cased code.
    pub fn display_name(&self, code: &str) -> String {
        match self.get_by_code(code) {
            Some(config) => config.native_name.to_string(),
            None => code.to_uppercase(),
        }
    }
}

/// Default language configurations.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "zh",
            native_name: "中文",
        },
        LanguageConfig {
            code: "en",
            native_name: "English",
        },
        LanguageConfig {
            code: "ja",
            native_name: "日本語",
        },
        LanguageConfig {
            code: "ko",
            native_name: "한국어",
        },
        LanguageConfig {
            code: "fr",
            native_name: "Français",
        },
        LanguageConfig {
            code: "de",
            native_name: "Deutsch",
        },
        LanguageConfig {
            code: "es",
            native_name: "Español",
        },
        LanguageConfig {
            code: "pt",
            native_name: "Português",
        },
        LanguageConfig {
            code: "ru",
            native_name: "Русский",
        },
    ]
}
