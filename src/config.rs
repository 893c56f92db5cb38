use crate::i18n::{LanguageCode, LanguageRegistry};
use crate::resolver::TranslationMode;
use crate::retry::RetryPolicy;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    // Languages
    pub default_language: LanguageCode,
    pub auto_detect: bool,
    pub discovery_candidates: Vec<LanguageCode>,

    // Translation files
    pub translation_path: String,
    pub fetch_timeout: Duration,
    pub load_attempts: u32,

    // Resolution
    pub mode: TranslationMode,

    // Host data (System.json with the engine's built-in terms)
    pub system_data_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Missing or unparsable values fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            // Languages
            default_language: lookup("DEFAULT_LANGUAGE")
                .and_then(|v| LanguageCode::from_code(&v).ok())
                .unwrap_or(defaults.default_language),
            // Only the literal "true" turns probing on once the variable is set
            auto_detect: lookup("AUTO_DETECT_TRANSLATIONS")
                .map(|v| v.trim() == "true")
                .unwrap_or(defaults.auto_detect),
            discovery_candidates: lookup("DISCOVERY_LANGUAGES")
                .map(|v| parse_code_list(&v))
                .filter(|codes| !codes.is_empty())
                .unwrap_or(defaults.discovery_candidates),

            // Translation files
            translation_path: lookup("TRANSLATION_PATH")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.translation_path),
            fetch_timeout: lookup("TRANSLATION_FETCH_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            load_attempts: lookup("TRANSLATION_LOAD_ATTEMPTS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|attempts: &u32| *attempts >= 1)
                .unwrap_or(defaults.load_attempts),

            // Resolution
            mode: lookup("TRANSLATION_MODE")
                .map(|v| parse_mode(&v))
                .unwrap_or(defaults.mode),

            // Host data
            system_data_path: lookup("SYSTEM_DATA_PATH").filter(|v| !v.trim().is_empty()),
        }
    }

    /// Retry policy for translation file loads.
    pub fn retry_policy(&self) -> RetryPolicy {
        if self.load_attempts <= 1 {
            RetryPolicy::single_attempt()
        } else {
            RetryPolicy::with_attempts(self.load_attempts)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_language: LanguageCode::from_registry("zh"),
            auto_detect: true,
            discovery_candidates: LanguageRegistry::get()
                .codes()
                .into_iter()
                .map(LanguageCode::from_registry)
                .collect(),
            translation_path: "translations/".to_string(),
            fetch_timeout: Duration::from_secs(10),
            load_attempts: 1,
            mode: TranslationMode::Simple,
            system_data_path: None,
        }
    }
}

fn parse_code_list(value: &str) -> Vec<LanguageCode> {
    value
        .split(',')
        .filter_map(|code| LanguageCode::from_code(code).ok())
        .collect()
}

/// Anything other than "full" means simple mode.
fn parse_mode(value: &str) -> TranslationMode {
    match value.trim().parse() {
        Ok(mode) => mode,
        Err(_) => {
            warn!(
                "Unknown TRANSLATION_MODE '{}', using {}",
                value,
                TranslationMode::Simple
            );
            TranslationMode::Simple
        }
    }
}
