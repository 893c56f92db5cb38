//! The translation session: active language, loaded tables, subscribers.
//!
//! A `TranslationManager` is built once by the host and shared (usually as
//! `Arc<TranslationManager<_>>`) with everything that displays text.
//! Lookups are synchronous; only table loads await.

use crate::config::Config;
use crate::discovery;
use crate::error::LoadError;
use crate::i18n::{LanguageCode, MetricsReport, TranslationMetrics};
use crate::loader;
use crate::notify::{Notifier, NotifyReport, RefreshCallback};
use crate::resolver::{self, Resolution, TranslationMode};
use crate::retry::RetryPolicy;
use crate::source::TranslationSource;
use crate::store::{LanguageStore, LoadedLanguage};
use crate::table::preview;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Every this-many exact hits, one is logged at debug level.
const EXACT_HIT_SAMPLE_EVERY: usize = 100;

struct SessionState {
    current: LanguageCode,
    initialized: bool,
    available: Vec<LanguageCode>,
    store: LanguageStore,
    /// Set once `set_language` has switched languages
    switched: bool,
}

/// Result of [`TranslationManager::set_language`].
#[derive(Debug, Clone, PartialEq)]
pub enum LanguageSwitch {
    /// The language was already active. Nothing was loaded or notified.
    Unchanged,
    /// The language is now active and subscribers were notified.
    Switched(NotifyReport),
    /// The table could not be loaded; the previous language stays active.
    Failed(LoadError),
}

impl LanguageSwitch {
    pub fn is_switched(&self) -> bool {
        matches!(self, LanguageSwitch::Switched(_))
    }
}

/// Snapshot of the session, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationStatus {
    pub initialized: bool,
    pub current_language: LanguageCode,
    pub available_languages: Vec<LanguageCode>,
    pub loaded_languages: Vec<LoadedLanguage>,
    /// Entries across the tables of all available languages
    pub translation_count: usize,
    pub mode: TranslationMode,
    pub metrics: MetricsReport,
}

pub struct TranslationManager<S> {
    config: Config,
    source: S,
    retry: RetryPolicy,
    state: RwLock<SessionState>,
    load_locks: Mutex<HashMap<LanguageCode, Arc<tokio::sync::Mutex<()>>>>,
    init_lock: tokio::sync::Mutex<()>,
    notifier: Notifier,
    metrics: TranslationMetrics,
}

impl<S: TranslationSource> TranslationManager<S> {
    pub fn new(config: Config, source: S) -> Self {
        let retry = config.retry_policy();
        let state = SessionState {
            current: config.default_language.clone(),
            initialized: false,
            available: Vec::new(),
            store: LanguageStore::new(),
            switched: false,
        };

        Self {
            config,
            source,
            retry,
            state: RwLock::new(state),
            load_locks: Mutex::new(HashMap::new()),
            init_lock: tokio::sync::Mutex::new(()),
            notifier: Notifier::new(),
            metrics: TranslationMetrics::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    // ==================== Initialization ====================

    /// Perform the initial load and mark the session ready.
    ///
    /// With auto-detect on, every discovery candidate is probed and the
    /// session becomes ready only after all of them have settled. Otherwise
    /// only the default language is loaded. Either way the default language
    /// is the sole discovered language if nothing loaded. Languages switched
    /// to in the meantime stay available and a switch made during loading
    /// is kept; without one, the active language moves to the first
    /// available one if it is not available.
    ///
    /// Calling this again after it has completed does nothing.
    pub async fn initialize(&self) -> Vec<LanguageCode> {
        let _guard = self.init_lock.lock().await;
        if self.is_initialized() {
            return self.available_languages();
        }

        let default = self.config.default_language.clone();
        let available = if self.config.auto_detect {
            let report = discovery::discover(self, &self.config.discovery_candidates).await;
            if report.found.is_empty() {
                warn!(
                    "No translation files found, falling back to '{}' without a table",
                    default
                );
                vec![default]
            } else {
                report.found
            }
        } else {
            if let Err(e) = self.load_language(&default).await {
                warn!("Default language '{}' has no translations: {}", default, e);
            }
            vec![default]
        };

        let mut state = self.write_state();
        // Switches that completed while loading already listed their language
        let mut merged = available;
        for code in state.available.drain(..) {
            if !merged.contains(&code) {
                merged.push(code);
            }
        }
        state.available = merged;
        if !state.switched && !state.available.contains(&state.current) {
            if let Some(first) = state.available.first().cloned() {
                info!(
                    "Default language '{}' is not available, using '{}'",
                    state.current, first
                );
                state.current = first;
            }
        }
        state.initialized = true;

        info!(
            "Translation initialized: current '{}', available {:?}",
            state.current,
            state.available.iter().map(|c| c.as_str()).collect::<Vec<_>>()
        );

        state.available.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.read_state().initialized
    }

    // ==================== Loading ====================

    /// Fetch and install the table for `code`, replacing any loaded one.
    ///
    /// Loads of the same code run one at a time; the last to start wins.
    /// Returns the number of entries loaded.
    pub async fn load_language(&self, code: &LanguageCode) -> Result<usize, LoadError> {
        let lock = self.load_lock(code);
        let _guard = lock.lock().await;
        self.fetch_and_install(code).await
    }

    /// Whether a table is loaded for `code`.
    pub fn has_table(&self, code: &str) -> bool {
        self.read_state().store.contains(code)
    }

    async fn fetch_and_install(&self, code: &LanguageCode) -> Result<usize, LoadError> {
        match loader::load_table(&self.source, code, &self.retry).await {
            Ok(table) => {
                let entries = table.len();
                self.write_state().store.insert(code.clone(), table);
                self.metrics.record_load_success();
                Ok(entries)
            }
            Err(e) => {
                self.metrics.record_load_failure();
                Err(e)
            }
        }
    }

    fn load_lock(&self, code: &LanguageCode) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .load_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(code.clone()).or_default())
    }

    // ==================== Switching ====================

    /// Make `code` the active language.
    ///
    /// Loads the table first if needed. Concurrent switches to the same
    /// unloaded code share a single fetch.
    pub async fn set_language(&self, code: &LanguageCode) -> LanguageSwitch {
        if self.read_state().current == *code {
            return LanguageSwitch::Unchanged;
        }

        if !self.has_table(code.as_str()) {
            let lock = self.load_lock(code);
            let _guard = lock.lock().await;

            // Another switch may have loaded it while we waited
            if !self.has_table(code.as_str()) {
                if let Err(e) = self.fetch_and_install(code).await {
                    warn!("Staying on '{}': {}", self.current_language(), e);
                    return LanguageSwitch::Failed(e);
                }
            }
        }

        {
            let mut state = self.write_state();
            if state.current == *code {
                return LanguageSwitch::Unchanged;
            }
            state.current = code.clone();
            state.switched = true;
            if !state.available.contains(code) {
                state.available.push(code.clone());
            }
        }

        info!("Switched language to '{}'", code);
        LanguageSwitch::Switched(self.notifier.notify_all())
    }

    pub fn current_language(&self) -> LanguageCode {
        self.read_state().current.clone()
    }

    /// The available languages. The returned list is a copy.
    pub fn available_languages(&self) -> Vec<LanguageCode> {
        self.read_state().available.clone()
    }

    // ==================== Translation ====================

    /// Translate `text` into the active language.
    ///
    /// Returns `text` unchanged before initialization, for empty input, when
    /// the active language has no table, and when nothing matches.
    pub fn translate(&self, text: &str) -> String {
        if text.is_empty() {
            self.metrics.record_passthrough();
            return String::new();
        }

        let table = {
            let state = self.read_state();
            if state.initialized {
                state.store.get(state.current.as_str())
            } else {
                None
            }
        };

        let Some(table) = table else {
            self.metrics.record_passthrough();
            return text.to_string();
        };

        let resolution = resolver::resolve(&table, text, self.config.mode);
        match &resolution {
            Resolution::Exact(translated) => {
                let hits = self.metrics.record_exact_hit();
                if hits % EXACT_HIT_SAMPLE_EVERY == 0 {
                    debug!("Translated: {} -> {}", preview(text), preview(translated));
                }
            }
            Resolution::Trimmed(_) => self.metrics.record_trimmed_hit(),
            Resolution::Fragment { key, text: fragment } => {
                self.metrics.record_fragment_hit();
                debug!(
                    "Fragment translated: {} -> {} (from {})",
                    preview(text),
                    preview(fragment),
                    preview(key)
                );
            }
            Resolution::Miss => self.metrics.record_miss(),
        }

        resolution.into_text(text)
    }

    // ==================== Notifications ====================

    /// Run `callback` after every language switch.
    pub fn subscribe(&self, callback: RefreshCallback) {
        self.notifier.subscribe(callback);
    }

    /// Run a closure after every language switch; keep the returned handle
    /// to unsubscribe it.
    pub fn subscribe_fn<F>(&self, callback: F) -> RefreshCallback
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.notifier.subscribe_fn(callback)
    }

    pub fn unsubscribe(&self, callback: &RefreshCallback) -> bool {
        self.notifier.unsubscribe(callback)
    }

    // ==================== Diagnostics ====================

    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }

    pub fn status(&self) -> TranslationStatus {
        let state = self.read_state();
        let translation_count = state
            .available
            .iter()
            .map(|code| state.store.entry_count(code.as_str()))
            .sum();

        TranslationStatus {
            initialized: state.initialized,
            current_language: state.current.clone(),
            available_languages: state.available.clone(),
            loaded_languages: state.store.loaded(),
            translation_count,
            mode: self.config.mode,
            metrics: self.metrics.report(),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const ZH: &str = r#"{"Level": "等級", "HP": "生命值", "Attack": "攻擊力", "Save which file?": "要儲存哪個檔案？", "%1 found!": "發現了 %1！"}"#;
    const EN: &str = r#"{"Level": "Level", "HP": "HP", "Attack": "Attack"}"#;

    fn code(value: &str) -> LanguageCode {
        LanguageCode::from_code(value).unwrap()
    }

    fn config(default: &str, mode: TranslationMode) -> Config {
        Config {
            default_language: code(default),
            auto_detect: false,
            mode,
            ..Config::default()
        }
    }

    fn manager(default: &str, source: MemorySource) -> TranslationManager<MemorySource> {
        TranslationManager::new(config(default, TranslationMode::Simple), source)
    }

    /// Serves from memory, but takes `delay` to answer for one code.
    struct SlowSource {
        inner: MemorySource,
        slow_code: &'static str,
        delay: Duration,
    }

    impl TranslationSource for SlowSource {
        async fn fetch(&self, code: &LanguageCode) -> Result<String, LoadError> {
            if code.as_str() == self.slow_code {
                tokio::time::sleep(self.delay).await;
            }
            self.inner.fetch(code).await
        }
    }

    fn counting_subscriber<S: TranslationSource>(manager: &TranslationManager<S>) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        manager.subscribe_fn(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        count
    }

    // ==================== Initialization Tests ====================

    #[tokio::test]
    async fn test_translate_before_initialize_is_identity() {
        let manager = manager("zh", MemorySource::new().with_payload("zh", ZH));
        manager.load_language(&code("zh")).await.unwrap();

        assert!(!manager.is_initialized());
        assert_eq!(manager.translate("Level"), "Level");
        assert_eq!(manager.translate(""), "");
    }

    #[tokio::test]
    async fn test_initialize_without_auto_detect_loads_default() {
        let manager = manager("zh", MemorySource::new().with_payload("zh", ZH));

        let available = manager.initialize().await;

        assert_eq!(available, vec![code("zh")]);
        assert!(manager.is_initialized());
        assert_eq!(manager.translate("Level"), "等級");
        assert_eq!(manager.source().fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_initialize_with_missing_default_still_completes() {
        let manager = manager("zh", MemorySource::new());

        manager.initialize().await;

        assert!(manager.is_initialized());
        assert_eq!(manager.available_languages(), vec![code("zh")]);
        assert_eq!(manager.current_language(), "zh");
        // No table: identity
        assert_eq!(manager.translate("Level"), "Level");
    }

    #[tokio::test]
    async fn test_switch_during_initialize_is_kept() {
        let source = SlowSource {
            inner: MemorySource::new().with_payload("zh", ZH).with_payload("en", EN),
            slow_code: "zh",
            delay: Duration::from_millis(50),
        };
        let manager = TranslationManager::new(config("zh", TranslationMode::Simple), source);
        let notified = counting_subscriber(&manager);

        let en = code("en");
        let (available, switch) = tokio::join!(manager.initialize(), manager.set_language(&en));

        assert!(switch.is_switched());
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert_eq!(manager.current_language(), "en");
        assert_eq!(available, vec![code("zh"), code("en")]);
        assert_eq!(manager.available_languages(), available);
        assert!(manager.has_table("zh"));
        assert_eq!(manager.translate("Attack"), "Attack");
    }

    #[tokio::test]
    async fn test_switch_during_discovery_is_kept() {
        let source = SlowSource {
            inner: MemorySource::new()
                .with_payload("ja", r#"{"Level": "レベル"}"#)
                .with_payload("en", EN),
            slow_code: "ja",
            delay: Duration::from_millis(50),
        };
        let config = Config {
            default_language: code("zh"),
            auto_detect: true,
            discovery_candidates: vec![code("zh"), code("ja")],
            ..Config::default()
        };
        let manager = TranslationManager::new(config, source);

        let en = code("en");
        let (available, switch) = tokio::join!(manager.initialize(), manager.set_language(&en));

        assert!(switch.is_switched());
        // The missing default would otherwise be replaced by "ja"
        assert_eq!(manager.current_language(), "en");
        assert_eq!(available, vec![code("ja"), code("en")]);
    }

    #[tokio::test]
    async fn test_initialize_twice_is_noop() {
        let manager = manager("zh", MemorySource::new().with_payload("zh", ZH));

        manager.initialize().await;
        manager.initialize().await;

        assert_eq!(manager.source().fetch_count(), 1);
    }

    // ==================== Translation Tests ====================

    #[tokio::test]
    async fn test_translate_exact_trimmed_and_miss() {
        let manager = manager("zh", MemorySource::new().with_payload("zh", ZH));
        manager.initialize().await;

        assert_eq!(manager.translate("HP"), "生命值");
        assert_eq!(manager.translate("%1 found!"), "發現了 %1！");
        assert_eq!(manager.translate("  Level  "), "等級");
        assert_eq!(manager.translate("NonExistentKey"), "NonExistentKey");
        assert_eq!(manager.translate(""), "");
    }

    #[tokio::test]
    async fn test_translate_is_stable_without_state_change() {
        let manager = manager("zh", MemorySource::new().with_payload("zh", ZH));
        manager.initialize().await;

        assert_eq!(manager.translate("Attack"), manager.translate("Attack"));
    }

    #[tokio::test]
    async fn test_full_mode_extracts_line_fragments() {
        let source = MemorySource::new().with_payload("zh", r#"{"Line 1\nLine 2": "行 1\n行 2"}"#);
        let manager = TranslationManager::new(config("zh", TranslationMode::Full), source);
        manager.initialize().await;

        assert_eq!(manager.translate("Line 1"), "行 1");
        assert_eq!(manager.translate("Line 2"), "行 2");
        assert_eq!(manager.metrics().fragment_hits, 2);
    }

    #[tokio::test]
    async fn test_simple_mode_does_not_extract_fragments() {
        let source = MemorySource::new().with_payload("zh", r#"{"Complete message": "完整訊息"}"#);
        let manager = TranslationManager::new(config("zh", TranslationMode::Simple), source);
        manager.initialize().await;

        assert_eq!(manager.translate("Complete"), "Complete");
    }

    // ==================== Switching Tests ====================

    #[tokio::test]
    async fn test_switch_to_active_language_does_nothing() {
        let manager = manager("zh", MemorySource::new().with_payload("zh", ZH));
        manager.initialize().await;
        let notified = counting_subscriber(&manager);

        let outcome = manager.set_language(&code("zh")).await;

        assert_eq!(outcome, LanguageSwitch::Unchanged);
        assert_eq!(notified.load(Ordering::SeqCst), 0);
        assert_eq!(manager.source().fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_switch_to_unloaded_language_loads_once_and_notifies() {
        let source = MemorySource::new().with_payload("zh", ZH).with_payload("en", EN);
        let manager = manager("zh", source);
        manager.initialize().await;
        let notified = counting_subscriber(&manager);

        let outcome = manager.set_language(&code("en")).await;

        assert!(outcome.is_switched());
        assert_eq!(manager.current_language(), "en");
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert_eq!(manager.source().fetch_count(), 2);
        assert_eq!(manager.translate("Attack"), "Attack");
        assert!(manager.available_languages().contains(&code("en")));
    }

    #[tokio::test]
    async fn test_switch_failure_keeps_previous_language() {
        let manager = manager("zh", MemorySource::new().with_payload("zh", ZH));
        manager.initialize().await;
        let notified = counting_subscriber(&manager);

        let outcome = manager.set_language(&code("fr")).await;

        assert!(matches!(outcome, LanguageSwitch::Failed(LoadError::NotFound { .. })));
        assert_eq!(manager.current_language(), "zh");
        assert_eq!(notified.load(Ordering::SeqCst), 0);
        assert_eq!(manager.translate("Level"), "等級");
        assert!(!manager.available_languages().contains(&code("fr")));
    }

    #[tokio::test]
    async fn test_switch_to_loaded_language_does_not_refetch() {
        let source = MemorySource::new().with_payload("zh", ZH).with_payload("en", EN);
        let manager = manager("zh", source);
        manager.initialize().await;
        manager.load_language(&code("en")).await.unwrap();

        manager.set_language(&code("en")).await;
        manager.set_language(&code("zh")).await;

        assert_eq!(manager.source().fetch_count(), 2);
        assert_eq!(manager.translate("Attack"), "攻擊力");
    }

    #[tokio::test]
    async fn test_concurrent_switches_share_one_fetch() {
        let source = MemorySource::new().with_payload("zh", ZH).with_payload("en", EN);
        let manager = manager("zh", source);
        manager.initialize().await;
        let notified = counting_subscriber(&manager);

        let en = code("en");
        let (first, second) = tokio::join!(manager.set_language(&en), manager.set_language(&en));

        assert_eq!(manager.source().fetch_count(), 2);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert!(first.is_switched() != second.is_switched());
    }

    #[tokio::test]
    async fn test_reload_replaces_table() {
        let manager = manager("zh", MemorySource::new().with_payload("zh", ZH));
        manager.initialize().await;

        assert_eq!(manager.load_language(&code("zh")).await, Ok(5));
        assert_eq!(manager.source().fetch_count(), 2);
        assert_eq!(manager.translate("Level"), "等級");
    }

    // ==================== Accessor Tests ====================

    #[tokio::test]
    async fn test_available_languages_is_a_copy() {
        let manager = manager("zh", MemorySource::new().with_payload("zh", ZH));
        manager.initialize().await;

        let mut languages = manager.available_languages();
        languages.push(code("xx"));
        languages.clear();

        assert_eq!(manager.available_languages(), vec![code("zh")]);
    }

    #[tokio::test]
    async fn test_unsubscribed_callback_is_not_notified() {
        let source = MemorySource::new().with_payload("zh", ZH).with_payload("en", EN);
        let manager = manager("zh", source);
        manager.initialize().await;

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let handle = manager.subscribe_fn(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        assert!(manager.unsubscribe(&handle));

        manager.set_language(&code("en")).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_status_report() {
        let source = MemorySource::new().with_payload("zh", ZH).with_payload("en", EN);
        let manager = manager("zh", source);
        manager.initialize().await;
        manager.set_language(&code("en")).await;
        manager.translate("HP");
        manager.translate("Mana");

        let status = manager.status();

        assert!(status.initialized);
        assert_eq!(status.current_language, "en");
        assert_eq!(status.available_languages, vec![code("zh"), code("en")]);
        assert_eq!(status.loaded_languages.len(), 2);
        assert_eq!(status.translation_count, 8);
        assert_eq!(status.mode, TranslationMode::Simple);
        assert_eq!(status.metrics.exact_hits, 1);
        assert_eq!(status.metrics.misses, 1);
        assert_eq!(status.metrics.loads_succeeded, 2);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["current_language"], "en");
        assert_eq!(json["mode"], "simple");
    }
}
