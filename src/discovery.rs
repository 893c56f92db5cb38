//! Probe candidate languages to find which translation files exist.

use crate::error::LoadError;
use crate::i18n::LanguageCode;
use crate::session::TranslationManager;
use crate::source::TranslationSource;
use futures::future::join_all;
use tracing::{debug, info};

/// Outcome of probing a set of candidate languages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryReport {
    /// Codes that loaded, in candidate order, without duplicates
    pub found: Vec<LanguageCode>,
    /// Codes that failed, with the reason
    pub failed: Vec<LoadError>,
}

/// Load every candidate at once and wait until all of them have settled.
///
/// Each successful probe leaves its table in the manager's store.
pub async fn discover<S: TranslationSource>(
    manager: &TranslationManager<S>,
    candidates: &[LanguageCode],
) -> DiscoveryReport {
    info!("Probing {} candidate languages", candidates.len());

    let results = join_all(candidates.iter().map(|code| async move {
        let result = manager.load_language(code).await;
        (code, result)
    }))
    .await;

    let mut report = DiscoveryReport::default();
    for (code, result) in results {
        match result {
            Ok(_) => {
                if !report.found.contains(code) {
                    report.found.push(code.clone());
                }
            }
            Err(e) => {
                debug!("Language '{}' not available: {}", code, e);
                report.failed.push(e);
            }
        }
    }

    info!(
        "Discovery finished: {} found, {} unavailable",
        report.found.len(),
        report.failed.len()
    );

    report
}
