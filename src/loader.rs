//! Fetch and parse one language's translation table.

use crate::error::LoadError;
use crate::i18n::LanguageCode;
use crate::retry::RetryPolicy;
use crate::source::TranslationSource;
use crate::table::{preview, TranslationTable};
use tracing::{debug, error, info, warn};

/// Number of keys shown in the debug sample after a successful load.
const SAMPLE_KEYS: usize = 5;

/// Fetch the file for `code` from `source` and parse it into a table.
///
/// Transient failures are retried according to `retry`. Every outcome is
/// logged here so callers only need the `Result` for control flow.
pub async fn load_table<S: TranslationSource>(
    source: &S,
    code: &LanguageCode,
    retry: &RetryPolicy,
) -> Result<TranslationTable, LoadError> {
    let result = retry
        .run(code, move || async move {
            let payload = source.fetch(code).await?;
            TranslationTable::from_json(code, &payload)
        })
        .await;

    match &result {
        Ok(table) => {
            info!("Loaded translations for '{}': {} entries", code, table.len());
            let sample: Vec<String> = table.keys().take(SAMPLE_KEYS).map(preview).collect();
            debug!("Sample keys for '{}': {:?}", code, sample);
        }
        Err(e @ LoadError::Parse { .. }) => error!("{}", e),
        Err(e) => warn!("{}", e),
    }

    result
}
