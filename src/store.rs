//! Per-language table storage.

use crate::i18n::LanguageCode;
use crate::table::TranslationTable;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct StoredTable {
    table: Arc<TranslationTable>,
    loaded_at: DateTime<Utc>,
}

/// Loaded translation tables, keyed by language code.
///
/// Entries are never evicted. Storing a table for a code that already has
/// one replaces it wholesale.
#[derive(Debug, Default)]
pub struct LanguageStore {
    tables: HashMap<LanguageCode, StoredTable>,
}

/// Summary of one stored table, for status reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedLanguage {
    pub code: LanguageCode,
    pub entries: usize,
    pub loaded_at: DateTime<Utc>,
}

impl LanguageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a table for `code`, replacing any previous one.
    pub fn insert(&mut self, code: LanguageCode, table: TranslationTable) {
        self.tables.insert(
            code,
            StoredTable {
                table: Arc::new(table),
                loaded_at: Utc::now(),
            },
        );
    }

    /// Shared handle to the table for `code`.
    pub fn get(&self, code: &str) -> Option<Arc<TranslationTable>> {
        self.tables.get(code).map(|stored| Arc::clone(&stored.table))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.tables.contains_key(code)
    }

    /// Number of entries in the table for `code`, or 0 if none is loaded.
    pub fn entry_count(&self, code: &str) -> usize {
        self.tables
            .get(code)
            .map(|stored| stored.table.len())
            .unwrap_or(0)
    }

    /// Every loaded language, sorted by code.
    pub fn loaded(&self) -> Vec<LoadedLanguage> {
        let mut loaded: Vec<LoadedLanguage> = self
            .tables
            .iter()
            .map(|(code, stored)| LoadedLanguage {
                code: code.clone(),
                entries: stored.table.len(),
                loaded_at: stored.loaded_at,
            })
            .collect();
        loaded.sort_by(|a, b| a.code.cmp(&b.code));
        loaded
    }
}
