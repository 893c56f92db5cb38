//! Translation metrics and observability module.
//!
//! Counts how each lookup was resolved and how table loads went. Each
//! `TranslationManager` owns its own instance, so counters are scoped to the
//! session that produced them.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Resolution and load counters for one translation session.
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Lookups answered by an exact key match
    exact_hits: AtomicUsize,

    /// Lookups answered after trimming surrounding whitespace
    trimmed_hits: AtomicUsize,

    /// Lookups answered by fragment extraction
    fragment_hits: AtomicUsize,

    /// Lookups with no translation under any strategy
    misses: AtomicUsize,

    /// Lookups skipped entirely (not initialized, empty input, no table)
    passthroughs: AtomicUsize,

    /// Table loads that installed a table
    loads_succeeded: AtomicUsize,

    /// Table loads that failed
    loads_failed: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an exact hit.
    ///
    /// Returns the running exact-hit count including this one, which callers
    /// use to sample log output.
    pub fn record_exact_hit(&self) -> usize {
        self.exact_hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_trimmed_hit(&self) {
        self.trimmed_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fragment_hit(&self) {
        self.fragment_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_passthrough(&self) {
        self.passthroughs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_success(&self) {
        self.loads_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_failure(&self) {
        self.loads_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let exact_hits = self.exact_hits.load(Ordering::Relaxed);
        let trimmed_hits = self.trimmed_hits.load(Ordering::Relaxed);
        let fragment_hits = self.fragment_hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);

        let hits = exact_hits + trimmed_hits + fragment_hits;
        let lookups = hits + misses;
        let hit_rate = if lookups > 0 {
            (hits as f64 / lookups as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            exact_hits,
            trimmed_hits,
            fragment_hits,
            misses,
            passthroughs: self.passthroughs.load(Ordering::Relaxed),
            hit_rate,
            loads_succeeded: self.loads_succeeded.load(Ordering::Relaxed),
            loads_failed: self.loads_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of translation statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub exact_hits: usize,
    pub trimmed_hits: usize,
    pub fragment_hits: usize,
    pub misses: usize,
    pub passthroughs: usize,

    /// Share of table lookups that found a translation, as a percentage
    /// (0-100). Passthroughs are not lookups and are excluded.
    pub hit_rate: f64,

    pub loads_succeeded: usize,
    pub loads_failed: usize,
}
