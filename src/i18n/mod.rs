//! Language identity and bookkeeping shared by the rest of the crate.
//!
//! # Architecture
//!
//! - `language`: the opaque `LanguageCode` type
//! - `registry`: names and probe order for well-known languages
//! - `metrics`: per-session resolution and load counters
//!
//! # Example
//!
//! ```rust,ignore
//! use dynamic_translation::i18n::{LanguageCode, LanguageRegistry};
//!
//! let japanese = LanguageCode::from_code("ja")?;
//! let label = LanguageRegistry::get().display_name(japanese.as_str());
//! ```

mod language;
mod metrics;
mod registry;

pub use language::LanguageCode;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
