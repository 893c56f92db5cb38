//! Runtime text substitution for game UI and message text.
//!
//! Translation tables are JSON objects mapping source strings to translated
//! strings, one file per language. A [`TranslationManager`] loads them, tracks
//! the active language and translates text on demand, falling back to the
//! original text whenever no translation applies.

pub mod config;
pub mod discovery;
pub mod error;
pub mod host;
pub mod i18n;
pub mod loader;
pub mod notify;
pub mod resolver;
pub mod retry;
pub mod session;
pub mod source;
pub mod store;
pub mod table;

pub use config::Config;
pub use error::LoadError;
pub use i18n::LanguageCode;
pub use resolver::TranslationMode;
pub use session::{LanguageSwitch, TranslationManager};
