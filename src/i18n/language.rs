//! Language code type.
//!
//! Codes are opaque: any non-blank string the host supplies is accepted,
//! whether or not the registry knows about it.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier selecting a translation table (e.g. "zh", "en").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Create a language code from a string.
    ///
    /// Surrounding whitespace is stripped.
    ///
    /// # Returns
    /// * `Ok(LanguageCode)` for any non-blank input
    /// * `Err` if the input is empty or only whitespace
    pub fn from_code(code: &str) -> Result<LanguageCode> {
        let code = code.trim();
        if code.is_empty() {
            bail!("Language code must not be empty");
        }
        Ok(LanguageCode(code.to_string()))
    }

    /// Wrap a code from the built-in registry, which is known to be valid.
    pub(crate) fn from_registry(code: &'static str) -> LanguageCode {
        LanguageCode(code.to_string())
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LanguageCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for LanguageCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LanguageCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
