//! Glue between the engine and the host game.
//!
//! The host exposes its built-in UI terms through [`TextLookup`];
//! [`TranslatedLookup`] wraps any lookup so every term comes back through
//! the active translation table. Message text, the language command and the
//! options-menu language cycle live here too.

use crate::i18n::LanguageCode;
use crate::session::{LanguageSwitch, TranslationManager};
use crate::source::TranslationSource;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Name of the command that switches the active language.
pub const SET_LANGUAGE_COMMAND: &str = "SetLanguage";

/// The host's categorized UI terms.
pub trait TextLookup {
    /// Basic status terms ("Level", "HP", ...).
    fn basic(&self, id: usize) -> String;
    /// Parameter names ("Attack", "Defense", ...).
    fn param(&self, id: usize) -> String;
    /// Menu commands ("Item", "Save", ...).
    fn command(&self, id: usize) -> String;
    /// Named messages ("saveMessage", "obtainGold", ...).
    fn message(&self, id: &str) -> String;
    fn currency_unit(&self) -> String;
}

/// Terms read from the engine's `System.json`.
///
/// Missing ids and `null` entries read as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemTerms {
    #[serde(rename = "currencyUnit", default)]
    currency_unit: String,
    #[serde(default)]
    terms: Terms,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Terms {
    #[serde(default)]
    basic: Vec<Option<String>>,
    #[serde(default)]
    params: Vec<Option<String>>,
    #[serde(default)]
    commands: Vec<Option<String>>,
    #[serde(default)]
    messages: HashMap<String, String>,
}

impl SystemTerms {
    pub fn from_json(payload: &str) -> Result<Self> {
        let payload = payload.strip_prefix('\u{feff}').unwrap_or(payload);
        serde_json::from_str(payload).context("Failed to parse system data")
    }

    pub async fn from_file(path: &str) -> Result<Self> {
        let payload = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system data from {}", path))?;
        Self::from_json(&payload)
    }
}

fn term(list: &[Option<String>], id: usize) -> String {
    list.get(id).cloned().flatten().unwrap_or_default()
}

impl TextLookup for SystemTerms {
    fn basic(&self, id: usize) -> String {
        term(&self.terms.basic, id)
    }

    fn param(&self, id: usize) -> String {
        term(&self.terms.params, id)
    }

    fn command(&self, id: usize) -> String {
        term(&self.terms.commands, id)
    }

    fn message(&self, id: &str) -> String {
        self.terms.messages.get(id).cloned().unwrap_or_default()
    }

    fn currency_unit(&self) -> String {
        self.currency_unit.clone()
    }
}

/// A [`TextLookup`] whose results are translated into the active language.
pub struct TranslatedLookup<L, S> {
    inner: L,
    manager: Arc<TranslationManager<S>>,
}

impl<L: TextLookup, S: TranslationSource> TranslatedLookup<L, S> {
    pub fn new(inner: L, manager: Arc<TranslationManager<S>>) -> Self {
        Self { inner, manager }
    }

    /// The untranslated lookup.
    pub fn raw(&self) -> &L {
        &self.inner
    }
}

impl<L: TextLookup, S: TranslationSource> TextLookup for TranslatedLookup<L, S> {
    fn basic(&self, id: usize) -> String {
        self.manager.translate(&self.inner.basic(id))
    }

    fn param(&self, id: usize) -> String {
        self.manager.translate(&self.inner.param(id))
    }

    fn command(&self, id: usize) -> String {
        self.manager.translate(&self.inner.command(id))
    }

    fn message(&self, id: &str) -> String {
        self.manager.translate(&self.inner.message(id))
    }

    fn currency_unit(&self) -> String {
        self.manager.translate(&self.inner.currency_unit())
    }
}

/// Translate a message box text.
///
/// The whole text is tried first. If that changes nothing, each non-blank
/// line is translated on its own and the lines are joined back together.
pub fn translate_message<S: TranslationSource>(manager: &TranslationManager<S>, text: &str) -> String {
    if !manager.is_initialized() {
        return text.to_string();
    }

    let whole = manager.translate(text);
    if whole != text {
        return whole;
    }

    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                manager.translate(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result of [`dispatch_command`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Unknown command, or a known one without a usable argument.
    Ignored,
    Language(LanguageSwitch),
}

/// Run a host command.
///
/// Only `SetLanguage <code>` is understood; anything else is ignored.
pub async fn dispatch_command<S: TranslationSource>(
    manager: &TranslationManager<S>,
    command: &str,
    args: &[&str],
) -> CommandOutcome {
    if command != SET_LANGUAGE_COMMAND {
        debug!("Ignoring unknown command '{}'", command);
        return CommandOutcome::Ignored;
    }

    match args.first().and_then(|arg| LanguageCode::from_code(arg).ok()) {
        Some(code) => CommandOutcome::Language(manager.set_language(&code).await),
        None => CommandOutcome::Ignored,
    }
}

/// The language after `current` in `available`, wrapping around.
///
/// If `current` is not in the list the first language is next. Returns
/// `None` for an empty list.
pub fn next_language(current: &LanguageCode, available: &[LanguageCode]) -> Option<LanguageCode> {
    let next = match available.iter().position(|code| code == current) {
        Some(index) => (index + 1) % available.len(),
        None => 0,
    };
    available.get(next).cloned()
}
