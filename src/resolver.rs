//! Translation resolution.
//!
//! Given one language's table and an input text, pick the translation:
//! exact key, then the whitespace-trimmed key, then (in full mode) a
//! fragment carved out of the translation of a longer key that contains the
//! input. All offsets are counted in `char`s.

use crate::table::TranslationTable;
use anyhow::bail;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Which fallbacks the resolver may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// Exact and trimmed lookups only.
    #[default]
    Simple,
    /// Also extract fragments from longer translated texts.
    Full,
}

impl FromStr for TranslationMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value {
            "simple" => Ok(TranslationMode::Simple),
            "full" => Ok(TranslationMode::Full),
            other => bail!("Unknown translation mode: '{}'", other),
        }
    }
}

impl fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationMode::Simple => f.write_str("simple"),
            TranslationMode::Full => f.write_str("full"),
        }
    }
}

/// How a lookup was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The text is a key.
    Exact(&'a str),
    /// The text with surrounding whitespace removed is a key.
    Trimmed(&'a str),
    /// The text is part of `key`; `text` is the matching part of its translation.
    Fragment { key: &'a str, text: String },
    /// Nothing matched.
    Miss,
}

impl Resolution<'_> {
    /// The text to display: the translation, or `original` on a miss.
    pub fn into_text(self, original: &str) -> String {
        match self {
            Resolution::Exact(text) | Resolution::Trimmed(text) => text.to_string(),
            Resolution::Fragment { text, .. } => text,
            Resolution::Miss => original.to_string(),
        }
    }
}

/// Resolve `text` against `table`.
///
/// Fragment extraction only runs in [`TranslationMode::Full`], and only for
/// single-line, non-empty input. The first key in table order that contains
/// the input wins; candidates are not ranked.
pub fn resolve<'a>(table: &'a TranslationTable, text: &str, mode: TranslationMode) -> Resolution<'a> {
    if let Some(translated) = table.get(text) {
        return Resolution::Exact(translated);
    }

    let trimmed = trim_text(text);
    if trimmed != text {
        if let Some(translated) = table.get(trimmed) {
            return Resolution::Trimmed(translated);
        }
    }

    if mode == TranslationMode::Full && !text.is_empty() && !text.contains('\n') {
        for (key, translation) in table.iter() {
            if key == text {
                continue;
            }
            if let Some(byte_index) = key.find(text) {
                let key_index = key[..byte_index].chars().count();
                return Resolution::Fragment {
                    key,
                    text: extract_fragment(text, key, translation, key_index),
                };
            }
        }
    }

    Resolution::Miss
}

/// Strip surrounding whitespace, including stray byte-order marks.
fn trim_text(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Carve the part of `translation` that corresponds to `part`, which occurs
/// in `key` starting at char offset `key_index`.
///
/// Three strategies, in order:
/// 1. line-aligned: key and translation have the same number (> 1) of lines;
///    map the offset within the containing line by that line pair's length
///    ratio, running to the end of the translated line when `part` reaches
///    the end of its line
/// 2. whole-string ratio: lengths within 50% of each other; map start and
///    end by position ratio and keep only the first line of the result
/// 3. proportional estimate: scale start and length by the overall length
///    ratio, at least one char, newlines removed
pub fn extract_fragment(part: &str, key: &str, translation: &str, key_index: usize) -> String {
    let part_len = part.chars().count();

    if let Some(fragment) = extract_by_line(part_len, key, translation, key_index) {
        return fragment;
    }

    let key_len = key.chars().count();
    if key_len == 0 {
        return translation.to_string();
    }

    let chars: Vec<char> = translation.chars().collect();
    let translation_len = chars.len();
    let key_len_f = key_len as f64;
    let translation_len_f = translation_len as f64;

    if (translation_len_f - key_len_f).abs() / key_len_f < 0.5 {
        let start_ratio = key_index as f64 / key_len_f;
        let end_ratio = (key_index + part_len) as f64 / key_len_f;

        let start = ((start_ratio * translation_len_f).round() as usize).min(translation_len);
        let end = ((end_ratio * translation_len_f).round() as usize)
            .min(translation_len)
            .max(start);

        let fragment: String = chars[start..end].iter().collect();
        if !part.contains('\n') {
            if let Some((first_line, _)) = fragment.split_once('\n') {
                return first_line.to_string();
            }
        }
        return fragment;
    }

    let scale = translation_len_f / key_len_f;
    let start = ((key_index as f64 * scale).round() as usize).min(translation_len);
    let length = ((part_len as f64 * scale).round() as usize)
        .min(translation_len - start)
        .max(1);
    let end = (start + length).min(translation_len);

    let mut fragment: String = chars[start..end].iter().collect();
    if !part.contains('\n') {
        fragment.retain(|c| c != '\n');
    }
    fragment
}

fn extract_by_line(
    part_len: usize,
    key: &str,
    translation: &str,
    key_index: usize,
) -> Option<String> {
    let key_lines: Vec<&str> = key.split('\n').collect();
    let translated_lines: Vec<&str> = translation.split('\n').collect();

    if key_lines.len() != translated_lines.len() || key_lines.len() < 2 {
        return None;
    }

    let last = key_lines.len() - 1;
    let mut line_start = 0;

    for (index, (line, translated_line)) in key_lines.iter().zip(&translated_lines).enumerate() {
        let line_len = line.chars().count();
        // A line owns its trailing newline
        let line_end = line_start + line_len + usize::from(index < last);

        if key_index >= line_start
            && key_index < line_end
            && line_len > 0
            && !translated_line.is_empty()
        {
            let relative_index = key_index - line_start;
            let relative_length = part_len.min(line_len - relative_index);

            let translated: Vec<char> = translated_line.chars().collect();
            let ratio = translated.len() as f64 / line_len as f64;

            let start = ((relative_index as f64 * ratio).floor() as usize).min(translated.len());
            let end = if relative_index + relative_length >= line_len {
                translated.len()
            } else {
                ((relative_index + relative_length) as f64 * ratio).floor() as usize
            };
            let end = end.clamp(start, translated.len());

            return Some(translated[start..end].iter().collect());
        }

        line_start = line_end;
    }

    None
}
