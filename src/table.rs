//! Translation tables: flat original-text to translated-text mappings.

use crate::error::LoadError;
use crate::i18n::LanguageCode;
use serde_json::{Map, Value};

/// An immutable original-text → translated-text mapping for one language.
///
/// Entries keep the order in which their keys first appeared in the source
/// payload. Fragment extraction scans keys in this order and takes the
/// first one that matches. Every value is a `Value::String`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    entries: Map<String, Value>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from key/value pairs.
    ///
    /// A repeated key keeps its first position and takes the last value,
    /// the same way a JSON object with duplicate keys is read.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), Value::String(value.into())))
            .collect();
        Self { entries }
    }

    /// Parse a translation file payload.
    ///
    /// The payload must be a single JSON object whose values are all strings.
    /// A leading byte-order mark is ignored.
    pub fn from_json(code: &LanguageCode, payload: &str) -> Result<Self, LoadError> {
        let payload = payload.strip_prefix('\u{feff}').unwrap_or(payload);

        let entries: Map<String, Value> =
            serde_json::from_str(payload).map_err(|e| LoadError::Parse {
                code: code.to_string(),
                message: e.to_string(),
            })?;

        if let Some((key, other)) = entries.iter().find(|(_, value)| !value.is_string()) {
            return Err(LoadError::Parse {
                code: code.to_string(),
                message: format!(
                    "value for key {:?} is {}, expected a string",
                    preview(key),
                    json_kind(other)
                ),
            });
        }

        Ok(Self { entries })
    }

    /// Look up the translation for an exact key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Entries in payload order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| Some((key.as_str(), value.as_str()?)))
    }

    /// Keys in payload order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// First 50 characters of a text, with an ellipsis if it was cut.
pub(crate) fn preview(text: &str) -> String {
    const LIMIT: usize = 50;
    match text.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zh() -> LanguageCode {
        LanguageCode::from_code("zh").unwrap()
    }

    // ==================== from_json Tests ====================

    #[test]
    fn test_from_json_flat_object() {
        let table = TranslationTable::from_json(&zh(), r#"{"Level": "等級", "HP": "生命值"}"#)
            .expect("Should parse");

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("Level"), Some("等級"));
        assert_eq!(table.get("HP"), Some("生命值"));
        assert_eq!(table.get("MP"), None);
    }

    #[test]
    fn test_from_json_keeps_payload_order() {
        let table = TranslationTable::from_json(&zh(), r#"{"b": "2", "a": "1", "c": "3"}"#)
            .expect("Should parse");

        let keys: Vec<&str> = table.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_from_json_strips_byte_order_mark() {
        let table = TranslationTable::from_json(&zh(), "\u{feff}{\"Save\": \"儲存\"}")
            .expect("Should parse");
        assert_eq!(table.get("Save"), Some("儲存"));
    }

    #[test]
    fn test_from_json_multiline_values() {
        let table =
            TranslationTable::from_json(&zh(), r#"{"Line 1\nLine 2": "行 1\n行 2"}"#).unwrap();
        assert_eq!(table.get("Line 1\nLine 2"), Some("行 1\n行 2"));
    }

    #[test]
    fn test_from_json_empty_object() {
        let table = TranslationTable::from_json(&zh(), "{}").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_from_json_malformed() {
        let err = TranslationTable::from_json(&zh(), "{not json").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert_eq!(err.code(), "zh");
    }

    #[test]
    fn test_from_json_rejects_array() {
        let err = TranslationTable::from_json(&zh(), r#"["Level", "等級"]"#).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_from_json_rejects_nested_values() {
        let err = TranslationTable::from_json(&zh(), r#"{"menu": {"Save": "儲存"}}"#).unwrap_err();
        match err {
            LoadError::Parse { message, .. } => assert!(message.contains("an object")),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_rejects_number_values() {
        let err = TranslationTable::from_json(&zh(), r#"{"Level": 1}"#).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    // ==================== from_pairs Tests ====================

    #[test]
    fn test_from_pairs_duplicate_key_keeps_position_takes_last_value() {
        let table = TranslationTable::from_pairs([("a", "1"), ("b", "2"), ("a", "3")]);

        let entries: Vec<(&str, &str)> = table.iter().collect();
        assert_eq!(entries, vec![("a", "3"), ("b", "2")]);
    }

    // ==================== preview Tests ====================

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("Level"), "Level");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let text = "等".repeat(60);
        let shown = preview(&text);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), 53);
    }
}
