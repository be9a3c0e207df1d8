//! Translation lookup for descriptions, titles and property docs.
//!
//! The host application owns its translations; this module only defines the
//! lookup seam and a map-backed implementation fed from the manifest.

use indexmap::IndexMap;
use serde_json::Value;

/// Looks up a translation by dotted key (`my_app.widgets.id`).
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str) -> Option<String>;
}

/// Translator that knows no translations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranslations;

impl Translator for NoTranslations {
    fn translate(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Translator backed by a flat map of dotted keys.
#[derive(Debug, Clone, Default)]
pub struct MapTranslator {
    entries: IndexMap<String, String>,
}

impl MapTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a translator from a nested map; nested keys are joined with `.`.
    /// Non-string leaves are stored in their JSON rendering.
    pub fn from_nested(tree: &Value) -> Self {
        let mut translator = Self::new();
        translator.merge_nested(tree);
        translator
    }

    /// Adds every leaf of a nested map, overriding existing keys.
    pub fn merge_nested(&mut self, tree: &Value) {
        flatten_into(&mut self.entries, String::new(), tree);
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Translator for MapTranslator {
    fn translate(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned()
    }
}

fn flatten_into(entries: &mut IndexMap<String, String>, prefix: String, node: &Value) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(entries, path, child);
            }
        }
        Value::Null => {}
        Value::String(text) if !prefix.is_empty() => {
            entries.insert(prefix, text.clone());
        }
        other if !prefix.is_empty() => {
            entries.insert(prefix, other.to_string());
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_translations() {
        assert_eq!(NoTranslations.translate("anything"), None);
    }

    #[test]
    fn test_nested_keys_are_flattened() {
        let translator = MapTranslator::from_nested(&json!({
            "my_app": {
                "title": "My App",
                "widgets": { "id": "Widget identifier" }
            }
        }));

        assert_eq!(translator.len(), 2);
        assert_eq!(translator.translate("my_app.title"), Some("My App".to_string()));
        assert_eq!(
            translator.translate("my_app.widgets.id"),
            Some("Widget identifier".to_string())
        );
        assert_eq!(translator.translate("my_app.widgets"), None);
    }

    #[test]
    fn test_empty_translation_counts_as_missing() {
        let mut translator = MapTranslator::new();
        translator.insert("a.b", "");
        assert_eq!(translator.translate("a.b"), None);
    }

    #[test]
    fn test_merge_overrides() {
        let mut translator = MapTranslator::from_nested(&json!({"a": {"b": "one"}}));
        translator.merge_nested(&json!({"a": {"b": "two"}}));
        assert_eq!(translator.translate("a.b"), Some("two".to_string()));
    }
}
