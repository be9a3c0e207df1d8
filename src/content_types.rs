//! MIME types produced by the documented API.

use indexmap::IndexMap;

/// Known serialization formats and their MIME types, in lookup order.
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("xml", "application/xml"),
    ("serializable_hash", "application/json"),
    ("json", "application/json"),
    ("binary", "application/octet-stream"),
    ("txt", "text/plain"),
];

/// Formats the host's default formatter registry can render.
const DEFAULT_FORMATTERS: &[&str] = &["json", "serializable_hash", "txt", "xml"];

/// Serialization settings of the documented application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSettings {
    /// Explicitly configured content types (format → MIME type)
    pub content_types: IndexMap<String, String>,
    pub format: Option<String>,
    pub default_format: Option<String>,
}

impl FormatSettings {
    /// MIME types the application produces.
    ///
    /// Explicit content types win; otherwise the explicitly set formats are
    /// mapped, and without those every default formatter is.
    pub fn produces(&self) -> Vec<String> {
        let mut produced: Vec<String> = Vec::new();

        if self.content_types.is_empty() {
            let mut formats: Vec<&str> = [self.format.as_deref(), self.default_format.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            if formats.is_empty() {
                formats = DEFAULT_FORMATTERS.to_vec();
            }

            for (format, mime) in CONTENT_TYPES {
                if formats.contains(format) {
                    push_unique(&mut produced, mime);
                }
            }
        } else {
            for mime in self.content_types.values() {
                push_unique(&mut produced, mime);
            }
        }

        produced
    }

    /// The same settings with the serialization format forced to `format`
    pub fn with_forced_format(&self, format: Option<&str>) -> FormatSettings {
        match format {
            Some(format) => FormatSettings {
                content_types: self.content_types.clone(),
                format: Some(format.to_string()),
                default_format: None,
            },
            None => self.clone(),
        }
    }
}

fn push_unique(produced: &mut Vec<String>, mime: &str) {
    if !produced.iter().any(|existing| existing == mime) {
        produced.push(mime.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_all_formatters() {
        let settings = FormatSettings::default();
        assert_eq!(
            settings.produces(),
            vec!["application/xml", "application/json", "text/plain"]
        );
    }

    #[test]
    fn test_explicit_format() {
        let settings = FormatSettings {
            format: Some("json".to_string()),
            default_format: Some("json".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.produces(), vec!["application/json"]);
    }

    #[test]
    fn test_explicit_content_types_win() {
        let mut content_types = IndexMap::new();
        content_types.insert("json".to_string(), "application/json".to_string());
        content_types.insert("csv".to_string(), "text/csv".to_string());
        let settings = FormatSettings {
            content_types,
            format: Some("xml".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.produces(), vec!["application/json", "text/csv"]);
    }

    #[test]
    fn test_forced_format_replaces_declared_formats() {
        let settings = FormatSettings {
            format: Some("xml".to_string()),
            default_format: Some("txt".to_string()),
            ..Default::default()
        };
        assert_eq!(
            settings.with_forced_format(Some("json")).produces(),
            vec!["application/json"]
        );
        assert_eq!(settings.with_forced_format(None), settings);
    }
}
