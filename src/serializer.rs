//! Serialization of documentation documents to JSON or YAML, and file output.

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serializes a document to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```no_run
/// use swagger_from_routes::documentation::Documentation;
/// use swagger_from_routes::serializer::serialize_yaml;
/// use swagger_from_routes::source::manifest::Manifest;
/// use std::path::Path;
///
/// let manifest = Manifest::load(Path::new("api.yaml")).unwrap();
/// let docs = Documentation::mount(&manifest.catalog, manifest.config).unwrap();
/// println!("{}", serialize_yaml(&docs.listing()).unwrap());
/// ```
pub fn serialize_yaml<T: Serialize>(doc: &T) -> Result<String> {
    debug!("Serializing document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize document to YAML")
}

/// Serializes a document to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json<T: Serialize>(doc: &T) -> Result<String> {
    debug!("Serializing document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize document to JSON")
}

/// Writes `content` to `path`, creating missing parent directories and
/// overwriting an existing file.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{Info, ResourceListing, ResourceSummary};
    use tempfile::TempDir;

    fn create_test_listing() -> ResourceListing {
        ResourceListing {
            api_version: Some("v1".to_string()),
            swagger_version: "1.2".to_string(),
            produces: vec!["application/json".to_string()],
            apis: vec![ResourceSummary {
                path: "/widgets.{format}".to_string(),
                description: "Widget ops".to_string(),
            }],
            info: Info {
                title: Some("Widgets API".to_string()),
                ..Default::default()
            },
            authorizations: None,
        }
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_listing()).unwrap();

        assert!(yaml.contains("apiVersion: v1"));
        assert!(yaml.contains("swaggerVersion:"));
        assert!(yaml.contains("/widgets.{format}"));
        assert!(yaml.contains("title: Widgets API"));
        assert!(!yaml.contains("authorizations"));
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_listing()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["apiVersion"], "v1");
        assert_eq!(parsed["apis"][0]["description"], "Widget ops");
        assert_eq!(parsed["info"]["title"], "Widgets API");
        assert!(parsed.get("authorizations").is_none());
    }

    #[test]
    fn test_serialize_json_keeps_field_order() {
        let json = serialize_json(&create_test_listing()).unwrap();

        let api_version = json.find("\"apiVersion\"").unwrap();
        let swagger_version = json.find("\"swaggerVersion\"").unwrap();
        let apis = json.find("\"apis\"").unwrap();
        assert!(api_version < swagger_version && swagger_version < apis);
        assert!(json.lines().count() > 5, "JSON should be pretty printed");
    }

    #[test]
    fn test_write_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("listing.json");

        write_to_file("{}", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");
    }

    #[test]
    fn test_write_to_file_creates_directories_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("docs").join("nested").join("widgets.json");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }
}
