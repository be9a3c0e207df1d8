//! Options of a mounted documentation service.

use crate::deferred::BasePath;
use crate::i18n::{NoTranslations, Translator};
use crate::markdown::Markdown;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_MOUNT_PATH: &str = "/swagger_doc";
pub const DEFAULT_API_VERSION: &str = "0.1";
pub const DEFAULT_API_DOC: &str = "Swagger compatible API description";
pub const DEFAULT_SPECIFIC_API_DOC: &str = "Swagger compatible API description for specific API";

/// Global API metadata rendered into the listing's `info` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub license_url: Option<String>,
    #[serde(default)]
    pub terms_of_service_url: Option<String>,
}

/// Everything the documentation service is configured with at mount time.
#[derive(Clone)]
pub struct DocumentationConfig {
    pub mount_path: String,
    /// Name the documentation service registers its own routes under
    pub class_name: Option<String>,
    pub base_path: Option<BasePath>,
    /// `None` leaves `{version}` placeholders in rendered paths
    pub api_version: Option<String>,
    pub info: ExtraInfo,
    pub hide_format: bool,
    /// Serialization format forced onto the documented API
    pub format: Option<String>,
    pub hide_documentation_path: bool,
    /// Models every resource document includes
    pub models: Vec<String>,
    /// Authorization metadata echoed verbatim
    pub authorizations: Option<Value>,
    /// `false` suppresses `basePath` in resource documents
    pub root_base_path: bool,
    pub api_documentation: String,
    pub specific_api_documentation: String,
    pub markdown: Markdown,
    pub translator: Arc<dyn Translator>,
}

impl DocumentationConfig {
    /// Name of the documentation service; derived from the mount path unless set
    pub fn class_name(&self) -> String {
        self.class_name
            .clone()
            .unwrap_or_else(|| self.mount_path.replace('/', ""))
    }
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
            class_name: None,
            base_path: None,
            api_version: Some(DEFAULT_API_VERSION.to_string()),
            info: ExtraInfo::default(),
            hide_format: false,
            format: None,
            hide_documentation_path: false,
            models: Vec::new(),
            authorizations: None,
            root_base_path: true,
            api_documentation: DEFAULT_API_DOC.to_string(),
            specific_api_documentation: DEFAULT_SPECIFIC_API_DOC.to_string(),
            markdown: Markdown::default(),
            translator: Arc::new(NoTranslations),
        }
    }
}

impl fmt::Debug for DocumentationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentationConfig")
            .field("mount_path", &self.mount_path)
            .field("base_path", &self.base_path)
            .field("api_version", &self.api_version)
            .field("hide_format", &self.hide_format)
            .field("format", &self.format)
            .field("hide_documentation_path", &self.hide_documentation_path)
            .field("models", &self.models)
            .field("root_base_path", &self.root_base_path)
            .field("markdown", &self.markdown)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DocumentationConfig::default();
        assert_eq!(config.mount_path, "/swagger_doc");
        assert_eq!(config.api_version.as_deref(), Some("0.1"));
        assert!(config.root_base_path);
        assert!(!config.hide_format);
        assert!(config.models.is_empty());
    }

    #[test]
    fn test_class_name_from_mount_path() {
        let config = DocumentationConfig {
            mount_path: "/api/docs".to_string(),
            ..Default::default()
        };
        assert_eq!(config.class_name(), "apidocs");
    }

    #[test]
    fn test_extra_info_deserializes_snake_case_keys() {
        let info: ExtraInfo = serde_yaml::from_str(
            "title: Widgets\nlicense_url: https://example.org/license\n",
        )
        .unwrap();
        assert_eq!(info.title.as_deref(), Some("Widgets"));
        assert_eq!(info.license_url.as_deref(), Some("https://example.org/license"));
        assert!(info.contact.is_none());
    }
}
