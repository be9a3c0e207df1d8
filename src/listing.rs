//! Resource Listing Assembler: the top-level Swagger 1.2 document.

use crate::aggregator::Aggregation;
use crate::config::{DocumentationConfig, ExtraInfo};
use crate::content_types::FormatSettings;
use crate::inflector::{pluralize, translation_scope};
use crate::parameters::is_blank;
use crate::paths::parse_path;
use log::debug;
use serde::Serialize;
use serde_json::Value;

pub const SWAGGER_VERSION: &str = "1.2";

/// The resource listing document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceListing {
    pub api_version: Option<String>,
    pub swagger_version: String,
    pub produces: Vec<String>,
    pub apis: Vec<ResourceSummary>,
    pub info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorizations: Option<Value>,
}

/// One listed resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSummary {
    pub path: String,
    pub description: String,
}

/// Global API metadata; blank entries are left out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Assembles the resource listing from an aggregation
pub struct ListingAssembler<'a> {
    aggregation: &'a Aggregation,
    config: &'a DocumentationConfig,
    formats: &'a FormatSettings,
    /// Name of the application the documentation is mounted into
    root_name: &'a str,
}

impl<'a> ListingAssembler<'a> {
    pub fn new(
        aggregation: &'a Aggregation,
        config: &'a DocumentationConfig,
        formats: &'a FormatSettings,
        root_name: &'a str,
    ) -> Self {
        Self {
            aggregation,
            config,
            formats,
            root_name,
        }
    }

    pub fn listing(&self) -> ResourceListing {
        let apis = self
            .aggregation
            .resources
            .keys()
            .filter_map(|key| self.summary(key))
            .collect();

        ResourceListing {
            api_version: self.config.api_version.clone(),
            swagger_version: SWAGGER_VERSION.to_string(),
            produces: produces(self.config, self.formats),
            apis,
            info: self.info(),
            authorizations: self
                .config
                .authorizations
                .clone()
                .filter(|value| !is_blank(value)),
        }
    }

    /// Keys of the resources the listing shows, in listing order
    pub fn listed_keys(&self) -> Vec<&'a str> {
        self.aggregation
            .resources
            .keys()
            .filter(|key| self.summary(key).is_some())
            .map(String::as_str)
            .collect()
    }

    /// Listing entry of one resource, `None` when it is not listed
    fn summary(&self, key: &str) -> Option<ResourceSummary> {
        if self.config.hide_documentation_path && self.is_documentation_resource(key) {
            debug!("Hiding documentation resource `{}`", key);
            return None;
        }

        let routes = self.aggregation.routes(key)?;
        let all_hidden = routes
            .iter()
            .map(|mounted| mounted.route.is_hidden())
            .fold(true, |all, hidden| all & hidden);
        if all_hidden {
            debug!("Resource `{}` has no visible routes", key);
            return None;
        }

        let namespace_name = self.aggregation.namespace_name(key);
        let description = self
            .aggregation
            .namespaces
            .get(namespace_name)
            .and_then(|namespace| namespace.description.as_ref())
            .map(|description| description.resolve())
            .unwrap_or_else(|| format!("Operations about {}", pluralize(namespace_name)));

        let format_suffix = if self.config.hide_format { "" } else { ".{format}" };

        Some(ResourceSummary {
            path: format!("/{}{}", key, format_suffix),
            description,
        })
    }

    fn is_documentation_resource(&self, key: &str) -> bool {
        let mount = parse_path(&self.config.mount_path, None, self.config.hide_format);
        format!("/{}/", key).starts_with(&format!("{}/", mount))
    }

    fn info(&self) -> Info {
        let ExtraInfo {
            title,
            description,
            contact,
            license,
            license_url,
            terms_of_service_url,
        } = &self.config.info;

        let scope = translation_scope(self.root_name);
        let translated = |key: &str| self.config.translator.translate(&format!("{}.{}", scope, key));

        let description = translated("description").or_else(|| description.clone());

        Info {
            contact: present(contact.clone()),
            description: present(self.config.markdown.as_markdown(description)),
            license: present(license.clone()),
            license_url: present(license_url.clone()),
            terms_of_service_url: present(terms_of_service_url.clone()),
            title: present(translated("title").or_else(|| title.clone())),
        }
    }
}

/// MIME types of the documented application, honoring a forced format
pub fn produces(config: &DocumentationConfig, formats: &FormatSettings) -> Vec<String> {
    formats
        .with_forced_format(config.format.as_deref())
        .produces()
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
