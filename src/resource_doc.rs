//! Per-resource document: the operations of one resource grouped by path,
//! plus every model they refer to.

use crate::aggregator::Aggregation;
use crate::config::DocumentationConfig;
use crate::content_types::FormatSettings;
use crate::deferred::{BasePath, RequestContext};
use crate::error::{Error, Result};
use crate::listing::{produces, SWAGGER_VERSION};
use crate::models::{ModelResolver, ModelSchema};
use crate::parameters::{is_blank, OperationSpec, RouteDoc};
use crate::paths::parse_path;
use crate::source::ModelRegistry;
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use serde_json::Value;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDocument {
    pub api_version: Option<String>,
    pub swagger_version: String,
    pub resource_path: String,
    pub produces: Vec<String>,
    pub apis: Vec<ApiPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<IndexMap<String, ModelSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorizations: Option<Value>,
}

/// Operations sharing one rendered path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiPath {
    pub path: String,
    pub operations: Vec<OperationSpec>,
}

pub struct ResourceDocBuilder<'a> {
    aggregation: &'a Aggregation,
    config: &'a DocumentationConfig,
    models: &'a ModelRegistry,
    formats: &'a FormatSettings,
}

impl<'a> ResourceDocBuilder<'a> {
    pub fn new(
        aggregation: &'a Aggregation,
        config: &'a DocumentationConfig,
        models: &'a ModelRegistry,
        formats: &'a FormatSettings,
    ) -> Self {
        Self {
            aggregation,
            config,
            models,
            formats,
        }
    }

    /// Renders the document of resource `name`.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when no resource of that name has a visible route,
    /// `Error::UnknownModel` when an operation refers to an unregistered model.
    pub fn build(&self, name: &str, request: &RequestContext) -> Result<ResourceDocument> {
        let routes = self
            .aggregation
            .routes(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        let mut grouped: IndexMap<String, Vec<OperationSpec>> = IndexMap::new();
        let mut model_roots: Vec<&str> = self.config.models.iter().map(String::as_str).collect();

        for mounted in routes.iter().filter(|mounted| !mounted.route.is_hidden()) {
            let doc = RouteDoc::new(mounted, self.config, self.models);
            model_roots.extend(doc.model_references());

            let path = parse_path(
                &mounted.route.path,
                self.config.api_version.as_deref(),
                self.config.hide_format,
            );
            grouped.entry(path).or_default().push(doc.operation());
        }

        if grouped.is_empty() {
            debug!("Resource `{}` has no visible routes", name);
            return Err(Error::NotFound(name.to_string()));
        }

        let resolved = ModelResolver::new(self.models, self.config.translator.as_ref())
            .resolve(model_roots)?;

        let base_path = resolve_base_path(self.config.base_path.as_ref(), request);

        Ok(ResourceDocument {
            api_version: self.config.api_version.clone(),
            swagger_version: SWAGGER_VERSION.to_string(),
            resource_path: format!("/{}", self.aggregation.namespace_name(name)),
            produces: produces(self.config, self.formats),
            apis: grouped
                .into_iter()
                .map(|(path, operations)| ApiPath { path, operations })
                .collect(),
            base_path: (self.config.root_base_path && !base_path.is_empty()).then_some(base_path),
            models: (!resolved.is_empty()).then_some(resolved),
            authorizations: self
                .config
                .authorizations
                .clone()
                .filter(|value| !is_blank(value)),
        })
    }
}

/// The `basePath` of a resource document.
///
/// A callback receives the request; an absolute URL is used as is; a relative
/// path is joined onto the request's base URL. Without configuration the
/// request's base URL itself is the base path.
pub fn resolve_base_path(base_path: Option<&BasePath>, request: &RequestContext) -> String {
    match base_path {
        Some(BasePath::Lazy(f)) => f(request),
        Some(BasePath::Literal(path)) => match Url::parse(path) {
            Ok(_) => path.clone(),
            Err(url::ParseError::RelativeUrlWithoutBase) => join_base_url(&request.base_url, path),
            Err(err) => {
                debug!("Base path `{}` is not a URL ({}), using it verbatim", path, err);
                path.clone()
            }
        },
        None => request.base_url.clone(),
    }
}

fn join_base_url(base_url: &str, path: &str) -> String {
    match Url::parse(base_url).and_then(|base| base.join(path)) {
        Ok(joined) => joined.to_string(),
        Err(_) => format!("{}{}", base_url, path),
    }
}
