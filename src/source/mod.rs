//! Route source module: the typed view of the host framework's registrations.
//!
//! The host framework registers applications, their endpoints, routes,
//! namespaces and data models once at boot. This module defines the read-only
//! descriptors the documentation core consumes and the [`RouteSource`] trait
//! through which it walks mounted applications.
//!
//! All "is it a map, a literal or a callback" handling of loosely typed
//! declarations happens when descriptors are built (see [`manifest`]); the
//! rest of the crate only sees the strongly typed structures below.
//!
//! # Example
//!
//! ```no_run
//! use swagger_from_routes::source::manifest::Manifest;
//! use swagger_from_routes::source::RouteSource;
//! use std::path::Path;
//!
//! let manifest = Manifest::load(Path::new("api.yaml")).unwrap();
//! println!("Documenting app {}", manifest.catalog.root().name);
//! ```

pub mod manifest;

use crate::deferred::{Deferred, ValueSet};
use crate::content_types::FormatSettings;
use crate::types::stripped_model_name;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Read access to the registered applications and models.
///
/// Implementations hand out the application the documentation is mounted
/// into, the applications it mounts (by name) and the model registry.
pub trait RouteSource {
    /// The application the documentation service is mounted into
    fn root(&self) -> &AppDescriptor;

    /// Looks up a mounted application by name
    fn app(&self, name: &str) -> Option<&AppDescriptor>;

    /// Registered data models
    fn models(&self) -> &ModelRegistry;
}

/// A registered application: its endpoints and serialization settings.
#[derive(Debug, Clone, Default)]
pub struct AppDescriptor {
    pub name: String,
    pub endpoints: Vec<EndpointDescriptor>,
    pub formats: FormatSettings,
}

/// One endpoint of an application.
///
/// An endpoint either declares routes itself or mounts another application,
/// whose routes it then exposes.
#[derive(Debug, Clone, Default)]
pub struct EndpointDescriptor {
    /// Namespace the endpoint was declared in, with its configuration
    pub namespace: Option<NamespaceDescriptor>,
    pub routes: Vec<Arc<RouteDescriptor>>,
    /// Name of the mounted application, if this endpoint is a mount
    pub mounts: Option<String>,
}

/// A declared path scope.
#[derive(Debug, Clone, Default)]
pub struct NamespaceDescriptor {
    /// Full namespace path, e.g. `/widgets/parts`
    pub path: String,
    pub description: Option<Deferred<String>>,
    /// Render as its own resource instead of folding into the parent
    pub standalone: bool,
    /// Display name used as resource identifier when standalone
    pub display_name: Option<String>,
}

impl NamespaceDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Resource identifier of a standalone namespace named `name`.
    ///
    /// A display name has its spaces replaced by hyphens; otherwise the name
    /// has underscores replaced by hyphens and slashes by underscores.
    pub fn standalone_identifier(&self, name: &str) -> String {
        match &self.display_name {
            Some(display) => display.replace(' ', "-"),
            None => name.replace('_', "-").replace('/', "_"),
        }
    }
}

/// HTTP methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    /// Upper-case method name
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Parses a method name case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            "OPTIONS" => Some(HttpMethod::Options),
            "HEAD" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    /// Whether requests with this method carry a form or body payload
    pub fn is_mutating(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete registration of one route.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub method: HttpMethod,
    /// Path template, e.g. `/:version/widgets/:id(.:format)`
    pub path: String,
    /// Framework prefix preceding the resource segment
    pub prefix: Option<String>,
    /// Full path of the owning namespace, e.g. `/widgets`
    pub namespace: Option<String>,
    /// Declared parameters in declaration order
    pub params: IndexMap<String, ParamDecl>,
    pub headers: IndexMap<String, ParamDecl>,
    pub http_codes: Vec<ResponseCode>,
    /// Response/request models, first one is the operation's response type
    pub entities: Vec<String>,
    pub hidden: Deferred<bool>,
    pub nickname: Option<String>,
    /// One-line summary
    pub description: Option<String>,
    pub notes: Option<String>,
    pub authorizations: Option<Value>,
}

impl RouteDescriptor {
    /// Create a new RouteDescriptor with minimal required fields
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            prefix: None,
            namespace: None,
            params: IndexMap::new(),
            headers: IndexMap::new(),
            http_codes: Vec::new(),
            entities: Vec::new(),
            hidden: Deferred::Value(false),
            nickname: None,
            description: None,
            notes: None,
            authorizations: None,
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, decl: ParamDecl) -> Self {
        self.params.insert(name.into(), decl);
        self
    }

    /// Evaluates the visibility flag
    pub fn is_hidden(&self) -> bool {
        self.hidden.resolve()
    }
}

/// A declared request parameter or header.
#[derive(Debug, Clone, Default)]
pub struct ParamDecl {
    /// Raw type token, `string` when absent
    pub type_token: Option<String>,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<Deferred<String>>,
    /// Translation key overriding the parameter name
    pub i18n_key: Option<String>,
    pub values: Option<ValueSet>,
    pub is_array: bool,
    /// Explicit location override (`path`, `query`, `form`, `body`, `header`)
    pub param_type: Option<String>,
    /// Display name overriding the declared name
    pub full_name: Option<String>,
}

impl ParamDecl {
    pub fn typed(type_token: impl Into<String>) -> Self {
        Self {
            type_token: Some(type_token.into()),
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Deferred::Value(description.into()));
        self
    }
}

/// A declared response status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCode {
    pub code: u16,
    pub message: String,
    pub model: Option<String>,
}

/// A data model and its exposed properties.
#[derive(Debug, Clone, Default)]
pub struct ModelDescriptor {
    /// Fully qualified name; models are identified by it
    pub name: String,
    /// Explicit display name overriding the stripped name
    pub entity_name: Option<String>,
    /// Explicit document id
    pub root: Option<String>,
    pub exposures: IndexMap<String, Exposure>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Canonical name used in `$ref`s and as key of the `models` section
    pub fn canonical_name(&self) -> String {
        match &self.entity_name {
            Some(name) => name.clone(),
            None => stripped_model_name(&self.name),
        }
    }

    /// Documented properties in declaration order
    pub fn documented(&self) -> impl Iterator<Item = (&String, &PropertySpec)> {
        self.exposures
            .iter()
            .filter_map(|(name, exposure)| exposure.documentation.as_ref().map(|doc| (name, doc)))
    }

    /// Names of sub-models used by documented properties
    pub fn documented_sub_models(&self) -> impl Iterator<Item = &str> {
        self.exposures
            .values()
            .filter(|exposure| exposure.documentation.is_some())
            .filter_map(|exposure| exposure.using.as_deref())
    }
}

/// One exposed attribute of a model.
#[derive(Debug, Clone, Default)]
pub struct Exposure {
    /// Model used to present the attribute
    pub using: Option<String>,
    /// Documentation of the attribute; undocumented exposures are not rendered
    pub documentation: Option<PropertySpec>,
}

/// Documentation of a model property.
#[derive(Debug, Clone, Default)]
pub struct PropertySpec {
    pub type_token: Option<String>,
    pub required: bool,
    pub is_array: bool,
    pub description: Option<Deferred<String>>,
    pub values: Option<ValueSet>,
    /// Additional keys passed through to the rendered property
    pub extra: Map<String, Value>,
}

/// Registered models, looked up by fully qualified or canonical name.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: IndexMap<String, Arc<ModelDescriptor>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model, replacing any model with the same name
    pub fn register(&mut self, model: ModelDescriptor) {
        self.models.insert(model.name.clone(), Arc::new(model));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ModelDescriptor>> {
        self.models.get(name).or_else(|| {
            self.models
                .values()
                .find(|model| model.canonical_name() == name)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Canonical name of a referenced model; unregistered names are stripped
    pub fn canonical_name(&self, name: &str) -> String {
        match self.get(name) {
            Some(model) => model.canonical_name(),
            None => stripped_model_name(name),
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ModelDescriptor>> {
        self.models.values()
    }
}

/// In-memory [`RouteSource`]: a root application, the applications it may
/// mount and the model registry.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: AppDescriptor,
    apps: IndexMap<String, AppDescriptor>,
    models: ModelRegistry,
}

impl Catalog {
    pub fn new(root: AppDescriptor) -> Self {
        Self {
            root,
            apps: IndexMap::new(),
            models: ModelRegistry::new(),
        }
    }

    /// Registers a mountable application, replacing one with the same name
    pub fn add_app(&mut self, app: AppDescriptor) {
        self.apps.insert(app.name.clone(), app);
    }

    pub fn register_model(&mut self, model: ModelDescriptor) {
        self.models.register(model);
    }

    pub fn with_app(mut self, app: AppDescriptor) -> Self {
        self.add_app(app);
        self
    }

    pub fn with_model(mut self, model: ModelDescriptor) -> Self {
        self.register_model(model);
        self
    }
}

impl RouteSource for Catalog {
    fn root(&self) -> &AppDescriptor {
        &self.root
    }

    fn app(&self, name: &str) -> Option<&AppDescriptor> {
        if self.root.name == name {
            Some(&self.root)
        } else {
            self.apps.get(name)
        }
    }

    fn models(&self) -> &ModelRegistry {
        &self.models
    }
}
