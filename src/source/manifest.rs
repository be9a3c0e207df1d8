//! Manifest normalization.
//!
//! A manifest describes the registered applications, routes and models in
//! YAML or JSON. Its raw, loosely typed shape (parameters given as maps or
//! bare values, enum values as lists or range strings, response codes as
//! tuples or maps) is deserialized into the `Raw*` structures below and
//! converted into typed descriptors exactly once, in [`Manifest::from_raw`].

use super::{
    AppDescriptor, Catalog, EndpointDescriptor, Exposure, HttpMethod, ModelDescriptor,
    NamespaceDescriptor, ParamDecl, PropertySpec, ResponseCode, RouteDescriptor,
};
use crate::config::{
    DocumentationConfig, ExtraInfo, DEFAULT_API_DOC, DEFAULT_API_VERSION, DEFAULT_MOUNT_PATH,
    DEFAULT_SPECIFIC_API_DOC,
};
use crate::content_types::FormatSettings;
use crate::deferred::{BasePath, Deferred, ValueSet};
use crate::error::{Error, Result};
use crate::i18n::MapTranslator;
use crate::parser::{ManifestFormat, ManifestParser};
use crate::scanner::FileScanner;
use anyhow::Context;
use indexmap::IndexMap;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

static RANGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(-?\d+)\s*(\.\.\.?)\s*(-?\d+)\s*$").expect("valid range regex"));

/// A manifest as written on disk, before normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawManifest {
    /// Name of the application the documentation is mounted into
    pub root: Option<String>,
    pub documentation: Option<RawDocumentation>,
    pub translations: Option<Value>,
    pub apps: Vec<RawApp>,
    pub models: Vec<RawModel>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawDocumentation {
    pub mount_path: Option<String>,
    pub class_name: Option<String>,
    /// Absent keeps the default version; an explicit `null` disables substitution
    #[serde(deserialize_with = "explicit_option")]
    pub api_version: Option<Option<String>>,
    pub base_path: Option<String>,
    pub hide_format: bool,
    pub hide_documentation_path: bool,
    pub format: Option<String>,
    pub models: Vec<String>,
    pub info: ExtraInfo,
    pub authorizations: Option<Value>,
    pub root_base_path: Option<bool>,
    pub api_documentation: Option<RawDescribed>,
    pub specific_api_documentation: Option<RawDescribed>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawDescribed {
    #[serde(default)]
    pub desc: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawApp {
    pub name: String,
    #[serde(default)]
    pub content_types: IndexMap<String, String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub default_format: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<RawEndpoint>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawEndpoint {
    pub namespace: Option<String>,
    pub namespace_options: Option<RawNamespaceOptions>,
    pub mount: Option<String>,
    pub routes: Vec<RawRoute>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawNamespaceOptions {
    pub desc: Option<String>,
    pub swagger: Option<RawSwaggerOptions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSwaggerOptions {
    /// `false` renders the namespace as its own resource
    pub nested: Option<bool>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawRoute {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub prefix: Option<String>,
    /// Defaults to the endpoint's namespace
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub params: IndexMap<String, RawParam>,
    #[serde(default)]
    pub headers: IndexMap<String, RawParam>,
    #[serde(default)]
    pub http_codes: Vec<RawHttpCode>,
    #[serde(default)]
    pub entity: Option<RawEntity>,
    #[serde(default)]
    pub authorizations: Option<Value>,
}

/// A parameter declaration: a spec map, or a bare scalar meaning "no spec".
///
/// The map is kept untyped until normalization so that a malformed spec is
/// reported against its route and parameter instead of degrading to a bare
/// declaration.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawParam {
    Spec(Map<String, Value>),
    Bare(Value),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawParamSpec {
    #[serde(rename = "type")]
    pub type_token: Option<String>,
    pub required: bool,
    pub default: Option<Value>,
    pub desc: Option<String>,
    pub description: Option<String>,
    pub i18n_key: Option<String>,
    pub values: Option<RawValues>,
    pub is_array: bool,
    pub param_type: Option<String>,
    pub full_name: Option<String>,
}

/// Allowed values: a list, or a range string such as `1..5` or `1...5`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawValues {
    List(Vec<Value>),
    Range(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawHttpCode {
    Full {
        code: u16,
        message: String,
        #[serde(default)]
        model: Option<String>,
    },
    WithModel(u16, String, String),
    Plain(u16, String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawEntity {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
pub struct RawModel {
    pub name: String,
    #[serde(default)]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub exposures: IndexMap<String, RawExposure>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawExposure {
    pub using: Option<String>,
    pub documentation: Option<RawPropertyDoc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPropertyDoc {
    #[serde(default, rename = "type")]
    pub type_token: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub values: Option<RawValues>,
    /// Any other documentation key, passed through verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn explicit_option<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl RawManifest {
    /// Folds another manifest into this one.
    ///
    /// Apps and models are appended; the first `root` and `documentation`
    /// sections win; translations are deep-merged.
    ///
    /// # Errors
    ///
    /// Returns `Error::ManifestError` naming `file` when `other` declares an
    /// app or model that is already present.
    pub fn merge(&mut self, other: RawManifest, file: &Path) -> Result<()> {
        if self.root.is_none() {
            self.root = other.root;
        }
        if self.documentation.is_none() {
            self.documentation = other.documentation;
        }
        match (&mut self.translations, other.translations) {
            (Some(mine), Some(theirs)) => merge_values(mine, theirs),
            (slot @ None, theirs) => *slot = theirs,
            (Some(_), None) => {}
        }

        for app in other.apps {
            if self.apps.iter().any(|existing| existing.name == app.name) {
                return Err(manifest_error(file, format!("duplicate app `{}`", app.name)));
            }
            self.apps.push(app);
        }
        for model in other.models {
            if self.models.iter().any(|existing| existing.name == model.name) {
                return Err(manifest_error(file, format!("duplicate model `{}`", model.name)));
            }
            self.models.push(model);
        }
        Ok(())
    }
}

fn merge_values(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(target), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match target.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, incoming) => *target = incoming,
    }
}

fn manifest_error(file: &Path, message: impl Into<String>) -> Error {
    Error::ManifestError {
        file: file.to_path_buf(),
        message: message.into(),
    }
}

/// A normalized manifest: the route source and the documentation options.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub catalog: Catalog,
    pub config: DocumentationConfig,
}

impl Manifest {
    /// Loads a manifest file, or every manifest file below a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no manifest file is found, a file cannot be
    /// parsed, or the merged manifest is inconsistent.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let files = if path.is_dir() {
            let scan = FileScanner::new(path.to_path_buf())
                .scan()
                .with_context(|| format!("Failed to scan {}", path.display()))?;
            scan.manifest_files
        } else {
            vec![path.to_path_buf()]
        };

        if files.is_empty() {
            anyhow::bail!("No manifest files found in {}", path.display());
        }
        info!("Loading {} manifest file(s)", files.len());

        let mut merged = RawManifest::default();
        for parsed in ManifestParser::parse_files(&files) {
            let parsed = parsed?;
            merged.merge(parsed.manifest, &parsed.path)?;
        }

        Ok(Self::from_raw(merged, path)?)
    }

    /// Parses and normalizes a single YAML manifest held in memory
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let raw = ManifestParser::parse_str(content, ManifestFormat::Yaml)?;
        Self::from_raw(raw, Path::new("<memory>"))
    }

    /// Normalizes a raw manifest. `origin` names the manifest in errors.
    ///
    /// # Errors
    ///
    /// Returns `Error::ManifestError` when the manifest declares no apps, names
    /// an unknown root app, or contains an invalid route method or value range.
    pub fn from_raw(raw: RawManifest, origin: &Path) -> Result<Self> {
        let RawManifest {
            root,
            documentation,
            translations,
            apps,
            models,
        } = raw;

        let root_name = match root.or_else(|| apps.first().map(|app| app.name.clone())) {
            Some(name) => name,
            None => return Err(manifest_error(origin, "manifest declares no apps")),
        };

        let mut descriptors = apps
            .into_iter()
            .map(|app| normalize_app(app, origin))
            .collect::<Result<Vec<_>>>()?;

        let root_index = descriptors
            .iter()
            .position(|app| app.name == root_name)
            .ok_or_else(|| manifest_error(origin, format!("root app `{}` is not declared", root_name)))?;
        let root_app = descriptors.remove(root_index);

        let mut catalog = Catalog::new(root_app);
        for app in descriptors {
            catalog.add_app(app);
        }
        for model in models {
            catalog.register_model(normalize_model(model, origin)?);
        }

        let config = normalize_documentation(documentation.unwrap_or_default(), translations);
        debug!(
            "Normalized manifest {}: root `{}`, mount path {}",
            origin.display(),
            root_name,
            config.mount_path
        );

        Ok(Self { catalog, config })
    }
}

fn normalize_documentation(raw: RawDocumentation, translations: Option<Value>) -> DocumentationConfig {
    let mut config = DocumentationConfig {
        mount_path: raw.mount_path.unwrap_or_else(|| DEFAULT_MOUNT_PATH.to_string()),
        class_name: raw.class_name,
        base_path: raw.base_path.map(BasePath::Literal),
        api_version: raw
            .api_version
            .unwrap_or_else(|| Some(DEFAULT_API_VERSION.to_string())),
        info: raw.info,
        hide_format: raw.hide_format,
        format: raw.format,
        hide_documentation_path: raw.hide_documentation_path,
        models: raw.models,
        authorizations: raw.authorizations,
        root_base_path: raw.root_base_path.unwrap_or(true),
        api_documentation: raw
            .api_documentation
            .and_then(|doc| doc.desc)
            .unwrap_or_else(|| DEFAULT_API_DOC.to_string()),
        specific_api_documentation: raw
            .specific_api_documentation
            .and_then(|doc| doc.desc)
            .unwrap_or_else(|| DEFAULT_SPECIFIC_API_DOC.to_string()),
        ..Default::default()
    };

    if let Some(tree) = translations {
        let translator = MapTranslator::from_nested(&tree);
        if !translator.is_empty() {
            config.translator = Arc::new(translator);
        }
    }
    config
}

fn normalize_app(raw: RawApp, origin: &Path) -> Result<AppDescriptor> {
    let endpoints = raw
        .endpoints
        .into_iter()
        .map(|endpoint| normalize_endpoint(endpoint, origin))
        .collect::<Result<Vec<_>>>()?;

    Ok(AppDescriptor {
        name: raw.name,
        endpoints,
        formats: FormatSettings {
            content_types: raw.content_types,
            format: raw.format,
            default_format: raw.default_format,
        },
    })
}

fn normalize_endpoint(raw: RawEndpoint, origin: &Path) -> Result<EndpointDescriptor> {
    let namespace = raw.namespace.as_ref().map(|path| {
        let options = raw.namespace_options.as_ref();
        let swagger = options.and_then(|options| options.swagger.as_ref());
        NamespaceDescriptor {
            path: path.clone(),
            description: options
                .and_then(|options| options.desc.clone())
                .map(Deferred::Value),
            standalone: swagger.and_then(|swagger| swagger.nested) == Some(false),
            display_name: swagger.and_then(|swagger| swagger.name.clone()),
        }
    });

    let routes = raw
        .routes
        .into_iter()
        .map(|route| normalize_route(route, raw.namespace.as_deref(), origin).map(Arc::new))
        .collect::<Result<Vec<_>>>()?;

    Ok(EndpointDescriptor {
        namespace,
        routes,
        mounts: raw.mount,
    })
}

fn normalize_route(raw: RawRoute, namespace: Option<&str>, origin: &Path) -> Result<RouteDescriptor> {
    let method = HttpMethod::parse(&raw.method).ok_or_else(|| {
        manifest_error(
            origin,
            format!("unknown HTTP method `{}` on route {}", raw.method, raw.path),
        )
    })?;

    let mut route = RouteDescriptor::new(method, raw.path);
    route.prefix = raw.prefix;
    route.namespace = raw.namespace.or_else(|| namespace.map(str::to_string));
    route.description = raw.description;
    route.notes = raw.notes;
    route.nickname = raw.nickname;
    route.hidden = Deferred::Value(raw.hidden);
    route.authorizations = raw.authorizations;

    for (name, param) in raw.params {
        let decl = normalize_param(param, &route.path, &name, origin)?;
        route.params.insert(name, decl);
    }
    for (name, header) in raw.headers {
        let decl = normalize_param(header, &route.path, &name, origin)?;
        route.headers.insert(name, decl);
    }

    route.http_codes = raw
        .http_codes
        .into_iter()
        .map(|code| match code {
            RawHttpCode::Full {
                code,
                message,
                model,
            } => ResponseCode {
                code,
                message,
                model,
            },
            RawHttpCode::WithModel(code, message, model) => ResponseCode {
                code,
                message,
                model: Some(model),
            },
            RawHttpCode::Plain(code, message) => ResponseCode {
                code,
                message,
                model: None,
            },
        })
        .collect();

    route.entities = match raw.entity {
        Some(RawEntity::One(entity)) => vec![entity],
        Some(RawEntity::Many(entities)) => entities,
        None => Vec::new(),
    };

    Ok(route)
}

fn normalize_param(raw: RawParam, route: &str, name: &str, origin: &Path) -> Result<ParamDecl> {
    let invalid = |reason: String| {
        manifest_error(
            origin,
            format!("invalid declaration of parameter `{}` on route {}: {}", name, route, reason),
        )
    };

    let spec: RawParamSpec = match raw {
        RawParam::Spec(map) => serde_json::from_value(Value::Object(map))
            .map_err(|err| invalid(err.to_string()))?,
        RawParam::Bare(Value::Array(_)) => {
            return Err(invalid("expected a map or a scalar".to_string()))
        }
        RawParam::Bare(_) => return Ok(ParamDecl::default()),
    };

    Ok(ParamDecl {
        type_token: spec.type_token,
        required: spec.required,
        default: spec.default.filter(|value| !value.is_null()),
        description: spec.desc.or(spec.description).map(Deferred::Value),
        i18n_key: spec.i18n_key,
        values: spec
            .values
            .map(|values| normalize_values(values, origin))
            .transpose()?,
        is_array: spec.is_array,
        param_type: spec.param_type,
        full_name: spec.full_name,
    })
}

fn normalize_values(raw: RawValues, origin: &Path) -> Result<ValueSet> {
    match raw {
        RawValues::List(values) => Ok(ValueSet::List(values)),
        RawValues::Range(text) => {
            let caps = RANGE_REGEX
                .captures(&text)
                .ok_or_else(|| manifest_error(origin, format!("invalid value range `{}`", text)))?;
            let bound = |index: usize| -> Result<i64> {
                caps[index]
                    .parse()
                    .map_err(|_| manifest_error(origin, format!("invalid value range `{}`", text)))
            };
            Ok(ValueSet::Range {
                start: bound(1)?,
                end: bound(3)?,
                inclusive: &caps[2] == "..",
            })
        }
    }
}

fn normalize_model(raw: RawModel, origin: &Path) -> Result<ModelDescriptor> {
    let mut model = ModelDescriptor::new(raw.name);
    model.entity_name = raw.entity_name;
    model.root = raw.root;

    for (name, exposure) in raw.exposures {
        let documentation = match exposure.documentation {
            Some(doc) => Some(PropertySpec {
                type_token: doc.type_token,
                required: doc.required,
                is_array: doc.is_array,
                description: doc.desc.map(Deferred::Value),
                values: doc
                    .values
                    .map(|values| normalize_values(values, origin))
                    .transpose()?,
                extra: doc.extra,
            }),
            None => None,
        };
        model.exposures.insert(
            name,
            Exposure {
                using: exposure.using,
                documentation,
            },
        );
    }
    Ok(model)
}
