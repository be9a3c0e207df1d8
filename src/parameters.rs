//! Operation & Parameter Extractor.
//!
//! Turns one route's declarations into Swagger 1.2 parameter and operation
//! objects: type inference, parameter location, description lookup and the
//! flattening of array and nested (`parent[child]`) parameters.

use crate::config::DocumentationConfig;
use crate::inflector::translation_scope;
use crate::namespace::MountedRoute;
use crate::paths::placeholders;
use crate::source::{ModelRegistry, ParamDecl, RouteDescriptor};
use crate::types::{format_for, is_primitive, select_data_type, TypeRef, ARRAY_TOKEN, FILE_TYPE};
use serde::Serialize;
use serde_json::Value;

const MULTIPART_FORM_DATA: &str = "multipart/form-data";
const VOID_TYPE: &str = "void";

/// One documented request parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    pub param_type: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_multiple: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

/// One documented operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    pub notes: String,
    pub summary: String,
    pub nickname: String,
    pub method: String,
    pub parameters: Vec<ParamSpec>,
    #[serde(rename = "type")]
    pub response_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorizations: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_messages: Vec<ResponseMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMessage {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_model: Option<String>,
}

/// Documentation view of a single route.
pub struct RouteDoc<'a> {
    mounted: &'a MountedRoute,
    config: &'a DocumentationConfig,
    models: &'a ModelRegistry,
}

impl<'a> RouteDoc<'a> {
    pub fn new(
        mounted: &'a MountedRoute,
        config: &'a DocumentationConfig,
        models: &'a ModelRegistry,
    ) -> Self {
        Self {
            mounted,
            config,
            models,
        }
    }

    fn route(&self) -> &'a RouteDescriptor {
        &self.mounted.route
    }

    /// Header parameters followed by the flattened declared parameters.
    pub fn parameters(&self) -> Vec<ParamSpec> {
        let mut parameters = self.header_params();
        parameters.extend(self.parse_params());
        parameters
    }

    /// The complete operation object of the route.
    pub fn operation(&self) -> OperationSpec {
        let route = self.route();
        let parameters = self.parameters();

        let consumes = parameters
            .iter()
            .any(|param| param.data_type == FILE_TYPE)
            .then(|| vec![MULTIPART_FORM_DATA.to_string()]);

        let response_type = match route.entities.first() {
            Some(entity) => self.models.canonical_name(entity),
            None => VOID_TYPE.to_string(),
        };

        let response_messages = route
            .http_codes
            .iter()
            .map(|code| ResponseMessage {
                code: code.code,
                message: code.message.clone(),
                response_model: code.model.as_deref().map(|m| self.models.canonical_name(m)),
            })
            .collect();

        OperationSpec {
            notes: self
                .config
                .markdown
                .as_markdown(route.notes.clone())
                .unwrap_or_default(),
            summary: route.description.clone().unwrap_or_default(),
            nickname: route
                .nickname
                .clone()
                .unwrap_or_else(|| default_nickname(route)),
            method: route.method.as_str().to_string(),
            parameters,
            response_type,
            authorizations: route.authorizations.clone().filter(|value| !is_blank(value)),
            consumes,
            response_messages,
        }
    }

    /// Models the operation refers to: its entities, then response code models
    pub fn model_references(&self) -> Vec<&'a str> {
        let route = self.route();
        route
            .entities
            .iter()
            .map(String::as_str)
            .chain(route.http_codes.iter().filter_map(|code| code.model.as_deref()))
            .collect()
    }

    fn header_params(&self) -> Vec<ParamSpec> {
        self.route()
            .headers
            .iter()
            .map(|(name, decl)| ParamSpec {
                param_type: "header".to_string(),
                name: name.clone(),
                description: self.description(decl, name),
                data_type: "string".to_string(),
                required: decl.required,
                allow_multiple: None,
                format: None,
                items: None,
                default_value: decl.default.clone(),
                enum_values: None,
            })
            .collect()
    }

    fn parse_params(&self) -> Vec<ParamSpec> {
        flatten_params(&self.route().params)
            .into_iter()
            .map(|(name, decl)| self.parse_param(&name, &decl))
            .collect()
    }

    fn parse_param(&self, name: &str, decl: &ParamDecl) -> ParamSpec {
        let raw_type = decl.type_token.as_deref().unwrap_or("string");
        let (data_type, is_array) = if is_array_container(raw_type) {
            (self.data_type(element_token(raw_type)), true)
        } else {
            (self.data_type(raw_type), decl.is_array)
        };

        let param_type = decl
            .param_type
            .clone()
            .unwrap_or_else(|| self.select_param_type(&data_type, name).to_string());

        ParamSpec {
            param_type,
            name: decl.full_name.clone().unwrap_or_else(|| name.to_string()),
            description: self.description(decl, name),
            data_type: if is_array {
                "array".to_string()
            } else {
                data_type.clone()
            },
            required: decl.required,
            allow_multiple: Some(is_array),
            format: format_for(&data_type).map(str::to_string),
            items: is_array.then(|| TypeRef::for_type(&data_type)),
            default_value: decl.default.clone(),
            enum_values: decl.values.as_ref().map(|values| values.materialize()),
        }
    }

    /// Normalized data type of a raw type token
    pub fn data_type(&self, raw: &str) -> String {
        select_data_type(raw, |model| self.models.canonical_name(model))
    }

    /// Location of a parameter without an explicit override.
    pub fn select_param_type(&self, data_type: &str, name: &str) -> &'static str {
        let route = self.route();
        if placeholders(&route.path).contains(&name) {
            "path"
        } else if route.method.is_mutating() {
            if is_primitive(data_type) {
                "form"
            } else {
                "body"
            }
        } else {
            "query"
        }
    }

    /// Declared description, else translation, else the parameter name;
    /// rendered as Markdown when a renderer is configured
    fn description(&self, decl: &ParamDecl, name: &str) -> String {
        let text = decl
            .description
            .as_ref()
            .map(|description| description.resolve())
            .or_else(|| self.translate(decl.i18n_key.as_deref().unwrap_or(name)))
            .unwrap_or_else(|| name.to_string());

        self.config
            .markdown
            .as_markdown(Some(text))
            .unwrap_or_default()
    }

    fn translate(&self, key: &str) -> Option<String> {
        let scope = translation_scope(&self.mounted.app);
        self.config.translator.translate(&format!("{}.{}", scope, key))
    }
}

/// `<METHOD><path>` with `/ : ( ) .` replaced by `-`
pub fn default_nickname(route: &RouteDescriptor) -> String {
    let path: String = route
        .path
        .chars()
        .map(|c| if matches!(c, '/' | ':' | '(' | ')' | '.') { '-' } else { c })
        .collect();
    format!("{}{}", route.method.as_str(), path)
}

/// Whether a type token declares an array container (`Array`, `Array[X]`)
pub fn is_array_container(token: &str) -> bool {
    token == ARRAY_TOKEN || (token.starts_with("Array[") && token.ends_with(']'))
}

/// Element type token of an array container; a bare `Array` holds objects
fn element_token(token: &str) -> &str {
    token
        .strip_prefix("Array[")
        .and_then(|rest| rest.strip_suffix(']'))
        .filter(|inner| !inner.is_empty())
        .unwrap_or("object")
}

/// Whether a JSON value carries no content (null, empty string, array or object)
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

/// Flattens declared parameters into the list Swagger 1.2 can express.
///
/// Sub-parameters following an array container (`filter` of type `Array`)
/// that are named `filter[...]` are renamed to `filter[]...` and folded into
/// the container, which stays in the list as an array parameter. Any other
/// parameter with bracketed children (`address` with `address[street]`) is
/// dropped in favour of its children. A container with a required child is
/// itself made optional.
pub fn flatten_params(params: &indexmap::IndexMap<String, ParamDecl>) -> Vec<(String, ParamDecl)> {
    let mut renamed: Vec<(String, ParamDecl)> = Vec::with_capacity(params.len());
    let mut array_param: Option<&str> = None;
    let mut containers: Vec<String> = Vec::new();

    for (name, decl) in params {
        let mut key = name.clone();
        if is_array_container(decl.type_token.as_deref().unwrap_or_default()) {
            array_param = Some(name.as_str());
            containers.push(name.clone());
        } else if let Some(array) = array_param {
            if let Some(rest) = name
                .strip_prefix(array)
                .filter(|rest| rest.starts_with('['))
            {
                key = format!("{}[]{}", array, rest);
            }
        }
        renamed.push((key, decl.clone()));
    }

    let children_of = |parent: &str, all: &[(String, ParamDecl)]| -> Vec<bool> {
        all.iter()
            .filter(|(other, _)| is_bracketed_child(other, parent))
            .map(|(_, decl)| decl.required)
            .collect()
    };

    let mut flattened = Vec::with_capacity(renamed.len());
    for (name, decl) in &renamed {
        let is_array = containers.contains(name);
        let inside_array = containers
            .iter()
            .any(|container| is_bracketed_child(name, container));
        if inside_array {
            continue;
        }

        let children = children_of(name, &renamed);
        if children.is_empty() {
            flattened.push((name.clone(), decl.clone()));
        } else if is_array {
            let mut decl = decl.clone();
            if children.iter().any(|required| *required) {
                decl.required = false;
            }
            flattened.push((name.clone(), decl));
        }
    }

    flattened
}

/// Whether `name` is `parent[...]...`
fn is_bracketed_child(name: &str, parent: &str) -> bool {
    name.len() > parent.len() + 2
        && name.starts_with(parent)
        && name[parent.len()..].starts_with('[')
        && name.ends_with(']')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::{Deferred, ValueSet};
    use crate::i18n::MapTranslator;
    use crate::source::{HttpMethod, ModelDescriptor, ResponseCode};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn doc_for(route: RouteDescriptor, check: impl FnOnce(&RouteDoc)) {
        let config = DocumentationConfig::default();
        let models = ModelRegistry::new();
        let mounted = MountedRoute::new(Arc::new(route), "Api");
        check(&RouteDoc::new(&mounted, &config, &models));
    }

    fn params(entries: Vec<(&str, ParamDecl)>) -> IndexMap<String, ParamDecl> {
        entries
            .into_iter()
            .map(|(name, decl)| (name.to_string(), decl))
            .collect()
    }

    fn names(flattened: &[(String, ParamDecl)]) -> Vec<&str> {
        flattened.iter().map(|(name, _)| name.as_str()).collect()
    }

    #[test]
    fn test_path_param_is_inferred() {
        let route = RouteDescriptor::new(HttpMethod::Get, "/widgets/:id(.:format)")
            .with_param("id", ParamDecl::typed("Integer").required());

        doc_for(route, |doc| {
            let params = doc.parameters();
            assert_eq!(params.len(), 1);
            let id = serde_json::to_value(&params[0]).unwrap();
            assert_eq!(
                id,
                json!({
                    "paramType": "path",
                    "name": "id",
                    "description": "id",
                    "type": "integer",
                    "required": true,
                    "allowMultiple": false,
                    "format": "int32"
                })
            );
        });
    }

    #[test]
    fn test_placeholder_match_is_exact() {
        let route = RouteDescriptor::new(HttpMethod::Get, "/widgets/:identifier")
            .with_param("id", ParamDecl::typed("String"));

        doc_for(route, |doc| {
            assert_eq!(doc.parameters()[0].param_type, "query");
        });
    }

    #[test]
    fn test_mutating_methods_use_form_and_body() {
        let route = RouteDescriptor::new(HttpMethod::Post, "/widgets")
            .with_param("name", ParamDecl::typed("String"))
            .with_param("widget", ParamDecl::typed("Widget"))
            .with_param("upload", ParamDecl::typed("Rack::Multipart::UploadedFile"));

        doc_for(route, |doc| {
            let params = doc.parameters();
            let located: Vec<(&str, &str)> = params
                .iter()
                .map(|p| (p.name.as_str(), p.param_type.as_str()))
                .collect();
            assert_eq!(
                located,
                vec![("name", "form"), ("widget", "body"), ("upload", "body")]
            );
        });
    }

    #[test]
    fn test_explicit_param_type_wins() {
        let mut decl = ParamDecl::typed("String");
        decl.param_type = Some("body".to_string());
        let route = RouteDescriptor::new(HttpMethod::Get, "/widgets").with_param("q", decl);

        doc_for(route, |doc| assert_eq!(doc.parameters()[0].param_type, "body"));
    }

    #[test]
    fn test_headers_come_first_as_strings() {
        let mut route = RouteDescriptor::new(HttpMethod::Get, "/widgets")
            .with_param("page", ParamDecl::typed("Integer"));
        let mut header = ParamDecl::typed("Integer").described("API token").required();
        header.default = Some(json!("none"));
        route.headers.insert("X-Token".to_string(), header);

        doc_for(route, |doc| {
            let params = doc.parameters();
            assert_eq!(params[0].param_type, "header");
            assert_eq!(params[0].data_type, "string");
            assert_eq!(params[0].description, "API token");
            assert_eq!(params[0].default_value, Some(json!("none")));
            assert_eq!(params[0].allow_multiple, None);
            assert_eq!(params[1].name, "page");
        });
    }

    #[test]
    fn test_array_flag_and_enum_values() {
        let mut decl = ParamDecl::typed("Integer");
        decl.is_array = true;
        decl.values = Some(ValueSet::Range {
            start: 1,
            end: 3,
            inclusive: true,
        });
        decl.default = Some(json!(2));
        decl.full_name = Some("ids[]".to_string());
        let route = RouteDescriptor::new(HttpMethod::Get, "/widgets").with_param("ids", decl);

        doc_for(route, |doc| {
            let param = &doc.parameters()[0];
            assert_eq!(param.name, "ids[]");
            assert_eq!(param.data_type, "array");
            assert_eq!(param.items, Some(TypeRef::Type("integer".to_string())));
            assert_eq!(param.allow_multiple, Some(true));
            assert_eq!(param.format.as_deref(), Some("int32"));
            assert_eq!(param.enum_values, Some(vec![json!(1), json!(2), json!(3)]));
            assert_eq!(param.default_value, Some(json!(2)));
        });
    }

    #[test]
    fn test_array_container_relaxes_required_and_drops_children() {
        let flattened = flatten_params(&params(vec![
            ("filter", ParamDecl::typed("Array").required()),
            ("filter[name]", ParamDecl::typed("String").required()),
            ("filter[size]", ParamDecl::typed("Integer")),
            ("page", ParamDecl::typed("Integer")),
        ]));

        assert_eq!(names(&flattened), vec!["filter", "page"]);
        assert!(!flattened[0].1.required);
    }

    #[test]
    fn test_array_container_renders_object_items() {
        let route = RouteDescriptor::new(HttpMethod::Get, "/widgets")
            .with_param("filter", ParamDecl::typed("Array"))
            .with_param("filter[name]", ParamDecl::typed("String").required());

        doc_for(route, |doc| {
            let params = doc.parameters();
            assert_eq!(params.len(), 1);
            assert_eq!(params[0].data_type, "array");
            assert_eq!(params[0].items, Some(TypeRef::Type("object".to_string())));
            assert!(!params[0].required);
            assert!(params.iter().all(|p| !p.name.contains('[')));
        });
    }

    #[test]
    fn test_typed_array_container_items() {
        let route = RouteDescriptor::new(HttpMethod::Get, "/widgets")
            .with_param("tags", ParamDecl::typed("Array[String]"));

        doc_for(route, |doc| {
            let param = &doc.parameters()[0];
            assert_eq!(param.items, Some(TypeRef::Type("string".to_string())));
        });
    }

    #[test]
    fn test_hash_container_is_replaced_by_children() {
        let flattened = flatten_params(&params(vec![
            ("address", ParamDecl::typed("Hash")),
            ("address[street]", ParamDecl::typed("String").required()),
            ("address[city]", ParamDecl::typed("String")),
        ]));

        assert_eq!(names(&flattened), vec!["address[street]", "address[city]"]);
        assert!(flattened[0].1.required);
    }

    #[test]
    fn test_similar_prefix_is_not_a_child() {
        let flattened = flatten_params(&params(vec![
            ("tag", ParamDecl::typed("String")),
            ("tags", ParamDecl::typed("String")),
            ("tag_id", ParamDecl::typed("Integer")),
        ]));

        assert_eq!(names(&flattened), vec!["tag", "tags", "tag_id"]);
    }

    #[test]
    fn test_description_falls_back_to_translation_then_name() {
        let mut translator = MapTranslator::new();
        translator.insert("store.api.color", "Paint color");
        let config = DocumentationConfig {
            translator: Arc::new(translator),
            ..Default::default()
        };
        let models = ModelRegistry::new();

        let mut lazy = ParamDecl::typed("String");
        lazy.description = Some(Deferred::lazy(|| "Computed".to_string()));
        let mut keyed = ParamDecl::typed("String");
        keyed.i18n_key = Some("color".to_string());

        let route = RouteDescriptor::new(HttpMethod::Get, "/widgets")
            .with_param("lazy", lazy)
            .with_param("shade", keyed)
            .with_param("plain", ParamDecl::typed("String"));
        let mounted = MountedRoute::new(Arc::new(route), "Store::API");
        let doc = RouteDoc::new(&mounted, &config, &models);

        let descriptions: Vec<String> = doc.parameters().into_iter().map(|p| p.description).collect();
        assert_eq!(descriptions, vec!["Computed", "Paint color", "plain"]);
    }

    #[test]
    fn test_operation_fields() {
        let mut route = RouteDescriptor::new(HttpMethod::Post, "/widgets/:id/upload(.:format)")
            .with_param("id", ParamDecl::typed("Integer").required())
            .with_param("file", ParamDecl::typed("File"));
        route.description = Some("Upload a widget image".to_string());
        route.notes = Some("Replaces any existing image".to_string());
        route.entities = vec!["API::Entities::Widget".to_string()];
        route.http_codes = vec![
            ResponseCode {
                code: 201,
                message: "Created".to_string(),
                model: None,
            },
            ResponseCode {
                code: 422,
                message: "Invalid".to_string(),
                model: Some("API::Entities::Error".to_string()),
            },
        ];
        route.authorizations = Some(json!({"oauth2": []}));

        let config = DocumentationConfig::default();
        let mut models = ModelRegistry::new();
        let mut widget = ModelDescriptor::new("API::Entities::Widget");
        widget.entity_name = Some("Widget".to_string());
        models.register(widget);
        let mounted = MountedRoute::new(Arc::new(route), "Api");
        let doc = RouteDoc::new(&mounted, &config, &models);

        let operation = serde_json::to_value(doc.operation()).unwrap();
        assert_eq!(operation["summary"], json!("Upload a widget image"));
        assert_eq!(operation["notes"], json!("Replaces any existing image"));
        assert_eq!(operation["nickname"], json!("POST-widgets--id-upload---format-"));
        assert_eq!(operation["method"], json!("POST"));
        assert_eq!(operation["type"], json!("Widget"));
        assert_eq!(operation["consumes"], json!(["multipart/form-data"]));
        assert_eq!(operation["authorizations"], json!({"oauth2": []}));
        assert_eq!(
            operation["responseMessages"],
            json!([
                {"code": 201, "message": "Created"},
                {"code": 422, "message": "Invalid", "responseModel": "API::Error"}
            ])
        );
        assert_eq!(
            doc.model_references(),
            vec!["API::Entities::Widget", "API::Entities::Error"]
        );
    }

    #[test]
    fn test_operation_defaults() {
        let mut route = RouteDescriptor::new(HttpMethod::Get, "/widgets");
        route.authorizations = Some(json!({}));

        doc_for(route, |doc| {
            let operation = serde_json::to_value(doc.operation()).unwrap();
            assert_eq!(
                operation,
                json!({
                    "notes": "",
                    "summary": "",
                    "nickname": "GET-widgets",
                    "method": "GET",
                    "parameters": [],
                    "type": "void"
                })
            );
        });
    }

    #[test]
    fn test_unknown_type_token_resolves_to_canonical_model_name() {
        let route = RouteDescriptor::new(HttpMethod::Put, "/widgets")
            .with_param("widget", ParamDecl::typed("API::Entities::Widget"));

        doc_for(route, |doc| {
            let param = &doc.parameters()[0];
            assert_eq!(param.data_type, "API::Widget");
            assert_eq!(param.param_type, "body");
        });
    }
}
