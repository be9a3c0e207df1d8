//! Model Schema Resolver.
//!
//! Discovers every model reachable from a set of root models through
//! documented "uses a sub-model" exposures, and renders each model's
//! property schema.

use crate::error::{Error, Result};
use crate::i18n::Translator;
use crate::inflector::translation_scope;
use crate::source::{ModelDescriptor, ModelRegistry, PropertySpec};
use crate::types::TypeRef;
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Rendered schema of one model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSchema {
    pub id: String,
    pub properties: IndexMap<String, Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// Resolves model references against a registry
pub struct ModelResolver<'a> {
    registry: &'a ModelRegistry,
    translator: &'a dyn Translator,
}

impl<'a> ModelResolver<'a> {
    pub fn new(registry: &'a ModelRegistry, translator: &'a dyn Translator) -> Self {
        Self {
            registry,
            translator,
        }
    }

    /// Renders the closure of `roots`, keyed by canonical model name.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownModel` if a root or a documented sub-model is not
    /// registered.
    pub fn resolve<'n, I>(&self, roots: I) -> Result<IndexMap<String, ModelSchema>>
    where
        I: IntoIterator<Item = &'n str>,
    {
        let schemas = self
            .closure(roots)?
            .iter()
            .map(|model| (model.canonical_name(), self.schema(model)))
            .collect();
        Ok(schemas)
    }

    /// The root models followed by every model they transitively use.
    ///
    /// Each model appears once, however often (or cyclically) it is referenced.
    pub fn closure<'n, I>(&self, roots: I) -> Result<Vec<Arc<ModelDescriptor>>>
    where
        I: IntoIterator<Item = &'n str>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut ordered: Vec<Arc<ModelDescriptor>> = Vec::new();

        for name in roots {
            let model = self.lookup(name)?;
            if seen.insert(model.name.clone()) {
                ordered.push(model);
            }
        }

        let mut cursor = 0;
        while cursor < ordered.len() {
            let model = Arc::clone(&ordered[cursor]);
            cursor += 1;

            for sub_model in model.documented_sub_models() {
                let nested = self.lookup(sub_model)?;
                if seen.insert(nested.name.clone()) {
                    debug!("Model `{}` uses `{}`", model.name, nested.name);
                    ordered.push(nested);
                }
            }
        }

        Ok(ordered)
    }

    /// Renders a single model
    pub fn schema(&self, model: &ModelDescriptor) -> ModelSchema {
        let properties = model
            .documented()
            .map(|(name, spec)| {
                let using = model.exposures.get(name).and_then(|e| e.using.as_deref());
                (name.clone(), self.property(model, name, spec, using))
            })
            .collect();

        let required: Vec<String> = model
            .documented()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name.clone())
            .collect();

        ModelSchema {
            id: model.root.clone().unwrap_or_else(|| model.canonical_name()),
            properties,
            required: (!required.is_empty()).then_some(required),
        }
    }

    fn property(
        &self,
        model: &ModelDescriptor,
        name: &str,
        spec: &PropertySpec,
        using: Option<&str>,
    ) -> Map<String, Value> {
        let mut property = spec.extra.clone();

        let type_ref = match (&spec.type_token, using) {
            (Some(token), _) => Some(self.type_ref(token)),
            (None, Some(sub_model)) => Some(TypeRef::for_type(&self.registry.canonical_name(sub_model))),
            (None, None) => None,
        };

        if spec.is_array {
            if let Some(type_ref) = type_ref {
                property.insert("items".to_string(), type_ref_value(type_ref));
            }
            property.insert("type".to_string(), Value::from("array"));
        } else if let Some(type_ref) = type_ref {
            let (key, value) = match type_ref {
                TypeRef::Type(data_type) => ("type", data_type),
                TypeRef::Ref(reference) => ("$ref", reference),
            };
            property.insert(key.to_string(), Value::from(value));
        }

        let description = spec
            .description
            .as_ref()
            .map(|description| description.resolve())
            .or_else(|| {
                let key = format!("{}.{}", translation_scope(&model.name), name);
                self.translator.translate(&key)
            })
            .unwrap_or_else(|| name.to_string());
        property.insert("description".to_string(), Value::from(description));

        if let Some(values) = &spec.values {
            property.insert("enum".to_string(), Value::Array(values.materialize()));
        }

        property
    }

    /// `$ref` to a registered model, otherwise a class-style type token
    fn type_ref(&self, token: &str) -> TypeRef {
        match self.registry.get(token) {
            Some(model) => TypeRef::Ref(model.canonical_name()),
            None => TypeRef::for_class_token(token),
        }
    }

    fn lookup(&self, name: &str) -> Result<Arc<ModelDescriptor>> {
        self.registry
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownModel(name.to_string()))
    }
}

fn type_ref_value(type_ref: TypeRef) -> Value {
    match type_ref {
        TypeRef::Type(data_type) => serde_json::json!({ "type": data_type }),
        TypeRef::Ref(reference) => serde_json::json!({ "$ref": reference }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::ValueSet;
    use crate::i18n::{MapTranslator, NoTranslations};
    use crate::source::Exposure;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn documented(type_token: Option<&str>) -> PropertySpec {
        PropertySpec {
            type_token: type_token.map(str::to_string),
            ..Default::default()
        }
    }

    fn expose(model: &mut ModelDescriptor, name: &str, using: Option<&str>, doc: Option<PropertySpec>) {
        model.exposures.insert(
            name.to_string(),
            Exposure {
                using: using.map(str::to_string),
                documentation: doc,
            },
        );
    }

    fn cyclic_registry() -> ModelRegistry {
        let mut a = ModelDescriptor::new("A");
        expose(&mut a, "b", Some("B"), Some(PropertySpec::default()));
        let mut b = ModelDescriptor::new("B");
        expose(&mut b, "a", Some("A"), Some(PropertySpec::default()));

        let mut registry = ModelRegistry::new();
        registry.register(a);
        registry.register(b);
        registry
    }

    #[test]
    fn test_cycle_resolves_to_both_models_once() {
        let registry = cyclic_registry();
        let resolver = ModelResolver::new(&registry, &NoTranslations);

        let schemas = resolver.resolve(["A", "B", "A"]).unwrap();

        let names: Vec<&String> = schemas.keys().collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_closure_follows_documented_uses_only() {
        let mut order = ModelDescriptor::new("API::Entities::Order");
        expose(&mut order, "items", Some("API::Entities::Item"), Some(PropertySpec::default()));
        expose(&mut order, "secret", Some("API::Entities::Secret"), None);
        let mut item = ModelDescriptor::new("API::Entities::Item");
        expose(&mut item, "product", Some("API::Entities::Product"), Some(PropertySpec::default()));

        let mut registry = ModelRegistry::new();
        registry.register(order);
        registry.register(item);
        registry.register(ModelDescriptor::new("API::Entities::Product"));
        registry.register(ModelDescriptor::new("API::Entities::Secret"));
        let resolver = ModelResolver::new(&registry, &NoTranslations);

        let closure: Vec<String> = resolver
            .closure(["API::Entities::Order"])
            .unwrap()
            .iter()
            .map(|m| m.name.clone())
            .collect();

        assert_eq!(
            closure,
            vec!["API::Entities::Order", "API::Entities::Item", "API::Entities::Product"]
        );
    }

    #[test]
    fn test_unknown_model_is_an_error() {
        let registry = ModelRegistry::new();
        let resolver = ModelResolver::new(&registry, &NoTranslations);

        let err = resolver.resolve(["Ghost"]).unwrap_err();
        assert!(matches!(err, Error::UnknownModel(name) if name == "Ghost"));
    }

    #[test]
    fn test_schema_properties() {
        let mut widget = ModelDescriptor::new("API::Entities::Widget");
        let mut id = documented(Some("Integer"));
        id.required = true;
        id.description = Some("Identifier".into());
        id.extra.insert("example".to_string(), json!(7));
        expose(&mut widget, "id", None, Some(id));

        let mut color = documented(Some("String"));
        color.values = Some(ValueSet::List(vec![json!("red"), json!("blue")]));
        expose(&mut widget, "color", None, Some(color));

        let mut parts = documented(None);
        parts.is_array = true;
        expose(&mut widget, "parts", Some("API::Entities::Part"), Some(parts));

        expose(&mut widget, "owner", Some("API::Entities::Part"), Some(documented(None)));
        expose(&mut widget, "notes", None, Some(documented(None)));
        expose(&mut widget, "internal", None, None);

        let mut part = ModelDescriptor::new("API::Entities::Part");
        part.entity_name = Some("Part".to_string());

        let mut registry = ModelRegistry::new();
        registry.register(widget);
        registry.register(part);
        let resolver = ModelResolver::new(&registry, &NoTranslations);

        let schemas = resolver.resolve(["API::Entities::Widget"]).unwrap();
        let rendered = serde_json::to_value(&schemas["API::Widget"]).unwrap();

        assert_eq!(
            rendered,
            json!({
                "id": "API::Widget",
                "properties": {
                    "id": {"example": 7, "type": "integer", "description": "Identifier"},
                    "color": {"type": "string", "description": "color", "enum": ["red", "blue"]},
                    "parts": {"items": {"$ref": "Part"}, "type": "array", "description": "parts"},
                    "owner": {"$ref": "Part", "description": "owner"},
                    "notes": {"description": "notes"}
                },
                "required": ["id"]
            })
        );
        assert!(schemas.contains_key("Part"));
    }

    #[test]
    fn test_root_overrides_id_and_empty_required_is_omitted() {
        let mut widget = ModelDescriptor::new("Widget");
        widget.root = Some("widget".to_string());
        expose(&mut widget, "name", None, Some(documented(Some("String"))));

        let mut registry = ModelRegistry::new();
        registry.register(widget);
        let resolver = ModelResolver::new(&registry, &NoTranslations);

        let schemas = resolver.resolve(["Widget"]).unwrap();
        let rendered = serde_json::to_value(&schemas["Widget"]).unwrap();

        assert_eq!(rendered["id"], json!("widget"));
        assert!(rendered.get("required").is_none());
    }

    #[test]
    fn test_property_type_naming_a_model_becomes_ref() {
        let mut widget = ModelDescriptor::new("Widget");
        expose(&mut widget, "maker", None, Some(documented(Some("API::Entities::Maker"))));

        let mut registry = ModelRegistry::new();
        registry.register(widget);
        registry.register(ModelDescriptor::new("API::Entities::Maker"));
        let resolver = ModelResolver::new(&registry, &NoTranslations);

        let schema = resolver.schema(&registry.get("Widget").unwrap().clone());
        assert_eq!(schema.properties["maker"]["$ref"], json!("API::Maker"));
    }

    #[test]
    fn test_property_description_from_translation() {
        let mut widget = ModelDescriptor::new("Shop::Widget");
        expose(&mut widget, "name", None, Some(documented(Some("String"))));

        let mut registry = ModelRegistry::new();
        registry.register(widget);
        let mut translator = MapTranslator::new();
        translator.insert("shop.widget.name", "Display name");
        let resolver = ModelResolver::new(&registry, &translator);

        let schema = resolver.schema(registry.get("Shop::Widget").unwrap());
        assert_eq!(schema.properties["name"]["description"], json!("Display name"));
    }
}
