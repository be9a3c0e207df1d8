//! Normalization of declared type tokens to Swagger 1.2 data types.

use serde::{Deserialize, Serialize};

/// Data types Swagger 1.2 treats as primitives.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "object", "integer", "long", "float", "double", "string", "byte", "boolean", "date",
    "dateTime",
];

/// Data type of uploaded files.
pub const FILE_TYPE: &str = "File";

/// Token declaring an array container parameter.
pub const ARRAY_TOKEN: &str = "Array";

/// Maps a declared parameter type token to its Swagger data type.
///
/// Scalar tokens are matched case-insensitively. Anything unrecognized is a
/// model reference; `model_name` turns it into that model's canonical name.
pub fn select_data_type<F>(raw: &str, model_name: F) -> String
where
    F: Fn(&str) -> String,
{
    let normalized = match raw.to_ascii_lowercase().as_str() {
        "hash" | "object" => "object",
        "rack::multipart::uploadedfile" | "file" => FILE_TYPE,
        "virtus::attribute::boolean" | "boolean" => "boolean",
        "integer" => "integer",
        "date" => "date",
        "string" | "symbol" => "string",
        "float" | "numeric" | "double" => "double",
        "bigdecimal" | "long" => "long",
        "datetime" => "dateTime",
        _ => return model_name(raw),
    };
    normalized.to_string()
}

/// Whether a data type is one of the Swagger primitives
pub fn is_primitive(data_type: &str) -> bool {
    PRIMITIVE_TYPES.contains(&data_type)
}

/// Integer format hint for a data type
pub fn format_for(data_type: &str) -> Option<&'static str> {
    match data_type {
        "integer" => Some("int32"),
        "long" => Some("int64"),
        _ => None,
    }
}

/// A `type` or `$ref` pointer, as used in property schemas and array items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRef {
    #[serde(rename = "type")]
    Type(String),
    #[serde(rename = "$ref")]
    Ref(String),
}

impl TypeRef {
    /// Wraps a resolved data type: primitives become `type`, the rest `$ref`.
    pub fn for_type(data_type: &str) -> Self {
        if is_primitive(data_type) {
            TypeRef::Type(data_type.to_string())
        } else {
            TypeRef::Ref(data_type.to_string())
        }
    }

    /// Like [`TypeRef::for_type`] for a class-style token (`String`, `DateTime`):
    /// the leading letter is lower-cased before the primitive check.
    pub fn for_class_token(token: &str) -> Self {
        let mut chars = token.chars();
        let lowered = match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        if is_primitive(&lowered) {
            TypeRef::Type(lowered)
        } else {
            TypeRef::Ref(token.to_string())
        }
    }
}

/// Model name with `Entity`/`Entities` stripped from its module path.
pub fn stripped_model_name(name: &str) -> String {
    name.replace("Entities", "")
        .replace("Entity", "")
        .replace("::::", "::")
        .trim_start_matches("::")
        .to_string()
}
