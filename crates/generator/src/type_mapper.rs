//! Type mapper for protobuf field kinds
//!
//! Maps scalar kinds to OpenAPI `(type, format)` pairs and their default
//! examples. Enum and message kinds need the surrounding `ApiDefinition`
//! and are handled by the schema builder.

use crate::openapi::Schema;
use protoc_gen_openapiv3_common::FieldKind;
use serde_json::{Number, Value};

/// Full name of the well-known timestamp message
pub const TIMESTAMP_TYPE: &str = "google.protobuf.Timestamp";

/// Example value used for timestamp fields
pub const TIMESTAMP_EXAMPLE: i64 = 1741589979;

/// OpenAPI primitive a protobuf kind maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    String,
    Bytes,
}

impl ScalarType {
    /// Map a scalar protobuf kind; `None` for enums, messages and groups
    pub fn from_kind(kind: &FieldKind) -> Option<Self> {
        let scalar = match kind {
            FieldKind::Bool => ScalarType::Boolean,
            FieldKind::Int32
            | FieldKind::Sint32
            | FieldKind::Uint32
            | FieldKind::Sfixed32
            | FieldKind::Fixed32 => ScalarType::Int32,
            FieldKind::Int64
            | FieldKind::Sint64
            | FieldKind::Uint64
            | FieldKind::Sfixed64
            | FieldKind::Fixed64 => ScalarType::Int64,
            FieldKind::Float => ScalarType::Float,
            FieldKind::Double => ScalarType::Double,
            FieldKind::String => ScalarType::String,
            FieldKind::Bytes => ScalarType::Bytes,
            FieldKind::Enum(_) | FieldKind::Message(_) | FieldKind::Group(_) => return None,
        };
        Some(scalar)
    }

    /// OpenAPI `type`
    pub fn schema_type(&self) -> &'static str {
        match self {
            ScalarType::Boolean => "boolean",
            ScalarType::Int32 | ScalarType::Int64 => "integer",
            ScalarType::Float | ScalarType::Double => "number",
            ScalarType::String | ScalarType::Bytes => "string",
        }
    }

    /// OpenAPI `format`
    pub fn format(&self) -> Option<&'static str> {
        match self {
            ScalarType::Boolean | ScalarType::String => None,
            ScalarType::Int32 => Some("int32"),
            ScalarType::Int64 => Some("int64"),
            ScalarType::Float => Some("float"),
            ScalarType::Double => Some("double"),
            ScalarType::Bytes => Some("byte"),
        }
    }

    pub fn schema(&self) -> Schema {
        Schema::typed(self.schema_type(), self.format())
    }

    /// Example used when no override is given
    pub fn default_example(&self) -> Value {
        match self {
            ScalarType::Boolean => Value::Bool(true),
            ScalarType::Int32 | ScalarType::Int64 => Value::from(0),
            ScalarType::Float | ScalarType::Double => Value::from(0.0),
            ScalarType::String | ScalarType::Bytes => Value::String(String::new()),
        }
    }

    /// Coerce an example override to this type
    ///
    /// Returns `None` when the text does not parse.
    pub fn coerce(&self, raw: &str) -> Option<Value> {
        match self {
            ScalarType::Boolean => parse_bool(raw).map(Value::Bool),
            ScalarType::Int32 | ScalarType::Int64 => raw.parse::<i64>().ok().map(Value::from),
            ScalarType::Float | ScalarType::Double => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            ScalarType::String | ScalarType::Bytes => Some(Value::String(raw.to_string())),
        }
    }

    /// The override when it coerces, else the default example
    pub fn example(&self, example_override: Option<&str>) -> Value {
        example_override
            .and_then(|raw| self.coerce(raw))
            .unwrap_or_else(|| self.default_example())
    }
}

/// Accepts the spellings `1, t, T, TRUE, true, True` and their false forms
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Schema and example of a timestamp field
pub fn timestamp(example_override: Option<&str>) -> (Schema, Value) {
    let example = example_override
        .and_then(|raw| ScalarType::Int32.coerce(raw))
        .unwrap_or_else(|| Value::from(TIMESTAMP_EXAMPLE));
    (ScalarType::Int32.schema(), example)
}

/// Schema and example of a kind that cannot be resolved
pub fn fallback() -> (Schema, Value) {
    (ScalarType::String.schema(), Value::String(String::new()))
}
