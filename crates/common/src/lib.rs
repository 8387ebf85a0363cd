//! Common types and utilities for protoc-gen-openapiv3
//!
//! This crate contains the typed descriptor IR shared by the parser and the
//! generator, the error type, and the plugin options.
//!
//! The IR is an arena: messages and enums live in maps keyed by their fully
//! qualified name and fields refer to them by that name, so recursive message
//! graphs need no shared ownership.

mod options;

pub use options::{parse_servers, PluginOptions, ServerOption, OUTPUT_FILE_NAME};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during OpenAPI generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Everything the generator needs from one descriptor graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDefinition {
    /// Services to document, in declaration order
    pub services: Vec<ServiceSpec>,

    /// All known message types keyed by full name (e.g. "shop.v1.Order")
    #[serde(default)]
    pub messages: BTreeMap<String, MessageType>,

    /// All known enum types keyed by full name
    #[serde(default)]
    pub enums: BTreeMap<String, EnumType>,
}

impl ApiDefinition {
    /// Look up a message by its fully qualified name
    pub fn message(&self, full_name: &str) -> Option<&MessageType> {
        self.messages.get(full_name)
    }

    /// Look up an enum by its fully qualified name
    pub fn enum_type(&self, full_name: &str) -> Option<&EnumType> {
        self.enums.get(full_name)
    }

    /// Add a message, keyed by its full name
    pub fn insert_message(&mut self, message: MessageType) {
        self.messages.insert(message.full_name.clone(), message);
    }

    /// Add an enum, keyed by its full name
    pub fn insert_enum(&mut self, enum_type: EnumType) {
        self.enums.insert(enum_type.full_name.clone(), enum_type);
    }
}

/// A protobuf message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageType {
    /// Fully qualified name (e.g. "shop.v1.Order.Line")
    pub full_name: String,

    /// Component schema name (e.g. "shop.v1.Order_Line")
    pub schema_name: String,

    /// Fields in declaration order
    pub fields: Vec<FieldSpec>,

    /// Synthetic entry type generated for a map field
    #[serde(default)]
    pub map_entry: bool,
}

impl MessageType {
    /// Create a message whose schema name equals its full name
    pub fn new(full_name: &str, fields: Vec<FieldSpec>) -> Self {
        Self {
            full_name: full_name.to_string(),
            schema_name: full_name.to_string(),
            fields,
            map_entry: false,
        }
    }

    /// Find a field by its proto name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A single message field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Name as declared in the .proto file
    pub name: String,

    /// Serialized (JSON) name, used as the property name
    pub json_name: String,

    /// Declared kind
    pub kind: FieldKind,

    /// Singular, repeated or map
    pub cardinality: Cardinality,

    /// Raw value of the `(openapiv3.example)` option
    #[serde(default)]
    pub example: Option<String>,
}

impl FieldSpec {
    /// Create a singular field whose JSON name equals its proto name
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            json_name: name.to_string(),
            kind,
            cardinality: Cardinality::Singular,
            example: None,
        }
    }

    /// Mark the field as repeated
    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    /// Mark the field as a map; its kind must reference the map entry type
    pub fn map(mut self) -> Self {
        self.cardinality = Cardinality::Map;
        self
    }

    /// Set the example override
    pub fn with_example(mut self, example: &str) -> Self {
        self.example = Some(example.to_string());
        self
    }

    /// Set the JSON name
    pub fn with_json_name(mut self, json_name: &str) -> Self {
        self.json_name = json_name.to_string();
        self
    }
}

/// Declared protobuf field kind
///
/// Enum, message and group kinds carry the full name of the referenced type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Bool,
    Int32,
    Sint32,
    Uint32,
    Sfixed32,
    Fixed32,
    Int64,
    Sint64,
    Uint64,
    Sfixed64,
    Fixed64,
    Float,
    Double,
    String,
    Bytes,
    Enum(String),
    Message(String),
    Group(String),
}

/// Field cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    Singular,
    Repeated,
    Map,
}

/// A protobuf enum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumType {
    /// Fully qualified name
    pub full_name: String,

    /// Value names in declaration order; the first is the default
    pub values: Vec<String>,
}

/// A protobuf service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Declared name (e.g. "ItemService")
    pub name: String,

    /// Fully qualified name (e.g. "shop.v1.ItemService")
    pub full_name: String,

    /// Resolved `(openapiv3.service)` option
    #[serde(default)]
    pub options: ServiceOptions,

    /// RPC methods in declaration order
    pub methods: Vec<MethodSpec>,
}

impl ServiceSpec {
    /// Name used for tags: the option override if set, else the declared name
    pub fn display_name(&self) -> &str {
        self.options
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.name)
    }

    /// Tag description
    pub fn description(&self) -> &str {
        self.options.description.as_deref().unwrap_or_default()
    }
}

/// Service-level documentation option
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceOptions {
    /// Display name override
    #[serde(default)]
    pub name: Option<String>,

    /// Tag description
    #[serde(default)]
    pub description: Option<String>,
}

/// A single RPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSpec {
    /// Declared name (e.g. "GetItem")
    pub name: String,

    /// Full name of the request message
    pub input_type: String,

    /// Full name of the response message
    pub output_type: String,

    /// Resolved `(google.api.http)` option
    #[serde(default)]
    pub http_rule: Option<HttpRule>,

    /// Resolved `(openapiv3.method)` option
    #[serde(default)]
    pub options: MethodOptions,
}

/// Method-level option
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodOptions {
    /// Operation does not require the bearer token
    #[serde(default)]
    pub skip_token: bool,
}

/// Typed view of `google.api.HttpRule`
///
/// Only the pattern cases this plugin understands are kept. In a well-formed
/// rule at most one of them is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRule {
    #[serde(default)]
    pub get: Option<String>,

    #[serde(default)]
    pub put: Option<String>,

    #[serde(default)]
    pub post: Option<String>,

    #[serde(default)]
    pub delete: Option<String>,

    #[serde(default)]
    pub patch: Option<String>,

    /// Extra bindings; only their templates are used
    #[serde(default)]
    pub additional_bindings: Vec<HttpRule>,
}
