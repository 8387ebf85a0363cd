//! Schema registry and builder
//!
//! The builder maps message fields to OpenAPI schemas and synthesizes
//! examples. Nested message schemas are registered once in the
//! [`SchemaRegistry`] under their component name and referenced by `$ref`
//! everywhere else.

use crate::openapi::Schema;
use crate::type_mapper::{self, ScalarType, TIMESTAMP_TYPE};
use protoc_gen_openapiv3_common::{
    ApiDefinition, Cardinality, FieldKind, FieldSpec, MessageType,
};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Key of the value field in a map entry message
const MAP_VALUE_FIELD: &str = "value";

/// Keys used for map examples
const MAP_EXAMPLE_KEYS: [&str; 2] = ["key1", "key2"];

/// Component schemas keyed by schema name
///
/// An entry is created at most once and never overwritten. A name is
/// reserved while its schema is being built, so recursive types resolve to
/// a `$ref` instead of being built again.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Schema>,
    pending: BTreeSet<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the schema for `name` unless it exists or is being built
    ///
    /// Returns whether the entry already existed.
    pub fn get_or_create<F>(&mut self, name: &str, create: F) -> bool
    where
        F: FnOnce(&mut Self) -> Schema,
    {
        if self.contains(name) {
            return true;
        }

        self.pending.insert(name.to_string());
        let schema = create(self);
        self.pending.remove(name);
        self.schemas.insert(name.to_string(), schema);
        false
    }

    /// Whether the name is registered or reserved
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name) || self.pending.contains(name)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn into_schemas(self) -> BTreeMap<String, Schema> {
        self.schemas
    }
}

/// Message types on the current example recursion path
#[derive(Debug, Default)]
pub struct RecursionPath {
    active: HashSet<String>,
}

impl RecursionPath {
    /// Returns false if the type is already on the path
    fn enter(&mut self, full_name: &str) -> bool {
        self.active.insert(full_name.to_string())
    }

    fn leave(&mut self, full_name: &str) {
        self.active.remove(full_name);
    }
}

/// Builds schemas and examples over one `ApiDefinition`
pub struct SchemaBuilder<'a> {
    api: &'a ApiDefinition,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(api: &'a ApiDefinition) -> Self {
        Self { api }
    }

    /// Register the schema of a message, returning its component name
    ///
    /// Returns `None` if the type is not part of the definition.
    pub fn register_message(
        &self,
        registry: &mut SchemaRegistry,
        full_name: &str,
    ) -> Option<String> {
        let Some(message) = self.api.message(full_name) else {
            tracing::warn!(type_name = full_name, "unresolved message type");
            return None;
        };

        let existed = registry.get_or_create(&message.schema_name, |registry| {
            self.message_schema(registry, message)
        });
        if !existed {
            tracing::debug!(schema = %message.schema_name, "registered schema");
        }

        Some(message.schema_name.clone())
    }

    /// `{type: object, properties, example}` for a message
    fn message_schema(&self, registry: &mut SchemaRegistry, message: &MessageType) -> Schema {
        let properties = message
            .fields
            .iter()
            .map(|field| (field.json_name.clone(), self.field_schema(registry, field)))
            .collect();

        let example = self.message_example(&message.full_name, &mut RecursionPath::default());
        Schema::object(properties).with_example(example)
    }

    /// Schema and example of one field
    pub fn field(&self, registry: &mut SchemaRegistry, field: &FieldSpec) -> (Schema, Value) {
        let schema = self.field_schema(registry, field);
        let example = self.field_example(field, &mut RecursionPath::default());
        (schema, example)
    }

    /// Field schema with cardinality applied: map first, then repeated
    pub fn field_schema(&self, registry: &mut SchemaRegistry, field: &FieldSpec) -> Schema {
        match field.cardinality {
            Cardinality::Map => match self.map_value_field(field) {
                Some(value) => Schema::map(self.field_schema(registry, value)),
                None => Schema::map(type_mapper::fallback().0),
            },
            Cardinality::Repeated => Schema::array(self.base_schema(registry, field)),
            Cardinality::Singular => self.base_schema(registry, field),
        }
    }

    fn base_schema(&self, registry: &mut SchemaRegistry, field: &FieldSpec) -> Schema {
        if let Some(scalar) = ScalarType::from_kind(&field.kind) {
            return scalar.schema();
        }

        match &field.kind {
            FieldKind::Enum(name) => self.enum_schema(name),
            FieldKind::Message(name) | FieldKind::Group(name) if name == TIMESTAMP_TYPE => {
                type_mapper::timestamp(None).0
            }
            FieldKind::Message(name) | FieldKind::Group(name) => {
                match self.register_message(registry, name) {
                    Some(schema_name) => Schema::reference(&schema_name),
                    None => type_mapper::fallback().0,
                }
            }
            _ => type_mapper::fallback().0,
        }
    }

    fn enum_schema(&self, full_name: &str) -> Schema {
        match self.api.enum_type(full_name) {
            Some(enum_type) => Schema {
                enum_values: enum_type.values.clone(),
                ..Schema::typed("string", Some("enum"))
            },
            None => {
                tracing::warn!(enum_type = full_name, "unresolved enum type");
                type_mapper::fallback().0
            }
        }
    }

    /// Field example with cardinality applied
    pub fn field_example(&self, field: &FieldSpec, path: &mut RecursionPath) -> Value {
        match field.cardinality {
            Cardinality::Map => {
                let value = match self.map_value_field(field) {
                    Some(value) => self.field_example(value, path),
                    None => type_mapper::fallback().1,
                };
                let entries: Map<String, Value> = MAP_EXAMPLE_KEYS
                    .iter()
                    .map(|key| (key.to_string(), value.clone()))
                    .collect();
                Value::Object(entries)
            }
            Cardinality::Repeated => Value::Array(vec![self.base_example(field, path)]),
            Cardinality::Singular => self.base_example(field, path),
        }
    }

    fn base_example(&self, field: &FieldSpec, path: &mut RecursionPath) -> Value {
        let example_override = field.example.as_deref();

        if let Some(scalar) = ScalarType::from_kind(&field.kind) {
            return scalar.example(example_override);
        }

        match &field.kind {
            FieldKind::Enum(name) => {
                if let Some(raw) = example_override {
                    return Value::String(raw.to_string());
                }
                self.api
                    .enum_type(name)
                    .and_then(|enum_type| enum_type.values.first())
                    .map(|value| Value::String(value.clone()))
                    .unwrap_or_else(|| type_mapper::fallback().1)
            }
            FieldKind::Message(name) | FieldKind::Group(name) if name == TIMESTAMP_TYPE => {
                type_mapper::timestamp(example_override).1
            }
            FieldKind::Message(name) | FieldKind::Group(name) => self.message_example(name, path),
            _ => type_mapper::fallback().1,
        }
    }

    /// Synthesized example object of a message
    ///
    /// A type already on the recursion path yields `{}`.
    pub fn message_example(&self, full_name: &str, path: &mut RecursionPath) -> Value {
        let Some(message) = self.api.message(full_name) else {
            return type_mapper::fallback().1;
        };

        if !path.enter(full_name) {
            return Value::Object(Map::new());
        }

        let object: Map<String, Value> = message
            .fields
            .iter()
            .map(|field| (field.json_name.clone(), self.field_example(field, path)))
            .collect();

        path.leave(full_name);
        Value::Object(object)
    }

    /// Schema and example for a path or query parameter
    ///
    /// Parameters never reference component schemas: message-typed fields
    /// other than timestamps are rendered as strings.
    pub fn parameter(&self, field: &FieldSpec) -> (Schema, Value) {
        let example_override = field.example.as_deref();

        let base = if field.cardinality == Cardinality::Map {
            tracing::warn!(field = %field.name, "map field bound as parameter, rendering as string");
            type_mapper::fallback()
        } else {
            match &field.kind {
                FieldKind::Enum(name) => {
                    let example = self.base_example(field, &mut RecursionPath::default());
                    (self.enum_schema(name), example)
                }
                FieldKind::Message(name) | FieldKind::Group(name) if name == TIMESTAMP_TYPE => {
                    type_mapper::timestamp(example_override)
                }
                FieldKind::Message(name) | FieldKind::Group(name) => {
                    tracing::warn!(
                        field = %field.name,
                        type_name = %name,
                        "message field bound as parameter, rendering as string"
                    );
                    type_mapper::fallback()
                }
                kind => match ScalarType::from_kind(kind) {
                    Some(scalar) => (scalar.schema(), scalar.example(example_override)),
                    None => type_mapper::fallback(),
                },
            }
        };

        match field.cardinality {
            Cardinality::Repeated => (Schema::array(base.0), Value::Array(vec![base.1])),
            _ => base,
        }
    }

    /// The `value` field of a map field's entry type
    fn map_value_field(&self, field: &FieldSpec) -> Option<&'a FieldSpec> {
        let entry_name = match &field.kind {
            FieldKind::Message(name) | FieldKind::Group(name) => name,
            _ => return None,
        };

        let value = self
            .api
            .message(entry_name)
            .and_then(|entry| entry.field(MAP_VALUE_FIELD));
        if value.is_none() {
            tracing::warn!(entry = %entry_name, "unresolved map entry type");
        }
        value
    }
}
