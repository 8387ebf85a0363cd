//! OpenAPI 3.0 document model
//!
//! Only the parts of OpenAPI 3.0 this generator emits are modeled.
//! Every map is a `BTreeMap` so serialization order is stable.

use crate::binding::HttpVerb;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Prefix of a component schema reference
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Media type of every request and response body
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Name of the bearer security scheme
pub const BEARER_AUTH: &str = "BearerAuth";

/// Security requirement: scheme name to scopes
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// OpenAPI document root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version ("3.0.0")
    pub openapi: String,

    /// API metadata
    pub info: Info,

    /// Servers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    /// Global security requirements
    #[serde(default)]
    pub security: Vec<SecurityRequirement>,

    /// Operation groups, sorted by name
    #[serde(default)]
    pub tags: Vec<Tag>,

    /// API paths, keyed by URL template
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,

    /// Reusable components
    pub components: Components,
}

impl OpenApiDocument {
    /// Get a component schema by reference path
    /// e.g., "#/components/schemas/shop.Item" -> returns the shop.Item schema
    pub fn resolve_schema_ref(&self, ref_path: &str) -> Option<&Schema> {
        let schema_name = ref_path.strip_prefix(SCHEMA_REF_PREFIX)?;
        self.components.schemas.get(schema_name)
    }

    /// Get the operation bound to a template and verb
    pub fn operation(&self, template: &str, verb: HttpVerb) -> Option<&Operation> {
        self.paths.get(template)?.operation(verb)
    }
}

/// API information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,

    /// API description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// API version
    pub version: String,
}

/// Server information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// Server URL
    pub url: String,

    /// Server description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operation group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Path item (operations for a path)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, verb: HttpVerb) -> &mut Option<Operation> {
        match verb {
            HttpVerb::Get => &mut self.get,
            HttpVerb::Put => &mut self.put,
            HttpVerb::Post => &mut self.post,
            HttpVerb::Delete => &mut self.delete,
            HttpVerb::Patch => &mut self.patch,
        }
    }

    /// Bind an operation to a verb, returning the one it replaced
    pub fn set_operation(&mut self, verb: HttpVerb, operation: Operation) -> Option<Operation> {
        self.slot(verb).replace(operation)
    }

    /// Operation bound to a verb
    pub fn operation(&self, verb: HttpVerb) -> Option<&Operation> {
        match verb {
            HttpVerb::Get => self.get.as_ref(),
            HttpVerb::Put => self.put.as_ref(),
            HttpVerb::Post => self.post.as_ref(),
            HttpVerb::Delete => self.delete.as_ref(),
            HttpVerb::Patch => self.patch.as_ref(),
        }
    }
}

/// HTTP operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Tags (for grouping)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Operation ID (unique identifier)
    #[serde(rename = "operationId")]
    pub operation_id: String,

    /// Parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    /// Request body
    #[serde(
        rename = "requestBody",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub request_body: Option<RequestBody>,

    /// Responses keyed by status code
    pub responses: BTreeMap<String, Response>,

    /// Per-operation security; `Some(vec![])` disables the global requirement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

/// Parameter location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
}

/// Parameter definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,

    /// Location: path or query
    #[serde(rename = "in")]
    pub location: ParameterLocation,

    /// Required flag
    pub required: bool,

    /// Schema
    pub schema: Schema,

    /// Example value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// Request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Content types
    pub content: BTreeMap<String, MediaType>,

    /// Required flag
    pub required: bool,
}

impl RequestBody {
    /// Required JSON body referencing a component schema
    pub fn json_ref(schema_name: &str) -> Self {
        Self {
            content: json_content(Schema::reference(schema_name)),
            required: true,
        }
    }
}

/// Response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Description
    pub description: String,

    /// Content types
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
}

impl Response {
    /// JSON response referencing a component schema
    pub fn json_ref(description: &str, schema_name: &str) -> Self {
        Self {
            description: description.to_string(),
            content: json_content(Schema::reference(schema_name)),
        }
    }
}

/// Media type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
}

fn json_content(schema: Schema) -> BTreeMap<String, MediaType> {
    BTreeMap::from([(JSON_MEDIA_TYPE.to_string(), MediaType { schema })])
}

/// Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to a component schema
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,

    /// Type: string, number, integer, boolean, array, object
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,

    /// Format (e.g., int32, int64, byte, enum)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Enum values
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,

    /// Items schema (for array type)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    /// Value schema (for map type)
    #[serde(
        rename = "additionalProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Box<Schema>>,

    /// Properties (for object type)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,

    /// Example value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Schema {
    /// Primitive schema with an optional format
    pub fn typed(schema_type: &str, format: Option<&str>) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            format: format.map(str::to_string),
            ..Default::default()
        }
    }

    /// `$ref` to a component schema
    pub fn reference(schema_name: &str) -> Self {
        Self {
            ref_path: Some(format!("{}{}", SCHEMA_REF_PREFIX, schema_name)),
            ..Default::default()
        }
    }

    /// `{type: array, items: <items>}`
    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed("array", None)
        }
    }

    /// `{type: object, additionalProperties: <value>}`
    pub fn map(value: Schema) -> Self {
        Self {
            additional_properties: Some(Box::new(value)),
            ..Self::typed("object", None)
        }
    }

    /// `{type: object, properties: ...}`
    pub fn object(properties: BTreeMap<String, Schema>) -> Self {
        Self {
            properties: Some(properties),
            ..Self::typed("object", None)
        }
    }

    /// Attach an example
    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }
}

/// Reusable components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Schemas
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,

    /// Security schemes
    #[serde(rename = "securitySchemes", default)]
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

/// HTTP security scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,

    pub scheme: String,

    #[serde(rename = "bearerFormat")]
    pub bearer_format: String,
}

impl SecurityScheme {
    /// `http` / `bearer` / `JWT`
    pub fn bearer_jwt() -> Self {
        Self {
            scheme_type: "http".to_string(),
            scheme: "bearer".to_string(),
            bearer_format: "JWT".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_serializes_only_set_fields() {
        let schema = Schema::array(Schema::typed("integer", Some("int64")));
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            value,
            json!({"type": "array", "items": {"type": "integer", "format": "int64"}})
        );

        let value = serde_json::to_value(Schema::reference("shop.Item")).unwrap();
        assert_eq!(value, json!({"$ref": "#/components/schemas/shop.Item"}));
    }

    #[test]
    fn test_set_operation_returns_replaced() {
        let operation = |id: &str| Operation {
            tags: vec![],
            operation_id: id.to_string(),
            parameters: vec![],
            request_body: None,
            responses: BTreeMap::new(),
            security: None,
        };

        let mut item = PathItem::default();
        assert!(item.set_operation(HttpVerb::Get, operation("A_Get")).is_none());
        let replaced = item.set_operation(HttpVerb::Get, operation("B_Get")).unwrap();
        assert_eq!(replaced.operation_id, "A_Get");
        assert_eq!(item.operation(HttpVerb::Get).unwrap().operation_id, "B_Get");
        assert!(item.operation(HttpVerb::Post).is_none());
    }

    #[test]
    fn test_skipped_security_serializes_as_empty_list() {
        let operation = Operation {
            tags: vec!["Items".to_string()],
            operation_id: "Items_List".to_string(),
            parameters: vec![],
            request_body: None,
            responses: BTreeMap::new(),
            security: Some(vec![]),
        };
        let value = serde_json::to_value(&operation).unwrap();
        assert_eq!(value["security"], json!([]));
        assert!(value.get("requestBody").is_none());
    }
}
