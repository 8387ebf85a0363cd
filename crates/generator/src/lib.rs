//! OpenAPI document generation
//!
//! This crate turns the typed descriptor IR (`ApiDefinition`) into an
//! OpenAPI 3.0 document and renders it as YAML.
//!
//! The walk goes services → methods. For each method the HTTP binding is
//! resolved, parameters are extracted, and the input and output message
//! schemas are registered in one shared [`SchemaRegistry`].

pub mod binding;
pub mod openapi;
pub mod output;
pub mod parameters;
pub mod schema;
pub mod type_mapper;

pub use binding::{resolve_binding, HttpBinding, HttpVerb};
pub use openapi::OpenApiDocument;
pub use output::{FsSink, OutputSink};
pub use schema::{SchemaBuilder, SchemaRegistry};

use openapi::{
    Components, Info, Operation, PathItem, RequestBody, Response, Schema, SecurityRequirement,
    SecurityScheme, Server, Tag, BEARER_AUTH,
};
use protoc_gen_openapiv3_common::{
    ApiDefinition, MethodSpec, PluginOptions, Result, ServiceSpec,
};
use serde_json::json;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Version written to the `openapi` field
pub const OPENAPI_VERSION: &str = "3.0.0";

const INFO_TITLE: &str = "Generated API";
const INFO_DESCRIPTION: &str = "API generated from protobufs";
const INFO_VERSION: &str = "1.0.0";

/// Component names of the shared error envelopes
pub const BAD_REQUEST_ERROR: &str = "BadRequestError";
pub const UNAUTHORIZED_ERROR: &str = "UnauthorizedError";
pub const INTERNAL_SERVER_ERROR: &str = "InternalServerError";

/// OpenAPI generator
///
/// Transforms an ApiDefinition into a single OpenAPI document:
/// - `paths` for every method with an HTTP binding
/// - `components.schemas` for every reachable message plus error envelopes
/// - sorted `tags`, one per service
pub struct OpenApiGenerator {
    api: ApiDefinition,
    options: PluginOptions,
}

impl OpenApiGenerator {
    /// Create a new generator from an ApiDefinition
    pub fn new(api: ApiDefinition, options: PluginOptions) -> Self {
        Self { api, options }
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    /// Build the document tree
    pub fn generate(&self) -> Result<OpenApiDocument> {
        let builder = SchemaBuilder::new(&self.api);
        let mut registry = SchemaRegistry::new();
        let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();
        let mut tags: BTreeMap<String, String> = BTreeMap::new();

        for service in &self.api.services {
            tags.insert(
                service.display_name().to_string(),
                service.description().to_string(),
            );

            for method in &service.methods {
                let Some((binding, operation)) =
                    self.build_operation(&builder, &mut registry, service, method)
                else {
                    continue;
                };

                let replaced = paths
                    .entry(binding.template.clone())
                    .or_default()
                    .set_operation(binding.verb, operation);

                if let Some(previous) = replaced {
                    tracing::warn!(
                        path = %binding.template,
                        verb = %binding.verb,
                        replaced = %previous.operation_id,
                        "route bound twice, keeping the last operation"
                    );
                }
            }
        }

        let mut schemas = registry.into_schemas();
        for (name, schema) in error_schemas() {
            match schemas.entry(name.to_string()) {
                Entry::Vacant(entry) => {
                    entry.insert(schema);
                }
                Entry::Occupied(_) => {
                    tracing::warn!(schema = name, "schema name taken, error envelope not added");
                }
            }
        }

        tracing::info!(
            paths = paths.len(),
            schemas = schemas.len(),
            tags = tags.len(),
            "generated OpenAPI document"
        );

        Ok(OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: INFO_TITLE.to_string(),
                description: Some(INFO_DESCRIPTION.to_string()),
                version: INFO_VERSION.to_string(),
            },
            servers: self
                .options
                .servers
                .iter()
                .map(|server| Server {
                    url: server.url.clone(),
                    description: server.description.clone(),
                })
                .collect(),
            security: vec![bearer_requirement()],
            tags: tags
                .into_iter()
                .map(|(name, description)| Tag {
                    name,
                    description: Some(description).filter(|d| !d.is_empty()),
                })
                .collect(),
            paths,
            components: Components {
                schemas,
                security_schemes: BTreeMap::from([(
                    BEARER_AUTH.to_string(),
                    SecurityScheme::bearer_jwt(),
                )]),
            },
        })
    }

    /// Register the method's schemas and build its operation
    ///
    /// Returns `None` when the method has no HTTP binding or its messages
    /// cannot be resolved; the schemas are registered either way.
    fn build_operation(
        &self,
        builder: &SchemaBuilder<'_>,
        registry: &mut SchemaRegistry,
        service: &ServiceSpec,
        method: &MethodSpec,
    ) -> Option<(HttpBinding, Operation)> {
        let input_schema = builder.register_message(registry, &method.input_type);
        let output_schema = builder.register_message(registry, &method.output_type);

        let Some(binding) = resolve_binding(method.http_rule.as_ref()) else {
            tracing::debug!(
                service = %service.full_name,
                method = %method.name,
                "no HTTP binding, skipping path"
            );
            return None;
        };

        let (Some(input_schema), Some(output_schema), Some(input)) = (
            input_schema,
            output_schema,
            self.api.message(&method.input_type),
        ) else {
            tracing::warn!(
                service = %service.full_name,
                method = %method.name,
                "unresolved request or response type, skipping path"
            );
            return None;
        };

        let request_body = binding
            .verb
            .has_body()
            .then(|| RequestBody::json_ref(&input_schema));

        let operation = Operation {
            tags: vec![service.display_name().to_string()],
            operation_id: format!("{}_{}", service.name, method.name),
            parameters: parameters::extract_parameters(builder, input, &binding),
            request_body,
            responses: standard_responses(&output_schema),
            security: method.options.skip_token.then(Vec::new),
        };

        Some((binding, operation))
    }

    /// Render the document as YAML
    pub fn render_yaml(&self) -> Result<String> {
        let document = self.generate()?;
        Ok(serde_yaml::to_string(&document)?)
    }

    /// Render and write the document to the configured output file
    ///
    /// Nothing is written if rendering fails.
    pub fn write(&self, sink: &dyn OutputSink) -> Result<PathBuf> {
        let yaml = self.render_yaml()?;
        let path = self.options.output_file();
        sink.write(&path, &yaml)?;
        Ok(path)
    }
}

fn bearer_requirement() -> SecurityRequirement {
    BTreeMap::from([(BEARER_AUTH.to_string(), Vec::new())])
}

fn standard_responses(output_schema: &str) -> BTreeMap<String, Response> {
    BTreeMap::from([
        ("200".to_string(), Response::json_ref("OK", output_schema)),
        (
            "400".to_string(),
            Response::json_ref("Bad Request", BAD_REQUEST_ERROR),
        ),
        (
            "401".to_string(),
            Response::json_ref("Unauthorized", UNAUTHORIZED_ERROR),
        ),
        (
            "500".to_string(),
            Response::json_ref("Internal Server Error", INTERNAL_SERVER_ERROR),
        ),
    ])
}

/// Error envelope: `code`, `message`, `details`
fn error_schema(example: serde_json::Value) -> Schema {
    let properties = BTreeMap::from([
        ("code".to_string(), Schema::typed("integer", None)),
        ("message".to_string(), Schema::typed("string", None)),
        (
            "details".to_string(),
            Schema::array(Schema::typed("object", None)),
        ),
    ]);
    Schema::object(properties).with_example(example)
}

fn error_schemas() -> [(&'static str, Schema); 3] {
    [
        (
            BAD_REQUEST_ERROR,
            error_schema(json!({
                "code": 400,
                "message": "Invalid request parameters",
                "details": [{"field": "name", "reason": "must not be empty"}],
            })),
        ),
        (
            UNAUTHORIZED_ERROR,
            error_schema(json!({
                "code": 401,
                "message": "Missing or invalid bearer token",
                "details": [],
            })),
        ),
        (
            INTERNAL_SERVER_ERROR,
            error_schema(json!({
                "code": 500,
                "message": "Internal server error",
                "details": [],
            })),
        ),
    ]
}

/// Generate the document for `api` and write it to the configured location
pub fn generate_openapi(api: ApiDefinition, options: PluginOptions) -> Result<PathBuf> {
    OpenApiGenerator::new(api, options).write(&FsSink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use output::MockOutputSink;
    use protoc_gen_openapiv3_common::GeneratorError;

    #[test]
    fn test_empty_definition() {
        let generator = OpenApiGenerator::new(ApiDefinition::default(), PluginOptions::default());
        let document = generator.generate().unwrap();

        assert_eq!(document.openapi, "3.0.0");
        assert_eq!(document.info.title, "Generated API");
        assert!(document.paths.is_empty());
        assert!(document.tags.is_empty());
        assert_eq!(document.components.schemas.len(), 3);
        assert_eq!(
            document.components.security_schemes[BEARER_AUTH],
            SecurityScheme::bearer_jwt()
        );
    }

    #[test]
    fn test_error_schemas_have_envelope_shape() {
        for (name, schema) in error_schemas() {
            let properties = schema.properties.as_ref().unwrap();
            assert_eq!(properties["code"], Schema::typed("integer", None), "{}", name);
            assert_eq!(properties["message"], Schema::typed("string", None), "{}", name);
            assert_eq!(
                properties["details"],
                Schema::array(Schema::typed("object", None)),
                "{}",
                name
            );
            assert!(schema.example.is_some());
        }
    }

    #[test]
    fn test_write_uses_output_file() {
        let options = PluginOptions::parse("openapi_out_path=docs");
        let generator = OpenApiGenerator::new(ApiDefinition::default(), options);

        let mut sink = MockOutputSink::new();
        sink.expect_write()
            .withf(|path, contents| {
                path == std::path::Path::new("docs/openapi.yaml")
                    && contents.starts_with("openapi:")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let path = generator.write(&sink).unwrap();
        assert_eq!(path, PathBuf::from("docs/openapi.yaml"));
    }

    #[test]
    fn test_write_failure_is_propagated() {
        let generator = OpenApiGenerator::new(ApiDefinition::default(), PluginOptions::default());

        let mut sink = MockOutputSink::new();
        sink.expect_write()
            .times(1)
            .returning(|_, _| Err(GeneratorError::Generation("disk full".to_string())));

        let result = generator.write(&sink);
        assert!(matches!(result, Err(GeneratorError::Generation(msg)) if msg == "disk full"));
    }
}
