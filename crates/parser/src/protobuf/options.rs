//! Extension option resolution
//!
//! Reads `google.api.http` and the `openapiv3.*` annotations off descriptor
//! options and turns them into the typed IR values. Missing extensions (not
//! imported by any file) and unset options both resolve to defaults.

use protoc_gen_openapiv3_common::{HttpRule, MethodOptions, ServiceOptions};
use prost_reflect::{DescriptorPool, DynamicMessage, ExtensionDescriptor, Value};

/// `google.api.http` on `MethodOptions`
pub const HTTP_EXTENSION: &str = "google.api.http";

/// `openapiv3.service` on `ServiceOptions`
pub const SERVICE_EXTENSION: &str = "openapiv3.service";

/// `openapiv3.method` on `MethodOptions`
pub const METHOD_EXTENSION: &str = "openapiv3.method";

/// `openapiv3.example` on `FieldOptions`
pub const EXAMPLE_EXTENSION: &str = "openapiv3.example";

/// Extension descriptors looked up once per pool
#[derive(Debug, Clone, Default)]
pub(crate) struct Extensions {
    http: Option<ExtensionDescriptor>,
    service: Option<ExtensionDescriptor>,
    method: Option<ExtensionDescriptor>,
    example: Option<ExtensionDescriptor>,
}

impl Extensions {
    pub(crate) fn lookup(pool: &DescriptorPool) -> Self {
        let extensions = Self {
            http: pool.get_extension_by_name(HTTP_EXTENSION),
            service: pool.get_extension_by_name(SERVICE_EXTENSION),
            method: pool.get_extension_by_name(METHOD_EXTENSION),
            example: pool.get_extension_by_name(EXAMPLE_EXTENSION),
        };

        tracing::debug!(
            http = extensions.http.is_some(),
            service = extensions.service.is_some(),
            method = extensions.method.is_some(),
            example = extensions.example.is_some(),
            "resolved extension descriptors"
        );

        extensions
    }

    /// HTTP rule of a method, if annotated
    pub(crate) fn http_rule(&self, options: &DynamicMessage) -> Option<HttpRule> {
        extension_message(options, self.http.as_ref(), decode_http_rule)
    }

    /// Service display options
    pub(crate) fn service_options(&self, options: &DynamicMessage) -> ServiceOptions {
        extension_message(options, self.service.as_ref(), decode_service_options)
            .unwrap_or_default()
    }

    /// Method options
    pub(crate) fn method_options(&self, options: &DynamicMessage) -> MethodOptions {
        extension_message(options, self.method.as_ref(), decode_method_options)
            .unwrap_or_default()
    }

    /// Example override of a field
    pub(crate) fn example(&self, options: &DynamicMessage) -> Option<String> {
        extension_message(options, self.example.as_ref(), |example| {
            string_field(example, "value")
        })
        .flatten()
    }
}

fn extension_message<T>(
    options: &DynamicMessage,
    extension: Option<&ExtensionDescriptor>,
    decode: impl FnOnce(&DynamicMessage) -> T,
) -> Option<T> {
    let extension = extension?;
    if !options.has_extension(extension) {
        return None;
    }

    match options.get_extension(extension).as_ref() {
        Value::Message(message) => Some(decode(message)),
        _ => None,
    }
}

/// Decode a `google.api.HttpRule` message
pub(crate) fn decode_http_rule(message: &DynamicMessage) -> HttpRule {
    let additional_bindings = message
        .get_field_by_name("additional_bindings")
        .map(|value| {
            value
                .as_list()
                .unwrap_or_default()
                .iter()
                .filter_map(Value::as_message)
                .map(decode_http_rule)
                .collect()
        })
        .unwrap_or_default();

    HttpRule {
        get: string_field(message, "get"),
        put: string_field(message, "put"),
        post: string_field(message, "post"),
        delete: string_field(message, "delete"),
        patch: string_field(message, "patch"),
        additional_bindings,
    }
}

/// Decode an `openapiv3.Service` message; an empty name is no override
pub(crate) fn decode_service_options(message: &DynamicMessage) -> ServiceOptions {
    ServiceOptions {
        name: string_field(message, "name").filter(|name| !name.is_empty()),
        description: string_field(message, "description"),
    }
}

/// Decode an `openapiv3.Method` message
pub(crate) fn decode_method_options(message: &DynamicMessage) -> MethodOptions {
    MethodOptions {
        skip_token: message
            .get_field_by_name("skip_token")
            .and_then(|value| value.as_bool())
            .unwrap_or(false),
    }
}

fn string_field(message: &DynamicMessage, name: &str) -> Option<String> {
    if !message.has_field_by_name(name) {
        return None;
    }
    let value = message.get_field_by_name(name)?;
    value.as_str().map(str::to_string)
}
