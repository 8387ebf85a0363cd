//! Converts protobuf descriptors to the ApiDefinition IR

use super::options::Extensions;
use protoc_gen_openapiv3_common::{
    ApiDefinition, Cardinality, EnumType, FieldKind, FieldSpec, MessageType, MethodSpec, Result,
    ServiceSpec,
};
use prost_reflect::{
    DescriptorPool, EnumDescriptor, FieldDescriptor, Kind, MessageDescriptor, MethodDescriptor,
    ServiceDescriptor,
};

/// Convert a protobuf DescriptorPool to an ApiDefinition
///
/// Every message and enum of the pool is converted so that references from
/// imported files resolve. Services are taken only from `files_to_generate`,
/// or from every file when the list is empty.
pub fn convert_protobuf_to_api_definition(
    pool: &DescriptorPool,
    files_to_generate: &[String],
) -> Result<ApiDefinition> {
    let extensions = Extensions::lookup(pool);
    let mut api = ApiDefinition::default();

    for message in pool.all_messages() {
        api.insert_message(convert_message(&message, &extensions));
    }

    for enum_descriptor in pool.all_enums() {
        api.insert_enum(convert_enum(&enum_descriptor));
    }

    for file in pool.files() {
        if !files_to_generate.is_empty() && !is_target_file(files_to_generate, file.name()) {
            continue;
        }

        for service in file.services() {
            api.services.push(convert_service(&service, &extensions));
        }
    }

    tracing::debug!(
        services = api.services.len(),
        messages = api.messages.len(),
        enums = api.enums.len(),
        "converted descriptor pool"
    );

    Ok(api)
}

/// Whether protoc asked for this file
///
/// protoc names targets exactly as the descriptors do. A target given on the
/// command line may carry extra leading directories (or vice versa), so a
/// match on whole trailing path segments is accepted too.
fn is_target_file(targets: &[String], file_name: &str) -> bool {
    let file_name = file_name.replace('\\', "/");
    targets.iter().any(|target| {
        let target = target.replace('\\', "/");
        target == file_name
            || ends_with_segments(&target, &file_name)
            || ends_with_segments(&file_name, &target)
    })
}

/// `path` ends with `suffix` on a `/` boundary
fn ends_with_segments(path: &str, suffix: &str) -> bool {
    path.strip_suffix(suffix)
        .is_some_and(|head| head.ends_with('/'))
}

fn convert_service(service: &ServiceDescriptor, extensions: &Extensions) -> ServiceSpec {
    let methods: Vec<MethodSpec> = service
        .methods()
        .map(|method| convert_method(&method, extensions))
        .collect();

    tracing::debug!(
        service = service.full_name(),
        methods = methods.len(),
        "converted service"
    );

    ServiceSpec {
        name: service.name().to_string(),
        full_name: service.full_name().to_string(),
        options: extensions.service_options(&service.options()),
        methods,
    }
}

fn convert_method(method: &MethodDescriptor, extensions: &Extensions) -> MethodSpec {
    let options = method.options();

    MethodSpec {
        name: method.name().to_string(),
        input_type: method.input().full_name().to_string(),
        output_type: method.output().full_name().to_string(),
        http_rule: extensions.http_rule(&options),
        options: extensions.method_options(&options),
    }
}

fn convert_message(message: &MessageDescriptor, extensions: &Extensions) -> MessageType {
    MessageType {
        full_name: message.full_name().to_string(),
        schema_name: schema_name(message),
        fields: message
            .fields()
            .map(|field| convert_field(&field, extensions))
            .collect(),
        map_entry: message.is_map_entry(),
    }
}

/// Component schema name: package, then the type path joined with `_`
///
/// `shop.v1.Order.Line` in package `shop.v1` becomes `shop.v1.Order_Line`.
/// A message of a package-less file keeps the separating dot (`.Order_Line`),
/// so every message name contains one.
fn schema_name(message: &MessageDescriptor) -> String {
    let full_name = message.full_name();
    let package = message.parent_file().package_name().to_string();

    if package.is_empty() {
        return format!(".{}", full_name.replace('.', "_"));
    }

    let local = full_name
        .strip_prefix(package.as_str())
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(full_name);

    format!("{}.{}", package, local.replace('.', "_"))
}

fn convert_field(field: &FieldDescriptor, extensions: &Extensions) -> FieldSpec {
    let cardinality = if field.is_map() {
        Cardinality::Map
    } else if field.is_list() {
        Cardinality::Repeated
    } else {
        Cardinality::Singular
    };

    FieldSpec {
        name: field.name().to_string(),
        json_name: field.json_name().to_string(),
        kind: convert_protobuf_kind(field),
        cardinality,
        example: extensions.example(&field.options()),
    }
}

/// Convert protobuf Kind to FieldKind
fn convert_protobuf_kind(field: &FieldDescriptor) -> FieldKind {
    match field.kind() {
        Kind::Double => FieldKind::Double,
        Kind::Float => FieldKind::Float,
        Kind::Int32 => FieldKind::Int32,
        Kind::Int64 => FieldKind::Int64,
        Kind::Uint32 => FieldKind::Uint32,
        Kind::Uint64 => FieldKind::Uint64,
        Kind::Sint32 => FieldKind::Sint32,
        Kind::Sint64 => FieldKind::Sint64,
        Kind::Fixed32 => FieldKind::Fixed32,
        Kind::Fixed64 => FieldKind::Fixed64,
        Kind::Sfixed32 => FieldKind::Sfixed32,
        Kind::Sfixed64 => FieldKind::Sfixed64,
        Kind::Bool => FieldKind::Bool,
        Kind::String => FieldKind::String,
        Kind::Bytes => FieldKind::Bytes,
        Kind::Message(message) if field.is_group() => {
            FieldKind::Group(message.full_name().to_string())
        }
        Kind::Message(message) => FieldKind::Message(message.full_name().to_string()),
        Kind::Enum(enum_descriptor) => FieldKind::Enum(enum_descriptor.full_name().to_string()),
    }
}

fn convert_enum(enum_descriptor: &EnumDescriptor) -> EnumType {
    EnumType {
        full_name: enum_descriptor.full_name().to_string(),
        values: enum_descriptor
            .values()
            .map(|value| value.name().to_string())
            .collect(),
    }
}
