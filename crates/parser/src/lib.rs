//! Protobuf descriptor parsing
//!
//! This crate decodes protobuf descriptors into the typed IR
//! (`ApiDefinition`) consumed by the generator.
//!
//! ## Inputs
//! - a binary `FileDescriptorSet` (`protoc --include_imports --descriptor_set_out`)
//! - a `CodeGeneratorRequest` read by the plugin from stdin
//!
//! Extension options (`google.api.http` and the `openapiv3.*` annotations)
//! are resolved here, so the generator only sees plain typed values.

pub mod protobuf;

pub use protobuf::{
    ProtobufParser, EXAMPLE_EXTENSION, HTTP_EXTENSION, METHOD_EXTENSION, SERVICE_EXTENSION,
};

use protoc_gen_openapiv3_common::{ApiDefinition, Result};

/// Decode a binary FileDescriptorSet and resolve it into an `ApiDefinition`
///
/// Services of every file in the set are included.
pub fn parse_descriptor_set(bytes: &[u8]) -> Result<ApiDefinition> {
    ProtobufParser::from_file_descriptor_set(bytes)?.parse()
}
