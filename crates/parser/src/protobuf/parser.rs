//! Protobuf FileDescriptorSet and CodeGeneratorRequest parser

use protoc_gen_openapiv3_common::{ApiDefinition, GeneratorError, Result};
use prost::Message;
use prost_reflect::DescriptorPool;
use std::fs;
use std::path::Path;

/// Wire-compatible view of `google.protobuf.compiler.CodeGeneratorRequest`
///
/// `proto_file` is kept as raw bytes: decoding it into `prost_types` would
/// drop the extension options we need.
#[derive(Clone, PartialEq, ::prost::Message)]
struct RawCodeGeneratorRequest {
    #[prost(string, repeated, tag = "1")]
    pub file_to_generate: ::prost::alloc::vec::Vec<String>,
    #[prost(string, optional, tag = "2")]
    pub parameter: Option<String>,
    #[prost(bytes, repeated, tag = "15")]
    pub proto_file: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

/// Wire-compatible view of `google.protobuf.FileDescriptorSet`
#[derive(Clone, PartialEq, ::prost::Message)]
struct RawFileDescriptorSet {
    #[prost(bytes, repeated, tag = "1")]
    pub file: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

/// Protobuf descriptor parser
///
/// Holds a descriptor pool plus the list of files whose services should be
/// documented. Messages and enums from every file are available for schema
/// generation.
pub struct ProtobufParser {
    /// Descriptor pool for reflection
    pool: DescriptorPool,

    /// Files whose services are emitted; empty means all files
    files_to_generate: Vec<String>,

    /// Raw plugin parameter string, when read from a plugin request
    parameter: Option<String>,
}

impl ProtobufParser {
    /// Load a FileDescriptorSet from a binary file
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = ProtobufParser::from_file("service.pb")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path.as_ref()).map_err(|e| {
            GeneratorError::Parse(format!(
                "Failed to read FileDescriptorSet file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_file_descriptor_set(&bytes)
    }

    /// Parse a FileDescriptorSet from bytes
    pub fn from_file_descriptor_set(bytes: &[u8]) -> Result<Self> {
        let pool = DescriptorPool::decode(bytes).map_err(|e| {
            GeneratorError::Parse(format!("Failed to decode FileDescriptorSet: {}", e))
        })?;

        Ok(Self {
            pool,
            files_to_generate: Vec::new(),
            parameter: None,
        })
    }

    /// Parse a protoc `CodeGeneratorRequest` from bytes
    ///
    /// The request's file list and parameter string are retained.
    pub fn from_code_generator_request(bytes: &[u8]) -> Result<Self> {
        let request = RawCodeGeneratorRequest::decode(bytes).map_err(|e| {
            GeneratorError::Parse(format!("Failed to decode CodeGeneratorRequest: {}", e))
        })?;

        // Re-frame the raw files as a FileDescriptorSet so the pool decodes
        // their options together with everything else.
        let set = RawFileDescriptorSet {
            file: request.proto_file,
        }
        .encode_to_vec();

        let mut parser = Self::from_file_descriptor_set(&set)?;
        parser.files_to_generate = request.file_to_generate;
        parser.parameter = request.parameter;

        tracing::debug!(
            files = parser.files_to_generate.len(),
            parameter = parser.parameter.as_deref().unwrap_or_default(),
            "decoded CodeGeneratorRequest"
        );

        Ok(parser)
    }

    /// Restrict service emission to the given proto files
    pub fn with_files_to_generate(mut self, files: Vec<String>) -> Self {
        self.files_to_generate = files;
        self
    }

    /// Files whose services are emitted
    pub fn files_to_generate(&self) -> &[String] {
        &self.files_to_generate
    }

    /// Plugin parameter string from the request, if any
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    /// Resolve the descriptors into the `ApiDefinition` IR
    pub fn parse(&self) -> Result<ApiDefinition> {
        super::converter::convert_protobuf_to_api_definition(&self.pool, &self.files_to_generate)
    }

    /// Get reference to the underlying descriptor pool
    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }
}
