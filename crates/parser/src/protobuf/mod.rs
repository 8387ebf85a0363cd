//! Protobuf descriptor parser
//!
//! Decodes descriptors with `prost-reflect` so that custom options survive,
//! then converts services, messages and enums into the IR.
//!
//! ## Example
//! ```rust,ignore
//! use protoc_gen_openapiv3_parser::ProtobufParser;
//!
//! let parser = ProtobufParser::from_file("service.pb")?
//!     .with_files_to_generate(vec!["shop/v1/shop.proto".to_string()]);
//! let api = parser.parse()?;
//! ```

mod converter;
mod options;
mod parser;

pub use options::{EXAMPLE_EXTENSION, HTTP_EXTENSION, METHOD_EXTENSION, SERVICE_EXTENSION};
pub use parser::ProtobufParser;
