//! protoc-gen-openapiv3 CLI
//!
//! Run without a subcommand, the binary speaks the protoc plugin protocol:
//! a `CodeGeneratorRequest` on stdin, a `CodeGeneratorResponse` on stdout.
//! The subcommands work offline on a descriptor set file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use prost::Message;
use prost_types::compiler::{code_generator_response, CodeGeneratorResponse};
use protoc_gen_openapiv3_common::{parse_servers, ApiDefinition, PluginOptions};
use protoc_gen_openapiv3_generator::{resolve_binding, FsSink, OpenApiGenerator};
use protoc_gen_openapiv3_parser::ProtobufParser;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "protoc-gen-openapiv3")]
#[command(
    version,
    about = "Generate OpenAPI 3.0 documents from annotated protobuf services",
    long_about = "Without a subcommand this runs as a protoc plugin:\n  \
        protoc --openapiv3_out=. --openapiv3_opt=openapi_out_path=docs service.proto"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate openapi.yaml from a FileDescriptorSet
    #[command(after_help = "EXAMPLES:\n  \
        # Build the descriptor set\n  \
        protoc --include_imports --descriptor_set_out=shop.pb -I proto shop/v1/shop.proto\n\n  \
        # Generate into ./docs\n  \
        protoc-gen-openapiv3 generate \\\n    \
        --descriptor-set shop.pb \\\n    \
        --file shop/v1/shop.proto \\\n    \
        --output ./docs \\\n    \
        --servers 'https://api.example.com|Production'")]
    Generate {
        /// Path to the binary FileDescriptorSet
        #[arg(short, long)]
        descriptor_set: PathBuf,

        /// Proto files whose services are documented (all when omitted)
        #[arg(short, long = "file")]
        files: Vec<String>,

        /// Output directory (current directory when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Servers as `url|description;url2|description2`
        #[arg(long)]
        servers: Option<String>,
    },

    /// Display the services, methods and HTTP bindings of a FileDescriptorSet
    Inspect {
        /// Path to the binary FileDescriptorSet
        #[arg(short, long)]
        descriptor_set: PathBuf,

        /// Dump the resolved definition as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        None => plugin_command()?,
        Some(Commands::Generate {
            descriptor_set,
            files,
            output,
            servers,
        }) => {
            generate_command(
                descriptor_set.as_path(),
                files,
                output,
                servers.as_deref(),
                cli.verbose,
            )?;
        }
        Some(Commands::Inspect {
            descriptor_set,
            json,
        }) => {
            inspect_command(descriptor_set.as_path(), json, cli.verbose)?;
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries the plugin response
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn plugin_command() -> Result<()> {
    let mut input = Vec::new();
    io::stdin()
        .read_to_end(&mut input)
        .context("Failed to read CodeGeneratorRequest from stdin")?;

    let response = handle_request(&input);

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&response.encode_to_vec())
        .context("Failed to write CodeGeneratorResponse")?;
    stdout.flush().context("Failed to flush stdout")?;

    Ok(())
}

/// Answer one plugin request
///
/// Generation failures are reported to protoc through the response's
/// `error` field.
fn handle_request(input: &[u8]) -> CodeGeneratorResponse {
    let mut response = CodeGeneratorResponse {
        supported_features: Some(code_generator_response::Feature::Proto3Optional as u64),
        ..Default::default()
    };

    if let Err(e) = generate_from_request(input) {
        tracing::error!(error = %format!("{:#}", e), "generation failed");
        response.error = Some(format!("{:#}", e));
    }

    response
}

fn generate_from_request(input: &[u8]) -> Result<PathBuf> {
    let parser = ProtobufParser::from_code_generator_request(input)
        .context("Failed to decode CodeGeneratorRequest")?;
    let options = PluginOptions::parse(parser.parameter().unwrap_or_default());
    let api = parser.parse().context("Failed to resolve descriptors")?;

    let path = OpenApiGenerator::new(api, options)
        .write(&FsSink)
        .context("Failed to generate OpenAPI document")?;

    tracing::info!(path = %path.display(), "wrote OpenAPI document");
    Ok(path)
}

fn load_definition(descriptor_set: &Path, files: Vec<String>) -> Result<ApiDefinition> {
    let parser = ProtobufParser::from_file(descriptor_set)
        .context("Failed to load FileDescriptorSet")?
        .with_files_to_generate(files);
    parser
        .parse()
        .context("Failed to resolve FileDescriptorSet")
}

fn generate_command(
    descriptor_set: &Path,
    files: Vec<String>,
    output: Option<PathBuf>,
    servers: Option<&str>,
    verbose: bool,
) -> Result<()> {
    println!(
        "{} Reading descriptor set: {}",
        "→".cyan(),
        descriptor_set.display()
    );

    let api = load_definition(descriptor_set, files)?;
    println!(
        "{} Resolved {} services, {} messages",
        "✓".green(),
        api.services.len(),
        api.messages.len()
    );

    let options = PluginOptions {
        openapi_out_path: output,
        servers: servers.map(parse_servers).unwrap_or_default(),
    };

    if verbose {
        println!("  Output: {}", options.output_file().display());
        for server in &options.servers {
            println!("  Server: {}", server.url);
        }
    }

    println!("{} Generating OpenAPI document...", "→".cyan());
    let path = OpenApiGenerator::new(api, options)
        .write(&FsSink)
        .context("Failed to generate OpenAPI document")?;

    println!("\n{}", "✓ Generation complete!".green().bold());
    println!("  📄 {}", path.display());

    Ok(())
}

fn inspect_command(descriptor_set: &Path, json: bool, verbose: bool) -> Result<()> {
    let api = load_definition(descriptor_set, Vec::new())?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&api).context("Failed to serialize definition")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("{}", "Services:".bold());
    for service in &api.services {
        println!("  • {} ({})", service.display_name().cyan(), service.full_name);

        for method in &service.methods {
            match resolve_binding(method.http_rule.as_ref()) {
                Some(binding) => println!(
                    "    {} {} {}",
                    method.name,
                    binding.verb.as_str().to_uppercase().yellow(),
                    binding.template
                ),
                None => println!("    {} {}", method.name, "(no HTTP binding)".dimmed()),
            }

            if verbose {
                println!("      Request: {}", method.input_type);
                println!("      Response: {}", method.output_type);
                if method.options.skip_token {
                    println!("      Auth: {}", "skipped".yellow());
                }
            }
        }
    }

    println!("\n  Messages: {}", api.messages.len());
    println!("  Enums: {}", api.enums.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::compiler::CodeGeneratorRequest;
    use prost_types::{
        field_descriptor_proto, DescriptorProto, FieldDescriptorProto, FileDescriptorProto,
        MethodDescriptorProto, ServiceDescriptorProto,
    };

    fn ping_file() -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some("ping.proto".to_string()),
            package: Some("ping".to_string()),
            message_type: vec![DescriptorProto {
                name: Some("Ping".to_string()),
                field: vec![FieldDescriptorProto {
                    name: Some("id".to_string()),
                    json_name: Some("id".to_string()),
                    number: Some(1),
                    label: Some(field_descriptor_proto::Label::Optional as i32),
                    r#type: Some(field_descriptor_proto::Type::String as i32),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            service: vec![ServiceDescriptorProto {
                name: Some("PingService".to_string()),
                method: vec![MethodDescriptorProto {
                    name: Some("Ping".to_string()),
                    input_type: Some(".ping.Ping".to_string()),
                    output_type: Some(".ping.Ping".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            syntax: Some("proto3".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_cli_parses_without_subcommand() {
        let cli = Cli::try_parse_from(["protoc-gen-openapiv3"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from([
            "protoc-gen-openapiv3",
            "generate",
            "--descriptor-set",
            "shop.pb",
            "--file",
            "a.proto",
            "--file",
            "b.proto",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Generate { files, output, .. }) => {
                assert_eq!(files, vec!["a.proto", "b.proto"]);
                assert_eq!(output, None);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_handle_request_writes_document() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("docs");

        let request = CodeGeneratorRequest {
            file_to_generate: vec!["ping.proto".to_string()],
            parameter: Some(format!("openapi_out_path={}", out_dir.display())),
            proto_file: vec![ping_file()],
            ..Default::default()
        };

        let response = handle_request(&request.encode_to_vec());
        assert_eq!(response.error, None);
        assert_eq!(response.supported_features, Some(1));
        assert!(response.file.is_empty());

        let contents = std::fs::read_to_string(out_dir.join("openapi.yaml")).unwrap();
        assert!(contents.contains("ping.Ping"));
        assert!(contents.contains("BearerAuth"));
    }

    #[test]
    fn test_handle_request_reports_errors() {
        let response = handle_request(b"\xff\xff\xff");
        assert!(response.error.is_some());
        assert_eq!(response.supported_features, Some(1));
    }
}
