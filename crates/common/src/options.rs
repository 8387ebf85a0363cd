//! Plugin options
//!
//! protoc passes plugin options as a single comma-separated string, e.g.
//! `--openapiv3_opt=openapi_out_path=docs,servers=https://api.example.com|Production`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the generated document
pub const OUTPUT_FILE_NAME: &str = "openapi.yaml";

/// Options controlling where the document goes and which servers it lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginOptions {
    /// Output directory; the current directory when unset
    #[serde(default)]
    pub openapi_out_path: Option<PathBuf>,

    /// Entries of the top-level `servers` list
    #[serde(default)]
    pub servers: Vec<ServerOption>,
}

/// One `servers` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerOption {
    /// Server URL
    pub url: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

impl PluginOptions {
    /// Parse the plugin parameter string
    ///
    /// Unknown keys are ignored.
    ///
    /// # Examples
    /// ```
    /// use protoc_gen_openapiv3_common::PluginOptions;
    ///
    /// let options = PluginOptions::parse("openapi_out_path=docs,servers=https://a.dev|Dev");
    /// assert_eq!(options.output_file().to_str(), Some("docs/openapi.yaml"));
    /// assert_eq!(options.servers[0].url, "https://a.dev");
    /// ```
    pub fn parse(parameter: &str) -> Self {
        let mut options = Self::default();

        for part in parameter.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if let Some(path) = part.strip_prefix("openapi_out_path=") {
                if options.openapi_out_path.is_none() {
                    options.openapi_out_path = Some(PathBuf::from(path));
                } else {
                    tracing::debug!(option = part, "openapi_out_path already set");
                }
            } else if let Some(servers) = part.strip_prefix("servers=") {
                options.servers.extend(parse_servers(servers));
            } else {
                tracing::debug!(option = part, "ignoring unknown plugin option");
            }
        }

        options
    }

    /// Path of the YAML document to write
    pub fn output_file(&self) -> PathBuf {
        match &self.openapi_out_path {
            Some(dir) => dir.join(OUTPUT_FILE_NAME),
            None => PathBuf::from(OUTPUT_FILE_NAME),
        }
    }
}

/// Parse `url|description;url2|description2;...`
///
/// An entry with exactly one `|` carries a description; any other entry is
/// taken as a bare URL up to its first `|`.
pub fn parse_servers(value: &str) -> Vec<ServerOption> {
    value
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let parts: Vec<&str> = entry.split('|').collect();
            if parts.len() == 2 {
                ServerOption {
                    url: parts[0].to_string(),
                    description: Some(parts[1].to_string()),
                }
            } else {
                ServerOption {
                    url: parts[0].to_string(),
                    description: None,
                }
            }
        })
        .collect()
}
