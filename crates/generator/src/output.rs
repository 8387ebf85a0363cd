//! Output sinks for rendered documents

use protoc_gen_openapiv3_common::{GeneratorError, Result};
use std::fs;
use std::path::Path;

/// Destination of a rendered document
#[cfg_attr(test, mockall::automock)]
pub trait OutputSink {
    /// Write `contents` to `path`
    fn write(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Writes to the local filesystem, creating missing parent directories
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSink;

impl OutputSink for FsSink {
    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                GeneratorError::Generation(format!(
                    "Failed to create output directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        fs::write(path, contents).map_err(|e| {
            GeneratorError::Generation(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote output");
        Ok(())
    }
}
