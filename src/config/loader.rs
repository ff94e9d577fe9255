//! Document loading from disk.
//!
//! Thin shim between the filesystem and the core: reads a file, picks a
//! parser by extension, and hands back a generic [`ConfigValue`] tree.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::ConfigError;
use crate::value::ConfigValue;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml,
}

/// Pick the parser for `path` by extension. `.toml` is TOML; everything
/// else (including no extension) is treated as YAML.
pub fn format_for(path: &Path) -> DocumentFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => DocumentFormat::Toml,
        _ => DocumentFormat::Yaml,
    }
}

/// Read and parse the document at `path`.
pub fn load_document(path: &Path) -> Result<ConfigValue, ConfigError> {
    let source = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = source.len(), "read configuration source");
    parse_document(&source, format_for(path))
}

/// Parse an in-memory document source.
pub fn parse_document(source: &str, format: DocumentFormat) -> Result<ConfigValue, ConfigError> {
    match format {
        DocumentFormat::Yaml => Ok(serde_yaml::from_str(source)?),
        DocumentFormat::Toml => Ok(toml::from_str(source)?),
    }
}
