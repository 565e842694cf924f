//! Loading of YAML and JSON input files.
//!
//! Unit configurations, validator settings and rendered manifests all come
//! from files authored by hand or emitted by other tooling. The format is
//! chosen from the file extension: `.json` is parsed with serde_json,
//! anything else as YAML.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading or parsing an input file.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The file could not be read.
  #[error("failed to read {path}: {source}")]
  Read { path: String, source: std::io::Error },

  /// The content is not valid JSON for the expected shape.
  #[error("failed to parse {origin} as JSON: {source}")]
  Json { origin: String, source: serde_json::Error },

  /// The content is not valid YAML for the expected shape.
  #[error("failed to parse {origin} as YAML: {source}")]
  Yaml { origin: String, source: serde_yaml::Error },
}

/// Serialization format of an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
  Json,
  Yaml,
}

impl Format {
  /// Pick the format from a path's extension.
  pub fn from_path(path: &Path) -> Self {
    match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
      _ => Format::Yaml,
    }
  }
}

/// Read a file to a string, mapping I/O failures to [`ConfigError::Read`].
pub fn read_file(path: &Path) -> Result<String, ConfigError> {
  debug!(path = ?path, "reading input file");
  fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.display().to_string(),
    source,
  })
}

/// Parse `content` in the given format. `origin` names the input in errors.
pub fn parse_str<T: DeserializeOwned>(content: &str, format: Format, origin: &str) -> Result<T, ConfigError> {
  match format {
    Format::Json => serde_json::from_str(content).map_err(|source| ConfigError::Json {
      origin: origin.to_string(),
      source,
    }),
    Format::Yaml => serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
      origin: origin.to_string(),
      source,
    }),
  }
}

/// Read and parse a file, choosing the format from its extension.
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
  let content = read_file(path)?;
  parse_str(&content, Format::from_path(path), &path.display().to_string())
}
