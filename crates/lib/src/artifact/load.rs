//! Parse rendered manifests into artifacts.
//!
//! YAML input may hold several `---`-separated documents; empty documents are
//! skipped. JSON input is a single array of objects.

use std::path::Path;

use serde::Deserialize;

use crate::config::{self, ConfigError, Format};

use super::Artifact;

/// Parse artifacts from `content`. `origin` names the input in errors.
pub fn load_documents(content: &str, format: Format, origin: &str) -> Result<Vec<Artifact>, ConfigError> {
  match format {
    Format::Json => config::parse_str(content, Format::Json, origin),
    Format::Yaml => {
      let yaml_err = |source: serde_yaml::Error| ConfigError::Yaml {
        origin: origin.to_string(),
        source,
      };
      let mut artifacts = Vec::new();
      for document in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(document).map_err(yaml_err)?;
        if value.is_null() {
          continue;
        }
        artifacts.push(serde_yaml::from_value(value).map_err(yaml_err)?);
      }
      Ok(artifacts)
    }
  }
}

/// Read a manifest file, choosing the format from its extension.
pub fn load_documents_from_path(path: &Path) -> Result<Vec<Artifact>, ConfigError> {
  let content = config::read_file(path)?;
  load_documents(&content, Format::from_path(path), &path.display().to_string())
}
