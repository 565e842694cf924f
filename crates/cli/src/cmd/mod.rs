mod rules;
mod validate;

pub use rules::cmd_rules;
pub use validate::cmd_validate;

use std::path::Path;

use anyhow::{Context, Result};
use chartwave_lib::ValidatorConfig;

/// Load the validator configuration, falling back to the defaults.
fn load_validator_config(path: Option<&Path>) -> Result<ValidatorConfig> {
  match path {
    Some(path) => ValidatorConfig::from_path(path)
      .with_context(|| format!("Failed to load validator config: {}", path.display())),
    None => Ok(ValidatorConfig::default()),
  }
}
