use std::path::Path;

use anyhow::{Context, Result};

use super::load_validator_config;

pub fn cmd_rules(config: Option<&Path>) -> Result<()> {
  let config = load_validator_config(config)?;
  let yaml = serde_yaml::to_string(&config).context("Failed to serialize validator config")?;
  print!("{}", yaml);
  Ok(())
}
