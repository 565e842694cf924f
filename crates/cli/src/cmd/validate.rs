//! Implementation of the `chartwave validate` command.
//!
//! Loads rendered manifests, runs the wave-order validator over them and
//! prints the findings. Returns `false` when the report carries errors so the
//! caller can exit non-zero.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use chartwave_lib::WaveOrderValidator;
use chartwave_lib::artifact::load_documents_from_path;

use crate::output::{OutputFormat, print_error, print_json, print_success, print_warning};

use super::load_validator_config;

pub fn cmd_validate(file: &Path, config: Option<&Path>, format: OutputFormat) -> Result<bool> {
  let validator = WaveOrderValidator::new(load_validator_config(config)?);

  let artifacts =
    load_documents_from_path(file).with_context(|| format!("Failed to load manifests: {}", file.display()))?;
  info!(file = %file.display(), resources = artifacts.len(), "loaded manifests");

  let report = validator.validate(&artifacts);

  if format.is_json() {
    print_json(&report)?;
    return Ok(report.is_ok());
  }

  for error in &report.errors {
    print_error(error);
  }
  for warning in &report.warnings {
    print_warning(warning);
  }

  if report.is_ok() {
    print_success(&format!(
      "{} resources checked, {} warning(s)",
      artifacts.len(),
      report.warnings.len()
    ));
  }

  Ok(report.is_ok())
}
