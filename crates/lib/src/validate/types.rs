use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{self, ConfigError};
use crate::consts::{SKIP_DRY_RUN_OPTION, SYNC_OPTIONS_ANNOTATION, SYNC_WAVE_ANNOTATION, WORKLOAD_WAVE};

/// Findings of a validation run, in discovery order.
///
/// `errors` are hard violations the caller should abort on; `warnings` are
/// advisory and are meant to be logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingReport {
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
}

impl OrderingReport {
  pub fn is_ok(&self) -> bool {
    self.errors.is_empty()
  }

  pub fn is_clean(&self) -> bool {
    self.errors.is_empty() && self.warnings.is_empty()
  }
}

/// A kind that must be applied after a conventional predecessor wave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveRule {
  /// Dependent kind, e.g. `HorizontalPodAutoscaler`.
  pub kind: String,
  /// Wave conventionally used by the predecessor. The dependent must sit
  /// strictly above it.
  pub threshold: i64,
  /// Predecessor kind, for messages.
  pub predecessor: String,
}

/// Conventions the validator checks against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
  pub wave_annotation: String,
  pub sync_options_annotation: String,
  pub skip_dry_run_option: String,
  pub wave_rules: Vec<WaveRule>,
  pub crd_dependent_kinds: Vec<String>,
}

impl Default for ValidatorConfig {
  fn default() -> Self {
    Self {
      wave_annotation: SYNC_WAVE_ANNOTATION.to_string(),
      sync_options_annotation: SYNC_OPTIONS_ANNOTATION.to_string(),
      skip_dry_run_option: SKIP_DRY_RUN_OPTION.to_string(),
      wave_rules: vec![WaveRule {
        kind: "HorizontalPodAutoscaler".to_string(),
        threshold: WORKLOAD_WAVE,
        predecessor: "Deployment".to_string(),
      }],
      crd_dependent_kinds: vec![
        "ServiceMonitor".to_string(),
        "PodMonitor".to_string(),
        "PrometheusRule".to_string(),
      ],
    }
  }
}

impl ValidatorConfig {
  /// Load from a `.json`, `.yaml` or `.yml` file. Missing fields take their
  /// defaults.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    config::load_file(path)
  }
}
