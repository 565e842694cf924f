//! Ordering and uniqueness checks over a flat set of artifacts.
//!
//! [`WaveOrderValidator::validate`] is a pure function of its input. It runs
//! three passes in order, each appending findings in input order:
//!
//! 1. duplicate identities (`kind`, namespace or `cluster`, `name`) are errors
//! 2. kinds listed in the wave table sitting at or below their predecessor's
//!    conventional wave are warnings (the predecessor's actual wave is not
//!    looked up)
//! 3. kinds that depend on optional CRDs without the skip-dry-run sync option
//!    are warnings
//!
//! A missing or unparseable wave counts as wave 0.

mod types;

use std::collections::HashSet;

use tracing::debug;

use crate::artifact::{Artifact, ResourceId};

pub use types::*;

#[derive(Debug, Clone, Default)]
pub struct WaveOrderValidator {
  config: ValidatorConfig,
}

impl WaveOrderValidator {
  pub fn new(config: ValidatorConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &ValidatorConfig {
    &self.config
  }

  pub fn validate<A: AsRef<Artifact>>(&self, artifacts: &[A]) -> OrderingReport {
    let artifacts: Vec<&Artifact> = artifacts.iter().map(|a| a.as_ref()).collect();
    let mut report = OrderingReport::default();

    let mut seen: HashSet<ResourceId> = HashSet::new();
    for &artifact in &artifacts {
      let id = artifact.id();
      if seen.contains(&id) {
        report.errors.push(format!("Duplicate resource found: {id}"));
      } else {
        seen.insert(id);
      }
    }

    for &artifact in &artifacts {
      for rule in self.config.wave_rules.iter().filter(|rule| rule.kind == artifact.kind) {
        let wave = self.wave_of(artifact);
        if wave <= rule.threshold {
          report.warnings.push(format!(
            "{} is at sync-wave {}; expected a wave after the {} wave ({})",
            artifact.id(),
            wave,
            rule.predecessor,
            rule.threshold
          ));
        }
      }
    }

    for &artifact in &artifacts {
      let depends_on_crd = self.config.crd_dependent_kinds.iter().any(|kind| *kind == artifact.kind);
      if depends_on_crd
        && !artifact.has_sync_option(&self.config.sync_options_annotation, &self.config.skip_dry_run_option)
      {
        report.warnings.push(format!(
          "{} depends on a CRD that may be missing at sync time; add {} to {}",
          artifact.id(),
          self.config.skip_dry_run_option,
          self.config.sync_options_annotation
        ));
      }
    }

    debug!(
      artifacts = artifacts.len(),
      errors = report.errors.len(),
      warnings = report.warnings.len(),
      "validated artifacts"
    );
    report
  }

  fn wave_of(&self, artifact: &Artifact) -> i64 {
    match artifact.wave_from(&self.config.wave_annotation) {
      Some(wave) => wave,
      None => {
        if let Some(raw) = artifact.annotation(&self.config.wave_annotation) {
          debug!(resource = %artifact.id(), raw = %raw, "unparseable sync-wave, treating as 0");
        }
        0
      }
    }
  }
}
