//! End-to-end synthesis of a set of deployable units.
//!
//! The pipeline is linear:
//!
//! 1. each [`DeployableUnitConfig`] is created by one factory under a root
//!    scope named after the unit; the whole run is a single resolution
//!    session, so units declaring equal dependencies share one instance
//! 2. every unit contributes its dependencies (in declaration order) and then
//!    its root to one collection; trees are flattened into resource nodes and
//!    each artifact instance is emitted once
//! 3. the validator runs once over the whole collection
//!
//! The caller decides what to do with the report: errors are meant to abort
//! the run, warnings to be logged.

use std::path::Path;

use tracing::{info, warn};

use crate::artifact::{ArtifactRef, collect_resources};
use crate::config::{self, ConfigError};
use crate::factory::{DeployableUnit, DeployableUnitConfig, DeployableUnitFactory};
use crate::registry::{ArtifactRegistry, Scope};
use crate::resolve::ResolveError;
use crate::validate::{OrderingReport, WaveOrderValidator};

/// Output of a synthesis run.
#[derive(Debug, Clone)]
pub struct Synthesis {
  /// Created units, in input order.
  pub units: Vec<DeployableUnit>,
  /// Flattened resources handed to the validator.
  pub resources: Vec<ArtifactRef>,
  pub report: OrderingReport,
}

pub struct Synthesizer<'r> {
  registry: &'r ArtifactRegistry,
  validator: WaveOrderValidator,
}

impl<'r> Synthesizer<'r> {
  pub fn new(registry: &'r ArtifactRegistry) -> Self {
    Self {
      registry,
      validator: WaveOrderValidator::default(),
    }
  }

  pub fn with_validator(mut self, validator: WaveOrderValidator) -> Self {
    self.validator = validator;
    self
  }

  /// Create every unit, collect their artifacts and validate them.
  ///
  /// Fails on the first unit that cannot be created; nothing is validated in
  /// that case.
  pub fn synthesize<I>(&self, units: I) -> Result<Synthesis, ResolveError>
  where
    I: IntoIterator<Item = DeployableUnitConfig>,
  {
    let mut factory = DeployableUnitFactory::new(self.registry);
    let mut created = Vec::new();

    for (index, config) in units.into_iter().enumerate() {
      let name = config
        .name
        .clone()
        .unwrap_or_else(|| format!("{}-{}", config.chart_type, index));
      let scope = Scope::root(self.registry, name);
      created.push(factory.create_unit(&scope, config)?);
    }

    let roots: Vec<&ArtifactRef> = created
      .iter()
      .flat_map(|unit| unit.dependencies.artifacts().chain(std::iter::once(&unit.root)))
      .collect();
    let resources = collect_resources(roots);
    let report = self.validator.validate(&resources);

    for warning in &report.warnings {
      warn!(warning = %warning, "ordering warning");
    }
    info!(
      units = created.len(),
      resources = resources.len(),
      errors = report.errors.len(),
      warnings = report.warnings.len(),
      "synthesis complete"
    );

    Ok(Synthesis {
      units: created,
      resources,
      report,
    })
  }
}

/// Load unit configurations from a YAML sequence or JSON array.
pub fn load_units(path: &Path) -> Result<Vec<DeployableUnitConfig>, ConfigError> {
  config::load_file(path)
}
