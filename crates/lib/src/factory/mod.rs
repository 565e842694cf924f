//! Creation of deployable units.
//!
//! A [`DeployableUnitConfig`] names a chart type, its properties and an
//! optional set of dependencies. [`DeployableUnitFactory::create`] resolves
//! the dependencies, merges them into the properties and instantiates the
//! chart type at [`ROOT_ID`], yielding exactly one root artifact per unit.
//!
//! # Merge precedence
//!
//! A resolved dependency always replaces a literal property of the same name.
//! The constructor sees the artifact, never the literal. Because that
//! silently discards data, the factory logs a warning naming the key.
//!
//! # Sessions
//!
//! The factory owns one resolution session. Units created through the same
//! factory share structurally equal dependencies; call
//! [`DeployableUnitFactory::reset`] between independent resolutions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::artifact::ArtifactRef;
use crate::consts::ROOT_ID;
use crate::props::{PropValue, PropertyBag};
use crate::registry::{ArtifactRegistry, Scope};
use crate::resolve::{DependencyDeclaration, DependencyResolver, DependencySpec, ResolveError, ResolvedDependencies};

/// Input for one deployable unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployableUnitConfig {
  /// Name of the unit's root scope. Defaults to `<type>-<index>` in a
  /// synthesis run.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(rename = "type")]
  pub chart_type: String,
  #[serde(default, skip_serializing_if = "PropertyBag::is_empty")]
  pub props: PropertyBag,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dependencies: Option<DependencyDeclaration>,
}

impl DeployableUnitConfig {
  pub fn new(chart_type: impl Into<String>) -> Self {
    Self {
      chart_type: chart_type.into(),
      ..Self::default()
    }
  }

  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
    self.props.insert(key, value);
    self
  }

  pub fn with_props(mut self, props: PropertyBag) -> Self {
    self.props = props;
    self
  }

  pub fn with_dependency(mut self, name: impl Into<String>, spec: DependencySpec) -> Self {
    self.dependencies.get_or_insert_with(DependencyDeclaration::new).insert(name, spec);
    self
  }
}

/// A created unit: its root artifact and the dependencies it was given.
#[derive(Debug, Clone)]
pub struct DeployableUnit {
  pub root: ArtifactRef,
  pub dependencies: ResolvedDependencies,
}

pub struct DeployableUnitFactory<'r> {
  resolver: DependencyResolver<'r>,
}

impl<'r> DeployableUnitFactory<'r> {
  pub fn new(registry: &'r ArtifactRegistry) -> Self {
    Self {
      resolver: DependencyResolver::new(registry),
    }
  }

  pub fn registry(&self) -> &'r ArtifactRegistry {
    self.resolver.registry()
  }

  /// Start a new resolution session. Dependencies created before are not
  /// reused by later units.
  pub fn reset(&mut self) {
    self.resolver.reset();
  }

  /// Create a unit and return its root artifact.
  pub fn create(&mut self, scope: &Scope<'_>, config: DeployableUnitConfig) -> Result<ArtifactRef, ResolveError> {
    self.create_unit(scope, config).map(|unit| unit.root)
  }

  /// Create a unit, returning the root together with its resolved
  /// dependencies.
  pub fn create_unit(&mut self, scope: &Scope<'_>, config: DeployableUnitConfig) -> Result<DeployableUnit, ResolveError> {
    let DeployableUnitConfig {
      chart_type,
      mut props,
      dependencies,
      ..
    } = config;

    let resolved = self.resolver.resolve(dependencies.as_ref())?;

    for (name, artifact) in resolved.iter() {
      if let Some(previous) = props.insert(name, PropValue::Artifact(Arc::clone(artifact))) {
        let same_instance = previous.as_artifact().is_some_and(|prev| Arc::ptr_eq(prev, artifact));
        if !same_instance {
          warn!(
            unit = %scope.path(),
            key = %name,
            "resolved dependency replaces a literal property of the same name"
          );
        }
      }
    }

    let constructor = self.resolver.registry().lookup(&chart_type)?;
    debug!(unit = %scope.path(), chart_type = %chart_type, dependencies = resolved.len(), "constructing unit");
    let root = Arc::new(constructor.construct(scope, ROOT_ID, &props)?);

    Ok(DeployableUnit {
      root,
      dependencies: resolved,
    })
  }
}
