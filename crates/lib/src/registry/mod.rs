//! Registry of artifact constructors.
//!
//! An [`ArtifactRegistry`] maps chart-type names to [`Constructor`]s. It is an
//! explicit value handed to the resolver and the factory rather than global
//! state, so each test (or each synthesis run) builds its own.
//!
//! # Generations
//!
//! [`ArtifactRegistry::clear`] bumps a generation counter. Resolution caches
//! remember the generation they were filled under and drop their entries
//! when it changes, so nothing built before a clear is handed out after it.

mod scope;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::artifact::Artifact;
use crate::props::PropertyBag;
use crate::resolve::ResolveError;

pub use scope::Scope;

/// Builds an artifact from a scope, an id and a property bag.
///
/// Constructors that need dependencies of their own resolve them through
/// [`Scope::resolver`]; the outer resolver only expands one level.
pub trait Constructor: Send + Sync {
  fn construct(&self, scope: &Scope<'_>, id: &str, props: &PropertyBag) -> Result<Artifact, ResolveError>;
}

impl<F> Constructor for F
where
  F: Fn(&Scope<'_>, &str, &PropertyBag) -> Result<Artifact, ResolveError> + Send + Sync,
{
  fn construct(&self, scope: &Scope<'_>, id: &str, props: &PropertyBag) -> Result<Artifact, ResolveError> {
    self(scope, id, props)
  }
}

/// A chart type was requested that has no registered constructor.
///
/// The message lists every registered type to make typos easy to spot. The
/// requested name is kept in [`requested`](Self::requested) and logged, but
/// not repeated in the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("chart type is not registered; registered types: [{}]", .registered.join(", "))]
pub struct UnregisteredTypeError {
  pub requested: String,
  pub registered: Vec<String>,
}

#[derive(Default)]
pub struct ArtifactRegistry {
  constructors: HashMap<String, Arc<dyn Constructor>>,
  generation: u64,
}

impl ArtifactRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a closure. An existing registration under the same name is
  /// replaced.
  pub fn register<F>(&mut self, chart_type: impl Into<String>, constructor: F)
  where
    F: Fn(&Scope<'_>, &str, &PropertyBag) -> Result<Artifact, ResolveError> + Send + Sync + 'static,
  {
    self.register_constructor(chart_type, constructor);
  }

  /// Register any [`Constructor`] implementation. Last registration wins.
  pub fn register_constructor(&mut self, chart_type: impl Into<String>, constructor: impl Constructor + 'static) {
    let chart_type = chart_type.into();
    if self.constructors.contains_key(&chart_type) {
      debug!(chart_type = %chart_type, "replacing registered constructor");
    }
    self.constructors.insert(chart_type, Arc::new(constructor));
  }

  pub fn lookup(&self, chart_type: &str) -> Result<&dyn Constructor, UnregisteredTypeError> {
    match self.constructors.get(chart_type) {
      Some(constructor) => Ok(constructor.as_ref()),
      None => {
        debug!(requested = %chart_type, "chart type not registered");
        Err(UnregisteredTypeError {
          requested: chart_type.to_string(),
          registered: self.names(),
        })
      }
    }
  }

  /// Remove every registration and invalidate outstanding resolution caches.
  pub fn clear(&mut self) {
    self.constructors.clear();
    self.generation += 1;
    debug!(generation = self.generation, "registry cleared");
  }

  pub fn contains(&self, chart_type: &str) -> bool {
    self.constructors.contains_key(chart_type)
  }

  /// Registered chart-type names, sorted.
  pub fn names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.constructors.keys().cloned().collect();
    names.sort();
    names
  }

  pub fn len(&self) -> usize {
    self.constructors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.constructors.is_empty()
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }
}

impl fmt::Debug for ArtifactRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ArtifactRegistry")
      .field("types", &self.names())
      .field("generation", &self.generation)
      .finish()
  }
}
