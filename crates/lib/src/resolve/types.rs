//! Types for dependency resolution.

use std::fmt;
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::artifact::ArtifactRef;
use crate::props::PropertyBag;
use crate::registry::UnregisteredTypeError;

/// Errors raised while resolving dependencies or constructing artifacts.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// No constructor is registered for a chart type. Propagated unchanged
  /// from any depth.
  #[error(transparent)]
  Unregistered(#[from] UnregisteredTypeError),

  /// A property bag could not be brought into canonical form.
  #[error("failed to canonicalize properties: {0}")]
  Canonicalize(#[from] serde_json::Error),

  /// A constructor required a property that was not supplied.
  #[error("missing property '{0}'")]
  MissingProperty(String),

  /// A property was supplied with the wrong shape.
  #[error("property '{key}' must be {expected}")]
  InvalidProperty { key: String, expected: &'static str },

  /// A constructor rejected its input for any other reason.
  #[error("failed to construct '{chart_type}': {message}")]
  Construct { chart_type: String, message: String },
}

/// One declared dependency: a chart type and the properties to build it with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencySpec {
  #[serde(rename = "type")]
  pub chart_type: String,
  #[serde(default, skip_serializing_if = "PropertyBag::is_empty")]
  pub props: PropertyBag,
}

impl DependencySpec {
  pub fn new(chart_type: impl Into<String>, props: PropertyBag) -> Self {
    Self {
      chart_type: chart_type.into(),
      props,
    }
  }
}

/// Named dependencies of a unit, kept in declaration order.
///
/// Serialized as a map; deserializing keeps the document's key order.
/// Declaring a name twice replaces the earlier spec in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyDeclaration {
  entries: Vec<(String, DependencySpec)>,
}

impl DependencyDeclaration {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder-style insert.
  pub fn with(mut self, name: impl Into<String>, spec: DependencySpec) -> Self {
    self.insert(name, spec);
    self
  }

  pub fn insert(&mut self, name: impl Into<String>, spec: DependencySpec) {
    let name = name.into();
    match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
      Some((_, slot)) => *slot = spec,
      None => self.entries.push((name, spec)),
    }
  }

  pub fn get(&self, name: &str) -> Option<&DependencySpec> {
    self.entries.iter().find(|(n, _)| n == name).map(|(_, spec)| spec)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &DependencySpec)> {
    self.entries.iter().map(|(name, spec)| (name.as_str(), spec))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl Serialize for DependencyDeclaration {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (name, spec) in &self.entries {
      map.serialize_entry(name, spec)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for DependencyDeclaration {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct DeclarationVisitor;

    impl<'de> Visitor<'de> for DeclarationVisitor {
      type Value = DependencyDeclaration;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of dependency names to {type, props}")
      }

      fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut declaration = DependencyDeclaration::new();
        while let Some((name, spec)) = access.next_entry::<String, DependencySpec>()? {
          declaration.insert(name, spec);
        }
        Ok(declaration)
      }
    }

    deserializer.deserialize_map(DeclarationVisitor)
  }
}

/// Resolved dependencies, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedDependencies {
  entries: Vec<(String, ArtifactRef)>,
}

impl ResolvedDependencies {
  pub(crate) fn push(&mut self, name: String, artifact: ArtifactRef) {
    self.entries.push((name, artifact));
  }

  pub fn get(&self, name: &str) -> Option<&ArtifactRef> {
    self.entries.iter().find(|(n, _)| n == name).map(|(_, a)| a)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &ArtifactRef)> {
    self.entries.iter().map(|(name, artifact)| (name.as_str(), artifact))
  }

  pub fn names(&self) -> Vec<&str> {
    self.entries.iter().map(|(name, _)| name.as_str()).collect()
  }

  pub fn artifacts(&self) -> impl Iterator<Item = &ArtifactRef> {
    self.entries.iter().map(|(_, artifact)| artifact)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Whether both names resolved to the same artifact instance.
  pub fn shares_instance(&self, a: &str, b: &str) -> bool {
    match (self.get(a), self.get(b)) {
      (Some(x), Some(y)) => Arc::ptr_eq(x, y),
      _ => false,
    }
  }
}

impl IntoIterator for ResolvedDependencies {
  type Item = (String, ArtifactRef);
  type IntoIter = std::vec::IntoIter<(String, ArtifactRef)>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.into_iter()
  }
}
