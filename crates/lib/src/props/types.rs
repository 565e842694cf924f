use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::artifact::ArtifactRef;
use crate::resolve::ResolveError;

/// A single property value.
///
/// Primitives, sequences and nested maps compare structurally. The
/// [`PropValue::Artifact`] variant holds a live reference and compares by
/// identity only: two bags holding distinct artifacts are never equal, even if
/// the artifacts themselves look alike.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PropValue {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  String(String),
  List(Vec<PropValue>),
  Map(PropertyBag),
  Artifact(ArtifactRef),
}

impl PropValue {
  pub fn as_str(&self) -> Option<&str> {
    match self {
      PropValue::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      PropValue::Int(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_artifact(&self) -> Option<&ArtifactRef> {
    match self {
      PropValue::Artifact(artifact) => Some(artifact),
      _ => None,
    }
  }

  /// Collect every live artifact reference reachable from this value.
  fn collect_artifacts(&self, out: &mut Vec<ArtifactRef>) {
    match self {
      PropValue::Artifact(artifact) => out.push(Arc::clone(artifact)),
      PropValue::List(items) => items.iter().for_each(|item| item.collect_artifacts(out)),
      PropValue::Map(bag) => bag.values().for_each(|value| value.collect_artifacts(out)),
      PropValue::Null | PropValue::Bool(_) | PropValue::Int(_) | PropValue::Float(_) | PropValue::String(_) => {}
    }
  }
}

impl PartialEq for PropValue {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (PropValue::Null, PropValue::Null) => true,
      (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
      (PropValue::Int(a), PropValue::Int(b)) => a == b,
      // NaN equals NaN here, matching the canonical form.
      (PropValue::Float(a), PropValue::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
      (PropValue::String(a), PropValue::String(b)) => a == b,
      (PropValue::List(a), PropValue::List(b)) => a == b,
      (PropValue::Map(a), PropValue::Map(b)) => a == b,
      (PropValue::Artifact(a), PropValue::Artifact(b)) => Arc::ptr_eq(a, b),
      _ => false,
    }
  }
}

impl From<serde_json::Value> for PropValue {
  fn from(value: serde_json::Value) -> Self {
    match value {
      serde_json::Value::Null => PropValue::Null,
      serde_json::Value::Bool(b) => PropValue::Bool(b),
      serde_json::Value::Number(n) => match n.as_i64() {
        Some(i) => PropValue::Int(i),
        None => PropValue::Float(n.as_f64().unwrap_or(f64::NAN)),
      },
      serde_json::Value::String(s) => PropValue::String(s),
      serde_json::Value::Array(items) => PropValue::List(items.into_iter().map(PropValue::from).collect()),
      serde_json::Value::Object(map) => {
        PropValue::Map(PropertyBag(map.into_iter().map(|(k, v)| (k, PropValue::from(v))).collect()))
      }
    }
  }
}

// Live references cannot come from a document, so every input is plain data.
impl<'de> Deserialize<'de> for PropValue {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    serde_json::Value::deserialize(deserializer).map(PropValue::from)
  }
}

impl From<&str> for PropValue {
  fn from(value: &str) -> Self {
    PropValue::String(value.to_string())
  }
}

impl From<String> for PropValue {
  fn from(value: String) -> Self {
    PropValue::String(value)
  }
}

impl From<bool> for PropValue {
  fn from(value: bool) -> Self {
    PropValue::Bool(value)
  }
}

impl From<i64> for PropValue {
  fn from(value: i64) -> Self {
    PropValue::Int(value)
  }
}

impl From<i32> for PropValue {
  fn from(value: i32) -> Self {
    PropValue::Int(i64::from(value))
  }
}

impl From<u32> for PropValue {
  fn from(value: u32) -> Self {
    PropValue::Int(i64::from(value))
  }
}

impl From<f64> for PropValue {
  fn from(value: f64) -> Self {
    PropValue::Float(value)
  }
}

impl From<Vec<PropValue>> for PropValue {
  fn from(value: Vec<PropValue>) -> Self {
    PropValue::List(value)
  }
}

impl From<PropertyBag> for PropValue {
  fn from(value: PropertyBag) -> Self {
    PropValue::Map(value)
  }
}

impl From<ArtifactRef> for PropValue {
  fn from(value: ArtifactRef) -> Self {
    PropValue::Artifact(value)
  }
}

/// Properties handed to a constructor.
///
/// Keys are kept sorted, so iteration order never depends on the order in
/// which a caller inserted them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(BTreeMap<String, PropValue>);

impl PropertyBag {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder-style insert.
  pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
    self.insert(key, value);
    self
  }

  /// Insert a value, returning the one it replaced.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Option<PropValue> {
    self.0.insert(key.into(), value.into())
  }

  pub fn get(&self, key: &str) -> Option<&PropValue> {
    self.0.get(key)
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.0.contains_key(key)
  }

  pub fn remove(&mut self, key: &str) -> Option<PropValue> {
    self.0.remove(key)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }

  pub fn values(&self) -> impl Iterator<Item = &PropValue> {
    self.0.values()
  }

  /// Get a value that must be present.
  pub fn require(&self, key: &str) -> Result<&PropValue, ResolveError> {
    self.get(key).ok_or_else(|| ResolveError::MissingProperty(key.to_string()))
  }

  pub fn get_str(&self, key: &str) -> Option<&str> {
    self.get(key).and_then(PropValue::as_str)
  }

  pub fn require_str(&self, key: &str) -> Result<&str, ResolveError> {
    self.require(key)?.as_str().ok_or_else(|| ResolveError::InvalidProperty {
      key: key.to_string(),
      expected: "a string",
    })
  }

  pub fn require_i64(&self, key: &str) -> Result<i64, ResolveError> {
    self.require(key)?.as_i64().ok_or_else(|| ResolveError::InvalidProperty {
      key: key.to_string(),
      expected: "an integer",
    })
  }

  pub fn require_artifact(&self, key: &str) -> Result<&ArtifactRef, ResolveError> {
    self.require(key)?.as_artifact().ok_or_else(|| ResolveError::InvalidProperty {
      key: key.to_string(),
      expected: "a resolved artifact",
    })
  }

  /// Every live artifact reference held anywhere in the bag.
  pub fn referenced_artifacts(&self) -> Vec<ArtifactRef> {
    let mut out = Vec::new();
    self.values().for_each(|value| value.collect_artifacts(&mut out));
    out
  }
}

impl FromIterator<(String, PropValue)> for PropertyBag {
  fn from_iter<I: IntoIterator<Item = (String, PropValue)>>(iter: I) -> Self {
    PropertyBag(iter.into_iter().collect())
  }
}

impl IntoIterator for PropertyBag {
  type Item = (String, PropValue);
  type IntoIter = std::collections::btree_map::IntoIter<String, PropValue>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}
