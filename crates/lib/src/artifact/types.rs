use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::consts::{CHART_KIND, CLUSTER_SCOPE, SYNC_OPTIONS_ANNOTATION, SYNC_WAVE_ANNOTATION};

/// Shared handle to an artifact. Reference identity is meaningful: the
/// resolver hands out the same `ArtifactRef` for equivalent dependencies.
pub type ArtifactRef = Arc<Artifact>;

/// Identifying metadata of an artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub namespace: Option<String>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub annotations: BTreeMap<String, String>,
}

/// A resource description, possibly owning child artifacts.
///
/// Nodes of kind [`CHART_KIND`] are grouping nodes: they hold children but
/// are not resources themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
  pub kind: String,
  pub metadata: ArtifactMeta,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub children: Vec<ArtifactRef>,
  /// Every other field of the resource (`apiVersion`, `spec`, `data`, ...).
  #[serde(flatten)]
  pub body: serde_json::Map<String, serde_json::Value>,
}

impl Artifact {
  pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      kind: kind.into(),
      metadata: ArtifactMeta {
        name: name.into(),
        ..ArtifactMeta::default()
      },
      children: Vec::new(),
      body: serde_json::Map::new(),
    }
  }

  /// A grouping node.
  pub fn chart(name: impl Into<String>) -> Self {
    Self::new(CHART_KIND, name)
  }

  pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
    self.metadata.namespace = Some(namespace.into());
    self
  }

  pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.metadata.annotations.insert(key.into(), value.into());
    self
  }

  pub fn with_wave(self, wave: i64) -> Self {
    self.with_annotation(SYNC_WAVE_ANNOTATION, wave.to_string())
  }

  /// Append a sync option to the comma-separated sync-options annotation.
  pub fn with_sync_option(mut self, option: &str) -> Self {
    let options = self
      .metadata
      .annotations
      .entry(SYNC_OPTIONS_ANNOTATION.to_string())
      .or_default();
    if !options.is_empty() {
      options.push(',');
    }
    options.push_str(option);
    self
  }

  pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
    self.body.insert(key.into(), value);
    self
  }

  pub fn with_child(mut self, child: ArtifactRef) -> Self {
    self.children.push(child);
    self
  }

  pub fn into_ref(self) -> ArtifactRef {
    Arc::new(self)
  }

  pub fn name(&self) -> &str {
    &self.metadata.name
  }

  pub fn namespace(&self) -> Option<&str> {
    self.metadata.namespace.as_deref()
  }

  pub fn is_chart(&self) -> bool {
    self.kind == CHART_KIND
  }

  pub fn annotation(&self, key: &str) -> Option<&str> {
    self.metadata.annotations.get(key).map(String::as_str)
  }

  /// Integer wave stored under `annotation`, if present and parseable.
  pub fn wave_from(&self, annotation: &str) -> Option<i64> {
    self.annotation(annotation).and_then(|raw| raw.trim().parse().ok())
  }

  /// Integer wave from the standard sync-wave annotation.
  pub fn wave(&self) -> Option<i64> {
    self.wave_from(SYNC_WAVE_ANNOTATION)
  }

  /// Whether the comma-separated options under `annotation` include `option`.
  pub fn has_sync_option(&self, annotation: &str, option: &str) -> bool {
    self
      .annotation(annotation)
      .is_some_and(|raw| raw.split(',').any(|o| o.trim() == option))
  }

  pub fn id(&self) -> ResourceId {
    ResourceId {
      kind: self.kind.clone(),
      namespace: self.namespace().unwrap_or(CLUSTER_SCOPE).to_string(),
      name: self.metadata.name.clone(),
    }
  }
}

impl AsRef<Artifact> for Artifact {
  fn as_ref(&self) -> &Artifact {
    self
  }
}

/// Identity of a resource: kind, namespace and name. Cluster-scoped
/// resources carry [`CLUSTER_SCOPE`] as their namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
  pub kind: String,
  pub namespace: String,
  pub name: String,
}

impl fmt::Display for ResourceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
  }
}

/// Flatten artifact trees into their resource nodes.
///
/// Walks each root pre-order (node, then children in order), skips chart
/// nodes, and emits every artifact *instance* once. An artifact shared
/// between several trees, such as a deduplicated dependency, therefore shows
/// up a single time, while two distinct instances with the same identity are
/// both kept so the validator can report them.
pub fn collect_resources<'a, I>(roots: I) -> Vec<ArtifactRef>
where
  I: IntoIterator<Item = &'a ArtifactRef>,
{
  let mut seen = HashSet::new();
  let mut out = Vec::new();
  for root in roots {
    visit(root, &mut seen, &mut out);
  }
  out
}

fn visit(node: &ArtifactRef, seen: &mut HashSet<*const Artifact>, out: &mut Vec<ArtifactRef>) {
  if !seen.insert(Arc::as_ptr(node)) {
    return;
  }
  if !node.is_chart() {
    out.push(Arc::clone(node));
  }
  for child in &node.children {
    visit(child, seen, out);
  }
}
