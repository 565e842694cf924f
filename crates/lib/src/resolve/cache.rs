//! Session-scoped cache of materialized dependencies.
//!
//! Keys are the chart type plus the canonical form of the property bag, so
//! two declarations with the same type and structurally equal properties map
//! to one entry and therefore one artifact instance.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::artifact::ArtifactRef;
use crate::props::{PropertyBag, canonical_string};
use crate::util::hash::Hashable;

/// Identity of a dependency within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey {
  pub chart_type: String,
  pub canonical: String,
}

impl CacheKey {
  pub fn new(chart_type: &str, props: &PropertyBag) -> Result<Self, serde_json::Error> {
    Ok(Self {
      chart_type: chart_type.to_string(),
      canonical: canonical_string(props)?,
    })
  }
}

impl Hashable for CacheKey {}

#[derive(Debug)]
struct CacheEntry {
  artifact: ArtifactRef,
  // Artifacts whose addresses appear in the key's canonical form. Holding
  // them keeps those addresses from being reused while the entry exists.
  _pinned: Vec<ArtifactRef>,
}

#[derive(Debug, Default)]
pub struct ResolutionCache {
  entries: HashMap<CacheKey, CacheEntry>,
  generation: u64,
}

impl ResolutionCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, key: &CacheKey) -> Option<ArtifactRef> {
    self.entries.get(key).map(|entry| Arc::clone(&entry.artifact))
  }

  pub fn insert(&mut self, key: CacheKey, artifact: ArtifactRef, pinned: Vec<ArtifactRef>) {
    self.entries.insert(
      key,
      CacheEntry {
        artifact,
        _pinned: pinned,
      },
    );
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Drop every entry if the registry generation moved since the cache was
  /// last used. Returns whether entries were dropped.
  pub fn sync_generation(&mut self, generation: u64) -> bool {
    if self.generation == generation {
      return false;
    }
    let dropped = !self.entries.is_empty();
    if dropped {
      debug!(
        from = self.generation,
        to = generation,
        entries = self.entries.len(),
        "registry changed, dropping cached artifacts"
      );
    }
    self.entries.clear();
    self.generation = generation;
    dropped
  }
}
