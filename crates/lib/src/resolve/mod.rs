//! Dependency resolution with structural deduplication.
//!
//! [`DependencyResolver::resolve`] turns a [`DependencyDeclaration`] into a
//! mapping of names to artifacts. Within one session, declarations with the
//! same chart type and structurally equal properties resolve to the *same*
//! [`ArtifactRef`]; see [`cache`] for the key.
//!
//! # Scope of expansion
//!
//! Only one level of declarations is processed per call. A constructor that
//! needs dependencies of its own resolves them itself (through
//! [`Scope::resolver`]), in a session of its own. Cycles therefore cannot form
//! inside a single call and are not checked for. Making resolution recursive
//! would require threading a visiting set through the recursion to fail fast
//! on cycles.
//!
//! # Failure
//!
//! Errors propagate to the caller as-is. Dependencies resolved before the
//! failing one stay cached, so a retry of the same declarations reuses them.

pub mod cache;
mod types;

use std::sync::Arc;

use tracing::{debug, info};

use crate::consts::ROOT_ID;
use crate::registry::{ArtifactRegistry, Scope};
use crate::util::hash::Hashable;

pub use cache::{CacheKey, ResolutionCache};
pub use types::*;

pub struct DependencyResolver<'r> {
  registry: &'r ArtifactRegistry,
  cache: ResolutionCache,
}

impl<'r> DependencyResolver<'r> {
  /// A resolver with an empty session.
  pub fn new(registry: &'r ArtifactRegistry) -> Self {
    Self::with_cache(registry, ResolutionCache::new())
  }

  /// A resolver continuing a session from an existing cache. The cache is
  /// emptied on first use if the registry was cleared since it was filled.
  pub fn with_cache(registry: &'r ArtifactRegistry, cache: ResolutionCache) -> Self {
    Self { registry, cache }
  }

  pub fn registry(&self) -> &'r ArtifactRegistry {
    self.registry
  }

  pub fn cache(&self) -> &ResolutionCache {
    &self.cache
  }

  pub fn into_cache(self) -> ResolutionCache {
    self.cache
  }

  /// Start a new session. Nothing resolved before is reused afterwards.
  pub fn reset(&mut self) {
    if !self.cache.is_empty() {
      info!(entries = self.cache.len(), "starting new resolution session");
    }
    self.cache.clear();
  }

  /// Resolve every declaration, in order.
  ///
  /// Absent or empty declarations resolve to an empty mapping.
  pub fn resolve(&mut self, declarations: Option<&DependencyDeclaration>) -> Result<ResolvedDependencies, ResolveError> {
    let mut resolved = ResolvedDependencies::default();
    let Some(declarations) = declarations else {
      return Ok(resolved);
    };

    self.cache.sync_generation(self.registry.generation());

    for (name, spec) in declarations.iter() {
      let key = CacheKey::new(&spec.chart_type, &spec.props)?;

      let artifact = match self.cache.get(&key) {
        Some(artifact) => {
          debug!(dependency = %name, chart_type = %spec.chart_type, "reusing cached dependency");
          artifact
        }
        None => {
          let constructor = self.registry.lookup(&spec.chart_type)?;
          let scope = Scope::root(self.registry, format!("{}-{}", spec.chart_type, key.compute_hash()?));
          debug!(dependency = %name, scope = %scope.path(), "constructing dependency");

          let artifact = Arc::new(constructor.construct(&scope, ROOT_ID, &spec.props)?);
          self
            .cache
            .insert(key, Arc::clone(&artifact), spec.props.referenced_artifacts());
          artifact
        }
      };

      resolved.push(name.to_string(), artifact);
    }

    Ok(resolved)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  use crate::artifact::Artifact;
  use crate::props::PropertyBag;

  fn statefulset(scope: &Scope<'_>, _id: &str, props: &PropertyBag) -> Result<Artifact, ResolveError> {
    let name = props.get_str("name").unwrap_or("db");
    Ok(Artifact::new("StatefulSet", name).with_annotation("scope", scope.path()))
  }

  fn registry() -> ArtifactRegistry {
    let mut registry = ArtifactRegistry::new();
    registry.register("postgres", statefulset);
    registry.register("redis", statefulset);
    registry
  }

  fn spec(chart_type: &str, props: PropertyBag) -> DependencySpec {
    DependencySpec::new(chart_type, props)
  }

  #[test]
  fn absent_and_empty_resolve_to_nothing() {
    let registry = registry();
    let mut resolver = DependencyResolver::new(&registry);

    assert!(resolver.resolve(None).unwrap().is_empty());
    assert!(resolver.resolve(Some(&DependencyDeclaration::new())).unwrap().is_empty());
  }

  #[test]
  fn equal_declarations_share_an_instance() {
    let registry = registry();
    let mut resolver = DependencyResolver::new(&registry);

    let declarations = DependencyDeclaration::new()
      .with("primary", spec("postgres", PropertyBag::new().with("name", "pg").with("version", 16)))
      .with("replica", spec("postgres", PropertyBag::new().with("version", 16).with("name", "pg")));

    let resolved = resolver.resolve(Some(&declarations)).unwrap();
    assert_eq!(resolved.names(), vec!["primary", "replica"]);
    assert!(resolved.shares_instance("primary", "replica"));
    assert_eq!(resolver.cache().len(), 1);
  }

  #[test]
  fn type_or_props_difference_builds_separately() {
    let registry = registry();
    let mut resolver = DependencyResolver::new(&registry);

    let declarations = DependencyDeclaration::new()
      .with("pg", spec("postgres", PropertyBag::new().with("name", "x")))
      .with("cache", spec("redis", PropertyBag::new().with("name", "x")))
      .with("pg2", spec("postgres", PropertyBag::new().with("name", "y")));

    let resolved = resolver.resolve(Some(&declarations)).unwrap();
    assert!(!resolved.shares_instance("pg", "cache"));
    assert!(!resolved.shares_instance("pg", "pg2"));
    assert_eq!(resolver.cache().len(), 3);
  }

  #[test]
  fn infinities_of_opposite_sign_build_separately() {
    let registry = registry();
    let mut resolver = DependencyResolver::new(&registry);

    let declarations = DependencyDeclaration::new()
      .with("pos", spec("postgres", PropertyBag::new().with("limit", f64::INFINITY)))
      .with("neg", spec("postgres", PropertyBag::new().with("limit", f64::NEG_INFINITY)))
      .with("nan", spec("postgres", PropertyBag::new().with("limit", f64::NAN)))
      .with("nan2", spec("postgres", PropertyBag::new().with("limit", f64::NAN)));

    let resolved = resolver.resolve(Some(&declarations)).unwrap();
    assert!(!resolved.shares_instance("pos", "neg"));
    assert!(!resolved.shares_instance("pos", "nan"));
    assert!(resolved.shares_instance("nan", "nan2"));
    assert_eq!(resolver.cache().len(), 3);
  }

  #[test]
  fn reuse_spans_calls_within_a_session() {
    let registry = registry();
    let mut resolver = DependencyResolver::new(&registry);
    let declarations = DependencyDeclaration::new().with("db", spec("postgres", PropertyBag::new()));

    let first = resolver.resolve(Some(&declarations)).unwrap();
    let second = resolver.resolve(Some(&declarations)).unwrap();
    assert!(Arc::ptr_eq(first.get("db").unwrap(), second.get("db").unwrap()));
  }

  #[test]
  fn reset_isolates_sessions() {
    let registry = registry();
    let mut resolver = DependencyResolver::new(&registry);
    let declarations = DependencyDeclaration::new().with("db", spec("postgres", PropertyBag::new()));

    let first = resolver.resolve(Some(&declarations)).unwrap();
    resolver.reset();
    let second = resolver.resolve(Some(&declarations)).unwrap();

    assert!(!Arc::ptr_eq(first.get("db").unwrap(), second.get("db").unwrap()));
    assert_eq!(**first.get("db").unwrap(), **second.get("db").unwrap());
  }

  #[test]
  fn dependencies_get_isolated_root_scopes() {
    let registry = registry();
    let mut resolver = DependencyResolver::new(&registry);
    let declarations = DependencyDeclaration::new().with("db", spec("postgres", PropertyBag::new()));

    let resolved = resolver.resolve(Some(&declarations)).unwrap();
    let path = resolved.get("db").unwrap().annotation("scope").unwrap().to_string();
    assert!(path.starts_with("postgres-"));
    assert!(!path.contains('/'));
  }

  #[test]
  fn unregistered_type_propagates_and_keeps_earlier_entries() {
    let registry = registry();
    let mut resolver = DependencyResolver::new(&registry);

    let declarations = DependencyDeclaration::new()
      .with("db", spec("postgres", PropertyBag::new()))
      .with("queue", spec("rabbitmq", PropertyBag::new()));

    let err = resolver.resolve(Some(&declarations)).unwrap_err();
    match err {
      ResolveError::Unregistered(inner) => {
        assert_eq!(inner.requested, "rabbitmq");
        assert_eq!(inner.registered, vec!["postgres".to_string(), "redis".to_string()]);
      }
      other => panic!("expected Unregistered, got {other:?}"),
    }
    assert_eq!(resolver.cache().len(), 1);
  }

  #[test]
  fn registry_clear_invalidates_carried_cache() {
    let mut registry = registry();
    let declarations = DependencyDeclaration::new().with("db", spec("postgres", PropertyBag::new()));

    let (first, cache) = {
      let mut resolver = DependencyResolver::new(&registry);
      let resolved = resolver.resolve(Some(&declarations)).unwrap();
      (Arc::clone(resolved.get("db").unwrap()), resolver.into_cache())
    };

    registry.clear();
    registry.register("postgres", statefulset);

    let mut resolver = DependencyResolver::with_cache(&registry, cache);
    let second = resolver.resolve(Some(&declarations)).unwrap();
    assert!(!Arc::ptr_eq(&first, second.get("db").unwrap()));
  }

  #[test]
  fn constructor_called_once_per_key() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);

    let mut registry = ArtifactRegistry::new();
    registry.register("counted", |_scope: &Scope<'_>, id: &str, _props: &PropertyBag| {
      CALLS.fetch_add(1, Ordering::SeqCst);
      Ok(Artifact::new("ConfigMap", id))
    });

    let mut resolver = DependencyResolver::new(&registry);
    let declarations = DependencyDeclaration::new()
      .with("a", spec("counted", PropertyBag::new()))
      .with("b", spec("counted", PropertyBag::new()))
      .with("c", spec("counted", PropertyBag::new()));
    resolver.resolve(Some(&declarations)).unwrap();

    assert_eq!(CALLS.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn live_references_dedup_by_identity() {
    let registry = registry();
    let mut resolver = DependencyResolver::new(&registry);

    let secret = Artifact::new("Secret", "creds").into_ref();
    let lookalike = Artifact::new("Secret", "creds").into_ref();

    let declarations = DependencyDeclaration::new()
      .with("a", spec("postgres", PropertyBag::new().with("auth", Arc::clone(&secret))))
      .with("b", spec("postgres", PropertyBag::new().with("auth", Arc::clone(&secret))))
      .with("c", spec("postgres", PropertyBag::new().with("auth", lookalike)));

    let resolved = resolver.resolve(Some(&declarations)).unwrap();
    assert!(resolved.shares_instance("a", "b"));
    assert!(!resolved.shares_instance("a", "c"));
  }

  #[test]
  fn nested_resolution_through_scope() {
    let mut registry = registry();
    registry.register("app", |scope: &Scope<'_>, id: &str, _props: &PropertyBag| {
      let nested = DependencyDeclaration::new().with("db", DependencySpec::new("postgres", PropertyBag::new()));
      let resolved = scope.resolver().resolve(Some(&nested))?;
      let mut chart = Artifact::chart(id);
      for artifact in resolved.artifacts() {
        chart = chart.with_child(Arc::clone(artifact));
      }
      Ok(chart)
    });

    let mut resolver = DependencyResolver::new(&registry);
    let declarations = DependencyDeclaration::new().with("app", spec("app", PropertyBag::new()));
    let resolved = resolver.resolve(Some(&declarations)).unwrap();

    let app = resolved.get("app").unwrap();
    assert_eq!(app.children.len(), 1);
    assert_eq!(app.children[0].kind, "StatefulSet");
  }
}
