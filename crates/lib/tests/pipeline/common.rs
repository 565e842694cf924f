//! Shared registry fixtures.

use std::sync::{Arc, Mutex};

use chartwave_lib::{Artifact, ArtifactRegistry, PropertyBag, ResolveError, Scope};

/// Props every `webapp` construction was called with.
pub type Calls = Arc<Mutex<Vec<PropertyBag>>>;

/// Registry with leaf charts (`postgres`, `redis`) and a `webapp` chart that
/// records the props it receives.
pub fn create_test_registry() -> (ArtifactRegistry, Calls) {
  let calls: Calls = Arc::default();
  let recorded = Arc::clone(&calls);

  let mut registry = ArtifactRegistry::new();
  registry.register("postgres", database);
  registry.register("redis", database);
  registry.register("webapp", move |scope: &Scope<'_>, id: &str, props: &PropertyBag| {
    if let Ok(mut calls) = recorded.lock() {
      calls.push(props.clone());
    }
    webapp(scope, id, props)
  });
  (registry, calls)
}

fn database(_scope: &Scope<'_>, _id: &str, props: &PropertyBag) -> Result<Artifact, ResolveError> {
  Ok(
    Artifact::new("StatefulSet", props.require_str("name")?)
      .with_namespace(props.get_str("namespace").unwrap_or("data"))
      .with_wave(0),
  )
}

fn webapp(scope: &Scope<'_>, id: &str, props: &PropertyBag) -> Result<Artifact, ResolveError> {
  let name = scope.root_name().to_string();
  let namespace = props.get_str("namespace").unwrap_or("apps").to_string();
  let mut chart = Artifact::chart(id).with_child(
    Artifact::new("Deployment", name.clone())
      .with_namespace(namespace.clone())
      .with_wave(10)
      .into_ref(),
  );
  if let Some(wave) = props.get("hpa_wave").and_then(|v| v.as_i64()) {
    chart = chart.with_child(
      Artifact::new("HorizontalPodAutoscaler", name)
        .with_namespace(namespace)
        .with_wave(wave)
        .into_ref(),
    );
  }
  Ok(chart)
}
