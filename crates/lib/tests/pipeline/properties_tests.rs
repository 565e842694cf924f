use std::sync::Arc;

use chartwave_lib::consts::ROOT_ID;
use chartwave_lib::{
  Artifact, DependencyDeclaration, DependencyResolver, DependencySpec, DeployableUnitConfig, DeployableUnitFactory,
  PropertyBag, ResolveError, Scope, WaveOrderValidator,
};

use super::common::create_test_registry;

fn orders_db() -> PropertyBag {
  PropertyBag::new().with("name", "orders").with("version", 16)
}

#[test]
fn create_is_deterministic_for_equal_props() {
  let (registry, _) = create_test_registry();
  let mut factory = DeployableUnitFactory::new(&registry);
  let scope = Scope::root(&registry, "storefront");

  let a = factory
    .create(
      &scope,
      DeployableUnitConfig::new("webapp").with_props(PropertyBag::new().with("namespace", "shop").with("hpa_wave", 12)),
    )
    .unwrap();
  let b = factory
    .create(
      &scope,
      DeployableUnitConfig::new("webapp").with_props(PropertyBag::new().with("hpa_wave", 12).with("namespace", "shop")),
    )
    .unwrap();

  assert_eq!(a.name(), ROOT_ID);
  let observe = |root: &Artifact| -> Vec<(String, Option<i64>)> {
    root
      .children
      .iter()
      .map(|child| (child.id().to_string(), child.wave()))
      .collect()
  };
  assert_eq!(observe(&*a), observe(&*b));
}

#[test]
fn sibling_dependencies_dedup_regardless_of_key_order() {
  let (registry, _) = create_test_registry();
  let mut resolver = DependencyResolver::new(&registry);

  let reordered = PropertyBag::new().with("version", 16).with("name", "orders");
  let declarations = DependencyDeclaration::new()
    .with("primary", DependencySpec::new("postgres", orders_db()))
    .with("reporting", DependencySpec::new("postgres", reordered));

  let resolved = resolver.resolve(Some(&declarations)).unwrap();
  assert!(Arc::ptr_eq(
    resolved.get("primary").unwrap(),
    resolved.get("reporting").unwrap()
  ));
}

#[test]
fn reset_between_sessions_builds_fresh() {
  let (registry, _) = create_test_registry();
  let mut resolver = DependencyResolver::new(&registry);
  let declarations = DependencyDeclaration::new().with("db", DependencySpec::new("postgres", orders_db()));

  let first = Arc::clone(resolver.resolve(Some(&declarations)).unwrap().get("db").unwrap());
  resolver.reset();
  let second = Arc::clone(resolver.resolve(Some(&declarations)).unwrap().get("db").unwrap());

  assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn unregistered_type_lists_registered_names_only() {
  let (registry, _) = create_test_registry();
  let mut factory = DeployableUnitFactory::new(&registry);
  let scope = Scope::root(&registry, "jobs");

  let err = factory.create(&scope, DeployableUnitConfig::new("cronjob")).unwrap_err();
  let ResolveError::Unregistered(err) = err else {
    panic!("expected an unregistered type error");
  };

  let message = err.to_string();
  for name in registry.names() {
    assert!(message.contains(&name), "{message} should list {name}");
  }
  assert!(!message.contains("cronjob"));
}

#[test]
fn duplicate_detection_respects_namespace() {
  let validator = WaveOrderValidator::default();

  let same = validator.validate(&[
    Artifact::new("Secret", "x").with_namespace("a"),
    Artifact::new("Secret", "x").with_namespace("a"),
  ]);
  assert_eq!(same.errors.len(), 1);
  for part in ["Secret", "a", "x"] {
    assert!(same.errors[0].contains(part));
  }

  let different = validator.validate(&[
    Artifact::new("Secret", "x").with_namespace("a"),
    Artifact::new("Secret", "x").with_namespace("b"),
  ]);
  assert!(different.errors.is_empty());
}

#[test]
fn autoscaler_wave_threshold() {
  let validator = WaveOrderValidator::default();

  let early = validator.validate(&[Artifact::new("HorizontalPodAutoscaler", "checkout").with_wave(5)]);
  assert_eq!(early.warnings.len(), 1);
  assert!(early.warnings[0].contains("checkout"));

  let late = validator.validate(&[Artifact::new("HorizontalPodAutoscaler", "checkout").with_wave(15)]);
  assert!(late.warnings.is_empty());
}

#[test]
fn resolved_dependency_wins_over_literal() {
  let (registry, calls) = create_test_registry();
  let mut factory = DeployableUnitFactory::new(&registry);
  let scope = Scope::root(&registry, "storefront");

  let config = DeployableUnitConfig::new("webapp")
    .with_prop("db", "literal-connection-string")
    .with_dependency("db", DependencySpec::new("postgres", orders_db()));
  let unit = factory.create_unit(&scope, config).unwrap();

  let calls = calls.lock().unwrap();
  assert_eq!(calls.len(), 1);
  let passed = calls[0].require_artifact("db").unwrap();
  assert!(Arc::ptr_eq(passed, unit.dependencies.get("db").unwrap()));
}
