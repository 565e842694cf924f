use chartwave_lib::artifact::load_documents;
use chartwave_lib::config::Format;
use chartwave_lib::synth::Synthesizer;
use chartwave_lib::{DependencySpec, DeployableUnitConfig, PropertyBag, ValidatorConfig, WaveOrderValidator};

use super::common::create_test_registry;

const RENDERED: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: checkout
  namespace: shop
  annotations:
    argocd.argoproj.io/sync-wave: "10"
---
apiVersion: autoscaling/v2
kind: HorizontalPodAutoscaler
metadata:
  name: checkout
  namespace: shop
  annotations:
    argocd.argoproj.io/sync-wave: "11"
---
apiVersion: monitoring.coreos.com/v1
kind: ServiceMonitor
metadata:
  name: checkout
  namespace: shop
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: checkout
  namespace: shop
"#;

#[test]
fn rendered_manifest_report() {
  let artifacts = load_documents(RENDERED, Format::Yaml, "rendered.yaml").unwrap();
  let report = WaveOrderValidator::default().validate(&artifacts);

  assert_eq!(
    report.errors,
    vec!["Duplicate resource found: Deployment/shop/checkout".to_string()]
  );
  assert_eq!(report.warnings.len(), 1);
  assert!(report.warnings[0].starts_with("ServiceMonitor/shop/checkout"));
}

#[test]
fn pipeline_with_custom_rules() {
  let (registry, _) = create_test_registry();
  let config = ValidatorConfig {
    wave_rules: vec![chartwave_lib::WaveRule {
      kind: "HorizontalPodAutoscaler".to_string(),
      threshold: 20,
      predecessor: "Rollout".to_string(),
    }],
    ..ValidatorConfig::default()
  };

  let units = vec![
    DeployableUnitConfig::new("webapp")
      .with_name("checkout")
      .with_prop("hpa_wave", 15)
      .with_dependency(
        "db",
        DependencySpec::new("postgres", PropertyBag::new().with("name", "orders")),
      ),
    DeployableUnitConfig::new("webapp").with_name("catalog").with_prop("hpa_wave", 25),
  ];

  let synthesis = Synthesizer::new(&registry)
    .with_validator(WaveOrderValidator::new(config))
    .synthesize(units)
    .unwrap();

  let ids: Vec<String> = synthesis.resources.iter().map(|a| a.id().to_string()).collect();
  assert_eq!(
    ids,
    vec![
      "StatefulSet/data/orders",
      "Deployment/apps/checkout",
      "HorizontalPodAutoscaler/apps/checkout",
      "Deployment/apps/catalog",
      "HorizontalPodAutoscaler/apps/catalog",
    ]
  );
  assert!(synthesis.report.is_ok());
  assert_eq!(synthesis.report.warnings.len(), 1);
  assert!(synthesis.report.warnings[0].contains("HorizontalPodAutoscaler/apps/checkout"));
}

#[test]
fn units_sharing_a_database_emit_it_once() {
  let (registry, calls) = create_test_registry();
  let db = || DependencySpec::new("postgres", PropertyBag::new().with("name", "orders"));
  let units = vec![
    DeployableUnitConfig::new("webapp").with_name("cart").with_dependency("db", db()),
    DeployableUnitConfig::new("webapp").with_name("checkout").with_dependency("db", db()),
  ];

  let synthesis = Synthesizer::new(&registry).synthesize(units).unwrap();

  let ids: Vec<String> = synthesis.resources.iter().map(|a| a.id().to_string()).collect();
  assert_eq!(
    ids,
    vec!["StatefulSet/data/orders", "Deployment/apps/cart", "Deployment/apps/checkout"]
  );
  assert!(synthesis.report.is_clean());

  let calls = calls.lock().unwrap();
  let first = calls[0].require_artifact("db").unwrap();
  let second = calls[1].require_artifact("db").unwrap();
  assert!(std::sync::Arc::ptr_eq(first, second));
}
