//! Well-known names shared across the crate.

/// Id under which every top-level unit and every dependency is instantiated.
///
/// Each unit (and each dependency) is its own root, so exactly one artifact
/// tree is emitted per logical deployable unit.
pub const ROOT_ID: &str = "Default";

/// Kind of grouping nodes. A chart node holds children but is not itself a
/// deployable resource.
pub const CHART_KIND: &str = "Chart";

/// Namespace segment used in identity keys for cluster-scoped resources.
pub const CLUSTER_SCOPE: &str = "cluster";

/// Annotation carrying the integer sync wave.
pub const SYNC_WAVE_ANNOTATION: &str = "argocd.argoproj.io/sync-wave";

/// Annotation carrying comma-separated sync options.
pub const SYNC_OPTIONS_ANNOTATION: &str = "argocd.argoproj.io/sync-options";

/// Sync option that lets a resource tolerate a missing CRD at dry-run time.
pub const SKIP_DRY_RUN_OPTION: &str = "SkipDryRunOnMissingResource=true";

/// Wave conventionally used for workload (Deployment) application.
pub const WORKLOAD_WAVE: i64 = 10;

/// Length of truncated object hashes used in scope names.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;
