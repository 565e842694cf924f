//! chartwave-lib: dependency resolution and wave-order validation for
//! deployable units.
//!
//! This crate provides:
//! - `ArtifactRegistry`: chart-type names mapped to artifact constructors
//! - `DependencyResolver`: structural deduplication of declared dependencies
//! - `DeployableUnitFactory`: one root artifact per deployable unit
//! - `WaveOrderValidator`: duplicate and sync-wave checks before handoff to
//!   a GitOps controller
//! - `Synthesizer`: the pipeline tying the above together

pub mod artifact;
pub mod config;
pub mod consts;
pub mod factory;
pub mod props;
pub mod registry;
pub mod resolve;
pub mod synth;
pub mod util;
pub mod validate;

pub use artifact::{Artifact, ArtifactRef, ResourceId};
pub use factory::{DeployableUnit, DeployableUnitConfig, DeployableUnitFactory};
pub use props::{PropValue, PropertyBag};
pub use registry::{ArtifactRegistry, Constructor, Scope, UnregisteredTypeError};
pub use resolve::{DependencyDeclaration, DependencyResolver, DependencySpec, ResolveError, ResolvedDependencies};
pub use synth::{Synthesis, Synthesizer};
pub use validate::{OrderingReport, ValidatorConfig, WaveOrderValidator, WaveRule};
