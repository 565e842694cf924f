//! Artifacts produced by constructors.
//!
//! An [`Artifact`] is a tree of resource descriptions. The core only looks at
//! a handful of fields on each node (kind, name, namespace and the annotations
//! that carry the sync wave and sync options); everything else is an opaque
//! body passed through untouched.
//!
//! # Submodules
//!
//! - [`load`] - parse rendered manifests back into artifacts

pub mod load;
mod types;

pub use load::{load_documents, load_documents_from_path};
pub use types::*;
