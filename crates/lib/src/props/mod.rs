//! Property bags passed to artifact constructors.
//!
//! A [`PropertyBag`] is an arbitrary-depth mapping of string keys to
//! [`PropValue`]s. Two bags are *structurally equal* when their canonical
//! forms are identical; see [`canonical`] for the exact rules. Structural
//! equality is what the dependency resolver deduplicates on.

pub mod canonical;
mod types;

pub use canonical::{canonical_string, structurally_equal};
pub use types::*;
