//! Canonical serialization of property bags.
//!
//! The canonical form is the JSON encoding of a tagged view of the bag:
//! - map keys are sorted
//! - sequences keep their order
//! - every value carries its variant tag, so `Int(1)`, `Float(1.0)` and
//!   `String("1")` never collide
//! - finite floats use serde_json's shortest round-trip formatting, with
//!   `-0.0` folded into `0.0`; `NaN`, `inf` and `-inf` are named under their
//!   own tag, since serde_json writes every non-finite float as `null`
//! - a live artifact reference encodes as the address of its allocation
//!
//! The last rule is the one exception to structural equality: two bags
//! holding artifacts are canonically equal only when they hold the *same*
//! artifact instances. Whoever keeps a canonical string around must also keep
//! the referenced artifacts alive, otherwise the address could be reused by
//! an unrelated allocation. The resolution cache pins them for that reason.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::{PropValue, PropertyBag};

#[derive(Serialize)]
enum Canonical<'a> {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  NonFinite(&'static str),
  String(&'a str),
  List(Vec<Canonical<'a>>),
  Map(BTreeMap<&'a str, Canonical<'a>>),
  Artifact(usize),
}

impl<'a> Canonical<'a> {
  fn of_bag(bag: &'a PropertyBag) -> Self {
    Canonical::Map(bag.iter().map(|(k, v)| (k, Canonical::of(v))).collect())
  }

  fn float(f: f64) -> Self {
    if f.is_nan() {
      Canonical::NonFinite("NaN")
    } else if f == f64::INFINITY {
      Canonical::NonFinite("inf")
    } else if f == f64::NEG_INFINITY {
      Canonical::NonFinite("-inf")
    } else {
      Canonical::Float(f + 0.0)
    }
  }

  fn of(value: &'a PropValue) -> Self {
    match value {
      PropValue::Null => Canonical::Null,
      PropValue::Bool(b) => Canonical::Bool(*b),
      PropValue::Int(n) => Canonical::Int(*n),
      PropValue::Float(f) => Canonical::float(*f),
      PropValue::String(s) => Canonical::String(s),
      PropValue::List(items) => Canonical::List(items.iter().map(Canonical::of).collect()),
      PropValue::Map(bag) => Canonical::of_bag(bag),
      PropValue::Artifact(artifact) => Canonical::Artifact(Arc::as_ptr(artifact) as usize),
    }
  }
}

/// Canonical string for a property bag.
pub fn canonical_string(bag: &PropertyBag) -> Result<String, serde_json::Error> {
  serde_json::to_string(&Canonical::of_bag(bag))
}

/// Whether two bags are structurally equal.
pub fn structurally_equal(a: &PropertyBag, b: &PropertyBag) -> Result<bool, serde_json::Error> {
  Ok(canonical_string(a)? == canonical_string(b)?)
}
