//! Hashing utilities for content-addressed identifiers.
//!
//! This module provides:
//! - `ObjectHash`: A truncated 20-character hash used in scope names
//! - `Hashable`: Hash any serializable value through its JSON form
//! - `hash_str()`: Hash an already-canonical string

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::consts::OBJ_HASH_PREFIX_LEN;

pub type HashError = serde_json::Error;

/// A content-addressed hash identifying a unique object.
///
/// The hash is a 20-character truncated SHA-256. It is short enough to appear
/// in scope paths while keeping collisions out of practical reach.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string, e.g., `"a1b2c3d4e5f6789012ab"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHash(pub String);

impl std::fmt::Display for ObjectHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<ObjectHash, HashError> {
    let serialized = serde_json::to_string(self)?;
    Ok(hash_str(&serialized))
  }
}

/// Hash a string that is already in canonical form.
pub fn hash_str(data: &str) -> ObjectHash {
  let mut hasher = Sha256::new();
  hasher.update(data.as_bytes());
  let full = format!("{:x}", hasher.finalize());
  ObjectHash(full[..OBJ_HASH_PREFIX_LEN].to_string())
}
