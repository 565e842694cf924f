//! Shared utilities.
//!
//! Common utilities used across the crate, currently content hashing.

pub mod hash;
