//! End-to-end tests for resolution, creation and validation.

mod common;
mod manifest_tests;
mod properties_tests;
