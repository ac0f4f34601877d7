//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! coercion engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: User types with registered surfaces and standard test values
//! - `assertions`: Custom assertion helpers for conversion outcomes
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use assertions::*;
pub use generators::*;
