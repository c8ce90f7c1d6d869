//! Common test utilities for Cairn CLI tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated test environment with temp directories
//! - Assertion macros: `assert_deployed!`, `assert_output_contains!`, etc.
//! - Fixtures: Reusable context bundles

#![allow(dead_code)]

pub mod assertions;
pub mod env;
pub mod fixtures;
pub mod windows;

pub use assertions::*;
pub use env::*;
pub use fixtures::*;
