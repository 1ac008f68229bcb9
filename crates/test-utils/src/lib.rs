//! Shared test utilities for the mrms-radar workspace.
//!
//! This crate provides common testing infrastructure including:
//! - A synthetic GRIB2 message builder
//! - Bit packing helpers for building data sections by hand
//! - Canned reflectivity scenes
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;
