//! gox - parallel cross compilation for Go programs
//!
//! This crate provides the library half of gox: the per-release platform
//! and flag compatibility tables, platform selection, `go build` argument
//! and environment construction, and the bounded parallel build runner.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

pub use core::{Platform, PlatformFilter, ReleaseIdentifier};
pub use resolver::CompatibilityResolver;
pub use util::errors::GoxError;
