//! High-level operations.
//!
//! This module contains the implementation of the gox commands.

pub mod gox_build;
pub mod list_osarch;

pub use gox_build::{build, BuildOptions, CrossBuild};
pub use list_osarch::{format_osarch_list, osarch_list};
