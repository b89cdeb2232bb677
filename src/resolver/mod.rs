//! Toolchain compatibility resolution.
//!
//! Knows which platforms and which `go build` flags each Go release
//! supports. Both tables are built once, validated, and then only read.

pub mod errors;
pub mod flags;
pub mod platforms;

pub use errors::TableIntegrityError;
pub use flags::FlagTable;
pub use platforms::{add_drop, PlatformTable};

use crate::core::platform::Platform;
use crate::core::release::ReleaseIdentifier;

/// Answers "is X supported by release V?".
///
/// A `None` release means the installed version could not be determined
/// and is treated as the latest known release.
#[derive(Debug, Clone)]
pub struct CompatibilityResolver {
    platforms: PlatformTable,
    flags: FlagTable,
}

impl CompatibilityResolver {
    pub fn new(platforms: PlatformTable, flags: FlagTable) -> Self {
        CompatibilityResolver { platforms, flags }
    }

    /// Build and validate the builtin tables.
    pub fn builtin() -> Result<Self, TableIntegrityError> {
        Ok(CompatibilityResolver::new(
            PlatformTable::builtin()?,
            FlagTable::builtin()?,
        ))
    }

    /// Every platform `release` can target, in table order.
    pub fn platforms_for(&self, release: Option<ReleaseIdentifier>) -> &[Platform] {
        self.platforms.platforms_for(release)
    }

    pub fn is_flag_supported(&self, flag: &str, release: Option<ReleaseIdentifier>) -> bool {
        self.flags.is_supported(flag, release)
    }
}
