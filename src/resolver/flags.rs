//! Minimum toolchain releases for `go build` flags.

use std::collections::HashMap;

use semver::VersionReq;

use crate::core::release::ReleaseIdentifier;

use super::errors::TableIntegrityError;

/// `go build` flag names.
pub mod names {
    pub const CHANGE_DIR: &str = "C";
    pub const REBUILD: &str = "a";
    pub const RACE: &str = "race";
    pub const MSAN: &str = "msan";
    pub const ASAN: &str = "asan";
    pub const COVER: &str = "cover";
    pub const COVER_PKG: &str = "coverpkg";
    pub const ASM_FLAGS: &str = "asmflags";
    pub const BUILD_MODE: &str = "buildmode";
    pub const BUILD_VCS: &str = "buildvcs";
    pub const COMPILER: &str = "compiler";
    pub const GCCGO_FLAGS: &str = "gccgoflags";
    pub const GC_FLAGS: &str = "gcflags";
    pub const INSTALL_SUFFIX: &str = "installsuffix";
    pub const LD_FLAGS: &str = "ldflags";
    pub const LINK_SHARED: &str = "linkshared";
    pub const MOD: &str = "mod";
    pub const MOD_CACHE_RW: &str = "modcacherw";
    pub const MOD_FILE: &str = "modfile";
    pub const OVERLAY: &str = "overlay";
    pub const PGO: &str = "pgo";
    pub const PKG_DIR: &str = "pkgdir";
    pub const TAGS: &str = "tags";
    pub const TRIM_PATH: &str = "trimpath";
}

const BUILTIN_CONSTRAINTS: &[(&str, &str)] = &[
    (names::CHANGE_DIR, ">=1.20"),
    (names::ASAN, ">=1.18"),
    (names::COVER, ">=1.20"),
    (names::COVER_PKG, ">=1.20"),
    (names::BUILD_VCS, ">=1.18"),
    (names::MOD_CACHE_RW, ">=1.14"),
    (names::MOD, ">=1.11"),
    (names::MOD_FILE, ">=1.14"),
    (names::OVERLAY, ">=1.16"),
    (names::PGO, ">=1.20"),
    (names::TRIM_PATH, ">=1.13"),
];

/// Flag name to release constraint. Flags not in the table are supported
/// by every release.
#[derive(Debug, Clone, Default)]
pub struct FlagTable {
    constraints: HashMap<String, VersionReq>,
}

impl FlagTable {
    pub fn new(entries: &[(&str, &str)]) -> Result<Self, TableIntegrityError> {
        let mut constraints = HashMap::with_capacity(entries.len());
        for (name, constraint) in entries {
            let req =
                VersionReq::parse(constraint).map_err(|e| TableIntegrityError::InvalidRange {
                    range: format!("{} ({})", constraint, name),
                    reason: e.to_string(),
                })?;
            constraints.insert(name.to_string(), req);
        }
        Ok(FlagTable { constraints })
    }

    pub fn builtin() -> Result<Self, TableIntegrityError> {
        Self::new(BUILTIN_CONSTRAINTS)
    }

    /// Whether `flag` may be passed to `release`. An unknown release is
    /// assumed to be the latest and satisfies every constraint.
    pub fn is_supported(&self, flag: &str, release: Option<ReleaseIdentifier>) -> bool {
        let Some(release) = release else {
            return true;
        };
        match self.constraints.get(flag) {
            Some(req) => req.matches(&release.to_semver()),
            None => true,
        }
    }

    /// The constraint for `flag`, if it has one.
    pub fn constraint(&self, flag: &str) -> Option<&VersionReq> {
        self.constraints.get(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(s: &str) -> Option<ReleaseIdentifier> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_gated_flag_boundary() {
        let table = FlagTable::builtin().unwrap();
        assert!(!table.is_supported(names::COVER, release("1.19")));
        assert!(table.is_supported(names::COVER, release("1.20")));
        assert!(table.is_supported(names::COVER, release("1.21")));

        assert!(!table.is_supported(names::TRIM_PATH, release("1.12")));
        assert!(table.is_supported(names::TRIM_PATH, release("1.13")));
    }

    #[test]
    fn test_ungated_flag_always_supported() {
        let table = FlagTable::builtin().unwrap();
        assert!(table.constraint(names::RACE).is_none());
        assert!(table.is_supported(names::RACE, release("1.0")));
        assert!(table.is_supported("made-up-flag", release("1.0")));
    }

    #[test]
    fn test_unknown_release_assumes_latest() {
        let table = FlagTable::builtin().unwrap();
        assert!(table.is_supported(names::PGO, None));
    }

    #[test]
    fn test_invalid_constraint_is_integrity_error() {
        let err = FlagTable::new(&[("cover", "at least 1.20")]).unwrap_err();
        assert!(matches!(err, TableIntegrityError::InvalidRange { .. }));
    }
}
