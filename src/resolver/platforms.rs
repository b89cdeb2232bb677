//! Per-release platform table.
//!
//! Each Go release supports a set of OS/arch pairs. The sets are derived
//! release by release with [`add_drop`], so every change between two
//! releases is written down exactly once. The table maps release ranges to
//! those sets; the first range containing a release wins.

use crate::core::platform::{arch, os, Platform};
use crate::core::release::{ReleaseIdentifier, VersionRange};

use super::errors::TableIntegrityError;

/// Derive a release's platform set from the previous release's set.
///
/// Entries in `add` that are already present in `base` replace the existing
/// entry in place, which is how a later release changes whether a platform
/// is built by default. Every entry in `drop` must be present once `add` has
/// been applied.
pub fn add_drop(
    release: &str,
    base: &[Platform],
    add: &[Platform],
    drop: &[Platform],
) -> Result<Vec<Platform>, TableIntegrityError> {
    let mut platforms = base.to_vec();

    for (i, platform) in add.iter().enumerate() {
        if add[..i].contains(platform) {
            return Err(TableIntegrityError::DuplicatePlatform {
                release: release.to_string(),
                platform: platform.to_string(),
            });
        }

        match platforms.iter_mut().find(|p| p.same_target(platform)) {
            Some(existing) => *existing = platform.clone(),
            None => platforms.push(platform.clone()),
        }
    }

    for platform in drop {
        let Some(index) = platforms.iter().position(|p| p.same_target(platform)) else {
            return Err(TableIntegrityError::MissingDrop {
                release: release.to_string(),
                platform: platform.to_string(),
            });
        };
        platforms.remove(index);
    }

    Ok(platforms)
}

/// One row of the platform table.
#[derive(Debug, Clone)]
pub struct PlatformTableEntry {
    pub range: VersionRange,
    pub platforms: Vec<Platform>,
}

/// Release ranges mapped to the platforms they support.
#[derive(Debug, Clone)]
pub struct PlatformTable {
    entries: Vec<PlatformTableEntry>,
    latest: Vec<Platform>,
}

impl PlatformTable {
    /// Build a table from `(range, platforms)` rows in ascending order plus
    /// the set used for releases newer than every range.
    pub fn new(
        rows: Vec<(&str, Vec<Platform>)>,
        latest: Vec<Platform>,
    ) -> Result<Self, TableIntegrityError> {
        let mut entries = Vec::with_capacity(rows.len());

        for (range, platforms) in rows {
            let parsed =
                VersionRange::parse(range).map_err(|e| TableIntegrityError::InvalidRange {
                    range: range.to_string(),
                    reason: e.to_string(),
                })?;
            check_unique(range, &platforms)?;
            entries.push(PlatformTableEntry {
                range: parsed,
                platforms,
            });
        }
        check_unique("latest", &latest)?;
        check_disjoint(&entries)?;

        Ok(PlatformTable { entries, latest })
    }

    /// The builtin table of Go releases.
    pub fn builtin() -> Result<Self, TableIntegrityError> {
        builtin_table()
    }

    /// Platforms supported by `release`.
    ///
    /// An unknown release, or one newer than every range, gets the most
    /// recent known set.
    pub fn platforms_for(&self, release: Option<ReleaseIdentifier>) -> &[Platform] {
        let Some(release) = release else {
            return &self.latest;
        };

        self.entries
            .iter()
            .find(|entry| entry.range.contains(release))
            .map(|entry| entry.platforms.as_slice())
            .unwrap_or(&self.latest)
    }

    pub fn latest(&self) -> &[Platform] {
        &self.latest
    }

    pub fn entries(&self) -> &[PlatformTableEntry] {
        &self.entries
    }
}

fn check_unique(release: &str, platforms: &[Platform]) -> Result<(), TableIntegrityError> {
    for (i, platform) in platforms.iter().enumerate() {
        if platforms[..i].contains(platform) {
            return Err(TableIntegrityError::DuplicatePlatform {
                release: release.to_string(),
                platform: platform.to_string(),
            });
        }
    }
    Ok(())
}

/// Probe every range boundary (and its neighbours) against all ranges.
fn check_disjoint(entries: &[PlatformTableEntry]) -> Result<(), TableIntegrityError> {
    let mut probes = Vec::new();
    for entry in entries {
        for b in entry.range.boundaries() {
            probes.push(b);
            probes.push(ReleaseIdentifier::new(b.major, b.minor + 1));
            if b.minor > 0 {
                probes.push(ReleaseIdentifier::new(b.major, b.minor - 1));
            }
        }
    }

    for release in probes {
        let mut matching = entries.iter().filter(|e| e.range.contains(release));
        if let (Some(first), Some(second)) = (matching.next(), matching.next()) {
            return Err(TableIntegrityError::OverlappingRanges {
                first: first.range.to_string(),
                second: second.range.to_string(),
                release: release.to_string(),
            });
        }
    }
    Ok(())
}

fn p(os: &str, arch: &str, default: bool) -> Platform {
    Platform::new(os, arch, default)
}

fn builtin_table() -> Result<PlatformTable, TableIntegrityError> {
    let go1_0 = vec![
        p(os::DARWIN, arch::X86, true),
        p(os::DARWIN, arch::AMD64, true),
        p(os::LINUX, arch::X86, true),
        p(os::LINUX, arch::AMD64, true),
        p(os::LINUX, arch::ARM, true),
        p(os::FREEBSD, arch::X86, true),
        p(os::FREEBSD, arch::AMD64, true),
        p(os::OPENBSD, arch::X86, true),
        p(os::OPENBSD, arch::AMD64, true),
        p(os::WINDOWS, arch::X86, true),
        p(os::WINDOWS, arch::AMD64, true),
    ];

    let go1_1 = add_drop(
        "1.1",
        &go1_0,
        &[
            p(os::FREEBSD, arch::ARM, true),
            p(os::NETBSD, arch::X86, true),
            p(os::NETBSD, arch::AMD64, true),
            p(os::NETBSD, arch::ARM, true),
            p(os::PLAN9, arch::X86, false),
        ],
        &[],
    )?;

    // no new platforms in 1.2
    let go1_2 = go1_1.clone();

    let go1_3 = add_drop(
        "1.3",
        &go1_2,
        &[
            p(os::DRAGONFLY, arch::X86, false),
            p(os::DRAGONFLY, arch::AMD64, false),
            p(os::NACL, arch::AMD64, false),
            p(os::NACL, arch::AMD64P32, false),
            p(os::NACL, arch::ARM, false),
            p(os::SOLARIS, arch::AMD64, false),
        ],
        &[],
    )?;

    let go1_4 = add_drop(
        "1.4",
        &go1_3,
        &[p(os::ANDROID, arch::ARM, false), p(os::PLAN9, arch::AMD64, false)],
        &[],
    )?;

    let go1_5 = add_drop(
        "1.5",
        &go1_4,
        &[
            p(os::DARWIN, arch::ARM, false),
            p(os::DARWIN, arch::ARM64, false),
            p(os::LINUX, arch::ARM64, false),
            p(os::LINUX, arch::PPC64, false),
            p(os::LINUX, arch::PPC64LE, false),
        ],
        &[],
    )?;

    let go1_6 = add_drop(
        "1.6",
        &go1_5,
        &[
            p(os::ANDROID, arch::X86, false),
            p(os::ANDROID, arch::AMD64, false),
            p(os::LINUX, arch::MIPS64, false),
            p(os::LINUX, arch::MIPS64LE, false),
            p(os::NACL, arch::X86, false),
            p(os::OPENBSD, arch::ARM, true),
        ],
        &[],
    )?;

    // mips64 and mips64le became fully supported, and so defaults, in 1.7.
    // s390x is not fully supported but is generally useful.
    let go1_7 = add_drop(
        "1.7",
        &go1_6,
        &[
            p(os::LINUX, arch::S390X, true),
            p(os::PLAN9, arch::ARM, false),
            p(os::LINUX, arch::MIPS64, true),
            p(os::LINUX, arch::MIPS64LE, true),
        ],
        &[],
    )?;

    let go1_8 = add_drop(
        "1.8",
        &go1_7,
        &[p(os::LINUX, arch::MIPS, true), p(os::LINUX, arch::MIPSLE, true)],
        &[],
    )?;

    // no new platforms in 1.9
    let go1_9 = go1_8.clone();

    // unannounced, but android/amd64 support was dropped
    let go1_10 = add_drop("1.10", &go1_9, &[], &[p(os::ANDROID, arch::AMD64, false)])?;

    let go1_11 = add_drop("1.11", &go1_10, &[p(os::JS, arch::WASM, true)], &[])?;

    let go1_12 = add_drop(
        "1.12",
        &go1_11,
        &[p(os::AIX, arch::PPC64, false), p(os::WINDOWS, arch::ARM, true)],
        &[],
    )?;

    let go1_13 = add_drop(
        "1.13",
        &go1_12,
        &[
            p(os::ILLUMOS, arch::AMD64, false),
            p(os::NETBSD, arch::ARM64, true),
            p(os::OPENBSD, arch::ARM64, true),
        ],
        &[],
    )?;

    // nacl was removed entirely, amd64p32 included. Go 1.14 no longer
    // builds any nacl target, so these drops stay.
    let go1_14 = add_drop(
        "1.14",
        &go1_13,
        &[p(os::FREEBSD, arch::ARM64, true), p(os::LINUX, arch::RISCV64, true)],
        &[
            p(os::NACL, arch::X86, false),
            p(os::NACL, arch::AMD64, false),
            p(os::NACL, arch::AMD64P32, false),
            p(os::NACL, arch::ARM, false),
        ],
    )?;

    // 32-bit macOS and iOS were removed. darwin/arm is gone along with
    // darwin/386; `go tool dist list` for 1.15 has neither.
    let go1_15 = add_drop(
        "1.15",
        &go1_14,
        &[p(os::ANDROID, arch::ARM64, false)],
        &[p(os::DARWIN, arch::X86, false), p(os::DARWIN, arch::ARM, false)],
    )?;

    // Apple silicon makes darwin/arm64 a default
    let go1_16 = add_drop(
        "1.16",
        &go1_15,
        &[
            p(os::ANDROID, arch::AMD64, false),
            p(os::DARWIN, arch::ARM64, true),
            p(os::OPENBSD, arch::MIPS64, false),
        ],
        &[],
    )?;

    let go1_17 = add_drop("1.17", &go1_16, &[p(os::WINDOWS, arch::ARM64, true)], &[])?;

    // no new platforms in 1.18
    let go1_18 = go1_17.clone();

    let go1_19 = add_drop("1.19", &go1_18, &[p(os::LINUX, arch::LOONG64, true)], &[])?;

    let go1_20 = go1_19.clone();
    let go1_21 = go1_20.clone();
    let latest = go1_21.clone();

    PlatformTable::new(
        vec![
            ("<=1.0", go1_0),
            (">=1.1, <1.2", go1_1),
            (">=1.2, <1.3", go1_2),
            (">=1.3, <1.4", go1_3),
            (">=1.4, <1.5", go1_4),
            (">=1.5, <1.6", go1_5),
            (">=1.6, <1.7", go1_6),
            (">=1.7, <1.8", go1_7),
            (">=1.8, <1.9", go1_8),
            (">=1.9, <1.10", go1_9),
            (">=1.10, <1.11", go1_10),
            (">=1.11, <1.12", go1_11),
            (">=1.12, <1.13", go1_12),
            (">=1.13, <1.14", go1_13),
            (">=1.14, <1.15", go1_14),
            (">=1.15, <1.16", go1_15),
            (">=1.16, <1.17", go1_16),
            (">=1.17, <1.18", go1_17),
            (">=1.18, <1.19", go1_18),
            (">=1.19, <1.20", go1_19),
            (">=1.20, <1.21", go1_20),
            (">=1.21, <1.22", go1_21),
        ],
        latest,
    )
}
