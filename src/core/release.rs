//! Toolchain release identifiers and release ranges.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use semver::{Version, VersionReq};
use thiserror::Error;

/// Matches `go1`, `go1.20`, `go1.21.4`. Release candidates, betas and devel
/// builds do not match.
static GO_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^go(\d+)(?:\.(\d+))?(?:\.\d+)?$").unwrap());

/// The toolchain reported a version string we cannot interpret.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unrecognized toolchain version `{raw}`")]
pub struct VersionParseError {
    pub raw: String,
}

/// A toolchain release, ordered by `(major, minor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseIdentifier {
    pub major: u64,
    pub minor: u64,
}

impl ReleaseIdentifier {
    pub const fn new(major: u64, minor: u64) -> Self {
        ReleaseIdentifier { major, minor }
    }

    /// Parse the output of `runtime.Version()` (`go1.21.4`). Go 1.0 reports
    /// a bare `go1`, which is release 1.0.
    pub fn from_go_version(raw: &str) -> Result<Self, VersionParseError> {
        let raw = raw.trim();
        let err = || VersionParseError {
            raw: raw.to_string(),
        };

        let caps = GO_VERSION_RE.captures(raw).ok_or_else(err)?;
        let major = caps[1].parse().map_err(|_| err())?;
        let minor = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| err())?,
            None => 0,
        };

        Ok(ReleaseIdentifier::new(major, minor))
    }

    /// The release as a semver version (`major.minor.0`) for range checks.
    pub fn to_semver(self) -> Version {
        Version::new(self.major, self.minor, 0)
    }
}

impl fmt::Display for ReleaseIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ReleaseIdentifier {
    type Err = VersionParseError;

    /// Parse a bare `major.minor` release such as `1.20`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError { raw: s.to_string() };
        let (major, minor) = s.trim().split_once('.').ok_or_else(err)?;
        Ok(ReleaseIdentifier::new(
            major.parse().map_err(|_| err())?,
            minor.parse().map_err(|_| err())?,
        ))
    }
}

/// A contiguous range of releases such as `>=1.1, <1.2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    req: VersionReq,
}

impl VersionRange {
    pub fn parse(range: &str) -> Result<Self, semver::Error> {
        Ok(VersionRange {
            req: VersionReq::parse(range)?,
        })
    }

    pub fn contains(&self, release: ReleaseIdentifier) -> bool {
        self.req.matches(&release.to_semver())
    }

    /// Releases named by the range's comparators.
    pub fn boundaries(&self) -> Vec<ReleaseIdentifier> {
        self.req
            .comparators
            .iter()
            .map(|c| ReleaseIdentifier::new(c.major, c.minor.unwrap_or(0)))
            .collect()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_go_version() {
        assert_eq!(
            ReleaseIdentifier::from_go_version("go1.20").unwrap(),
            ReleaseIdentifier::new(1, 20)
        );
        assert_eq!(
            ReleaseIdentifier::from_go_version("go1.21.4\n").unwrap(),
            ReleaseIdentifier::new(1, 21)
        );
    }

    #[test]
    fn test_parse_go1_without_minor() {
        assert_eq!(
            ReleaseIdentifier::from_go_version("go1").unwrap(),
            ReleaseIdentifier::new(1, 0)
        );
        assert_eq!(
            ReleaseIdentifier::from_go_version("go1.0.3").unwrap(),
            ReleaseIdentifier::new(1, 0)
        );
    }

    #[test]
    fn test_parse_go_version_rejects_unexpected_formats() {
        for raw in ["go1.21rc2", "devel go1.22-abcdef", "1.20", "go", "go1.", "gox1.2", ""] {
            assert!(
                ReleaseIdentifier::from_go_version(raw).is_err(),
                "expected {:?} to be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_release_ordering() {
        let r19: ReleaseIdentifier = "1.9".parse().unwrap();
        let r10: ReleaseIdentifier = "1.10".parse().unwrap();
        assert!(r19 < r10);
        assert!(ReleaseIdentifier::new(2, 0) > ReleaseIdentifier::new(1, 99));
    }

    #[test]
    fn test_range_contains() {
        let range = VersionRange::parse(">=1.9, <1.10").unwrap();
        assert!(range.contains(ReleaseIdentifier::new(1, 9)));
        assert!(!range.contains(ReleaseIdentifier::new(1, 10)));
        assert!(!range.contains(ReleaseIdentifier::new(1, 8)));

        let first = VersionRange::parse("<=1.0").unwrap();
        assert!(first.contains(ReleaseIdentifier::new(1, 0)));
        assert!(!first.contains(ReleaseIdentifier::new(1, 1)));
    }
}
