//! Listing the platforms the installed Go can build for.

use std::fmt::Write;

use anyhow::Result;

use crate::builder::toolchain::{GoToolchain, ToolchainVersion};
use crate::core::platform::Platform;
use crate::resolver::CompatibilityResolver;
use crate::util::errors::GoxError;

/// Render the platform listing for `version`.
pub fn format_osarch_list(version: &ToolchainVersion, platforms: &[Platform]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Supported OS/Arch combinations for {} are shown below. The \"default\"",
        version
    );
    let _ = writeln!(
        out,
        "value means that if no OS/Arch is specified, then the default will be built."
    );
    out.push('\n');

    for platform in platforms {
        let _ = writeln!(out, "{}\t(default: {})", platform, platform.default);
    }
    out
}

/// The platform listing for the toolchain at `gocmd`.
pub fn osarch_list(gocmd: &str) -> Result<String> {
    let resolver = CompatibilityResolver::builtin().map_err(GoxError::from)?;
    let go = GoToolchain::locate(gocmd)?;
    let version = go.detect_version();

    Ok(format_osarch_list(
        &version,
        resolver.platforms_for(version.release),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_osarch_list() {
        let platforms = vec![
            Platform::new("linux", "amd64", true),
            Platform::new("android", "arm", false),
        ];
        let out = format_osarch_list(&ToolchainVersion::parse("go1.20.3"), &platforms);
        let lines: Vec<_> = out.lines().collect();

        assert!(lines[0].contains("for go1.20.3"));
        assert_eq!(lines[3], "linux/amd64\t(default: true)");
        assert_eq!(lines[4], "android/arm\t(default: false)");
    }

    #[test]
    fn test_listing_follows_release() {
        let resolver = CompatibilityResolver::builtin().unwrap();
        let version = ToolchainVersion::parse("go1.4");
        let out = format_osarch_list(&version, resolver.platforms_for(version.release));

        assert!(out.contains("nacl/amd64p32\t(default: false)"));
        assert!(!out.contains("linux/arm64"));
    }
}
