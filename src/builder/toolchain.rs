//! The Go toolchain as an external collaborator.
//!
//! gox never compiles anything itself. Everything it needs to know about
//! the installed Go (version, `GOROOT`, which packages are commands) comes
//! from running `go`, and every build task is one `go build` process.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::orchestrator::TaskRunner;
use crate::builder::task::BuildTask;
use crate::core::release::ReleaseIdentifier;
use crate::util::errors::GoxError;
use crate::util::process::{find_executable, ProcessBuilder};

const VERSION_PROBE_FILE: &str = "version.go";

/// Prints the version of the toolchain that compiled it.
const VERSION_PROBE_SOURCE: &str = r#"package main

import (
	"fmt"
	"runtime"
)

func main() {
	fmt.Print(runtime.Version())
}
"#;

/// Template for `go list`; one `name|import path` line per package.
pub const LIST_FORMAT: &str = "{{.Name}}|{{.ImportPath}}";

const MAIN_PACKAGE: &str = "main";

/// The version reported by the toolchain, and the release it maps to.
///
/// `release` is `None` when the version could not be determined; callers
/// treat that as the latest known release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainVersion {
    pub raw: Option<String>,
    pub release: Option<ReleaseIdentifier>,
}

impl ToolchainVersion {
    /// Interpret a raw version string such as `go1.21.4` or
    /// `go1.21.4 X:loopvar`.
    pub fn parse(raw: &str) -> ToolchainVersion {
        let raw = raw.trim();
        let token = raw.split_whitespace().next().unwrap_or(raw);

        let release = match ReleaseIdentifier::from_go_version(token) {
            Ok(release) => Some(release),
            Err(e) => {
                tracing::warn!("Unable to parse current go version: {}; assuming the latest release", e);
                None
            }
        };

        ToolchainVersion {
            raw: Some(raw.to_string()),
            release,
        }
    }

    pub fn unknown() -> ToolchainVersion {
        ToolchainVersion {
            raw: None,
            release: None,
        }
    }
}

impl fmt::Display for ToolchainVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            Some(raw) => write!(f, "{}", raw),
            None => write!(f, "an unknown Go version"),
        }
    }
}

/// A located `go` executable.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    command: String,
    program: PathBuf,
}

impl GoToolchain {
    /// Find `command` on the PATH.
    pub fn locate(command: &str) -> Result<Self, GoxError> {
        let program = find_executable(command).ok_or_else(|| GoxError::ToolchainUnavailable {
            command: command.to_string(),
        })?;
        tracing::debug!("Using {} at {}", command, program.display());

        Ok(GoToolchain {
            command: command.to_string(),
            program,
        })
    }

    /// The command name as configured (`go`, `go1.20`, ...).
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn process(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
    }

    /// The raw version string of the toolchain.
    ///
    /// Compiles and runs a probe program first; if that fails, asks
    /// `go env GOVERSION`.
    pub fn version_string(&self) -> Result<String> {
        match self.probe_version() {
            Ok(version) => Ok(version),
            Err(e) => {
                tracing::debug!("Version probe failed, falling back to `go env`: {:#}", e);
                self.process()
                    .args(["env", "GOVERSION"])
                    .exec_stdout()
                    .context("failed to read the Go version")
            }
        }
    }

    fn probe_version(&self) -> Result<String> {
        let dir = tempfile::Builder::new()
            .prefix("gox-version")
            .tempdir()
            .context("failed to create a directory for the version probe")?;
        let source = dir.path().join(VERSION_PROBE_FILE);
        std::fs::write(&source, VERSION_PROBE_SOURCE)
            .with_context(|| format!("failed to write {}", source.display()))?;

        self.process()
            .arg("run")
            .arg(&source)
            .cwd(dir.path())
            .exec_stdout()
    }

    /// Detect the installed release. Never fails: anything unexpected
    /// degrades to "latest" with a warning.
    pub fn detect_version(&self) -> ToolchainVersion {
        if let Ok(root) = self.go_root() {
            tracing::debug!("GOROOT: {}", root);
        }

        match self.version_string() {
            Ok(raw) => {
                let version = ToolchainVersion::parse(&raw);
                tracing::debug!("Go version: {}", version);
                version
            }
            Err(e) => {
                tracing::warn!("{:#}; assuming the latest release", e);
                ToolchainVersion::unknown()
            }
        }
    }

    /// `GOROOT` of this toolchain.
    pub fn go_root(&self) -> Result<String> {
        self.process().args(["env", "GOROOT"]).exec_stdout()
    }

    /// Import paths of the `main` packages matching `patterns`.
    pub fn main_packages(&self, patterns: &[String]) -> Result<Vec<String>> {
        let output = self
            .process()
            .args(["list", "-f", LIST_FORMAT])
            .args(patterns)
            .exec_and_check()
            .context("error reading packages")?;

        Ok(parse_package_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl TaskRunner for GoToolchain {
    fn run(&self, task: &BuildTask) -> Result<()> {
        let mut process = self
            .process()
            .args(task.command_args())
            .envs(&task.env);
        if let Some(cwd) = &task.cwd {
            process = process.cwd(cwd);
        }

        tracing::debug!("Running `{}`", process.display_command());
        process.exec_and_check()?;
        Ok(())
    }
}

/// Keep the import paths of `main` packages from `go list` output.
pub fn parse_package_list(output: &str) -> Vec<String> {
    let mut packages = Vec::new();

    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let Some((name, import_path)) = line.split_once('|') else {
            tracing::warn!("Bad line reading packages: {}", line);
            continue;
        };

        if name == MAIN_PACKAGE {
            packages.push(import_path.to_string());
        }
    }

    packages
}
