//! Configuration file support for gox.
//!
//! Two locations are read:
//! - Global: `~/.gox/config.toml` - user-wide defaults
//! - Project: `.gox/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::diagnostic::Diagnostic;

/// Name of the per-user and per-project config directory.
pub const CONFIG_DIR: &str = ".gox";

pub const CONFIG_FILE: &str = "config.toml";

/// gox configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub build: BuildConfig,
}

/// Defaults for a cross build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Number of parallel builds (None = derived from the CPU count)
    pub parallel: Option<usize>,

    /// Output path template
    pub output: Option<String>,

    /// Go executable
    pub gocmd: Option<String>,

    /// Force cgo on for every target
    pub cgo: Option<bool>,

    /// Space separated operating systems
    pub os: Option<String>,

    /// Space separated architectures
    pub arch: Option<String>,

    /// Space separated os/arch pairs
    pub osarch: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing
    /// or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("{}", malformed_config(path, &e).format(false).trim_end());
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let build = other.build;
        if build.parallel.is_some() {
            self.build.parallel = build.parallel;
        }
        if build.output.is_some() {
            self.build.output = build.output;
        }
        if build.gocmd.is_some() {
            self.build.gocmd = build.gocmd;
        }
        if build.cgo.is_some() {
            self.build.cgo = build.cgo;
        }
        if build.os.is_some() {
            self.build.os = build.os;
        }
        if build.arch.is_some() {
            self.build.arch = build.arch;
        }
        if build.osarch.is_some() {
            self.build.osarch = build.osarch;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.gox/config.toml)
/// 2. Global config (~/.gox/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

fn malformed_config(path: &Path, err: &anyhow::Error) -> Diagnostic {
    Diagnostic::warning("ignoring malformed config file")
        .with_location(path)
        .with_context(format!("{:#}", err))
}

/// Get the global config directory (~/.gox).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the global config path (~/.gox/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Get the project config path (.gox/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.build.parallel.is_none());
        assert!(config.build.output.is_none());
        assert!(config.build.cgo.is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[build]
parallel = 4
output = "dist/{{.OS}}_{{.Arch}}/{{.Dir}}"
gocmd = "go1.20"
cgo = true
os = "linux darwin"
osarch = "!darwin/386"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.build.parallel, Some(4));
        assert_eq!(
            config.build.output.as_deref(),
            Some("dist/{{.OS}}_{{.Arch}}/{{.Dir}}")
        );
        assert_eq!(config.build.gocmd.as_deref(), Some("go1.20"));
        assert_eq!(config.build.cgo, Some(true));
        assert_eq!(config.build.os.as_deref(), Some("linux darwin"));
        assert!(config.build.arch.is_none());
        assert_eq!(config.build.osarch.as_deref(), Some("!darwin/386"));
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.build.parallel = Some(2);
        base.build.gocmd = Some("go".to_string());

        let mut override_cfg = Config::default();
        override_cfg.build.gocmd = Some("go1.21".to_string());
        override_cfg.build.cgo = Some(false);

        base.merge(override_cfg);

        assert_eq!(base.build.gocmd.as_deref(), Some("go1.21"));
        assert_eq!(base.build.parallel, Some(2));
        assert_eq!(base.build.cgo, Some(false));
    }

    #[test]
    fn test_malformed_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[build]\nparallel = \"lots\"\n").unwrap();

        assert!(Config::load(&config_path).is_err());
        assert_eq!(Config::load_or_default(&config_path), Config::default());
    }

    #[test]
    fn test_malformed_config_warning_names_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[build\n").unwrap();

        let err = Config::load(&config_path).unwrap_err();
        let out = malformed_config(&config_path, &err).format(false);

        assert!(out.starts_with("warning: ignoring malformed config file"));
        assert!(out.contains(&format!("--> {}", config_path.display())));
        assert!(out.contains("failed to parse config file"));
    }

    #[test]
    fn test_missing_config_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_or_default(&tmp.path().join("absent.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_root = tmp.path().join("project");
        let project_path = project_config_path(&project_root);
        std::fs::create_dir_all(project_path.parent().unwrap()).unwrap();

        std::fs::write(
            &global_path,
            r#"
[build]
parallel = 8
output = "global/{{.Dir}}"
"#,
        )
        .unwrap();

        std::fs::write(
            &project_path,
            r#"
[build]
output = "bin/{{.Dir}}_{{.OS}}_{{.Arch}}"
"#,
        )
        .unwrap();

        let config = load_config(Some(&global_path), &project_path);

        assert_eq!(config.build.parallel, Some(8));
        assert_eq!(
            config.build.output.as_deref(),
            Some("bin/{{.Dir}}_{{.OS}}_{{.Arch}}")
        );
    }

    #[test]
    fn test_project_config_path() {
        assert_eq!(
            project_config_path(Path::new("/work/app")),
            PathBuf::from("/work/app/.gox/config.toml")
        );
    }
}
