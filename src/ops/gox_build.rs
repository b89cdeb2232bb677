//! Implementation of a cross build.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::builder::args::CompileOptions;
use crate::builder::env::HostEnv;
use crate::builder::orchestrator::{host_parallelism, BuildOrchestrator, TaskRunner};
use crate::builder::output::{OutputTemplate, DEFAULT_OUTPUT_TEMPLATE};
use crate::builder::plan::TaskPlanner;
use crate::builder::task::{BuildReport, BuildTask, TaskState};
use crate::builder::toolchain::{GoToolchain, ToolchainVersion};
use crate::core::platform::Platform;
use crate::core::platform_filter::PlatformFilter;
use crate::resolver::CompatibilityResolver;
use crate::util::errors::GoxError;

/// Options for a cross build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Package patterns handed to `go list`
    pub packages: Vec<String>,

    /// Space separated OS lists, `!` negates
    pub os: Vec<String>,

    /// Space separated architecture lists, `!` negates
    pub arch: Vec<String>,

    /// Space separated `os/arch` lists, `!` negates
    pub osarch: Vec<String>,

    /// Output path template
    pub output: String,

    /// Number of parallel builds (None = derived from the CPU count)
    pub parallel: Option<usize>,

    /// Go executable
    pub gocmd: String,

    /// Force cgo on for every target
    pub cgo: bool,

    /// Options passed through to `go build`
    pub compile: CompileOptions,

    /// Draw a progress bar
    pub progress: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            packages: vec![".".to_string()],
            os: Vec::new(),
            arch: Vec::new(),
            osarch: Vec::new(),
            output: DEFAULT_OUTPUT_TEMPLATE.to_string(),
            parallel: None,
            gocmd: "go".to_string(),
            cgo: false,
            compile: CompileOptions::default(),
            progress: false,
        }
    }
}

impl BuildOptions {
    /// Parse the OS, architecture and pair filters.
    pub fn platform_filter(&self) -> Result<PlatformFilter> {
        let mut filter = PlatformFilter::new();
        for list in &self.os {
            filter.add_os(list);
        }
        for list in &self.arch {
            filter.add_arch(list);
        }
        for list in &self.osarch {
            filter
                .add_osarch(list)
                .map_err(|e| anyhow::anyhow!("invalid --osarch value: {}", e))?;
        }
        Ok(filter)
    }

    pub fn output_template(&self) -> Result<OutputTemplate, GoxError> {
        OutputTemplate::parse(&self.output).map_err(|e| GoxError::InvalidOutputTemplate {
            template: self.output.clone(),
            reason: e.reason,
        })
    }

    /// Worker count: the configured value, or the host default when unset
    /// or zero.
    pub fn parallelism(&self) -> usize {
        match self.parallel {
            Some(n) if n > 0 => n,
            _ => host_parallelism(),
        }
    }

    /// Filters as the user gave them, for error messages.
    fn describe_filters(&self) -> Vec<String> {
        let mut filters = Vec::new();
        for (name, lists) in [("os", &self.os), ("arch", &self.arch), ("osarch", &self.osarch)] {
            for list in lists {
                filters.push(format!("--{}=\"{}\"", name, list));
            }
        }
        filters
    }
}

/// Everything a finished cross build produced.
#[derive(Debug)]
pub struct CrossBuild {
    pub version: ToolchainVersion,
    pub parallelism: usize,
    pub tasks: Vec<BuildTask>,
    pub report: BuildReport,
    pub duration: Duration,
}

impl CrossBuild {
    /// Output path of the task for `platform` and `package`.
    pub fn output_for(&self, platform: &Platform, package: &str) -> Option<&Path> {
        self.tasks
            .iter()
            .find(|t| &t.platform == platform && t.package_path == package)
            .map(|t| t.output.as_path())
    }

    /// The report, or [`GoxError::BuildFailed`] listing every failed task.
    pub fn into_result(self) -> Result<BuildReport, GoxError> {
        if self.report.success() {
            Ok(self.report)
        } else {
            Err(GoxError::BuildFailed {
                failures: self.report.failures,
            })
        }
    }
}

/// Cross build every `main` package matching the patterns for every
/// selected platform.
///
/// Setup problems fail before any task starts. Task failures do not stop
/// the build; they are collected in the returned report.
pub fn build(opts: &BuildOptions) -> Result<CrossBuild> {
    let resolver = CompatibilityResolver::builtin().map_err(GoxError::from)?;
    let template = opts.output_template()?;
    let filter = opts.platform_filter()?;

    let go = GoToolchain::locate(&opts.gocmd)?;
    let version = go.detect_version();

    let platforms = select_platforms(opts, &resolver, &filter, &version)?;
    warn_unsupported_flags(opts, &resolver, &version);

    let packages = go
        .main_packages(&opts.packages)
        .context("Error reading packages")?;
    if packages.is_empty() {
        tracing::warn!("No main packages found in {}", opts.packages.join(" "));
    }

    run_tasks(opts, &resolver, &template, version, &platforms, &packages, &go)
}

/// The version-appropriate platforms that pass the user's filters.
pub fn select_platforms(
    opts: &BuildOptions,
    resolver: &CompatibilityResolver,
    filter: &PlatformFilter,
    version: &ToolchainVersion,
) -> Result<Vec<Platform>, GoxError> {
    let platforms = filter.select(resolver.platforms_for(version.release));
    if platforms.is_empty() {
        return Err(GoxError::NoPlatforms {
            version: version.to_string(),
            filters: opts.describe_filters(),
        });
    }
    tracing::debug!(
        "Building for {}",
        platforms
            .iter()
            .map(Platform::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    );
    Ok(platforms)
}

fn warn_unsupported_flags(
    opts: &BuildOptions,
    resolver: &CompatibilityResolver,
    version: &ToolchainVersion,
) {
    for flag in opts.compile.unsupported_flags(resolver, version.release) {
        tracing::warn!(
            "Go compiler version {} does not support the -{} flag, ignoring it",
            version,
            flag
        );
    }
}

/// Plan one task per platform and package and run them all.
pub fn run_tasks(
    opts: &BuildOptions,
    resolver: &CompatibilityResolver,
    template: &OutputTemplate,
    version: ToolchainVersion,
    platforms: &[Platform],
    packages: &[String],
    runner: &dyn TaskRunner,
) -> Result<CrossBuild> {
    let base_dir = std::env::current_dir().context("failed to read the current directory")?;
    run_tasks_in(opts, resolver, template, version, platforms, packages, runner, &base_dir)
}

#[allow(clippy::too_many_arguments)]
fn run_tasks_in(
    opts: &BuildOptions,
    resolver: &CompatibilityResolver,
    template: &OutputTemplate,
    version: ToolchainVersion,
    platforms: &[Platform],
    packages: &[String],
    runner: &dyn TaskRunner,
    base_dir: &Path,
) -> Result<CrossBuild> {
    let tasks = TaskPlanner::new(resolver, version.release, &opts.compile, template)
        .cgo(opts.cgo)
        .env(HostEnv::capture())
        .base_dir(base_dir)
        .plan(platforms, packages);

    let parallelism = opts.parallelism();
    tracing::info!("Number of parallel builds: {}", parallelism);

    let progress = if opts.progress {
        progress_bar(tasks.len())
    } else {
        ProgressBar::hidden()
    };

    let start = Instant::now();
    let report = BuildOrchestrator::new(runner, parallelism)
        .with_progress(progress)
        .run(&tasks)?;

    Ok(CrossBuild {
        version,
        parallelism,
        tasks,
        report,
        duration: start.elapsed(),
    })
}

fn progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Output paths of the successful tasks, in task order.
pub fn built_outputs(build: &CrossBuild) -> Vec<PathBuf> {
    build
        .report
        .results
        .iter()
        .filter(|r| r.state() == TaskState::Succeeded)
        .filter_map(|r| build.output_for(&r.platform, &r.package_path))
        .map(Path::to_path_buf)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use anyhow::bail;

    use crate::core::release::ReleaseIdentifier;

    /// Records every task and fails the ones for `fail_os`.
    #[derive(Default)]
    struct RecordingRunner {
        seen: Mutex<Vec<String>>,
        fail_os: Option<&'static str>,
    }

    impl TaskRunner for RecordingRunner {
        fn run(&self, task: &BuildTask) -> Result<()> {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{} {}", task.platform, task.command_args().join(" ")));
            if self.fail_os == Some(task.platform.os.as_str()) {
                bail!("exit status: 1\nStderr: boom");
            }
            Ok(())
        }
    }

    fn version(raw: &str) -> ToolchainVersion {
        ToolchainVersion::parse(raw)
    }

    #[test]
    fn test_select_platforms_os_filter() {
        let resolver = CompatibilityResolver::builtin().unwrap();
        let opts = BuildOptions {
            os: vec!["linux".to_string()],
            ..Default::default()
        };
        let filter = opts.platform_filter().unwrap();

        let platforms = select_platforms(&opts, &resolver, &filter, &version("go1.6")).unwrap();
        assert!(!platforms.is_empty());
        assert!(platforms.iter().all(|p| p.os == "linux"));
        assert!(platforms.iter().any(|p| p.arch == "mips64"));
    }

    #[test]
    fn test_no_platforms_error() {
        let resolver = CompatibilityResolver::builtin().unwrap();
        let opts = BuildOptions {
            os: vec!["beos".to_string()],
            ..Default::default()
        };
        let filter = opts.platform_filter().unwrap();

        let err = select_platforms(&opts, &resolver, &filter, &version("go1.20.1")).unwrap_err();
        match err {
            GoxError::NoPlatforms { version, filters } => {
                assert_eq!(version, "go1.20.1");
                assert_eq!(filters, vec!["--os=\"beos\""]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_invalid_osarch_rejected() {
        let opts = BuildOptions {
            osarch: vec!["linux".to_string()],
            ..Default::default()
        };
        assert!(opts.platform_filter().is_err());
    }

    #[test]
    fn test_invalid_template_rejected() {
        let opts = BuildOptions {
            output: "{{.Version}}".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            opts.output_template(),
            Err(GoxError::InvalidOutputTemplate { .. })
        ));
    }

    #[test]
    fn test_parallelism_defaults() {
        let mut opts = BuildOptions::default();
        assert!(opts.parallelism() >= 1);
        opts.parallel = Some(0);
        assert!(opts.parallelism() >= 1);
        opts.parallel = Some(5);
        assert_eq!(opts.parallelism(), 5);
    }

    #[test]
    fn test_run_tasks_reports_every_outcome() {
        let resolver = CompatibilityResolver::builtin().unwrap();
        let opts = BuildOptions {
            parallel: Some(2),
            compile: CompileOptions {
                cover: true,
                trim_path: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let template = opts.output_template().unwrap();
        let platforms = vec![
            Platform::new("linux", "amd64", true),
            Platform::new("darwin", "amd64", true),
            Platform::new("windows", "amd64", true),
        ];
        let packages = vec!["example.com/a".to_string(), "example.com/b".to_string()];
        let runner = RecordingRunner {
            fail_os: Some("windows"),
            ..Default::default()
        };

        let build = run_tasks_in(
            &opts,
            &resolver,
            &template,
            version("go1.19.2"),
            &platforms,
            &packages,
            &runner,
            Path::new("/work"),
        )
        .unwrap();

        assert_eq!(build.version.release, Some(ReleaseIdentifier::new(1, 19)));
        assert_eq!(build.parallelism, 2);
        assert_eq!(build.tasks.len(), 6);
        assert_eq!(build.report.results.len(), 6);
        assert_eq!(runner.seen.lock().unwrap().len(), 6);

        // -cover needs 1.20, -trimpath only 1.13
        assert!(runner
            .seen
            .lock()
            .unwrap()
            .iter()
            .all(|line| line.contains("-trimpath") && !line.contains("-cover")));

        assert_eq!(
            build.output_for(&platforms[2], "example.com/b"),
            Some(Path::new("/work/b_windows_amd64.exe"))
        );
        assert_eq!(built_outputs(&build).len(), 4);

        match build.into_result() {
            Err(GoxError::BuildFailed { failures }) => {
                assert_eq!(failures.len(), 2);
                assert!(failures.iter().all(|f| f.platform.os == "windows"));
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.results.len())),
        }
    }
}
