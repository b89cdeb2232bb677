//! Turning platforms and packages into build tasks.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::builder::args::CompileOptions;
use crate::builder::env::{build_environment, cgo_enabled, experiments, HostEnv, TargetOverrides};
use crate::builder::orchestrator::cross_product;
use crate::builder::output::OutputTemplate;
use crate::builder::task::BuildTask;
use crate::core::platform::{os, Platform};
use crate::core::release::ReleaseIdentifier;
use crate::resolver::flags::names;
use crate::resolver::CompatibilityResolver;

/// `/c_/` at the start of an outside-the-tree import path on Windows.
static WINDOWS_DRIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([a-zA-Z])_/").unwrap());

/// Where to run `go build` for a package, and what to pass as the package.
///
/// `go list` reports packages outside GOPATH and any module as `_` followed
/// by their directory. Those are built from inside that directory with no
/// package argument.
pub fn package_location(import_path: &str, host_os: &str) -> (Option<PathBuf>, String) {
    let Some(dir) = import_path.strip_prefix('_') else {
        return (None, import_path.to_string());
    };

    let dir = if host_os == os::WINDOWS {
        WINDOWS_DRIVE_RE
            .replace(dir, "${1}:\\")
            .replace('/', "\\")
    } else {
        dir.to_string()
    };

    (Some(PathBuf::from(dir)), String::new())
}

/// Builds one [`BuildTask`] per platform and package.
pub struct TaskPlanner<'a> {
    resolver: &'a CompatibilityResolver,
    release: Option<ReleaseIdentifier>,
    options: &'a CompileOptions,
    template: &'a OutputTemplate,
    cgo: bool,
    cc: String,
    cxx: String,
    host: Platform,
    env: HostEnv,
    base_dir: PathBuf,
}

impl<'a> TaskPlanner<'a> {
    pub fn new(
        resolver: &'a CompatibilityResolver,
        release: Option<ReleaseIdentifier>,
        options: &'a CompileOptions,
        template: &'a OutputTemplate,
    ) -> Self {
        TaskPlanner {
            resolver,
            release,
            options,
            template,
            cgo: false,
            cc: String::new(),
            cxx: String::new(),
            host: Platform::host(),
            env: HostEnv::default(),
            base_dir: PathBuf::new(),
        }
    }

    /// Force cgo on for every target.
    pub fn cgo(mut self, cgo: bool) -> Self {
        self.cgo = cgo;
        self
    }

    /// The platform gox runs on.
    pub fn host(mut self, host: Platform) -> Self {
        self.host = host;
        self
    }

    /// Environment consulted for cgo and per-target overrides.
    pub fn env(mut self, env: HostEnv) -> Self {
        self.env = env;
        self
    }

    /// Directory relative output paths are resolved against.
    pub fn base_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.base_dir = dir.as_ref().to_path_buf();
        self
    }

    /// One task per `(platform, package)` pair, platforms outermost.
    pub fn plan(&self, platforms: &[Platform], packages: &[String]) -> Vec<BuildTask> {
        cross_product(platforms, packages)
            .into_iter()
            .map(|(platform, package)| self.task(platform, package))
            .collect()
    }

    pub fn task(&self, platform: &Platform, package: &str) -> BuildTask {
        let base = TargetOverrides {
            ld_flags: self.options.ld_flags.clone(),
            gc_flags: self.options.gc_flags.clone(),
            asm_flags: self.options.asm_flags.clone(),
            cc: self.cc.clone(),
            cxx: self.cxx.clone(),
        };
        let resolved = base.for_platform(platform, &self.env);

        let options = CompileOptions {
            ld_flags: resolved.ld_flags,
            gc_flags: resolved.gc_flags,
            asm_flags: resolved.asm_flags,
            ..self.options.clone()
        };
        let args = options.arguments(self.resolver, self.release);

        let cover = options.cover && self.resolver.is_flag_supported(names::COVER, self.release);
        let cgo = cgo_enabled(self.cgo, platform, &self.host, &self.env);
        let env = build_environment(
            platform,
            cgo,
            &resolved.cc,
            &resolved.cxx,
            &experiments(cover, &self.env),
        );

        let output = self.base_dir.join(self.template.output_path(package, platform));
        let (cwd, package_arg) = package_location(package, &self.host.os);

        BuildTask {
            package_path: package.to_string(),
            platform: platform.clone(),
            args,
            env,
            output,
            cwd,
            package_arg,
        }
    }
}
