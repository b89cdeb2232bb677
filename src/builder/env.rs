//! Per-target environment for `go build`.
//!
//! Besides `GOOS`/`GOARCH`, a target gets cgo switched on or off, optional
//! C/C++ compilers, and Go experiments. A handful of values can also be
//! overridden for one target through `GOX_<OS>_<ARCH>_<NAME>` variables.

use std::collections::HashMap;

use crate::core::platform::Platform;

/// Prefix of per-target override variables.
pub const OVERRIDE_PREFIX: &str = "GOX";

const COVERAGE_EXPERIMENT: &str = "coverageredesign";

/// Snapshot of the process environment.
#[derive(Debug, Clone, Default)]
pub struct HostEnv {
    vars: HashMap<String, String>,
}

impl HostEnv {
    /// Capture the current process environment.
    pub fn capture() -> Self {
        HostEnv {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        HostEnv {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Values that can be overridden per target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideKind {
    LdFlags,
    GcFlags,
    AsmFlags,
    Cc,
    Cxx,
}

impl OverrideKind {
    pub const ALL: [OverrideKind; 5] = [
        OverrideKind::LdFlags,
        OverrideKind::GcFlags,
        OverrideKind::AsmFlags,
        OverrideKind::Cc,
        OverrideKind::Cxx,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            OverrideKind::LdFlags => "LDFLAGS",
            OverrideKind::GcFlags => "GCFLAGS",
            OverrideKind::AsmFlags => "ASMFLAGS",
            OverrideKind::Cc => "CC",
            OverrideKind::Cxx => "CXX",
        }
    }

    /// `GOX_<OS>_<ARCH>_<SUFFIX>` for `platform`.
    pub fn variable(self, platform: &Platform) -> String {
        format!(
            "{}_{}_{}_{}",
            OVERRIDE_PREFIX,
            platform.os.to_uppercase(),
            platform.arch.to_uppercase(),
            self.suffix()
        )
    }
}

/// Base values subject to per-target override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetOverrides {
    pub ld_flags: String,
    pub gc_flags: String,
    pub asm_flags: String,
    pub cc: String,
    pub cxx: String,
}

impl TargetOverrides {
    fn slot(&mut self, kind: OverrideKind) -> &mut String {
        match kind {
            OverrideKind::LdFlags => &mut self.ld_flags,
            OverrideKind::GcFlags => &mut self.gc_flags,
            OverrideKind::AsmFlags => &mut self.asm_flags,
            OverrideKind::Cc => &mut self.cc,
            OverrideKind::Cxx => &mut self.cxx,
        }
    }

    /// These values with any override variables for `platform` applied.
    pub fn for_platform(&self, platform: &Platform, env: &HostEnv) -> TargetOverrides {
        let mut resolved = self.clone();
        for kind in OverrideKind::ALL {
            let var = kind.variable(platform);
            if let Some(value) = env.get(&var) {
                tracing::debug!("{}: using {} from {}", platform, kind.suffix(), var);
                *resolved.slot(kind) = value.to_string();
            }
        }
        resolved
    }
}

/// Whether cgo is enabled for `target`.
///
/// An explicit request always wins. Otherwise `CGO_ENABLED=0` in the
/// environment disables it, and it is only enabled for native builds.
pub fn cgo_enabled(explicit: bool, target: &Platform, host: &Platform, env: &HostEnv) -> bool {
    if explicit {
        return true;
    }
    if env.get("CGO_ENABLED") == Some("0") {
        return false;
    }
    target.same_target(host)
}

/// `GOEXPERIMENT` entries: the inherited ones plus coverage instrumentation
/// when `-cover` is in effect.
pub fn experiments(cover: bool, env: &HostEnv) -> Vec<String> {
    let mut exp: Vec<String> = env
        .get("GOEXPERIMENT")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect();

    if cover && !exp.iter().any(|e| e == COVERAGE_EXPERIMENT) {
        exp.push(COVERAGE_EXPERIMENT.to_string());
    }
    exp
}

/// Variables set on top of the inherited environment, in a fixed order.
pub fn build_environment(
    platform: &Platform,
    cgo: bool,
    cc: &str,
    cxx: &str,
    experiments: &[String],
) -> Vec<(String, String)> {
    let mut env = vec![
        ("GOOS".to_string(), platform.os.clone()),
        ("GOARCH".to_string(), platform.arch.clone()),
    ];

    if !cc.is_empty() {
        env.push(("CC".to_string(), cc.to_string()));
    }
    if !cxx.is_empty() {
        env.push(("CXX".to_string(), cxx.to_string()));
    }

    let cgo = if cgo { "1" } else { "0" };
    env.push(("CGO_ENABLED".to_string(), cgo.to_string()));

    if !experiments.is_empty() {
        env.push(("GOEXPERIMENT".to_string(), experiments.join(",")));
    }

    env
}
