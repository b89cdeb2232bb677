//! `go build` argument construction.
//!
//! One [`CompileOptions`] record can be reused across toolchain versions:
//! options the installed release does not understand are left out instead
//! of failing the build.

use crate::core::release::ReleaseIdentifier;
use crate::resolver::flags::names;
use crate::resolver::CompatibilityResolver;

/// Options passed through to `go build`.
///
/// Field order is the order arguments are emitted in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// `-C`
    pub change_dir: String,
    /// `-a`
    pub rebuild: bool,
    pub race: bool,
    pub msan: bool,
    pub asan: bool,
    pub cover: bool,
    pub cover_pkg: String,
    pub asm_flags: String,
    pub build_mode: String,
    pub build_vcs: String,
    pub compiler: String,
    pub gccgo_flags: String,
    pub gc_flags: String,
    pub install_suffix: String,
    pub ld_flags: String,
    pub link_shared: bool,
    pub mod_mode: String,
    pub mod_cache_rw: bool,
    pub mod_file: String,
    pub overlay: String,
    pub pgo: String,
    pub pkg_dir: String,
    pub tags: String,
    pub trim_path: bool,
}

/// How an option is rendered on the command line.
#[derive(Debug, Clone, Copy)]
enum OptionValue<'a> {
    /// `-name`
    Bool(bool),
    /// `-name=value`
    Str(&'a str),
    /// `-name="value"`, keeping spaces inside the value together
    Words(&'a str),
}

impl OptionValue<'_> {
    fn is_set(&self) -> bool {
        match self {
            OptionValue::Bool(b) => *b,
            OptionValue::Str(s) | OptionValue::Words(s) => !s.is_empty(),
        }
    }
}

impl CompileOptions {
    fn entries(&self) -> [(&'static str, OptionValue<'_>); 24] {
        use OptionValue::{Bool, Str, Words};
        [
            (names::CHANGE_DIR, Str(&self.change_dir)),
            (names::REBUILD, Bool(self.rebuild)),
            (names::RACE, Bool(self.race)),
            (names::MSAN, Bool(self.msan)),
            (names::ASAN, Bool(self.asan)),
            (names::COVER, Bool(self.cover)),
            (names::COVER_PKG, Str(&self.cover_pkg)),
            (names::ASM_FLAGS, Words(&self.asm_flags)),
            (names::BUILD_MODE, Str(&self.build_mode)),
            (names::BUILD_VCS, Str(&self.build_vcs)),
            (names::COMPILER, Str(&self.compiler)),
            (names::GCCGO_FLAGS, Words(&self.gccgo_flags)),
            (names::GC_FLAGS, Words(&self.gc_flags)),
            (names::INSTALL_SUFFIX, Str(&self.install_suffix)),
            (names::LD_FLAGS, Words(&self.ld_flags)),
            (names::LINK_SHARED, Bool(self.link_shared)),
            (names::MOD, Str(&self.mod_mode)),
            (names::MOD_CACHE_RW, Bool(self.mod_cache_rw)),
            (names::MOD_FILE, Str(&self.mod_file)),
            (names::OVERLAY, Str(&self.overlay)),
            (names::PGO, Str(&self.pgo)),
            (names::PKG_DIR, Str(&self.pkg_dir)),
            (names::TAGS, Words(&self.tags)),
            (names::TRIM_PATH, Bool(self.trim_path)),
        ]
    }

    /// The `go build` arguments for `release`, in field order.
    pub fn arguments(
        &self,
        resolver: &CompatibilityResolver,
        release: Option<ReleaseIdentifier>,
    ) -> Vec<String> {
        let mut flags = BuildArgFlags::new(resolver, release);
        for (name, value) in self.entries() {
            match value {
                OptionValue::Bool(b) => flags.add_boolean(name, b),
                OptionValue::Str(s) => flags.add_string(name, s),
                OptionValue::Words(s) => flags.add_strings(name, s),
            }
        }
        flags.into_args()
    }

    /// Flags that are set but that `release` does not support.
    pub fn unsupported_flags(
        &self,
        resolver: &CompatibilityResolver,
        release: Option<ReleaseIdentifier>,
    ) -> Vec<&'static str> {
        self.entries()
            .into_iter()
            .filter(|(name, value)| value.is_set() && !resolver.is_flag_supported(name, release))
            .map(|(name, _)| name)
            .collect()
    }
}

/// Accumulates version-gated `go build` flags.
pub struct BuildArgFlags<'a> {
    resolver: &'a CompatibilityResolver,
    release: Option<ReleaseIdentifier>,
    args: Vec<String>,
}

impl<'a> BuildArgFlags<'a> {
    pub fn new(resolver: &'a CompatibilityResolver, release: Option<ReleaseIdentifier>) -> Self {
        BuildArgFlags {
            resolver,
            release,
            args: Vec::new(),
        }
    }

    fn supported(&self, name: &str) -> bool {
        self.resolver.is_flag_supported(name, self.release)
    }

    pub fn add_boolean(&mut self, name: &str, value: bool) {
        if value && self.supported(name) {
            self.args.push(format!("-{}", name));
        }
    }

    pub fn add_string(&mut self, name: &str, value: &str) {
        if !value.is_empty() && self.supported(name) {
            self.args.push(format!("-{}={}", name, value));
        }
    }

    /// Add a flag whose value may contain several space separated words.
    pub fn add_strings(&mut self, name: &str, value: &str) {
        if !value.is_empty() && self.supported(name) {
            self.args.push(format!("-{}=\"{}\"", name, value));
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_args(self) -> Vec<String> {
        self.args
    }
}
