//! Cross-compilation target platforms.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Go operating system values for `GOOS`.
pub mod os {
    pub const AIX: &str = "aix";
    pub const ANDROID: &str = "android";
    pub const DARWIN: &str = "darwin";
    pub const DRAGONFLY: &str = "dragonfly";
    pub const FREEBSD: &str = "freebsd";
    pub const ILLUMOS: &str = "illumos";
    pub const JS: &str = "js";
    pub const LINUX: &str = "linux";
    pub const NACL: &str = "nacl";
    pub const NETBSD: &str = "netbsd";
    pub const OPENBSD: &str = "openbsd";
    pub const PLAN9: &str = "plan9";
    pub const SOLARIS: &str = "solaris";
    pub const WINDOWS: &str = "windows";
}

/// Go architecture values for `GOARCH`.
pub mod arch {
    pub const X86: &str = "386";
    pub const AMD64: &str = "amd64";
    pub const AMD64P32: &str = "amd64p32";
    pub const ARM: &str = "arm";
    pub const ARM64: &str = "arm64";
    pub const LOONG64: &str = "loong64";
    pub const MIPS: &str = "mips";
    pub const MIPSLE: &str = "mipsle";
    pub const MIPS64: &str = "mips64";
    pub const MIPS64LE: &str = "mips64le";
    pub const PPC64: &str = "ppc64";
    pub const PPC64LE: &str = "ppc64le";
    pub const RISCV64: &str = "riscv64";
    pub const S390X: &str = "s390x";
    pub const WASM: &str = "wasm";
}

/// An OS/architecture pair that can be built against.
///
/// Identity is the `(os, arch)` pair; `default` only says whether the
/// platform is built when the user gives no OS or architecture filters.
/// Popular, generally useful targets are defaults. Rare ones (Android,
/// Plan 9, ...) must be asked for explicitly.
#[derive(Debug, Clone, Serialize)]
pub struct Platform {
    pub os: String,
    pub arch: String,
    pub default: bool,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>, default: bool) -> Self {
        Platform {
            os: os.into(),
            arch: arch.into(),
            default,
        }
    }

    /// Whether this platform has the same OS/arch pair as `other`.
    pub fn same_target(&self, other: &Platform) -> bool {
        self.os == other.os && self.arch == other.arch
    }

    /// Whether the target OS needs an `.exe` suffix on executables.
    pub fn needs_exe_suffix(&self) -> bool {
        self.os == os::WINDOWS
    }

    /// The platform the current process runs on, in Go's naming.
    pub fn host() -> Platform {
        Platform::new(
            go_os_name(std::env::consts::OS),
            go_arch_name(std::env::consts::ARCH, cfg!(target_endian = "little")),
            false,
        )
    }
}

impl PartialEq for Platform {
    fn eq(&self, other: &Self) -> bool {
        self.same_target(other)
    }
}

impl Eq for Platform {}

impl std::hash::Hash for Platform {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.os.hash(state);
        self.arch.hash(state);
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

impl FromStr for Platform {
    type Err = String;

    /// Parse an `os/arch` pair. The result is never a default platform.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((os, arch)) if !os.is_empty() && !arch.is_empty() && !arch.contains('/') => {
                Ok(Platform::new(os, arch, false))
            }
            _ => Err(format!("invalid os/arch pair '{}'; expected e.g. 'linux/amd64'", s)),
        }
    }
}

/// Map a Rust `std::env::consts::OS` value to its `GOOS` spelling.
pub fn go_os_name(rust_os: &str) -> &str {
    match rust_os {
        "macos" | "ios" => os::DARWIN,
        other => other,
    }
}

/// Map a Rust `std::env::consts::ARCH` value to its `GOARCH` spelling.
///
/// Rust names ppc64 and the mips family the same on both endiannesses;
/// Go adds an `le` suffix for little-endian.
pub fn go_arch_name(rust_arch: &str, little_endian: bool) -> &str {
    match (rust_arch, little_endian) {
        ("x86", _) => arch::X86,
        ("x86_64", _) => arch::AMD64,
        ("aarch64", _) => arch::ARM64,
        ("loongarch64", _) => arch::LOONG64,
        ("powerpc64", false) => arch::PPC64,
        ("powerpc64", true) => arch::PPC64LE,
        ("mips", false) => arch::MIPS,
        ("mips", true) => arch::MIPSLE,
        ("mips64", false) => arch::MIPS64,
        ("mips64", true) => arch::MIPS64LE,
        ("s390x", _) => arch::S390X,
        ("wasm32", _) => arch::WASM,
        (other, _) => other,
    }
}
