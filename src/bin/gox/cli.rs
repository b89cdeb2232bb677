//! CLI definitions using clap.

use clap::{Args, Parser, ValueEnum};

use gox::builder::CompileOptions;

const AFTER_HELP: &str = "\
Output path template:
  The value of --output is a template with the variables {{.Dir}} (last
  element of the package path), {{.OS}} and {{.Arch}}. Windows binaries get
  an .exe suffix.

Platforms (OS/Arch):
  --os and --arch take space separated GOOS/GOARCH values. Prefix a value
  with ! to exclude it. If a list only has exclusions, they are taken from
  the default platforms. --osarch takes complete os/arch pairs, which may
  also be negated, and has the highest precedence.

Platform overrides:
  GOX_[OS]_[ARCH]_GCFLAGS, GOX_[OS]_[ARCH]_LDFLAGS, GOX_[OS]_[ARCH]_ASMFLAGS,
  GOX_[OS]_[ARCH]_CC and GOX_[OS]_[ARCH]_CXX replace the corresponding value
  for that platform only.";

/// gox - cross-compile Go applications in parallel
///
/// If no operating systems or architectures are given, gox builds for every
/// default pair supported by the installed Go.
#[derive(Parser)]
#[command(name = "gox")]
#[command(author, version, about, long_about = None, after_help = AFTER_HELP)]
pub struct Cli {
    /// Packages to build (defaults to the current directory)
    #[arg(value_name = "PACKAGES")]
    pub packages: Vec<String>,

    /// Space separated list of operating systems to build for
    #[arg(long, value_name = "LIST")]
    pub os: Vec<String>,

    /// Space separated list of architectures to build for
    #[arg(long, value_name = "LIST")]
    pub arch: Vec<String>,

    /// Space separated list of os/arch pairs to build for
    #[arg(long, value_name = "LIST")]
    pub osarch: Vec<String>,

    /// List supported os/arch pairs for your Go version
    #[arg(long)]
    pub osarch_list: bool,

    /// Output path template
    #[arg(short, long, value_name = "TEMPLATE")]
    pub output: Option<String>,

    /// Number of parallel builds (defaults to the number of CPUs minus one)
    #[arg(short, long, value_name = "N")]
    pub parallel: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Go command to build with
    #[arg(long, value_name = "CMD", env = "GOX_GOCMD")]
    pub gocmd: Option<String>,

    /// Set CGO_ENABLED=1 for every target; requires a C toolchain
    #[arg(long)]
    pub cgo: bool,

    /// Output format for build results
    #[arg(long, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(flatten)]
    pub go_build: GoBuildArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

/// Options handed through to `go build` when the installed Go supports them.
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "go build options")]
pub struct GoBuildArgs {
    /// Passed to go build flag -C: change to dir before running the command
    #[arg(long, value_name = "DIR")]
    pub change_dir: Option<String>,

    /// Passed to go build flag -a: force rebuilding of packages that are up to date
    #[arg(long)]
    pub rebuild: bool,

    /// Passed to go build flag -race; requires cgo
    #[arg(long)]
    pub race: bool,

    /// Passed to go build flag -msan
    #[arg(long)]
    pub msan: bool,

    /// Passed to go build flag -asan
    #[arg(long)]
    pub asan: bool,

    /// Passed to go build flag -cover
    #[arg(long)]
    pub cover: bool,

    /// Passed to go build flag -coverpkg
    #[arg(long, value_name = "PATTERNS")]
    pub coverpkg: Option<String>,

    /// Passed to go build flag -asmflags
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub asmflags: Option<String>,

    /// Passed to go build flag -buildmode
    #[arg(long, value_name = "MODE")]
    pub buildmode: Option<String>,

    /// Passed to go build flag -buildvcs
    #[arg(long, value_name = "VALUE")]
    pub buildvcs: Option<String>,

    /// Passed to go build flag -compiler
    #[arg(long, value_name = "NAME")]
    pub compiler: Option<String>,

    /// Passed to go build flag -gccgoflags
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub gccgoflags: Option<String>,

    /// Passed to go build flag -gcflags
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub gcflags: Option<String>,

    /// Passed to go build flag -installsuffix
    #[arg(long, value_name = "SUFFIX")]
    pub installsuffix: Option<String>,

    /// Passed to go build flag -ldflags
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub ldflags: Option<String>,

    /// Passed to go build flag -linkshared
    #[arg(long)]
    pub linkshared: bool,

    /// Passed to go build flag -mod
    #[arg(long = "mod", value_name = "MODE")]
    pub mod_mode: Option<String>,

    /// Passed to go build flag -modcacherw
    #[arg(long)]
    pub modcacherw: bool,

    /// Passed to go build flag -modfile
    #[arg(long, value_name = "FILE")]
    pub modfile: Option<String>,

    /// Passed to go build flag -overlay
    #[arg(long, value_name = "FILE")]
    pub overlay: Option<String>,

    /// Passed to go build flag -pgo
    #[arg(long, value_name = "FILE")]
    pub pgo: Option<String>,

    /// Passed to go build flag -pkgdir
    #[arg(long, value_name = "DIR")]
    pub pkgdir: Option<String>,

    /// Passed to go build flag -tags
    #[arg(long, value_name = "TAGS")]
    pub tags: Option<String>,

    /// Passed to go build flag -trimpath: remove file system paths from the executable
    #[arg(long)]
    pub trimpath: bool,
}

impl From<GoBuildArgs> for CompileOptions {
    fn from(args: GoBuildArgs) -> Self {
        CompileOptions {
            change_dir: args.change_dir.unwrap_or_default(),
            rebuild: args.rebuild,
            race: args.race,
            msan: args.msan,
            asan: args.asan,
            cover: args.cover,
            cover_pkg: args.coverpkg.unwrap_or_default(),
            asm_flags: args.asmflags.unwrap_or_default(),
            build_mode: args.buildmode.unwrap_or_default(),
            build_vcs: args.buildvcs.unwrap_or_default(),
            compiler: args.compiler.unwrap_or_default(),
            gccgo_flags: args.gccgoflags.unwrap_or_default(),
            gc_flags: args.gcflags.unwrap_or_default(),
            install_suffix: args.installsuffix.unwrap_or_default(),
            ld_flags: args.ldflags.unwrap_or_default(),
            link_shared: args.linkshared,
            mod_mode: args.mod_mode.unwrap_or_default(),
            mod_cache_rw: args.modcacherw,
            mod_file: args.modfile.unwrap_or_default(),
            overlay: args.overlay.unwrap_or_default(),
            pgo: args.pgo.unwrap_or_default(),
            pkg_dir: args.pkgdir.unwrap_or_default(),
            tags: args.tags.unwrap_or_default(),
            trim_path: args.trimpath,
        }
    }
}
