//! CLI integration tests for gox.
//!
//! A small shell script stands in for `go`, so these run without a Go
//! installation. It answers `run` (the version probe), `env`, `list` and
//! `build`, and writes `$GOOS/$GOARCH` into every output it is asked for.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the gox binary command.
fn gox() -> Command {
    Command::cargo_bin("gox").unwrap()
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

#[cfg(unix)]
const FAKE_GO: &str = r#"#!/bin/sh
log() { [ -n "$FAKE_GO_LOG" ] && echo "$*" >> "$FAKE_GO_LOG"; return 0; }
case "$1" in
  run) printf '%s' "${FAKE_GO_VERSION:-go1.20.3}" ;;
  env)
    case "$2" in
      GOROOT) echo /usr/local/go ;;
      *) echo "${FAKE_GO_VERSION:-go1.20.3}" ;;
    esac ;;
  list) printf 'main|example.com/hello\nlib|example.com/hello/internal/greet\n' ;;
  build)
    log "$GOOS/$GOARCH CGO_ENABLED=$CGO_ENABLED $*"
    if [ "$GOOS" = "$FAKE_GO_FAIL_OS" ]; then
      echo "cmd/link: unsupported GOOS $GOOS" >&2
      exit 2
    fi
    while [ $# -gt 0 ]; do
      if [ "$1" = -o ]; then
        shift
        mkdir -p "$(dirname "$1")"
        echo "$GOOS/$GOARCH" > "$1"
      fi
      shift
    done ;;
  *) echo "unexpected go command: $*" >&2; exit 1 ;;
esac
"#;

/// Write the fake `go` into `dir` and return its path.
#[cfg(unix)]
fn fake_go(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-go");
    fs::write(&path, FAKE_GO).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// gox run in `dir` with the fake toolchain and an isolated home.
#[cfg(unix)]
fn gox_in(dir: &Path, go: &Path) -> Command {
    let mut cmd = gox();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("GOX_GOCMD")
        .env_remove("CGO_ENABLED")
        .env_remove("GOEXPERIMENT")
        .arg("--gocmd")
        .arg(go);
    cmd
}

// ============================================================================
// Help and argument errors
// ============================================================================

#[test]
fn test_help() {
    gox()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cross-compile Go applications"))
        .stdout(predicate::str::contains("--osarch-list"))
        .stdout(predicate::str::contains("GOX_[OS]_[ARCH]_LDFLAGS"));
}

#[test]
fn test_unknown_flag_fails() {
    gox().arg("--no-such-flag").assert().failure();
}

#[test]
fn test_missing_toolchain() {
    let tmp = temp_dir();

    gox()
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .args(["--gocmd", "gox-test-missing-go"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "`gox-test-missing-go` executable must be on the PATH",
        ));
}

// ============================================================================
// gox --osarch-list
// ============================================================================

#[cfg(unix)]
#[test]
fn test_osarch_list() {
    let tmp = temp_dir();
    let go = fake_go(tmp.path());

    gox_in(tmp.path(), &go)
        .arg("--osarch-list")
        .assert()
        .success()
        .stdout(predicate::str::contains("go1.20.3"))
        .stdout(predicate::str::contains("linux/amd64\t(default: true)"))
        .stdout(predicate::str::contains("android/arm64\t(default: false)"));
}

#[cfg(unix)]
#[test]
fn test_osarch_list_old_release() {
    let tmp = temp_dir();
    let go = fake_go(tmp.path());

    gox_in(tmp.path(), &go)
        .env("FAKE_GO_VERSION", "go1.4.3")
        .arg("--osarch-list")
        .assert()
        .success()
        .stdout(predicate::str::contains("nacl/amd64p32"))
        .stdout(predicate::str::contains("linux/arm64").not());
}

// ============================================================================
// gox [PACKAGES]
// ============================================================================

#[cfg(unix)]
#[test]
fn test_build_selected_pairs() {
    let tmp = temp_dir();
    let go = fake_go(tmp.path());

    gox_in(tmp.path(), &go)
        .args([
            "--osarch",
            "linux/amd64 windows/386",
            "--output",
            "dist/{{.Dir}}_{{.OS}}_{{.Arch}}",
            "-p",
            "2",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Number of parallel builds: 2"))
        .stderr(predicate::str::contains("linux/amd64: example.com/hello"));

    let linux = tmp.path().join("dist/hello_linux_amd64");
    let windows = tmp.path().join("dist/hello_windows_386.exe");
    assert_eq!(fs::read_to_string(linux).unwrap().trim(), "linux/amd64");
    assert_eq!(fs::read_to_string(windows).unwrap().trim(), "windows/386");
    assert!(!tmp.path().join("dist/hello_darwin_amd64").exists());
}

#[cfg(unix)]
#[test]
fn test_build_passes_gated_flags_and_env() {
    let tmp = temp_dir();
    let go = fake_go(tmp.path());
    let log = tmp.path().join("go.log");

    gox_in(tmp.path(), &go)
        .env("FAKE_GO_LOG", &log)
        .env("FAKE_GO_VERSION", "go1.19.8")
        .env("GOX_LINUX_ARM_LDFLAGS", "-s -w")
        .args([
            "--osarch",
            "linux/arm",
            "--trimpath",
            "--cover",
            "--ldflags=-X main.version=1",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("does not support the -cover flag"));

    let log = fs::read_to_string(log).unwrap();
    assert!(log.contains("linux/arm CGO_ENABLED=0"));
    assert!(log.contains("-ldflags=\"-s -w\""));
    assert!(log.contains("-trimpath"));
    assert!(!log.contains("-cover"));
    assert!(log.contains("example.com/hello"));
}

#[cfg(unix)]
#[test]
fn test_failed_target_is_reported_and_others_finish() {
    let tmp = temp_dir();
    let go = fake_go(tmp.path());

    gox_in(tmp.path(), &go)
        .env("FAKE_GO_FAIL_OS", "windows")
        .args(["--os", "linux windows", "--arch", "amd64"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("1 errors occurred"))
        .stderr(predicate::str::contains("windows/amd64 error"))
        .stderr(predicate::str::contains("unsupported GOOS windows"));

    assert!(tmp.path().join("hello_linux_amd64").exists());
    assert!(!tmp.path().join("hello_windows_amd64.exe").exists());
}

#[cfg(unix)]
#[test]
fn test_no_valid_platforms() {
    let tmp = temp_dir();
    let go = fake_go(tmp.path());
    let log = tmp.path().join("go.log");

    gox_in(tmp.path(), &go)
        .env("FAKE_GO_LOG", &log)
        .args(["--os", "beos"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no valid platforms to build for"));

    assert!(!log.exists());
}

#[cfg(unix)]
#[test]
fn test_invalid_output_template() {
    let tmp = temp_dir();
    let go = fake_go(tmp.path());

    gox_in(tmp.path(), &go)
        .args(["--output", "{{.Version}}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid output template"));
}

#[cfg(unix)]
#[test]
fn test_project_config_supplies_defaults() {
    let tmp = temp_dir();
    let go = fake_go(tmp.path());

    fs::create_dir_all(tmp.path().join(".gox")).unwrap();
    fs::write(
        tmp.path().join(".gox/config.toml"),
        r#"
[build]
osarch = "darwin/arm64"
output = "bin/{{.OS}}-{{.Arch}}/{{.Dir}}"
"#,
    )
    .unwrap();

    gox_in(tmp.path(), &go).assert().success();

    assert!(tmp.path().join("bin/darwin-arm64/hello").exists());
}

#[cfg(unix)]
#[test]
fn test_json_message_format() {
    let tmp = temp_dir();
    let go = fake_go(tmp.path());

    let output = gox_in(tmp.path(), &go)
        .env("FAKE_GO_FAIL_OS", "plan9")
        .args([
            "--osarch",
            "linux/arm64 plan9/386",
            "--message-format",
            "json",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(events.len(), 4);
    assert_eq!(events[0]["reason"], "build-started");
    assert_eq!(events[0]["tasks"], 2);

    let finished: Vec<_> = events
        .iter()
        .filter(|e| e["reason"] == "task-finished")
        .collect();
    assert_eq!(finished.len(), 2);
    assert!(finished
        .iter()
        .any(|e| e["platform"] == "plan9/386" && e["success"] == false));

    let last = &events[3];
    assert_eq!(last["reason"], "build-finished");
    assert_eq!(last["succeeded"], 1);
    assert_eq!(last["failed"], 1);
}
