//! Build tasks and their outcomes.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::platform::Platform;

/// One `go build` invocation for a single package and platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTask {
    /// Import path as reported by `go list`.
    pub package_path: String,
    pub platform: Platform,
    /// Gated `go build` arguments, without `build`, `-o` or the package.
    pub args: Vec<String>,
    /// Variables set on top of the inherited environment.
    pub env: Vec<(String, String)>,
    /// Absolute output path.
    pub output: PathBuf,
    /// Working directory, for packages outside the module tree.
    pub cwd: Option<PathBuf>,
    /// Package argument passed to `go build`; empty when `cwd` is set.
    pub package_arg: String,
}

impl BuildTask {
    /// The full `go build` argument vector.
    pub fn command_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 4);
        args.push("build".to_string());
        args.extend(self.args.iter().cloned());
        args.push("-o".to_string());
        args.push(self.output.display().to_string());
        if !self.package_arg.is_empty() {
            args.push(self.package_arg.clone());
        }
        args
    }
}

/// Lifecycle of a task. Each task gets exactly one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }

    /// Move to `next`, or `None` when the transition is not allowed.
    pub fn advance(self, next: TaskState) -> Option<TaskState> {
        match (self, next) {
            (TaskState::Pending, TaskState::Running)
            | (TaskState::Running, TaskState::Succeeded)
            | (TaskState::Running, TaskState::Failed) => Some(next),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum TaskOutcome {
    Success,
    Failure(String),
}

/// What happened to one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    pub platform: Platform,
    pub package_path: String,
    pub outcome: TaskOutcome,
}

impl BuildResult {
    pub fn state(&self) -> TaskState {
        match self.outcome {
            TaskOutcome::Success => TaskState::Succeeded,
            TaskOutcome::Failure(_) => TaskState::Failed,
        }
    }
}

/// A failed task as listed in the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFailure {
    pub platform: Platform,
    pub package_path: String,
    pub message: String,
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.platform, self.message)
    }
}

/// Outcome of every task of one run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub results: Vec<BuildResult>,
    pub failures: Vec<BuildFailure>,
}

impl BuildReport {
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.results.len() - self.failures.len()
    }
}
