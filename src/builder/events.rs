//! Build event types for JSON output.
//!
//! These events are emitted, one JSON object per line, when using
//! `--message-format=json`.
//!
//! # Event Types
//!
//! - `build-started`: toolchain version and task count, before any task runs
//! - `task-finished`: one per task, success or failure
//! - `build-finished`: once, after every task has finished
//!
//! # Stability
//!
//! New fields may be added, but existing fields should not be removed or
//! renamed.

use std::path::PathBuf;

use serde::Serialize;

use crate::builder::task::{BuildResult, TaskOutcome};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    #[serde(rename = "build-started")]
    BuildStarted {
        /// Version string reported by the toolchain
        #[serde(skip_serializing_if = "Option::is_none")]
        go_version: Option<String>,
        /// Number of parallel builds
        parallel: usize,
        /// Number of tasks that will run
        tasks: usize,
    },

    #[serde(rename = "task-finished")]
    TaskFinished {
        /// Target as `os/arch`
        platform: String,
        /// Import path of the package
        package: String,
        success: bool,
        /// Output binary, on success
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<PathBuf>,
        /// Diagnostic text, on failure
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    #[serde(rename = "build-finished")]
    BuildFinished {
        success: bool,
        /// Total build duration in milliseconds
        duration_ms: u64,
        succeeded: usize,
        failed: usize,
    },
}

impl BuildEvent {
    pub fn started(go_version: Option<String>, parallel: usize, tasks: usize) -> Self {
        BuildEvent::BuildStarted {
            go_version,
            parallel,
            tasks,
        }
    }

    /// Event for a finished task whose binary was written to `output`.
    pub fn task(result: &BuildResult, output: Option<PathBuf>) -> Self {
        let (success, output, message) = match &result.outcome {
            TaskOutcome::Success => (true, output, None),
            TaskOutcome::Failure(message) => (false, None, Some(message.clone())),
        };
        BuildEvent::TaskFinished {
            platform: result.platform.to_string(),
            package: result.package_path.clone(),
            success,
            output,
            message,
        }
    }

    pub fn finished(succeeded: usize, failed: usize, duration_ms: u64) -> Self {
        BuildEvent::BuildFinished {
            success: failed == 0,
            duration_ms,
            succeeded,
            failed,
        }
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
