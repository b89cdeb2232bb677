//! Bounded parallel execution of build tasks.
//!
//! Every task runs exactly once on a fixed-size worker pool. A failed task
//! never stops its siblings; failures are collected and reported together
//! once every task has finished.

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::builder::task::{
    BuildFailure, BuildReport, BuildResult, BuildTask, TaskOutcome, TaskState,
};
use crate::core::platform::{os, Platform};

/// Worker count on Solaris-derived hosts, which tend to report far more
/// cores than a build can use (zones report the whole machine).
pub const SOLARIS_PARALLELISM: usize = 3;

/// Runs a single build task. An error carries the diagnostic text.
pub trait TaskRunner: Send + Sync {
    fn run(&self, task: &BuildTask) -> Result<()>;
}

/// Default worker count for a host: one less than the CPU count, at least
/// one, and a fixed low value on Solaris and illumos.
pub fn default_parallelism(host_os: &str, cpus: usize) -> usize {
    if host_os == os::SOLARIS || host_os == os::ILLUMOS {
        return SOLARIS_PARALLELISM;
    }
    cpus.saturating_sub(1).max(1)
}

/// [`default_parallelism`] for the current host.
pub fn host_parallelism() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    default_parallelism(&Platform::host().os, cpus)
}

/// Every `(platform, package)` pair, platforms outermost.
pub fn cross_product<'a>(
    platforms: &'a [Platform],
    packages: &'a [String],
) -> Vec<(&'a Platform, &'a str)> {
    platforms
        .iter()
        .flat_map(|platform| packages.iter().map(move |pkg| (platform, pkg.as_str())))
        .collect()
}

/// Runs build tasks through a bounded worker pool.
pub struct BuildOrchestrator<'a> {
    runner: &'a dyn TaskRunner,
    parallelism: usize,
    progress: ProgressBar,
    states: Mutex<Vec<TaskState>>,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(runner: &'a dyn TaskRunner, parallelism: usize) -> Self {
        BuildOrchestrator {
            runner,
            parallelism: parallelism.max(1),
            progress: ProgressBar::hidden(),
            states: Mutex::new(Vec::new()),
        }
    }

    /// Tick `progress` once per finished task.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// State of every task of the current or last run, in task order.
    pub fn states(&self) -> Vec<TaskState> {
        self.lock_states().clone()
    }

    /// Run every task to completion and collect the outcomes.
    ///
    /// Results are in task order; failures are in completion order.
    pub fn run(&self, tasks: &[BuildTask]) -> Result<BuildReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.parallelism)
            .thread_name(|i| format!("gox-build-{}", i))
            .build()
            .context("failed to start build workers")?;

        self.progress.set_length(tasks.len() as u64);
        *self.lock_states() = vec![TaskState::Pending; tasks.len()];

        let failures = Mutex::new(Vec::new());
        let results: Vec<BuildResult> = pool.install(|| {
            tasks
                .par_iter()
                .enumerate()
                .map(|(index, task)| self.run_task(index, task, &failures))
                .collect()
        });

        self.progress.finish_and_clear();

        let failures = failures.into_inner().unwrap_or_else(PoisonError::into_inner);
        Ok(BuildReport { results, failures })
    }

    fn run_task(
        &self,
        index: usize,
        task: &BuildTask,
        failures: &Mutex<Vec<BuildFailure>>,
    ) -> BuildResult {
        // keep log lines off the progress bar's line
        self.progress.suspend(|| {
            tracing::info!("--> {:>15}: {}", task.platform.to_string(), task.package_path)
        });
        self.transition(index, TaskState::Running);

        let outcome = match self.runner.run(task) {
            Ok(()) => TaskOutcome::Success,
            Err(e) => {
                let message = format!("{:#}", e);
                tracing::debug!("{} failed: {}", task.platform, message);
                failures
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(BuildFailure {
                        platform: task.platform.clone(),
                        package_path: task.package_path.clone(),
                        message: message.clone(),
                    });
                TaskOutcome::Failure(message)
            }
        };

        let result = BuildResult {
            platform: task.platform.clone(),
            package_path: task.package_path.clone(),
            outcome,
        };
        self.transition(index, result.state());
        self.progress.inc(1);

        result
    }

    /// Advance task `index` and show how many tasks are running.
    fn transition(&self, index: usize, next: TaskState) {
        let mut states = self.lock_states();
        if let Some(state) = states.get_mut(index) {
            match state.advance(next) {
                Some(advanced) => *state = advanced,
                None => tracing::debug!("Task {} cannot move from {:?} to {:?}", index, state, next),
            }
        }

        let running = states.iter().filter(|s| **s == TaskState::Running).count();
        self.progress.set_message(format!("{} running", running));
    }

    fn lock_states(&self) -> MutexGuard<'_, Vec<TaskState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
