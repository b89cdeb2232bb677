//! Cross build machinery.
//!
//! Turns selected platforms and packages into `go build` tasks and runs
//! them through a bounded worker pool.

pub mod args;
pub mod env;
pub mod events;
pub mod orchestrator;
pub mod output;
pub mod plan;
pub mod task;
pub mod toolchain;

pub use args::{BuildArgFlags, CompileOptions};
pub use env::HostEnv;
pub use events::BuildEvent;
pub use orchestrator::{default_parallelism, BuildOrchestrator, TaskRunner};
pub use output::{OutputTemplate, DEFAULT_OUTPUT_TEMPLATE};
pub use plan::TaskPlanner;
pub use task::{BuildFailure, BuildReport, BuildResult, BuildTask, TaskOutcome, TaskState};
pub use toolchain::{GoToolchain, ToolchainVersion};
