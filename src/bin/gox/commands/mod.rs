//! Command implementations

pub mod build;
pub mod osarch_list;

use anyhow::{Context, Result};

use gox::util::config::{global_config_path, load_config, project_config_path};
use gox::util::Config;

/// Global and project configuration for the current directory.
pub fn current_config() -> Result<Config> {
    let cwd = std::env::current_dir().context("failed to read the current directory")?;
    Ok(load_config(
        global_config_path().as_deref(),
        &project_config_path(&cwd),
    ))
}

/// Go command: flag, then config, then `go`.
pub fn gocmd(flag: Option<String>, config: &Config) -> String {
    flag.or_else(|| config.build.gocmd.clone())
        .unwrap_or_else(|| "go".to_string())
}
