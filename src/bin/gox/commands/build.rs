//! `gox [PACKAGES]...` - the cross build

use std::io::IsTerminal;

use anyhow::Result;

use crate::cli::{Cli, MessageFormat};
use gox::builder::{BuildEvent, CompileOptions, DEFAULT_OUTPUT_TEMPLATE};
use gox::ops::gox_build::{build, built_outputs, BuildOptions, CrossBuild};

/// Command-line lists win; otherwise the configured list, if any.
fn lists(flag: Vec<String>, config: Option<String>) -> Vec<String> {
    if flag.is_empty() {
        config.into_iter().collect()
    } else {
        flag
    }
}

pub fn execute(cli: Cli) -> Result<()> {
    let config = super::current_config()?;
    let json = cli.message_format == MessageFormat::Json;

    let packages = if cli.packages.is_empty() {
        vec![".".to_string()]
    } else {
        cli.packages
    };

    let opts = BuildOptions {
        packages,
        os: lists(cli.os, config.build.os.clone()),
        arch: lists(cli.arch, config.build.arch.clone()),
        osarch: lists(cli.osarch, config.build.osarch.clone()),
        output: cli
            .output
            .or_else(|| config.build.output.clone())
            .unwrap_or_else(|| DEFAULT_OUTPUT_TEMPLATE.to_string()),
        parallel: cli.parallel.or(config.build.parallel),
        gocmd: super::gocmd(cli.gocmd, &config),
        cgo: cli.cgo || config.build.cgo.unwrap_or(false),
        compile: CompileOptions::from(cli.go_build),
        progress: !json && !cli.verbose && std::io::stderr().is_terminal(),
    };

    let result = build(&opts)?;

    if json {
        emit_events(&result);
    }

    for output in built_outputs(&result) {
        tracing::debug!("Built {}", output.display());
    }

    result.into_result()?;
    Ok(())
}

fn emit_events(result: &CrossBuild) {
    println!(
        "{}",
        BuildEvent::started(
            result.version.raw.clone(),
            result.parallelism,
            result.tasks.len()
        )
        .to_json()
    );

    for r in &result.report.results {
        let output = result
            .output_for(&r.platform, &r.package_path)
            .map(|p| p.to_path_buf());
        println!("{}", BuildEvent::task(r, output).to_json());
    }

    println!(
        "{}",
        BuildEvent::finished(
            result.report.succeeded(),
            result.report.failures.len(),
            result.duration.as_millis() as u64
        )
        .to_json()
    );
}
