//! gox CLI - parallel cross compilation for Go

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gox::util::diagnostic::emit;
use gox::GoxError;

mod cli;
mod commands;

use cli::Cli;

fn main() {
    if let Err(e) = run() {
        match e.downcast_ref::<GoxError>() {
            Some(err) => emit(&err.to_diagnostic(), std::io::stderr().is_terminal()),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("gox=debug")
    } else {
        EnvFilter::new("gox=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if cli.osarch_list {
        commands::osarch_list::execute(cli)
    } else {
        commands::build::execute(cli)
    }
}
