//! Loupe CLI binary.

use std::io::Write;
use std::process;

use anyhow::Context;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use loupe::cli::args::*;
use loupe::cli::commands::*;
use loupe::error::LoupeError;

fn main() {
    let args = LoupeArgs::parse();

    let log_level = match args.verbosity() {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        process::exit(exit_code(&e));
    }
}

fn run(args: LoupeArgs) -> anyhow::Result<()> {
    let command = args.command.name();
    execute_command(args).with_context(|| format!("loupe {command} failed"))
}

/// 2 for errors caused by the request, 1 for everything else.
fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<LoupeError>() {
        Some(e) if e.is_client_error() => 2,
        _ => 1,
    }
}
