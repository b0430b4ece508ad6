// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! shellflow: shell-script like workflow management system.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "shellflow",
    version,
    about = "shell-script like workflow management system"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a workflow
    Run(commands::run::RunArgs),
    /// Export the workflow DAG in DOT for visualization
    Dot(commands::dot::DotArgs),
    /// Write a file log (SHA-256, modification date, size) as JSON
    Filelog(commands::filelog::FilelogArgs),
    /// Show execution logs of past runs
    Viewlog(commands::viewlog::ViewlogArgs),
    /// Launch the flowscript interpreter
    Flowscript,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SHELLFLOW_LOG")
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => commands::run::run(args),
        Command::Dot(args) => commands::dot::run(args),
        Command::Filelog(args) => commands::filelog::run(args),
        Command::Viewlog(args) => commands::viewlog::run(args),
        Command::Flowscript => commands::flowscript::run(),
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
