// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterwerk: command-line front end
//
// Entry point. Initialises logging, loads the engine configuration, and
// dispatches to the subcommand. Errors are printed with a hint and mapped to
// the exit status from `human_errors`.

mod cli;
mod codec;
mod commands;
mod fingerprint;

use std::process::ExitCode;

use clap::Parser;
use rasterwerk_core::error::Result;
use rasterwerk_core::human_errors::humanize_error;

use cli::{CliArg, CliCommand};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli_arg = CliArg::parse();
    tracing::debug!(cli_arg = ?cli_arg, "Arguments parsed");

    let status = match run(&cli_arg) {
        Ok(status) => status,
        Err(err) => {
            let report = humanize_error(&err);
            tracing::error!(error = %err, "Command failed");
            eprintln!("error: {report}");
            report.exit_code
        }
    };
    ExitCode::from(u8::try_from(status).unwrap_or(1))
}

fn run(cli_arg: &CliArg) -> Result<i32> {
    let config = cli_arg.global_options.engine_config()?;
    match &cli_arg.command {
        CliCommand::Separate(args) => commands::separate(config, args),
        CliCommand::Merge(args) => commands::merge(config, args),
        CliCommand::Extract(args) => commands::extract(config, args),
    }
}
