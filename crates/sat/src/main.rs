// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! `sat` — the WebAssembly function Runner.

use std::process::ExitCode;

use clap::Parser;
use sat::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = sat::env::load(cli.target, cli.stdin);

    let shutdown = match sat::signals::install() {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "failed to install signal handlers");
            return ExitCode::FAILURE;
        }
    };

    let runner = sat::Runner::new(config);
    match runner.run(shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "sat exiting after unrecoverable error");
            ExitCode::from(e.exit_code())
        }
    }
}
