// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! `constd` — the WebAssembly function constellation supervisor. Reads an
//! application bundle (or polls a remote control plane), launches and
//! autoscales `sat` Runner replicas per function, and performs graceful
//! drain on shutdown.

use std::process::ExitCode;

use clap::Parser;
use constd::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = constd::env::load(cli.bundle_path);

    let shutdown = match constd::signals::install() {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "failed to install signal handlers");
            return ExitCode::FAILURE;
        }
    };

    match constd::run(config, shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "constd exiting after unrecoverable error");
            ExitCode::FAILURE
        }
    }
}
