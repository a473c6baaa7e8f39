// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! `runner <path|url|fqfn> [--stdin]` (`spec.md` §6).

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "sat")]
pub struct Cli {
    /// A path, URL, or FQFN identifying the Runnable to load.
    pub target: String,

    /// Read one line from stdin, execute it, print the output, and exit.
    #[arg(long)]
    pub stdin: bool,
}
