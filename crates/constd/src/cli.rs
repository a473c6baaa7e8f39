// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Command-line surface: `constd <bundle_path>`. The bundle path is only
//! required when the Supervisor is acting as its own control plane; when an
//! external `CONSTD_CONTROL_PLANE` is configured it may be omitted.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "constd", about = "WebAssembly function constellation supervisor")]
pub struct Cli {
    /// Filesystem path to the application bundle.
    pub bundle_path: Option<PathBuf>,
}
