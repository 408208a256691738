// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tfshim: signal-relaying capture wrapper for Terraform-family CLIs.
//!
//! Installed in place of the tool binary and invoked by a multi-module
//! orchestrator, it supervises the real binary, mirrors its combined
//! output into durable per-module artifacts, and relays termination
//! signals immediately instead of waiting out the orchestrator's own
//! forwarding delay.

mod exit_error;
mod run;

use exit_error::ExitError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr only: stdout carries the child's output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(tfshim_core::env::LOG_VAR)
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    match run::run(argv).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let code = err.downcast_ref::<ExitError>().map(|e| e.code).unwrap_or(1);
            eprintln!("tfshim: {err:#}");
            std::process::exit(code);
        }
    }
}
