// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One wrapped invocation, end to end.
//!
//! Resolution (module dir, real binary) happens once at startup, before
//! anything is written; the supervisor and the capture drain then run
//! concurrently for the lifetime of the child, and plan post-processing
//! runs only after a successful plan.

use std::process::Stdio;
use std::time::Instant;

use anyhow::{Context, Result};
use tfshim_core::{locate, moduledir, Config, Invocation, Subcommand};
use tfshim_engine::{plan, CapturePipe, Outcome, PlanContext, SuperviseError, Supervisor};

use crate::exit_error::ExitError;

/// Run the wrapper for the given argv tail and return its exit code.
pub async fn run(argv: Vec<String>) -> Result<i32> {
    let config = Config::from_env();
    let invocation = Invocation::parse(argv);
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    if invocation.subcommand == Subcommand::Plan {
        tracing::debug!(
            json = invocation.plan.json,
            out_file = ?invocation.plan.out_file,
            "plan options detected"
        );
    }

    // Resolve the durable directory before any artifact is written: the
    // orchestrator runs the tool from a transient cache that is discarded.
    let module_dir = moduledir::resolve(config.module_dir_hint.as_deref(), &cwd);
    let binary = locate::resolve(&config);

    tracing::info!(
        subcommand = invocation.subcommand.name(),
        binary = %binary.display(),
        module_dir = %module_dir.display(),
        "starting wrapped invocation"
    );
    let start = Instant::now();

    let supervisor = Supervisor::new(binary.clone(), invocation.forwarded_args())
        .grace(config.grace_window);

    let outcome = match invocation.transcript_name() {
        Some(name) => {
            let (pipe, stdout, stderr) =
                CapturePipe::new().context("cannot create capture pipe")?;
            let drain = pipe.spawn_drain(module_dir.join(&name));
            let outcome = supervisor.run(stdout, stderr).await.map_err(into_exit_error)?;
            // The drain finishes once the whole child tree has closed its
            // output; waiting on it is what keeps transcripts complete.
            match drain.await {
                Ok(bytes) => tracing::debug!(bytes, transcript = %name, "transcript drained"),
                Err(e) => tracing::warn!(error = %e, "capture drain task failed"),
            }
            outcome
        }
        None => {
            supervisor.run(Stdio::inherit(), Stdio::inherit()).await.map_err(into_exit_error)?
        }
    };

    if invocation.subcommand == Subcommand::Plan {
        if let (Outcome::Exited { code: 0 }, Some(out_file)) =
            (outcome, invocation.plan.out_file.as_deref())
        {
            let ctx = PlanContext {
                binary: &binary,
                module_dir: &module_dir,
                out_file,
                ambient_arg_vars: config.ambient_arg_vars,
            };
            if let Err(e) = plan::render(&ctx).await {
                tracing::warn!(error = %e, "plan post-processing failed");
            }
        }
    }

    let exit_code = outcome.exit_code();
    tracing::info!(
        subcommand = invocation.subcommand.name(),
        exit_code,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "invocation finished"
    );
    Ok(exit_code)
}

fn into_exit_error(err: SuperviseError) -> anyhow::Error {
    match err {
        SuperviseError::Spawn { .. } => ExitError::spawn_failure(err.to_string()).into(),
        SuperviseError::Wait(_) => ExitError::new(1, err.to_string()).into(),
    }
}
