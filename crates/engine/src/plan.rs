// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan artifact post-processor.
//!
//! After a plan invocation exits zero with an `-out` file, the plan is
//! copied into the module directory and rendered twice via the tool's
//! `show` subcommand, machine-readable and human-readable. Rendering
//! problems degrade to structured placeholder artifacts: a missing
//! report is worse for downstream tooling than a present-but-flagged one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;

/// Fixed artifact names inside the module directory.
pub const PLAN_COPY: &str = "tfplan";
pub const PLAN_JSON: &str = "tfplan.json";
pub const PLAN_TEXT: &str = "tfplan.txt";

/// Settle delay before touching the plan file: filesystem writes from the
/// just-exited child may not be visible yet.
const SETTLE: Duration = Duration::from_millis(200);

/// Post-processing failed to produce even placeholder artifacts.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to write {artifact}: {source}")]
    WriteArtifact {
        artifact: String,
        #[source]
        source: std::io::Error,
    },
}

/// Inputs for one post-processing pass.
pub struct PlanContext<'a> {
    /// Resolved real binary, re-invoked for inspection.
    pub binary: &'a Path,
    /// Durable destination for all artifacts.
    pub module_dir: &'a Path,
    /// The `-out` flag value, as passed to the plan invocation.
    pub out_file: &'a str,
    /// Ambient default-argument variables to clear for inspection calls,
    /// so an orchestrator-wide override cannot alter the output format.
    pub ambient_arg_vars: &'a [&'a str],
}

/// Placeholder written when the plan cannot be rendered. Downstream
/// consumers must always find a parseable artifact at the expected path.
#[derive(Debug, Serialize)]
struct Placeholder<'a> {
    error: &'a str,
}

/// Derive the plan artifacts for a successful plan invocation.
///
/// Never fails the invocation: every degradation ends in placeholder
/// artifacts. The only error reported is the inability to write those.
pub async fn render(ctx: &PlanContext<'_>) -> Result<(), PlanError> {
    tokio::time::sleep(SETTLE).await;

    let original = PathBuf::from(ctx.out_file);
    let copied = ctx.module_dir.join(PLAN_COPY);

    if !original.is_file() {
        tracing::warn!(plan = %original.display(), "plan file missing after successful plan");
        let reason = format!("plan file {} not found after plan exit", ctx.out_file);
        write_placeholder(ctx.module_dir, PLAN_JSON, &reason).await?;
        write_placeholder(ctx.module_dir, PLAN_TEXT, &reason).await?;
        return Ok(());
    }

    let copied = match copy_plan(&original, &copied).await {
        Ok(()) => Some(copied),
        Err(e) => {
            tracing::warn!(error = %e, "failed to copy plan file into module dir");
            None
        }
    };

    // Fixed rendering order, machine-readable first: re-running the
    // post-processor must produce byte-identical artifacts.
    render_one(ctx, &original, copied.as_deref(), "-json", PLAN_JSON).await?;
    render_one(ctx, &original, copied.as_deref(), "-no-color", PLAN_TEXT).await?;
    Ok(())
}

/// Copy the plan into the module directory, unless it already lives there.
async fn copy_plan(original: &Path, copied: &Path) -> std::io::Result<()> {
    let from = tokio::fs::canonicalize(original).await?;
    if let Ok(to) = tokio::fs::canonicalize(copied).await {
        if from == to {
            return Ok(());
        }
    }
    tokio::fs::copy(&from, copied).await?;
    Ok(())
}

/// Render one artifact, retrying once against the copied plan path: the
/// original may have been relative to a now-stale working directory.
async fn render_one(
    ctx: &PlanContext<'_>,
    original: &Path,
    copied: Option<&Path>,
    flag: &str,
    artifact: &str,
) -> Result<(), PlanError> {
    let first = inspect(ctx, flag, original).await;
    let rendered = match first {
        Ok(bytes) => Ok(bytes),
        Err(first_err) => match copied {
            Some(copied) if copied != original => {
                tracing::warn!(artifact, error = %first_err, "inspection failed, retrying against copied plan");
                inspect(ctx, flag, copied).await.map_err(|retry_err| {
                    format!("{first_err}; retry against copy: {retry_err}")
                })
            }
            _ => Err(first_err),
        },
    };

    match rendered {
        Ok(bytes) => write_artifact(ctx.module_dir, artifact, &bytes).await,
        Err(reason) => {
            tracing::warn!(artifact, %reason, "writing placeholder artifact");
            write_placeholder(ctx.module_dir, artifact, &reason).await
        }
    }
}

/// Run `show` against the plan file in a clean environment.
async fn inspect(ctx: &PlanContext<'_>, flag: &str, plan: &Path) -> Result<Vec<u8>, String> {
    let mut cmd = Command::new(ctx.binary);
    cmd.arg("show")
        .arg(flag)
        .arg(plan)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped());
    for var in ctx.ambient_arg_vars {
        cmd.env_remove(var);
    }

    let output = cmd
        .output()
        .await
        .map_err(|e| format!("failed to run {} show: {e}", ctx.binary.display()))?;

    if output.status.success() && !output.stdout.is_empty() {
        Ok(output.stdout)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(format!(
            "show {flag} exited {}: {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        ))
    }
}

async fn write_artifact(module_dir: &Path, name: &str, bytes: &[u8]) -> Result<(), PlanError> {
    tokio::fs::write(module_dir.join(name), bytes).await.map_err(|source| {
        PlanError::WriteArtifact { artifact: name.to_string(), source }
    })
}

async fn write_placeholder(module_dir: &Path, name: &str, reason: &str) -> Result<(), PlanError> {
    let bytes = if name.ends_with(".json") {
        let mut body = serde_json::to_vec_pretty(&Placeholder { error: reason })
            .unwrap_or_else(|_| br#"{"error":"plan rendering failed"}"#.to_vec());
        body.push(b'\n');
        body
    } else {
        format!("ERROR: {reason}\n").into_bytes()
    };
    write_artifact(module_dir, name, &bytes).await
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
