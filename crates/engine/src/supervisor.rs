// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervisor and signal relay.
//!
//! The orchestrator sitting above this wrapper holds termination signals
//! for a fixed multi-second interval before forwarding them to its
//! children, long enough for the CI environment's own escalation to
//! reach SIGKILL first. The supervisor exists to close that gap: it
//! relays every termination-class signal to the child the moment it
//! arrives, then waits out a bounded grace window before escalating.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;
use thiserror::Error;
use tokio::process::Child;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

/// Signals relayed to the child. Interrupt/terminate/hangup/quit are what
/// CI cancellation actually delivers; the rest are handled defensively.
const RELAYED: &[Signal] = &[
    Signal::SIGINT,
    Signal::SIGTERM,
    Signal::SIGHUP,
    Signal::SIGQUIT,
    Signal::SIGUSR1,
    Signal::SIGUSR2,
    Signal::SIGPIPE,
    Signal::SIGALRM,
    Signal::SIGABRT,
];

const DEFAULT_GRACE: Duration = Duration::from_secs(30);

/// Errors that can occur while supervising the child.
#[derive(Debug, Error)]
pub enum SuperviseError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting on child: {0}")]
    Wait(#[from] std::io::Error),
}

/// Terminal state of a supervised invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The child terminated on its own.
    Exited { code: i32 },
    /// Terminated via the signal relay path.
    Signaled { signo: i32 },
}

impl Outcome {
    /// The wrapper's own exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match *self {
            Outcome::Exited { code } => code,
            Outcome::Signaled { signo } => 128 + signo,
        }
    }
}

/// Supervises exactly one child process per invocation.
pub struct Supervisor {
    command: PathBuf,
    args: Vec<String>,
    grace: Duration,
}

impl Supervisor {
    pub fn new(command: PathBuf, args: Vec<String>) -> Self {
        Self { command, args, grace: DEFAULT_GRACE }
    }

    /// Override the grace window between relay and forced kill.
    pub fn grace(self, grace: Duration) -> Self {
        Self { grace, ..self }
    }

    /// Spawn the child with the given output descriptors and supervise it
    /// to completion.
    ///
    /// Signal handlers are installed before the spawn so nothing is lost
    /// in the startup window. The child runs in its own process group, so
    /// group-wide relay reaches detached grandchildren (provider plugins).
    pub async fn run(self, stdout: Stdio, stderr: Stdio) -> Result<Outcome, SuperviseError> {
        let mut signals = relay_channel();

        let mut cmd = tokio::process::Command::new(&self.command);
        cmd.args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(stdout)
            .stderr(stderr)
            .process_group(0);

        let mut child = cmd.spawn().map_err(|source| SuperviseError::Spawn {
            command: self.command.display().to_string(),
            source,
        })?;

        // Recorded once at spawn, read-only thereafter; signal handling
        // needs no lock around it.
        let pid = child.id().map(|raw| Pid::from_raw(raw as i32));
        tracing::debug!(command = %self.command.display(), pid = ?pid, "child spawned");

        loop {
            tokio::select! {
                status = child.wait() => {
                    let status = status?;
                    let code = exit_code_of(status);
                    tracing::debug!(code, "child exited");
                    return Ok(Outcome::Exited { code });
                }
                Some(sig) = signals.recv() => {
                    return Ok(self.relay_and_reap(&mut child, pid, sig).await);
                }
            }
        }
    }

    /// Relay the signal, wait out the grace window, then escalate.
    async fn relay_and_reap(&self, child: &mut Child, pid: Option<Pid>, sig: Signal) -> Outcome {
        tracing::info!(signal = %sig, pid = ?pid, "relaying termination signal to child");
        if let Some(pid) = pid {
            // Process first, then its group: some children re-exec and
            // leave the original pid behind.
            let _ = kill(pid, sig);
            let _ = killpg(pid, sig);
        }

        match tokio::time::timeout(self.grace, child.wait()).await {
            Ok(status) => {
                tracing::debug!(signal = %sig, status = ?status.ok(), "child exited within grace window");
            }
            Err(_) => {
                tracing::warn!(
                    signal = %sig,
                    grace_secs = self.grace.as_secs(),
                    "grace window elapsed, sending SIGKILL"
                );
                if let Some(pid) = pid {
                    let _ = kill(pid, Signal::SIGKILL);
                    let _ = killpg(pid, Signal::SIGKILL);
                }
                let _ = child.wait().await;
            }
        }

        Outcome::Signaled { signo: sig as i32 }
    }
}

/// Install a handler per relayed signal, multiplexed onto one channel.
///
/// A signal whose handler cannot be installed is skipped with a warning;
/// the remaining handlers still cover the CI cancellation path.
fn relay_channel() -> mpsc::Receiver<Signal> {
    let (tx, rx) = mpsc::channel(16);
    for &sig in RELAYED {
        let mut stream = match signal(SignalKind::from_raw(sig as i32)) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(signal = %sig, error = %e, "failed to install signal handler");
                continue;
            }
        };
        let tx = tx.clone();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                if tx.send(sig).await.is_err() {
                    break;
                }
            }
        });
    }
    rx
}

/// A child killed by an unrelayed signal reports `128 + signo`, the same
/// convention the relay path uses.
fn exit_code_of(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.code().unwrap_or_else(|| 128 + status.signal().unwrap_or(0))
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
