// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the wrapper.
//!
//! Every environment input is read exactly once, at startup, into a
//! [`Config`] that is threaded explicitly to the call sites that need it.

use std::path::PathBuf;
use std::time::Duration;

/// Binary-family selector (e.g. `terraform`, `tofu`). Default: `terraform`.
pub const BIN_NAME_VAR: &str = "TFSHIM_BIN_NAME";

/// Explicit path to the real binary, bypassing the locator search.
pub const BIN_PATH_VAR: &str = "TFSHIM_BIN_PATH";

/// Durable module directory hint set by the orchestrator manifest.
pub const MODULE_DIR_VAR: &str = "TFSHIM_MODULE_DIR";

/// Grace window (seconds) between signal relay and forced kill.
pub const GRACE_SECS_VAR: &str = "TFSHIM_GRACE_SECS";

/// Tracing filter for the wrapper's own diagnostics.
pub const LOG_VAR: &str = "TFSHIM_LOG";

/// Ambient default-argument variables honored by the wrapped tool family.
///
/// These are inherited by the supervised child as-is, but must be cleared
/// for plan-inspection re-invocations so they cannot alter the rendered
/// output format.
pub const AMBIENT_ARG_VARS: &[&str] = &["TF_CLI_ARGS", "TF_CLI_ARGS_show"];

const DEFAULT_BIN_NAME: &str = "terraform";
const DEFAULT_GRACE: Duration = Duration::from_secs(30);

/// Wrapper configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tool family name, used when no explicit path override is present.
    pub bin_name: String,
    /// Explicit real-binary path override.
    pub bin_override: Option<PathBuf>,
    /// Durable module directory hint from the orchestrator.
    pub module_dir_hint: Option<PathBuf>,
    /// How long to wait for natural exit after relaying a signal.
    pub grace_window: Duration,
    /// Variables to clear for clean-environment inspection calls.
    pub ambient_arg_vars: &'static [&'static str],
}

impl Config {
    /// Read the full configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            bin_name: bin_name(),
            bin_override: path_var(BIN_PATH_VAR),
            module_dir_hint: path_var(MODULE_DIR_VAR),
            grace_window: grace_window(),
            ambient_arg_vars: AMBIENT_ARG_VARS,
        }
    }
}

/// Tool family name: `TFSHIM_BIN_NAME`, default `terraform`.
pub fn bin_name() -> String {
    std::env::var(BIN_NAME_VAR)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_BIN_NAME.to_string())
}

/// Grace window: `TFSHIM_GRACE_SECS`, default 30s.
///
/// Deliberately longer than typical CI forced-kill deadlines so graceful
/// shutdown is attempted whenever the surrounding environment allows it.
pub fn grace_window() -> Duration {
    match std::env::var(GRACE_SECS_VAR) {
        Err(_) => DEFAULT_GRACE,
        Ok(raw) => match raw.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                tracing::warn!(value = %raw, var = GRACE_SECS_VAR, "not a number, using default");
                DEFAULT_GRACE
            }
        },
    }
}

fn path_var(var: &str) -> Option<PathBuf> {
    std::env::var(var).ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
