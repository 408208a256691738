// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real-binary resolution.
//!
//! When the wrapper is installed in place of the tool, the install step
//! renames the original binary aside as `<name>-real`. Resolution must
//! therefore prefer the renamed binary over the plain name, and must
//! never resolve to the wrapper's own executable.

use std::path::{Path, PathBuf};

use crate::env::Config;

/// Install directories checked for the real binary.
pub const WELL_KNOWN_DIRS: &[&str] = &["/usr/local/bin", "/usr/bin", "/opt/homebrew/bin"];

/// Suffix given to the original binary when the wrapper replaces it.
pub const REAL_SUFFIX: &str = "-real";

/// Resolve the real tool binary for this configuration.
///
/// Falls back to the bare name as a last resort; the spawn step surfaces
/// the resulting "executable not found" condition.
pub fn resolve(config: &Config) -> PathBuf {
    let dirs: Vec<PathBuf> = WELL_KNOWN_DIRS.iter().map(PathBuf::from).collect();
    let path_var = std::env::var("PATH").ok();
    let self_exe = std::env::current_exe().ok().and_then(|p| p.canonicalize().ok());
    resolve_in(
        &config.bin_name,
        config.bin_override.as_deref(),
        &dirs,
        path_var.as_deref(),
        self_exe.as_deref(),
    )
}

/// Resolution order: override path, renamed-aside binary in the install
/// dirs, plain name in the install dirs, then a `PATH` walk.
pub fn resolve_in(
    name: &str,
    override_path: Option<&Path>,
    dirs: &[PathBuf],
    path_var: Option<&str>,
    self_exe: Option<&Path>,
) -> PathBuf {
    if let Some(path) = override_path {
        if is_executable(path) {
            return path.to_path_buf();
        }
        tracing::warn!(path = %path.display(), "binary override is not executable, ignoring");
    }

    let renamed = format!("{name}{REAL_SUFFIX}");
    for candidate_name in [renamed.as_str(), name] {
        for dir in dirs {
            let candidate = dir.join(candidate_name);
            if is_executable(&candidate) && !is_self(&candidate, self_exe) {
                return candidate;
            }
        }
    }

    if let Some(path_var) = path_var {
        for dir in path_var.split(':').filter(|d| !d.is_empty()) {
            let candidate = Path::new(dir).join(name);
            if is_executable(&candidate) && !is_self(&candidate, self_exe) {
                return candidate;
            }
        }
    }

    tracing::warn!(name, "real binary not found, deferring to spawn");
    PathBuf::from(name)
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

/// A wrapped install must never resolve back into the wrapper itself.
fn is_self(candidate: &Path, self_exe: Option<&Path>) -> bool {
    let Some(self_exe) = self_exe else {
        return false;
    };
    match candidate.canonicalize() {
        Ok(resolved) => resolved == self_exe,
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "locate_tests.rs"]
mod tests;
