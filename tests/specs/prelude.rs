// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the tfshim specs.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// A module directory, a transient working directory, and a fake tool
/// binary, wired together the way the orchestrator would.
pub struct Fixture {
    _dir: TempDir,
    pub module_dir: PathBuf,
    pub work_dir: PathBuf,
    tool: PathBuf,
}

impl Fixture {
    pub fn new(tool_script: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let module_dir = dir.path().join("module");
        let work_dir = dir.path().join("work");
        std::fs::create_dir_all(&module_dir).unwrap();
        std::fs::create_dir_all(&work_dir).unwrap();

        let tool = dir.path().join("faketool");
        std::fs::write(&tool, tool_script).unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        Self { _dir: dir, module_dir, work_dir, tool }
    }

    /// The shim, configured for one-shot assertions.
    pub fn shim(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("tfshim").unwrap();
        self.configure(cmd.current_dir(&self.work_dir));
        cmd
    }

    /// The shim as a raw process, for specs that deliver signals.
    pub fn shim_process(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin("tfshim"));
        cmd.current_dir(&self.work_dir)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());
        self.configure_std(&mut cmd);
        cmd
    }

    fn configure(&self, cmd: &mut assert_cmd::Command) {
        cmd.env("TFSHIM_BIN_PATH", &self.tool)
            .env("TFSHIM_MODULE_DIR", &self.module_dir)
            .env("TFSHIM_GRACE_SECS", "20")
            .env_remove("TF_CLI_ARGS")
            .env_remove("TF_CLI_ARGS_show");
    }

    fn configure_std(&self, cmd: &mut std::process::Command) {
        cmd.env("TFSHIM_BIN_PATH", &self.tool)
            .env("TFSHIM_MODULE_DIR", &self.module_dir)
            .env("TFSHIM_GRACE_SECS", "20")
            .env_remove("TF_CLI_ARGS")
            .env_remove("TF_CLI_ARGS_show");
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.module_dir.join(name)
    }

    pub fn artifact(&self, name: &str) -> String {
        std::fs::read_to_string(self.artifact_path(name)).unwrap()
    }
}

/// Poll `cond` until it holds or `max_ms` elapses.
pub fn wait_for(max_ms: u64, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    cond()
}

/// Wait until `path` exists and contains `needle`.
pub fn wait_for_content(path: &Path, needle: &str, max_ms: u64) -> bool {
    wait_for(max_ms, || {
        std::fs::read_to_string(path).map(|s| s.contains(needle)).unwrap_or(false)
    })
}
