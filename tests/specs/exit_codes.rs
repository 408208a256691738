// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exit-code mapping and argument forwarding specs.

use crate::prelude::*;

#[test]
fn child_exit_code_passes_through() {
    let fx = Fixture::new("#!/bin/sh\necho failing\nexit 3\n");
    fx.shim().arg("apply").assert().code(3);
}

#[test]
fn zero_exit_passes_through() {
    let fx = Fixture::new("#!/bin/sh\nexit 0\n");
    fx.shim().arg("init").assert().success();
}

#[test]
fn unresolvable_binary_fails_with_127() {
    let fx = Fixture::new("#!/bin/sh\nexit 0\n");
    let mut cmd = fx.shim();
    cmd.env_remove("TFSHIM_BIN_PATH")
        .env("TFSHIM_BIN_NAME", "tfshim-no-such-tool")
        .env("PATH", "/nonexistent");
    cmd.arg("apply").assert().code(127);
}

#[test]
fn separator_tokens_never_reach_the_tool() {
    let fx = Fixture::new("#!/bin/sh\necho \"argv: $*\"\n");
    fx.shim().args(["apply", "-", "-auto-approve", "--"]).assert().success();

    assert_eq!(fx.artifact("tf-apply.log"), "argv: apply -auto-approve\n");
}

#[test]
fn passthrough_subcommand_forwards_args_verbatim() {
    let fx = Fixture::new("#!/bin/sh\necho \"argv: $*\"\n");
    let assert = fx.shim().args(["workspace", "list"]).assert().success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert_eq!(stdout, "argv: workspace list\n");
}
