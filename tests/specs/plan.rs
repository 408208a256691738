// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan artifact specs.

use crate::prelude::*;

/// Fake tool with a working plan/show pair. `plan` honors `-out=` and
/// `show` refuses to run if the ambient default-args variables leaked in.
const PLANNING_TOOL: &str = r#"#!/bin/sh
cmd="$1"; shift
if [ -n "$TF_CLI_ARGS" ] || [ -n "$TF_CLI_ARGS_show" ]; then
    if [ "$cmd" = "show" ]; then
        echo "ambient args leaked" 1>&2
        exit 1
    fi
fi
case "$cmd" in
    plan)
        out=""
        for a in "$@"; do
            case "$a" in -out=*) out="${a#-out=}" ;; esac
        done
        if [ -n "$out" ]; then printf 'opaque-plan-bytes' > "$out"; fi
        echo "Plan: 1 to add, 0 to change, 0 to destroy."
        ;;
    show)
        case "$1" in
            -json) printf '{"format_version":"1.2","resource_changes":[]}\n' ;;
            *) printf 'Plan: 1 to add, 0 to change, 0 to destroy.\n' ;;
        esac
        ;;
    *)
        exit 1
        ;;
esac
"#;

#[test]
fn successful_plan_produces_all_artifacts() {
    let fx = Fixture::new(PLANNING_TOOL);
    fx.shim().args(["plan", "-", "-json", "-out=tfplan.bin"]).assert().success();

    // Raw plan copied under its fixed name.
    assert_eq!(
        std::fs::read(fx.artifact_path("tfplan")).unwrap(),
        b"opaque-plan-bytes"
    );
    // Machine-readable rendering parses and carries no error marker.
    let json: serde_json::Value = serde_json::from_str(&fx.artifact("tfplan.json")).unwrap();
    assert_eq!(json["format_version"], "1.2");
    assert!(json.get("error").is_none());
    // Human-readable rendering.
    assert!(fx.artifact("tfplan.txt").starts_with("Plan: 1 to add"));
    // And the transcript captured the plan output itself.
    assert!(fx.artifact("tf-plan.log").contains("Plan: 1 to add"));
}

#[test]
fn ambient_default_args_do_not_leak_into_inspection() {
    let fx = Fixture::new(PLANNING_TOOL);
    let mut cmd = fx.shim();
    cmd.env("TF_CLI_ARGS", "-no-color").env("TF_CLI_ARGS_show", "-json");
    cmd.args(["plan", "-out=tfplan.bin"]).assert().success();

    let json: serde_json::Value = serde_json::from_str(&fx.artifact("tfplan.json")).unwrap();
    assert!(json.get("error").is_none(), "inspection must run with a clean environment");
}

#[test]
fn missing_plan_file_yields_placeholder_artifacts_not_failure() {
    // `plan` succeeds but never writes the -out file.
    let tool = r#"#!/bin/sh
case "$1" in
    plan) echo "Plan: 0 to add." ;;
    show) echo "no plan here" 1>&2; exit 1 ;;
esac
"#;
    let fx = Fixture::new(tool);
    fx.shim().args(["plan", "-out=tfplan.bin"]).assert().success();

    let json: serde_json::Value = serde_json::from_str(&fx.artifact("tfplan.json")).unwrap();
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("not found"), "placeholder must explain itself: {error}");
    assert!(fx.artifact("tfplan.txt").starts_with("ERROR: "));
    assert!(!fx.artifact_path("tfplan").exists());
}

#[test]
fn failed_plan_produces_no_artifacts() {
    let tool = "#!/bin/sh\necho 'Error: invalid configuration' 1>&2\nexit 1\n";
    let fx = Fixture::new(tool);
    fx.shim().args(["plan", "-out=tfplan.bin"]).assert().code(1);

    assert!(!fx.artifact_path("tfplan").exists());
    assert!(!fx.artifact_path("tfplan.json").exists());
    assert!(!fx.artifact_path("tfplan.txt").exists());
    // The failing output is still captured durably.
    assert!(fx.artifact("tf-plan.log").contains("invalid configuration"));
}

#[test]
fn plan_without_out_flag_skips_post_processing() {
    let fx = Fixture::new(PLANNING_TOOL);
    fx.shim().args(["plan"]).assert().success();

    assert!(!fx.artifact_path("tfplan.json").exists());
    assert!(!fx.artifact_path("tfplan.txt").exists());
    assert!(fx.artifact_path("tf-plan.log").exists());
}
