use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};

/// Runs the binary with a clean environment for its own settings.
fn cmdtree(args: &[&str]) -> Output {
    cmdtree_with_config(args, None)
}

fn cmdtree_with_config(args: &[&str], config: Option<&Path>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_cmdtree"));
    command
        .args(args)
        .env_remove("CMDTREE_CONFIG")
        .env_remove("CMDTREE_VERBOSE")
        .env_remove("RUST_LOG");
    if let Some(path) = config {
        command.env("CMDTREE_CONFIG", path);
    }
    command.output().expect("failed to run cmdtree")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// Help and dispatch
// ---------------------------------------------------------------------------

#[test]
fn help_lists_subcommands_and_exits_zero() {
    let output = cmdtree(&["--help"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with("Usage: cmdtree [OPTIONS] COMMAND\n"), "{out}");
    for name in ["greet", "inspect", "deploy", "describe"] {
        assert!(out.contains(&format!("\n{name}\t")), "missing {name} in {out}");
    }
    assert!(stderr(&output).is_empty());
}

#[test]
fn subcommand_help_shows_its_own_usage() {
    let output = cmdtree(&["deploy", "help"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with("Usage: cmdtree deploy [OPTIONS]\n"), "{out}");
    assert!(out.contains("-e\t--env\tenvironment\tUsage: target environment\t(required)"));
}

#[test]
fn greet_uses_flags_and_positionals() {
    let output = cmdtree(&["greet", "--times", "2", "Ada", "Grace"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Hello, Ada, Grace!\nHello, Ada, Grace!\n");

    let output = cmdtree(&["greet", "-s"]);
    assert_eq!(stdout(&output), "HELLO, WORLD!\n");
}

#[test]
fn inspect_reports_resolved_invocation() {
    let output = cmdtree(&[
        "inspect", "-l", "hi", "--ratio=0.5", "--tags", "a,b,,c", "extra", "--", "raw", "--x",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let inv: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(
        inv,
        json!({
            "command": "inspect",
            "args": ["extra"],
            "flags": {"label": "hi", "ratio": 0.5, "tags": ["a", "b", "c"]},
            "passthrough": ["raw", "--x"],
        })
    );
}

#[test]
fn two_subcommands_are_rejected() {
    let output = cmdtree(&["greet", "inspect"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        "ERROR: you can run one command at a time; found: greet, inspect\n"
    );
    assert!(stdout(&output).is_empty());
}

#[test]
fn missing_required_flag_prints_help() {
    let output = cmdtree(&["deploy"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        "ERROR: environment are missing but they were required\n"
    );
    assert!(stdout(&output).starts_with("Usage: cmdtree deploy [OPTIONS]\n"));

    let output = cmdtree(&["deploy", "--env", "staging"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "SUCCESS: deployed to staging\n");

    let output = cmdtree(&["deploy", "-estaging", "--dry"]);
    assert_eq!(stdout(&output), "INFO: would deploy to staging\n");
}

#[test]
fn missing_value_is_a_usage_error() {
    let output = cmdtree(&["greet", "--times", "--shout"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "ERROR: missing value for flag --times\n");
}

// ---------------------------------------------------------------------------
// Describe
// ---------------------------------------------------------------------------

#[test]
fn describe_exports_tree_in_each_format() {
    let output = cmdtree(&["describe"]);
    assert!(output.status.success());
    let desc: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(desc["name"], json!("cmdtree"));
    assert_eq!(desc["subcommands"][3]["name"], json!("describe"));
    assert_eq!(desc["subcommands"][2]["flags"][0]["required"], json!(true));

    let output = cmdtree(&["describe", "--format", "yaml"]);
    assert!(stdout(&output).starts_with("name: cmdtree\n"));

    let output = cmdtree(&["describe", "-f", "md"]);
    let md = stdout(&output);
    assert!(md.starts_with("# cmdtree\n\n"));
    assert!(md.contains("## cmdtree greet\n"));
}

#[test]
fn describe_rejects_unknown_format() {
    let output = cmdtree(&["describe", "--format", "toml"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).starts_with("ERROR: command describe failed: unknown output format: toml"),
        "stderr: {}",
        stderr(&output)
    );
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[test]
fn strict_values_from_config_file() {
    let output = cmdtree(&["inspect", "--ratio", "lots"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        "ERROR: invalid value for flag --ratio: expected a number, got 'lots'\n"
    );

    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("cmdtree.yaml");
    fs::write(&config, "strict_values: false\n").unwrap();

    let output = cmdtree_with_config(&["inspect", "--ratio", "lots"], Some(&config));
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let inv: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(inv["flags"], json!({}));
    assert_eq!(inv["args"], json!([]));
}

#[test]
fn unreadable_config_fails_before_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("missing.yaml");

    let output = cmdtree_with_config(&["greet"], Some(&config));
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("ERROR: failed to load settings from '"), "{err}");
    assert_eq!(err.lines().count(), 1, "{err}");
    assert!(stdout(&output).is_empty());
}

#[test]
fn verbose_setting_enables_debug_logs() {
    let output = Command::new(env!("CARGO_BIN_EXE_cmdtree"))
        .arg("greet")
        .env_remove("CMDTREE_CONFIG")
        .env_remove("RUST_LOG")
        .env("CMDTREE_VERBOSE", "1")
        .output()
        .expect("failed to run cmdtree");

    assert!(output.status.success());
    assert_eq!(stdout(&output), "Hello, world!\n");
    assert!(stderr(&output).contains("Selected subcommand"));

    assert!(!stderr(&cmdtree(&["greet"])).contains("Selected subcommand"));
}
