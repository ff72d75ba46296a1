// Regression tests for the `veritas` binary.
// Requires: assert_cmd, predicates, tempfile in [dev-dependencies]

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn veritas() -> Command {
    Command::cargo_bin("veritas").unwrap()
}

#[test]
fn run_passes_on_fixture_directory() {
    veritas()
        .args(["run", "tests/fixtures", "--seed", "5", "--no-color"])
        .assert()
        .success()
        .stdout(
            contains("PASS: freezing point")
                .and(contains("SKIP: not ready yet (disabled)"))
                .and(contains("PASS: missing age"))
                .and(contains("seed 5")),
        );
}

#[test]
fn failing_case_exits_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("wrong.json");
    fs::write(
        &file,
        r#"{"name": "wrong answer", "function_name": "celsius_to_fahrenheit",
            "input": [{"name": "celsius", "type": "float", "value": 0}],
            "output": [{"name": "f", "type": "float", "value": 0}]}"#,
    )
    .unwrap();

    veritas()
        .arg("run")
        .arg(&file)
        .arg("--no-color")
        .assert()
        .failure()
        .stdout(contains("FAIL: wrong answer").and(contains("arguments: {celsius: 0.0}")));
}

#[test]
fn config_errors_are_rendered_as_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("untyped.json");
    fs::write(
        &file,
        r#"{"name": "untyped", "function_name": "divide", "input": [{"name": "a", "value": 1}]}"#,
    )
    .unwrap();

    veritas()
        .arg("run")
        .arg(&file)
        .assert()
        .failure()
        .stderr(contains("veritas::config::missing_type").and(contains("untyped")));
}

#[test]
fn check_reports_every_invalid_case() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("mixed.json");
    fs::write(
        &file,
        r#"[
            {"name": "ok", "function_name": "divide"},
            {"name": "unknown", "function_name": "no_such_function"},
            {"name": "bad range", "function_name": "divide",
             "input": [{"name": "a", "type": "int", "range": {"min": 5, "max": 1}}]}
        ]"#,
    )
    .unwrap();

    veritas()
        .arg("check")
        .arg(&file)
        .assert()
        .failure()
        .stdout(contains("1 case(s) ok, 2 invalid"))
        .stderr(contains("no_such_function").and(contains("veritas::config::range")));
}

#[test]
fn json_output_is_machine_readable() {
    let output = veritas()
        .args(["run", "tests/fixtures/division.json", "--json", "--seed", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["seed"], 1);
    assert_eq!(json[0]["cases"][0]["name"], "divide by zero");
    assert_eq!(json[0]["cases"][0]["status"], "passed");
}

#[test]
fn functions_lists_builtins() {
    veritas()
        .arg("functions")
        .assert()
        .success()
        .stdout(contains("celsius_to_fahrenheit").and(contains("validate_email")));
}

#[test]
fn printing_targets_do_not_corrupt_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("echo.json");
    fs::write(
        &file,
        r#"{"name": "echo", "function_name": "print_arguments",
            "input": [{"name": "word", "type": "string", "value": "hello"}]}"#,
    )
    .unwrap();

    let output = veritas()
        .arg("run")
        .arg(&file)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["cases"][0]["status"], "passed");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Arguments: {word: \"hello\"}"));
}

#[test]
fn contracts_lists_builtin_contracts() {
    veritas()
        .arg("contracts")
        .assert()
        .success()
        .stdout(contains("EventContract (1 rule(s))").and(contains("UserContract (6 rule(s))")));
}

#[test]
fn contract_mismatch_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("young.json");
    fs::write(
        &file,
        r#"{"description": "too young", "contract": "UserContract",
            "data": {"name": "Tim", "email": "tim@example.com", "age": -1},
            "expected_errors": []}"#,
    )
    .unwrap();

    veritas()
        .arg("run")
        .arg(&file)
        .arg("--no-color")
        .assert()
        .failure()
        .stdout(
            contains("FAIL: too young")
                .and(contains("Got: [\"Field 'age' must be between 0 and 120\"]")),
        );
}
