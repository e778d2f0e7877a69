//! Integration tests for the `harness` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to drive the generate,
//! parse-call, render, judge and languages subcommands through the actual
//! binary, including stdin/stdout piping, file I/O and error handling.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to the request.json fixture.
fn request_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/request.json")
}

/// Helper: read the request.json fixture as a string.
fn request_json() -> String {
    std::fs::read_to_string(request_path()).expect("request.json fixture must exist")
}

/// Helper: a scratch path unique to this test.
fn scratch(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("harness-cli-{}-{}", std::process::id(), name))
}

/// Helper: run `harness generate` with extra args and parse the program JSON.
fn generate_with(args: &[&str]) -> serde_json::Value {
    let output = Command::cargo_bin("harness")
        .unwrap()
        .arg("generate")
        .args(args)
        .write_stdin(request_json())
        .output()
        .expect("binary must run");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("generate must print JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// Generate subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn generate_stdin_to_stdout() {
    Command::cargo_bin("harness")
        .unwrap()
        .arg("generate")
        .write_stdin(request_json())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""entryPoint": "_harness_runner.py""#))
        .stdout(predicate::str::contains(r#""mode": "native""#));
}

#[test]
fn generate_pass_through_ships_records() {
    let program = generate_with(&[]);
    let stdin = program["stdin"].as_str().unwrap();
    let records: serde_json::Value = serde_json::from_str(stdin).unwrap();
    assert_eq!(records[0]["call"], "add(1, 2)");
    assert_eq!(records[2]["expected"], serde_json::Value::Null);
    assert_eq!(program["files"].as_array().unwrap().len(), 2);
}

#[test]
fn generate_structured_mode_flag() {
    let program = generate_with(&["--mode", "structured"]);
    assert_eq!(program["stdin"], "3\n0.5\nnull\n");
}

#[test]
fn generate_embed_expected_flag_empties_stdin() {
    let program = generate_with(&["--embed-expected"]);
    assert_eq!(program["stdin"], "");
}

#[test]
fn generate_file_to_file() {
    let output_path = scratch("program.json");
    let _ = std::fs::remove_file(&output_path);

    Command::cargo_bin("harness")
        .unwrap()
        .args(["generate", "-i", request_path(), "-o"])
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = std::fs::read_to_string(&output_path).expect("output file must exist");
    assert!(content.contains("_harness_runner.py"));

    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn generate_unknown_language_is_fallback() {
    let request = r#"{"language":"brainfck","files":[{"name":"p.bf","content":"+"}],"testCases":[{"call":"f()","expected":1}]}"#;
    Command::cargo_bin("harness")
        .unwrap()
        .arg("generate")
        .write_stdin(request)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""mode": "fallback""#))
        .stdout(predicate::str::contains(r#""entryPoint": "p.bf""#));
}

#[test]
fn generate_invalid_json_fails() {
    Command::cargo_bin("harness")
        .unwrap()
        .arg("generate")
        .write_stdin("this is not valid json {{{")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse request JSON"));
}

#[test]
fn generate_invalid_request_fails() {
    let request = r#"{"language":"python","files":[],"testCases":[]}"#;
    Command::cargo_bin("harness")
        .unwrap()
        .arg("generate")
        .write_stdin(request)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one source file is required"));
}

#[test]
fn generate_structured_parse_error_fails() {
    let request = r#"{"language":"java","files":[{"name":"S.java","content":"class S {}"}],"testCases":[{"call":"f(g(1))","expected":1}],"options":{"callMode":"structured"}}"#;
    Command::cargo_bin("harness")
        .unwrap()
        .arg("generate")
        .write_stdin(request)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to generate program"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Parse-call and render subcommands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn parse_call_prints_invocation() {
    Command::cargo_bin("harness")
        .unwrap()
        .args(["parse-call", "add(1, 2.0)"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"functionName":"add","args":[1,2.0]}"#,
        ));
}

#[test]
fn parse_call_rewrites_tuples() {
    Command::cargo_bin("harness")
        .unwrap()
        .args(["parse-call", "f((1, 2))"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""args":[[1,2]]"#));
}

#[test]
fn parse_call_rejects_identifiers() {
    Command::cargo_bin("harness")
        .unwrap()
        .args(["parse-call", "add(x)"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse call"));
}

#[test]
fn render_java_array() {
    Command::cargo_bin("harness")
        .unwrap()
        .args(["render", "--language", "java", "[1, 2.5]"])
        .assert()
        .success()
        .stdout("new double[]{1.0, 2.5}\n");
}

#[test]
fn render_keeps_float_tags() {
    Command::cargo_bin("harness")
        .unwrap()
        .args(["render", "-l", "python", "[1.0, 1]"])
        .assert()
        .success()
        .stdout("[1.0, 1]\n");
}

#[test]
fn render_for_generic_fails() {
    Command::cargo_bin("harness")
        .unwrap()
        .args(["render", "-l", "brainfck", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to render value"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Judge subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn judge_reads_the_last_line() {
    let stdout_path = scratch("judge-ok.txt");
    std::fs::write(
        &stdout_path,
        concat!(
            "print from user code\n",
            r#"[{"index":0,"actual":3,"passed":true,"error":null},"#,
            r#"{"index":1,"actual":0.5,"passed":true,"error":null},"#,
            r#"{"index":2,"actual":null,"passed":false,"error":"ZeroDivisionError: division by zero"}]"#,
            "\n"
        ),
    )
    .unwrap();

    let output = Command::cargo_bin("harness")
        .unwrap()
        .args(["judge", "-i", request_path(), "--stdout"])
        .arg(&stdout_path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let outcomes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcomes[0]["passed"], true);
    assert_eq!(outcomes[2]["error"], "ZeroDivisionError: division by zero");

    let _ = std::fs::remove_file(&stdout_path);
}

#[test]
fn judge_contract_violation_fails_every_case() {
    let stdout_path = scratch("judge-bad.txt");
    std::fs::write(&stdout_path, "Segmentation fault\n").unwrap();

    Command::cargo_bin("harness")
        .unwrap()
        .args(["judge", "-i", request_path(), "--stdout"])
        .arg(&stdout_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("output contract violated"))
        .stdout(predicate::str::contains(r#""passed":true"#).not());

    let _ = std::fs::remove_file(&stdout_path);
}

#[test]
fn judge_fallback_is_unverified() {
    let stdout_path = scratch("judge-fallback.txt");
    std::fs::write(&stdout_path, "anything\n").unwrap();

    Command::cargo_bin("harness")
        .unwrap()
        .args(["judge", "-i", request_path(), "--fallback", "--stdout"])
        .arg(&stdout_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Unverified"));

    let _ = std::fs::remove_file(&stdout_path);
}

#[test]
fn judge_infers_fallback_from_the_request_language() {
    let request_path = scratch("judge-generic-request.json");
    std::fs::write(
        &request_path,
        r#"{"language":"brainfck","files":[{"name":"p.bf","content":"+"}],"testCases":[{"call":"f()","expected":1}]}"#,
    )
    .unwrap();
    let stdout_path = scratch("judge-generic.txt");
    std::fs::write(&stdout_path, "anything\n").unwrap();

    Command::cargo_bin("harness")
        .unwrap()
        .arg("judge")
        .arg("-i")
        .arg(&request_path)
        .arg("--stdout")
        .arg(&stdout_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Unverified"))
        .stdout(predicate::str::contains("output contract violated").not());

    let _ = std::fs::remove_file(&request_path);
    let _ = std::fs::remove_file(&stdout_path);
}

#[test]
fn judge_language_flag_overrides_the_request() {
    let stdout_path = scratch("judge-override.txt");
    std::fs::write(&stdout_path, "anything\n").unwrap();

    Command::cargo_bin("harness")
        .unwrap()
        .args(["judge", "-i", request_path(), "--language", "brainfck", "--stdout"])
        .arg(&stdout_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Unverified"));

    let _ = std::fs::remove_file(&stdout_path);
}

#[test]
fn judge_missing_stdout_file_fails() {
    Command::cargo_bin("harness")
        .unwrap()
        .args(["judge", "-i", request_path(), "--stdout", "/nonexistent/run.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Languages and misc
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn languages_lists_backends_with_aliases() {
    Command::cargo_bin("harness")
        .unwrap()
        .arg("languages")
        .assert()
        .success()
        .stdout(predicate::str::contains("python: python, py"))
        .stdout(predicate::str::contains("csharp: csharp, c#"))
        .stdout(predicate::str::contains("generic").not());
}

#[test]
fn help_flag_shows_usage() {
    Command::cargo_bin("harness")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("judge"));
}

#[test]
fn unknown_subcommand_fails() {
    Command::cargo_bin("harness")
        .unwrap()
        .arg("frobnicate")
        .assert()
        .failure();
}
