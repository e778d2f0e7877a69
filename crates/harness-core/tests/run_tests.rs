//! Execution tests: generated programs are built and run with the real
//! toolchains, and their stdout is judged through `collect_outcomes`.
//!
//! A language whose tools are not on `PATH` is skipped with a note on stderr.

use harness_core::{
    collect_outcomes, generate, CallMode, GenerateOptions, GenerateRequest, GeneratedProgram,
    Outcome, SourceFile, TestCase, Value,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const BINARY: &str = "harness_bin";

fn s(text: &str) -> Value {
    Value::String(text.to_string())
}

fn available(tools: &[&str]) -> bool {
    tools.iter().all(|tool| {
        let flag = if *tool == "go" { "version" } else { "--version" };
        Command::new(tool)
            .arg(flag)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    })
}

fn workdir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("harness-run-{}-{}", std::process::id(), name));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("scratch directory must be writable");
    dir
}

fn write_program(dir: &Path, program: &GeneratedProgram) {
    for file in &program.files {
        let path = dir.join(&file.name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, &file.content).unwrap();
    }
}

fn build(dir: &Path, program: &str, args: &[&str]) {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .expect("build tool must start");
    assert!(
        output.status.success(),
        "{} failed:\n{}",
        program,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn execute(dir: &Path, mut command: Command, stdin: &str) -> String {
    let mut child = command
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("generated program must start");
    if let Some(mut pipe) = child.stdin.take() {
        pipe.write_all(stdin.as_bytes()).unwrap();
    }
    let output = child.wait_with_output().unwrap();
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Generate, build and run `req`, or `None` when the toolchain is missing.
fn run(req: &GenerateRequest, name: &str) -> Option<Vec<Outcome>> {
    let tools: &[&str] = match req.language.as_str() {
        "python" => &["python3"],
        "javascript" => &["node"],
        "cpp" => &["g++"],
        "java" => &["javac", "java"],
        "rust" => &["rustc"],
        "go" => &["go"],
        other => panic!("no toolchain known for {}", other),
    };
    if !available(tools) {
        eprintln!("skipping {}: {} not found", name, tools.join(", "));
        return None;
    }

    let program = generate(req).expect("program must generate");
    let dir = workdir(name);
    write_program(&dir, &program);
    let entry = program.entry_point.as_str();
    let command = match req.language.as_str() {
        "python" => {
            let mut c = Command::new("python3");
            c.arg(entry);
            c
        }
        "javascript" => {
            let mut c = Command::new("node");
            c.arg(entry);
            c
        }
        "cpp" => {
            build(&dir, "g++", &["-std=c++17", "-o", BINARY, entry]);
            Command::new(dir.join(BINARY))
        }
        "java" => {
            build(&dir, "javac", &["-d", "classes", entry]);
            let mut c = Command::new("java");
            c.args(["-cp", "classes", "HarnessMain"]);
            c
        }
        "rust" => {
            build(&dir, "rustc", &["--edition", "2021", "-o", BINARY, entry]);
            Command::new(dir.join(BINARY))
        }
        "go" => {
            build(&dir, "go", &["build", "-o", BINARY, entry]);
            Command::new(dir.join(BINARY))
        }
        _ => unreachable!(),
    };
    let stdout = execute(&dir, command, &program.stdin);
    let outcomes = collect_outcomes(program.mode, &req.language, &stdout, &req.test_cases);
    let _ = std::fs::remove_dir_all(&dir);
    Some(outcomes)
}

fn request(language: &str, file: &str, source: &str, cases: Vec<TestCase>) -> GenerateRequest {
    GenerateRequest {
        language: language.to_string(),
        files: vec![SourceFile::new(file, source)],
        test_cases: cases,
        options: GenerateOptions::default(),
    }
}

/// `add(1, 2)`, `divide(10, 0)`, `pairs()` and, where the language keeps
/// integers and floats apart, `one()` against `1.0`.
fn shared_cases(strict_numbers: bool) -> Vec<TestCase> {
    let mut cases = vec![
        TestCase::new("add(1, 2)", Value::Int(3)),
        TestCase::new("divide(10, 0)", Value::Null),
        TestCase::new(
            "pairs()",
            Value::Array(vec![Value::Array(vec![s("card"), Value::Int(1000)])]),
        ),
    ];
    if strict_numbers {
        cases.push(TestCase::new("one()", Value::Float(1.0)));
    }
    cases
}

fn assert_shared(outcomes: &[Outcome], strict_numbers: bool) {
    assert_eq!(outcomes.len(), if strict_numbers { 4 } else { 3 });
    assert!(outcomes[0].passed, "add: {:?}", outcomes[0]);
    assert_eq!(outcomes[0].actual, Value::Int(3));
    assert!(!outcomes[1].passed);
    assert!(outcomes[1].error.is_some(), "divide: {:?}", outcomes[1]);
    assert!(outcomes[2].passed, "pairs: {:?}", outcomes[2]);
    if strict_numbers {
        assert!(!outcomes[3].passed, "one: {:?}", outcomes[3]);
        assert!(outcomes[3].error.is_none());
    }
}

// ============================================================================
// Dynamic languages
// ============================================================================

#[test]
fn python_program_runs() {
    let source = "def add(a, b):\n    return a + b\n\ndef divide(a, b):\n    return a // b\n\ndef one():\n    return 1\n\ndef pairs():\n    print(\"noise\")\n    return [(\"card\", 1000)]\n";
    let req = request("python", "solution.py", source, shared_cases(true));
    let Some(outcomes) = run(&req, "python") else {
        return;
    };
    assert_shared(&outcomes, true);
    assert!(outcomes[1]
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("ZeroDivisionError")));
}

#[test]
fn javascript_program_runs() {
    let source = "function add(a, b) { return a + b; }\n\nfunction divide(a, b) {\n  if (b === 0) throw new RangeError('division by zero');\n  return Math.trunc(a / b);\n}\n\nfunction pairs() { return [['card', 1000]]; }\n\nmodule.exports = { add, divide, pairs };\n";
    let req = request("javascript", "solution.js", source, shared_cases(false));
    let Some(outcomes) = run(&req, "javascript") else {
        return;
    };
    assert_shared(&outcomes, false);
}

// ============================================================================
// Compiled languages
// ============================================================================

#[test]
fn cpp_program_runs() {
    let source = "#include <string>\n#include <utility>\n#include <vector>\n\nint add(int a, int b) { return a + b; }\nint divide(int a, int b) { return a / b; }\nint one() { return 1; }\nstd::vector<std::pair<std::string, int>> pairs() { return {{\"card\", 1000}}; }\n";
    let req = request("cpp", "solution.cpp", source, shared_cases(true));
    let Some(outcomes) = run(&req, "cpp") else {
        return;
    };
    assert_shared(&outcomes, true);
}

#[test]
fn cpp_class_methods_run() {
    let source = "class Solution {\npublic:\n    int add(int a, int b) { return a + b; }\n    static int twice(int a) { return 2 * a; }\n};\n\nint main() {\n    return Solution().add(1, 2);\n}\n";
    let req = request(
        "cpp",
        "solution.cpp",
        source,
        vec![
            TestCase::new("add(1, 2)", Value::Int(3)),
            TestCase::new("twice(4)", Value::Int(8)),
        ],
    );
    let Some(outcomes) = run(&req, "cpp-class") else {
        return;
    };
    assert!(outcomes.iter().all(|o| o.passed), "{:?}", outcomes);
}

#[test]
fn java_program_runs() {
    let source = "import java.util.*;\n\npublic class Solution {\n    public int add(int a, int b) { return a + b; }\n    public int divide(int a, int b) { return a / b; }\n    public int one() { return 1; }\n    public List<List<Object>> pairs() { return List.of(List.of(\"card\", 1000)); }\n}\n";
    let req = request("java", "Solution.java", source, shared_cases(true));
    let Some(outcomes) = run(&req, "java") else {
        return;
    };
    assert_shared(&outcomes, true);
}

#[test]
fn rust_program_runs() {
    let source = "fn add(a: i64, b: i64) -> i64 { a + b }\n\nfn divide(a: i64, b: i64) -> i64 { a / b }\n\nfn one() -> i64 { 1 }\n\nfn pairs() -> Vec<(String, i64)> { vec![(\"card\".to_string(), 1000)] }\n\nfn main() {}\n";
    let req = request("rust", "main.rs", source, shared_cases(true));
    let Some(outcomes) = run(&req, "rust") else {
        return;
    };
    assert_shared(&outcomes, true);
}

#[test]
fn rust_structured_float_vectors_run() {
    let source = "fn total(xs: Vec<f64>) -> f64 { xs.iter().sum() }\n\nfn firsts(xs: Vec<Option<i64>>) -> usize { xs.iter().flatten().count() }\n";
    let mut req = request(
        "rust",
        "main.rs",
        source,
        vec![
            TestCase::new("total([1, 2.5])", Value::Float(3.5)),
            TestCase::new("firsts([1, null, 3])", Value::Int(2)),
        ],
    );
    req.options.call_mode = CallMode::Structured;
    let Some(outcomes) = run(&req, "rust-structured") else {
        return;
    };
    assert!(outcomes.iter().all(|o| o.passed), "{:?}", outcomes);
}

#[test]
fn go_program_runs() {
    let source = "package main\n\nimport \"errors\"\n\nfunc Add(a, b int) int { return a + b }\n\nfunc Divide(a, b int) (int, error) {\n\tif b == 0 {\n\t\treturn 0, errors.New(\"division by zero\")\n\t}\n\treturn a / b, nil\n}\n\nfunc MinMax(xs []int) (int, int) { return xs[0], xs[len(xs)-1] }\n";
    let req = request(
        "go",
        "main.go",
        source,
        vec![
            TestCase::new("Add(1, 2)", Value::Int(3)),
            TestCase::new("Divide(10, 0)", Value::Null),
            TestCase::new("Divide(9, 3)", Value::Int(3)),
            TestCase::new(
                "MinMax([]int{4, 7})",
                Value::Array(vec![Value::Int(4), Value::Int(7)]),
            ),
        ],
    );
    let Some(outcomes) = run(&req, "go") else {
        return;
    };
    assert!(outcomes[0].passed, "{:?}", outcomes[0]);
    assert!(!outcomes[1].passed);
    assert_eq!(outcomes[1].error.as_deref(), Some("Error: division by zero"));
    assert!(outcomes[2].passed, "{:?}", outcomes[2]);
    assert!(outcomes[3].passed, "{:?}", outcomes[3]);
}
