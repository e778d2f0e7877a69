//! JavaScript (Node) and TypeScript backends.
//!
//! Both share one runtime core (`runtime/js_core.js`), which is plain enough
//! to type-check as non-strict TypeScript.
//!
//! JavaScript loads the solution into the global scope with `vm` and, in
//! pass-through mode, evaluates each call text read from stdin. TypeScript
//! must type-check every call, so the calls are compiled in verbatim: the
//! entry file is the solution followed by the runtime and one thunk per case.

use super::{
    call_texts, expected_lines_payload, fill, indent, non_finite, primary, quote_string,
    records_payload, Backend, ControlEscape, Payload,
};
use crate::error::Result;
use crate::program::{CallMode, GenerateOptions, GeneratedProgram, ProgramMode, SourceFile, TestCase};
use crate::value::{float_text, Value};

const CORE: &str = include_str!("runtime/js_core.js");
const JS_RUNTIME: &str = include_str!("runtime/javascript_runner.js");
const TS_RUNTIME: &str = include_str!("runtime/typescript_runner.ts");

/// Name of the generated JavaScript entry file.
pub const JS_RUNNER_FILE: &str = "_harness_runner.js";
/// Name of the generated TypeScript entry file.
pub const TS_RUNNER_FILE: &str = "_harness_main.ts";

const TSCONFIG: &str = r#"{
  "compilerOptions": {
    "target": "ES2020",
    "module": "commonjs",
    "strict": false,
    "esModuleInterop": true,
    "skipLibCheck": true
  }
}
"#;

/// Largest integer a JavaScript number holds exactly.
const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

fn quote(s: &str) -> String {
    quote_string(s, ControlEscape::Unicode, &[])
}

/// Literal syntax shared by both dialects.
fn render_js(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null | Value::Undefined => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) if i.unsigned_abs() > MAX_SAFE_INTEGER as u64 => format!("{}n", i),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => match non_finite(*f, "NaN", "Infinity", "-Infinity") {
            Some(constant) => constant.to_string(),
            None => float_text(*f),
        },
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let parts = items.iter().map(render_js).collect::<Result<Vec<_>>>()?;
            format!("[{}]", parts.join(", "))
        }
        Value::Object(entries) if entries.is_empty() => "{}".to_string(),
        Value::Object(entries) => {
            let parts = entries
                .iter()
                .map(|(k, v)| Ok(format!("{}: {}", quote(k), render_js(v)?)))
                .collect::<Result<Vec<_>>>()?;
            format!("{{ {} }}", parts.join(", "))
        }
    })
}

pub struct JavaScript;

impl Backend for JavaScript {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["javascript", "js", "node", "nodejs", "ecmascript"]
    }

    fn render(&self, value: &Value) -> Result<String> {
        render_js(value)
    }

    fn generate(
        &self,
        files: &[SourceFile],
        cases: &[TestCase],
        options: &GenerateOptions,
    ) -> Result<GeneratedProgram> {
        let solution = primary(files)?;
        let (payload_text, structured_calls) = match options.call_mode {
            CallMode::PassThrough => (records_payload(cases), String::new()),
            CallMode::Structured => {
                let calls = call_texts(self, cases, options.call_mode)?;
                let thunks: Vec<String> = calls.iter().map(|c| format!("() => ({}),", c)).collect();
                (expected_lines_payload(cases), indent(&thunks.join("\n"), 4))
            }
        };
        let payload = Payload::route(payload_text, options.expected_delivery);
        let structured = (options.call_mode == CallMode::Structured).to_string();

        let runner = fill(
            JS_RUNTIME,
            &[
                ("CORE", CORE),
                ("SOLUTION_PATH", &quote(&solution.name)),
                ("PAYLOAD", &payload.literal(quote, "null")),
                ("STRUCTURED", &structured),
                ("STRUCTURED_CALLS", &structured_calls),
                ("CASE_COUNT", &cases.len().to_string()),
            ],
        );

        let mut out_files = files.to_vec();
        out_files.push(SourceFile::new(JS_RUNNER_FILE, runner));
        Ok(GeneratedProgram {
            files: out_files,
            entry_point: JS_RUNNER_FILE.to_string(),
            stdin: payload.stdin,
            mode: ProgramMode::Native,
        })
    }
}

pub struct TypeScript;

impl Backend for TypeScript {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["typescript", "ts", "tsnode", "tsx", "deno"]
    }

    fn render(&self, value: &Value) -> Result<String> {
        render_js(value)
    }

    fn generate(
        &self,
        files: &[SourceFile],
        cases: &[TestCase],
        options: &GenerateOptions,
    ) -> Result<GeneratedProgram> {
        let solution = primary(files)?;
        let calls = call_texts(self, cases, options.call_mode)?;
        let thunks: Vec<String> = calls.iter().map(|c| format!("() => ({}),", c)).collect();
        let payload = Payload::route(expected_lines_payload(cases), options.expected_delivery);

        let runtime = fill(
            TS_RUNTIME,
            &[
                ("CORE", CORE),
                ("PAYLOAD", &payload.literal(quote, "null")),
                ("CASE_COUNT", &cases.len().to_string()),
                ("CALLS", &indent(&thunks.join("\n"), 4)),
            ],
        );
        let mut main = solution.content.clone();
        if !main.ends_with('\n') {
            main.push('\n');
        }
        main.push_str(&runtime);

        let mut out_files: Vec<SourceFile> = files.to_vec();
        if !files.iter().any(|f| f.name == "tsconfig.json") {
            out_files.push(SourceFile::new("tsconfig.json", TSCONFIG));
        }
        out_files.push(SourceFile::new(TS_RUNNER_FILE, main));
        Ok(GeneratedProgram {
            files: out_files,
            entry_point: TS_RUNNER_FILE.to_string(),
            stdin: payload.stdin,
            mode: ProgramMode::Native,
        })
    }
}
