//! Python backend.
//!
//! Pass-through calls travel on stdin as `{call, expected}` records and are
//! `eval`ed inside the solution module's namespace, so comprehensions,
//! lambdas and keyword arguments all work. Structured calls are rendered as
//! lambdas in the runner and the expected values arrive one per line.

use super::{
    call_texts, expected_lines_payload, fill, indent, non_finite, primary, quote_string,
    records_payload, Backend, ControlEscape, Payload,
};
use crate::error::Result;
use crate::program::{CallMode, GenerateOptions, GeneratedProgram, ProgramMode, SourceFile, TestCase};
use crate::value::{float_text, Value};

const RUNTIME: &str = include_str!("runtime/python_runner.py");

/// Name of the generated entry file.
pub const RUNNER_FILE: &str = "_harness_runner.py";

pub struct Python;

fn quote(s: &str) -> String {
    quote_string(s, ControlEscape::Hex, &[])
}

impl Backend for Python {
    fn name(&self) -> &'static str {
        "python"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["python", "py", "python3", "py3", "cpython", "pypy", "pypy3"]
    }

    fn render(&self, value: &Value) -> Result<String> {
        Ok(match value {
            Value::Null | Value::Undefined => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => match non_finite(*f, "float('nan')", "float('inf')", "float('-inf')") {
                Some(constant) => constant.to_string(),
                None => float_text(*f),
            },
            Value::String(s) => quote(s),
            Value::Array(items) => {
                let parts = items.iter().map(|v| self.render(v)).collect::<Result<Vec<_>>>()?;
                format!("[{}]", parts.join(", "))
            }
            Value::Object(entries) => {
                let parts = entries
                    .iter()
                    .map(|(k, v)| Ok(format!("{}: {}", quote(k), self.render(v)?)))
                    .collect::<Result<Vec<_>>>()?;
                format!("{{{}}}", parts.join(", "))
            }
        })
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
                let lambdas: Vec<String> = calls.iter().map(|c| format!("lambda: {},", c)).collect();
                (expected_lines_payload(cases), indent(&lambdas.join("\n"), 8))
            }
        };
        let payload = Payload::route(payload_text, options.expected_delivery);
        let structured = if options.call_mode == CallMode::Structured {
            "True"
        } else {
            "False"
        };

        let runner = fill(
            RUNTIME,
            &[
                ("SOLUTION_PATH", &quote(&solution.name)),
                ("MODULE_NAME", &quote(solution.stem())),
                ("PAYLOAD", &payload.literal(quote, "None")),
                ("STRUCTURED", structured),
                ("STRUCTURED_CALLS", &structured_calls),
                ("CASE_COUNT", &cases.len().to_string()),
            ],
        );

        let mut out_files = files.to_vec();
        out_files.push(SourceFile::new(RUNNER_FILE, runner));
        Ok(GeneratedProgram {
            files: out_files,
            entry_point: RUNNER_FILE.to_string(),
            stdin: payload.stdin,
            mode: ProgramMode::Native,
        })
    }
}
