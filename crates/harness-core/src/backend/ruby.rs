//! Ruby backend.
//!
//! The solution is `load`ed at top level and each pass-through call is
//! `eval`ed against `TOPLEVEL_BINDING`. Symbols serialize as strings and hash
//! keys are matched literally first, then by string form.

use super::{
    call_texts, expected_lines_payload, fill, indent, non_finite, primary, quote_string,
    records_payload, Backend, ControlEscape, Payload,
};
use crate::error::Result;
use crate::program::{CallMode, GenerateOptions, GeneratedProgram, ProgramMode, SourceFile, TestCase};
use crate::value::{float_text, Value};

const RUNTIME: &str = include_str!("runtime/ruby_runner.rb");

/// Name of the generated entry file.
pub const RUNNER_FILE: &str = "_harness_runner.rb";

pub struct Ruby;

fn quote(s: &str) -> String {
    quote_string(s, ControlEscape::Hex, &['#'])
}

impl Backend for Ruby {
    fn name(&self) -> &'static str {
        "ruby"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["ruby", "rb", "jruby", "truffleruby"]
    }

    fn render(&self, value: &Value) -> Result<String> {
        Ok(match value {
            Value::Null | Value::Undefined => "nil".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => match non_finite(*f, "Float::NAN", "Float::INFINITY", "-Float::INFINITY") {
                Some(constant) => constant.to_string(),
                None => float_text(*f),
            },
            Value::String(s) => quote(s),
            Value::Array(items) => {
                let parts = items.iter().map(|v| self.render(v)).collect::<Result<Vec<_>>>()?;
                format!("[{}]", parts.join(", "))
            }
            Value::Object(entries) if entries.is_empty() => "{}".to_string(),
            Value::Object(entries) => {
                let parts = entries
                    .iter()
                    .map(|(k, v)| Ok(format!("{} => {}", quote(k), self.render(v)?)))
                    .collect::<Result<Vec<_>>>()?;
                format!("{{ {} }}", parts.join(", "))
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
                let lambdas: Vec<String> = calls.iter().map(|c| format!("-> {{ {} }},", c)).collect();
                (expected_lines_payload(cases), indent(&lambdas.join("\n"), 6))
            }
        };
        let payload = Payload::route(payload_text, options.expected_delivery);
        let structured = (options.call_mode == CallMode::Structured).to_string();

        let runner = fill(
            RUNTIME,
            &[
                ("SOLUTION_PATH", &quote(&solution.name)),
                ("PAYLOAD", &payload.literal(quote, "nil")),
                ("STRUCTURED", &structured),
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
