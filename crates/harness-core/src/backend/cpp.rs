//! C++ backend.
//!
//! The solution is inlined ahead of the `harness_rt` namespace in one
//! translation unit, `harness_main.cpp`. Each case becomes a
//! `std::function<JV()>` lambda; `to_jv` overloads fold standard containers,
//! `std::pair`/`std::tuple` and `std::optional` into the runtime's value type.
//! `SIGFPE` and `SIGSEGV` are trapped per case so integer division by zero is
//! reported instead of killing the batch.
//!
//! Calls to a method of a user class are routed through it
//! (`Solution().add(1, 2)`, or `Solution::add(1, 2)` for static methods) and
//! a user `main` is renamed to `harness_user_main`.

use super::{
    call_texts, expected_lines_payload, fill, indent, is_wide, non_finite, primary, quote_string,
    Backend, ControlEscape, Payload,
};
use crate::error::{HarnessError, Result};
use crate::hygiene::{self, Receiver};
use crate::program::{GenerateOptions, GeneratedProgram, ProgramMode, SourceFile, TestCase};
use crate::value::{float_text, Value};

const RUNTIME: &str = include_str!("runtime/harness_main.cpp");

/// Name of the generated entry file.
pub const MAIN_FILE: &str = "harness_main.cpp";

pub struct Cpp;

/// Move a top-level `int main(` out of the way of the runtime's.
fn rename_user_main(source: &str) -> String {
    let mut out: Vec<String> = source
        .lines()
        .map(|line| {
            let is_main = ["int main(", "int main (", "signed main(", "auto main("]
                .iter()
                .any(|prefix| line.starts_with(prefix));
            if is_main {
                line.replacen("main", "harness_user_main", 1)
            } else {
                line.to_string()
            }
        })
        .collect();
    out.push(String::new());
    out.join("\n")
}

/// Route a call to a method of the user's class through an instance, or
/// through the class scope when the method is static.
fn qualify(call: &str, source: &str) -> String {
    let owner = hygiene::call_name(call).and_then(|name| hygiene::owning_type(source, &name));
    match owner {
        Some(type_name) => hygiene::qualify_call_as(call, &type_name, source, Receiver::Scoped),
        None => call.trim().to_string(),
    }
}

fn quote(s: &str) -> String {
    quote_string(s, ControlEscape::Octal, &[])
}

impl Backend for Cpp {
    fn name(&self) -> &'static str {
        "cpp"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["cpp", "c++", "cxx", "cc", "g++", "clang++"]
    }

    fn render(&self, value: &Value) -> Result<String> {
        Ok(match value {
            Value::Null | Value::Undefined => "nullptr".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) if *i == i64::MIN => "(-9223372036854775807LL - 1)".to_string(),
            Value::Int(i) if is_wide(*i) => format!("{}LL", i),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => match non_finite(
                *f,
                "std::numeric_limits<double>::quiet_NaN()",
                "std::numeric_limits<double>::infinity()",
                "-std::numeric_limits<double>::infinity()",
            ) {
                Some(constant) => constant.to_string(),
                None => float_text(*f),
            },
            Value::String(s) => quote(s),
            Value::Array(items) => {
                let parts = items.iter().map(|v| self.render(v)).collect::<Result<Vec<_>>>()?;
                format!("{{{}}}", parts.join(", "))
            }
            Value::Object(entries) if entries.is_empty() => {
                return Err(HarnessError::UnsupportedValue {
                    kind: "empty object",
                    language: "cpp",
                })
            }
            Value::Object(entries) => {
                let parts = entries
                    .iter()
                    .map(|(k, v)| Ok(format!("{{{}, {}}}", quote(k), self.render(v)?)))
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
        let body = rename_user_main(&solution.content);
        let calls = call_texts(self, cases, options.call_mode)?;
        let thunks: Vec<String> = calls
            .iter()
            .map(|call| {
                format!(
                    "[]() -> JV {{ return harness_rt::to_jv(({})); }},",
                    qualify(call, &body)
                )
            })
            .collect();
        let payload = Payload::route(expected_lines_payload(cases), options.expected_delivery);

        let main = fill(
            RUNTIME,
            &[
                ("USER_SOURCE", body.trim_end()),
                ("PAYLOAD", &payload.literal(quote, "nullptr")),
                ("CALLS", &indent(&thunks.join("\n"), 8)),
            ],
        );

        let mut out_files: Vec<SourceFile> = files
            .iter()
            .filter(|f| f.name != solution.name)
            .cloned()
            .collect();
        out_files.push(SourceFile::new(MAIN_FILE, main));
        Ok(GeneratedProgram {
            files: out_files,
            entry_point: MAIN_FILE.to_string(),
            stdin: payload.stdin,
            mode: ProgramMode::Native,
        })
    }
}
