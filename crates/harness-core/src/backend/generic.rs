//! Fallback for languages without a native backend.
//!
//! Nothing is generated: the user files go out unchanged, the first one is
//! the entry point, and the raw `{call, expected}` records travel on stdin
//! with each expected value spelled exactly as the request spelled it.
//! The program is marked [`ProgramMode::Fallback`] and its output is never
//! judged; see [`fallback_outcomes`](crate::outcome::fallback_outcomes).

use super::{primary, Backend};
use crate::error::{HarnessError, Result};
use crate::program::{GenerateOptions, GeneratedProgram, ProgramMode, SourceFile, TestCase};
use crate::value::Value;

pub struct Generic;

fn verbatim_records(cases: &[TestCase]) -> String {
    let records: Vec<String> = cases
        .iter()
        .map(|case| {
            format!(
                "{{\"call\":{},\"expected\":{}}}",
                serde_json::Value::String(case.call.clone()),
                case.expected_json()
            )
        })
        .collect();
    format!("[{}]", records.join(","))
}

impl Backend for Generic {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["generic"]
    }

    fn render(&self, value: &Value) -> Result<String> {
        Err(HarnessError::UnsupportedValue {
            kind: value.kind(),
            language: "generic",
        })
    }

    fn generate(
        &self,
        files: &[SourceFile],
        cases: &[TestCase],
        _options: &GenerateOptions,
    ) -> Result<GeneratedProgram> {
        let entry = primary(files)?;
        Ok(GeneratedProgram {
            files: files.to_vec(),
            entry_point: entry.name.clone(),
            stdin: verbatim_records(cases),
            mode: ProgramMode::Fallback,
        })
    }
}
