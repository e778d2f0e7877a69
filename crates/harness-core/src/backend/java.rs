//! Java backend.
//!
//! Everything lands in one compilation unit, `HarnessMain.java`: hoisted
//! imports, the user's source with its package line removed and its public
//! types demoted, then the public `HarnessMain` class holding one lambda per
//! case. Unqualified calls are routed through the user's primary type.

use super::{
    call_texts, expected_lines_payload, fill, indent, is_wide, non_finite, primary, quote_string,
    Backend, ControlEscape, LiteralType, Payload,
};
use crate::error::Result;
use crate::hygiene::{self, ImportStyle};
use crate::program::{GenerateOptions, GeneratedProgram, ProgramMode, SourceFile, TestCase};
use crate::value::{float_text, Value};
use tracing::debug;

const RUNTIME: &str = include_str!("runtime/HarnessMain.java");

/// Name of the generated entry file.
pub const MAIN_FILE: &str = "HarnessMain.java";

const RUNTIME_IMPORTS: &[&str] = &[
    "import java.io.*;",
    "import java.math.*;",
    "import java.nio.charset.StandardCharsets;",
    "import java.util.*;",
];

pub struct Java;

fn quote(s: &str) -> String {
    quote_string(s, ControlEscape::Octal, &[])
}

/// Java spelling of a literal type, for typed array initialisers.
fn type_name(t: &LiteralType) -> String {
    match t {
        LiteralType::Int => "int".to_string(),
        LiteralType::Wide => "long".to_string(),
        LiteralType::Float => "double".to_string(),
        LiteralType::Bool => "boolean".to_string(),
        LiteralType::Str => "String".to_string(),
        LiteralType::Any | LiteralType::Map(_) => "Object".to_string(),
        LiteralType::List(inner) => format!("{}[]", type_name(inner)),
    }
}

impl Java {
    fn render_as(&self, value: &Value, target: &LiteralType) -> Result<String> {
        match (value, target) {
            (Value::Int(i), LiteralType::Wide) => Ok(format!("{}L", i)),
            (Value::Int(i), LiteralType::Float) => Ok(float_text(*i as f64)),
            (Value::Array(items), LiteralType::List(element)) => self.array(items, element),
            _ => self.render(value),
        }
    }

    fn array(&self, items: &[Value], element: &LiteralType) -> Result<String> {
        let parts = items
            .iter()
            .map(|v| self.render_as(v, element))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("new {}[]{{{}}}", type_name(element), parts.join(", ")))
    }
}

impl Backend for Java {
    fn name(&self) -> &'static str {
        "java"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["java", "jdk", "openjdk"]
    }

    fn render(&self, value: &Value) -> Result<String> {
        Ok(match value {
            Value::Null | Value::Undefined => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) if is_wide(*i) => format!("{}L", i),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => match non_finite(
                *f,
                "Double.NaN",
                "Double.POSITIVE_INFINITY",
                "Double.NEGATIVE_INFINITY",
            ) {
                Some(constant) => constant.to_string(),
                None => float_text(*f),
            },
            Value::String(s) => quote(s),
            Value::Array(items) => {
                self.array(items, &LiteralType::common(items.iter(), LiteralType::Int))?
            }
            Value::Object(entries) => {
                let parts = entries
                    .iter()
                    .map(|(k, v)| Ok(format!("{}, {}", quote(k), self.render(v)?)))
                    .collect::<Result<Vec<_>>>()?;
                format!("HarnessMain.mapOf({})", parts.join(", "))
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
        let (source, package) = hygiene::strip_package(&solution.content, "package");
        if let Some(package) = package {
            debug!(package = %package, "dropped package declaration");
        }
        let (user_imports, body) = hygiene::hoist_imports(&source, ImportStyle::Java);
        let primary_type = hygiene::primary_type(&body);
        let body = hygiene::demote_public_types(&body);

        let calls = call_texts(self, cases, options.call_mode)?;
        let thunks: Vec<String> = calls
            .iter()
            .map(|call| {
                let call = match &primary_type {
                    Some(type_name) => hygiene::qualify_call(call, type_name, &body),
                    None => call.clone(),
                };
                format!("() -> {},", call)
            })
            .collect();

        let imports = hygiene::dedupe(
            RUNTIME_IMPORTS
                .iter()
                .map(|s| s.to_string())
                .chain(user_imports),
        );
        let payload = Payload::route(expected_lines_payload(cases), options.expected_delivery);
        let main = fill(
            RUNTIME,
            &[
                ("IMPORTS", &imports.join("\n")),
                ("USER_SOURCE", body.trim_end()),
                ("PAYLOAD", &payload.literal(quote, "null")),
                ("CALLS", &indent(&thunks.join("\n"), 12)),
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
