//! C# backend.
//!
//! The solution and the runtime share `HarnessProgram.cs`. User `using`
//! directives are hoisted above both, a file-scoped namespace is dropped and
//! a block namespace is imported instead, and a user `Main` is renamed so the
//! harness owns the entry point. Cases are `Func<object>` lambdas.

use super::{
    call_texts, expected_lines_payload, fill, indent, is_wide, non_finite, primary, quote_string,
    Backend, ControlEscape, LiteralType, Payload,
};
use crate::error::Result;
use crate::hygiene::{self, ImportStyle};
use crate::program::{GenerateOptions, GeneratedProgram, ProgramMode, SourceFile, TestCase};
use crate::value::{float_text, Value};
use tracing::debug;

const RUNTIME: &str = include_str!("runtime/HarnessProgram.cs");

/// Name of the generated entry file.
pub const MAIN_FILE: &str = "HarnessProgram.cs";

const RUNTIME_USINGS: &[&str] = &[
    "using System;",
    "using System.Collections;",
    "using System.Collections.Generic;",
    "using System.Globalization;",
    "using System.IO;",
    "using System.Linq;",
    "using System.Numerics;",
    "using System.Reflection;",
    "using System.Runtime.CompilerServices;",
    "using System.Text;",
    "using System.Text.Json;",
];

pub struct CSharp;

fn quote(s: &str) -> String {
    quote_string(s, ControlEscape::Unicode, &[])
}

fn type_name(t: &LiteralType) -> String {
    match t {
        LiteralType::Int => "int".to_string(),
        LiteralType::Wide => "long".to_string(),
        LiteralType::Float => "double".to_string(),
        LiteralType::Bool => "bool".to_string(),
        LiteralType::Str => "string".to_string(),
        LiteralType::Any => "object".to_string(),
        LiteralType::List(inner) => format!("{}[]", type_name(inner)),
        LiteralType::Map(inner) => format!("Dictionary<string, {}>", type_name(inner)),
    }
}

/// Rename `static ... Main(` so the runtime's `Main` is the only entry point.
fn rename_user_main(source: &str) -> String {
    let mut out: Vec<String> = source
        .lines()
        .map(|line| {
            let is_main = line.split_whitespace().any(|w| w == "static") && line.contains(" Main(");
            if is_main {
                line.replacen(" Main(", " __UserMain(", 1)
            } else {
                line.to_string()
            }
        })
        .collect();
    out.push(String::new());
    out.join("\n")
}

impl CSharp {
    fn render_as(&self, value: &Value, target: &LiteralType) -> Result<String> {
        match (value, target) {
            (Value::Int(i), LiteralType::Wide) => Ok(format!("{}L", i)),
            (Value::Int(i), LiteralType::Float) => Ok(float_text(*i as f64)),
            (Value::Array(items), LiteralType::List(element)) => self.array(items, element),
            (Value::Object(entries), LiteralType::Map(element)) => self.dictionary(entries, element),
            _ => self.render(value),
        }
    }

    fn array(&self, items: &[Value], element: &LiteralType) -> Result<String> {
        let parts = items
            .iter()
            .map(|v| self.render_as(v, element))
            .collect::<Result<Vec<_>>>()?;
        if parts.is_empty() {
            return Ok(format!("new {}[] {{ }}", type_name(element)));
        }
        Ok(format!("new {}[] {{ {} }}", type_name(element), parts.join(", ")))
    }

    fn dictionary(&self, entries: &[(String, Value)], element: &LiteralType) -> Result<String> {
        let parts = entries
            .iter()
            .map(|(k, v)| Ok(format!("[{}] = {}", quote(k), self.render_as(v, element)?)))
            .collect::<Result<Vec<_>>>()?;
        if parts.is_empty() {
            return Ok(format!("new Dictionary<string, {}>()", type_name(element)));
        }
        Ok(format!(
            "new Dictionary<string, {}> {{ {} }}",
            type_name(element),
            parts.join(", ")
        ))
    }
}

impl Backend for CSharp {
    fn name(&self) -> &'static str {
        "csharp"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["csharp", "c#", "cs", "dotnet", "mono"]
    }

    fn render(&self, value: &Value) -> Result<String> {
        Ok(match value {
            Value::Null | Value::Undefined => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) if is_wide(*i) => format!("{}L", i),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => match non_finite(
                *f,
                "double.NaN",
                "double.PositiveInfinity",
                "double.NegativeInfinity",
            ) {
                Some(constant) => constant.to_string(),
                None => float_text(*f),
            },
            Value::String(s) => quote(s),
            Value::Array(items) => {
                self.array(items, &LiteralType::common(items.iter(), LiteralType::Int))?
            }
            Value::Object(entries) => self.dictionary(
                entries,
                &LiteralType::common(entries.iter().map(|(_, v)| v), LiteralType::Any),
            )?,
        })
    }

    fn generate(
        &self,
        files: &[SourceFile],
        cases: &[TestCase],
        options: &GenerateOptions,
    ) -> Result<GeneratedProgram> {
        let solution = primary(files)?;
        let (source, namespace) = hygiene::strip_package(&solution.content, "namespace");
        if let Some(namespace) = namespace {
            debug!(namespace = %namespace, "dropped file-scoped namespace");
        }
        let (user_usings, body) = hygiene::hoist_imports(&source, ImportStyle::CSharp);
        let body = rename_user_main(&body);
        let primary_type = hygiene::primary_type(&body);

        let mut usings: Vec<String> = RUNTIME_USINGS.iter().map(|s| s.to_string()).collect();
        usings.extend(user_usings);
        if let Some(namespace) = hygiene::block_namespace(&body) {
            usings.push(format!("using {};", namespace));
        }
        let usings = hygiene::dedupe(usings);

        let calls = call_texts(self, cases, options.call_mode)?;
        let thunks: Vec<String> = calls
            .iter()
            .map(|call| {
                let call = match &primary_type {
                    Some(type_name) => hygiene::qualify_call(call, type_name, &body),
                    None => call.clone(),
                };
                format!("() => {},", call)
            })
            .collect();

        let payload = Payload::route(expected_lines_payload(cases), options.expected_delivery);
        let main = fill(
            RUNTIME,
            &[
                ("USINGS", &usings.join("\n")),
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
