//! Rust backend.
//!
//! The solution and the runtime share one crate root, `harness_main.rs`.
//! Results are folded through the runtime's `ToJv` trait, implemented for
//! primitives, strings, slices, `Vec`, tuples, `Option`, `Result` and the
//! std maps and sets. Each call runs under `catch_unwind`, so a panic fails
//! only its own case.
//!
//! Collection literals are typed from their contents: integers next to
//! floats are written as floats and nulls turn the element type into an
//! `Option`, so `[1, 2.5, null]` becomes `vec![Some(1.0), Some(2.5), None]`.

use super::{
    call_texts, expected_lines_payload, fill, is_wide, non_finite, primary, quote_string, Backend,
    ControlEscape, Payload,
};
use crate::error::{HarnessError, Result};
use crate::program::{GenerateOptions, GeneratedProgram, ProgramMode, SourceFile, TestCase};
use crate::value::{float_text, Value};

const RUNTIME: &str = include_str!("runtime/harness_main.rs");

/// Name of the generated entry file.
pub const MAIN_FILE: &str = "harness_main.rs";

pub struct Rust;

fn quote(s: &str) -> String {
    quote_string(s, ControlEscape::BracedUnicode, &[])
}

/// Move a top-level `fn main()` out of the way of the runtime's.
fn rename_user_main(source: &str) -> String {
    let mut out: Vec<String> = source
        .lines()
        .map(|line| {
            for prefix in ["fn main()", "pub fn main()"] {
                if let Some(rest) = line.strip_prefix(prefix) {
                    return format!("#[allow(dead_code)]\nfn __user_main(){}", rest);
                }
            }
            line.to_string()
        })
        .collect();
    out.push(String::new());
    out.join("\n")
}

/// The Rust type a literal takes once its siblings are accounted for.
#[derive(Debug, Clone, PartialEq)]
enum Shape {
    /// Nothing but nulls (or nothing at all) seen so far.
    Unknown,
    Int,
    Float,
    Bool,
    Str,
    List(Box<Shape>),
    Map(Box<Shape>),
    Optional(Box<Shape>),
}

impl Shape {
    /// `None` when a collection mixes kinds no single Rust type holds.
    fn of(value: &Value) -> Option<Shape> {
        Some(match value {
            Value::Null | Value::Undefined => Shape::Optional(Box::new(Shape::Unknown)),
            Value::Bool(_) => Shape::Bool,
            Value::Int(_) => Shape::Int,
            Value::Float(_) => Shape::Float,
            Value::String(_) => Shape::Str,
            Value::Array(items) => Shape::List(Box::new(Self::common(items.iter())?)),
            Value::Object(entries) => Shape::Map(Box::new(Self::common(entries.iter().map(|(_, v)| v))?)),
        })
    }

    fn common<'a>(mut values: impl Iterator<Item = &'a Value>) -> Option<Shape> {
        values.try_fold(Shape::Unknown, |acc, value| Self::unify(acc, Self::of(value)?))
    }

    fn unify(a: Shape, b: Shape) -> Option<Shape> {
        match (a, b) {
            (x, y) if x == y => Some(x),
            (Shape::Unknown, t) | (t, Shape::Unknown) => Some(t),
            (Shape::Optional(x), Shape::Optional(y)) => {
                Some(Shape::Optional(Box::new(Self::unify(*x, *y)?)))
            }
            (Shape::Optional(x), t) | (t, Shape::Optional(x)) => {
                Some(Shape::Optional(Box::new(Self::unify(*x, t)?)))
            }
            (Shape::Int, Shape::Float) | (Shape::Float, Shape::Int) => Some(Shape::Float),
            (Shape::List(x), Shape::List(y)) => Some(Shape::List(Box::new(Self::unify(*x, *y)?))),
            (Shape::Map(x), Shape::Map(y)) => Some(Shape::Map(Box::new(Self::unify(*x, *y)?))),
            _ => None,
        }
    }
}

impl Rust {
    fn render_as(&self, value: &Value, shape: &Shape) -> Result<String> {
        Ok(match (value, shape) {
            (Value::Null | Value::Undefined, _) => "None".to_string(),
            (_, Shape::Optional(inner)) => format!("Some({})", self.render_as(value, inner)?),
            (Value::Bool(b), _) => b.to_string(),
            (Value::Int(i), Shape::Float) => float_text(*i as f64),
            (Value::Int(i), _) if is_wide(*i) => format!("{}i64", i),
            (Value::Int(i), _) => i.to_string(),
            (Value::Float(f), _) => match non_finite(*f, "f64::NAN", "f64::INFINITY", "f64::NEG_INFINITY") {
                Some(constant) => constant.to_string(),
                None => float_text(*f),
            },
            (Value::String(s), _) => quote(s),
            (Value::Array(items), Shape::List(inner)) => {
                let parts = items
                    .iter()
                    .map(|v| self.render_as(v, inner))
                    .collect::<Result<Vec<_>>>()?;
                format!("vec![{}]", parts.join(", "))
            }
            (Value::Object(entries), _) if entries.is_empty() => {
                "std::collections::HashMap::new()".to_string()
            }
            (Value::Object(entries), Shape::Map(inner)) => {
                let parts = entries
                    .iter()
                    .map(|(k, v)| Ok(format!("({}, {})", quote(k), self.render_as(v, inner)?)))
                    .collect::<Result<Vec<_>>>()?;
                format!("std::collections::HashMap::from([{}])", parts.join(", "))
            }
            (Value::Array(_) | Value::Object(_), _) => self.render(value)?,
        })
    }
}

impl Backend for Rust {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["rust", "rs", "rustc", "cargo"]
    }

    fn render(&self, value: &Value) -> Result<String> {
        let shape = Shape::of(value).ok_or(HarnessError::UnsupportedValue {
            kind: "mixed-type collection",
            language: "rust",
        })?;
        self.render_as(value, &shape)
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
        let pushes: Vec<String> = calls
            .iter()
            .map(|call| format!("    cases.push(Box::new(|| harness_rt::ToJv::to_jv(&({}))));", call))
            .collect();
        let payload = Payload::route(expected_lines_payload(cases), options.expected_delivery);
        let embedded = payload.literal(|text| format!("Some({})", quote(text)), "None");

        let main = fill(
            RUNTIME,
            &[
                ("USER_SOURCE", body.trim_end()),
                ("PAYLOAD", &embedded),
                ("CALLS", &pushes.join("\n")),
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
