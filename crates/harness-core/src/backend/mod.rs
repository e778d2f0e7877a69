//! Per-language program generators.
//!
//! Every backend implements [`Backend`]: it can render a [`Value`] as a source
//! literal and turn user files plus test cases into a [`GeneratedProgram`].
//! Each generated program carries its own runtime (serializer, JSON reader,
//! deep comparator) written in the target language; those runtimes live in
//! `backend/runtime/` and are pulled in with `include_str!`.
//!
//! Runtime templates use `{{NAME}}` placeholders filled by [`fill`].

pub mod cpp;
pub mod csharp;
pub mod generic;
pub mod go;
pub mod java;
pub mod javascript;
pub mod python;
pub mod ruby;
pub mod rust;

use crate::error::{HarnessError, Result};
use crate::parser::{parse, Invocation};
use crate::program::{CallMode, ExpectedDelivery, GenerateOptions, GeneratedProgram, SourceFile, TestCase};
use crate::value::Value;
use serde_json::Map;

/// A target-language generator.
pub trait Backend: Send + Sync {
    /// Canonical language name.
    fn name(&self) -> &'static str;

    /// Identifiers (already normalised) that resolve to this backend.
    fn aliases(&self) -> &'static [&'static str];

    /// Render a value as a literal in the target language.
    ///
    /// # Errors
    /// Returns [`HarnessError::UnsupportedValue`] when the value has no
    /// literal form in this language.
    fn render(&self, value: &Value) -> Result<String>;

    /// Render a parsed call. The default is `path(arg, ...)`.
    fn render_call(&self, invocation: &Invocation) -> Result<String> {
        let args = invocation
            .args
            .iter()
            .map(|arg| self.render(arg))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("{}({})", invocation.function_name, args.join(", ")))
    }

    /// Build the runnable program.
    fn generate(
        &self,
        files: &[SourceFile],
        cases: &[TestCase],
        options: &GenerateOptions,
    ) -> Result<GeneratedProgram>;
}

/// Call expressions in target syntax: raw text in pass-through mode, or
/// parsed and re-rendered in structured mode.
pub(crate) fn call_texts<B: Backend + ?Sized>(
    backend: &B,
    cases: &[TestCase],
    mode: CallMode,
) -> Result<Vec<String>> {
    cases
        .iter()
        .enumerate()
        .map(|(index, case)| match mode {
            CallMode::PassThrough => Ok(case.call.trim().to_string()),
            CallMode::Structured => {
                let invocation =
                    parse(&case.call).map_err(|source| HarnessError::Parse { index, source })?;
                backend.render_call(&invocation)
            }
        })
        .collect()
}

/// `[{"call": ..., "expected": ...}, ...]`: the record payload for
/// runtime-evaluated calls and for the fallback backend.
pub(crate) fn records_payload(cases: &[TestCase]) -> String {
    let records: Vec<serde_json::Value> = cases
        .iter()
        .map(|case| {
            let mut record = Map::new();
            record.insert("call".to_string(), serde_json::Value::String(case.call.clone()));
            record.insert("expected".to_string(), case.expected.to_json());
            serde_json::Value::Object(record)
        })
        .collect();
    serde_json::Value::Array(records).to_string()
}

/// One JSON-encoded expected value per line, in call order.
pub(crate) fn expected_lines_payload(cases: &[TestCase]) -> String {
    let mut out = String::new();
    for case in cases {
        out.push_str(&case.expected.to_json_string());
        out.push('\n');
    }
    out
}

/// Payload routing: either stdin, or a literal embedded in source.
pub(crate) struct Payload {
    pub stdin: String,
    pub embedded: Option<String>,
}

impl Payload {
    pub fn route(text: String, delivery: ExpectedDelivery) -> Self {
        match delivery {
            ExpectedDelivery::Stdin => Payload {
                stdin: text,
                embedded: None,
            },
            ExpectedDelivery::Embedded => Payload {
                stdin: String::new(),
                embedded: Some(text),
            },
        }
    }

    /// The embedded literal, or `none` when the payload travels on stdin.
    pub fn literal(&self, quote: impl Fn(&str) -> String, none: &str) -> String {
        match &self.embedded {
            Some(text) => quote(text),
            None => none.to_string(),
        }
    }
}

/// Replace `{{KEY}}` placeholders in a runtime template. Single pass: text
/// substituted for one key is never scanned for another. Unknown keys are
/// left in place.
pub(crate) fn fill(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let replaced = after.find("}}").and_then(|end| {
            let key = &after[..end];
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (value, end))
        });
        match replaced {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// How control characters other than `\n`, `\r`, `\t` are spelled.
#[derive(Clone, Copy)]
pub(crate) enum ControlEscape {
    /// `\x07`
    Hex,
    /// `\u0007`
    Unicode,
    /// `\007` (never greedy; Java and C++)
    Octal,
    /// `\u{7}`
    BracedUnicode,
}

/// Double-quoted string literal with backslash, quote, newline, CR and tab
/// escaped. `extra` lists further characters to backslash-escape (`#` for
/// Ruby interpolation).
pub(crate) fn quote_string(s: &str, control: ControlEscape, extra: &[char]) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if extra.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let code = c as u32;
                match control {
                    ControlEscape::Hex => out.push_str(&format!("\\x{:02x}", code)),
                    ControlEscape::Unicode => out.push_str(&format!("\\u{:04x}", code)),
                    ControlEscape::Octal => out.push_str(&format!("\\{:03o}", code)),
                    ControlEscape::BracedUnicode => out.push_str(&format!("\\u{{{:x}}}", code)),
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Outside the signed 32-bit range.
pub(crate) fn is_wide(i: i64) -> bool {
    i < i64::from(i32::MIN) || i > i64::from(i32::MAX)
}

/// Named constants for non-finite floats, or `None` when `f` is finite.
pub(crate) fn non_finite<'a>(f: f64, nan: &'a str, inf: &'a str, neg_inf: &'a str) -> Option<&'a str> {
    if f.is_nan() {
        Some(nan)
    } else if f == f64::INFINITY {
        Some(inf)
    } else if f == f64::NEG_INFINITY {
        Some(neg_inf)
    } else {
        None
    }
}

/// Indent every non-empty line of `text` by `spaces`.
pub(crate) fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The primary (first) user file. Requests are validated to carry at least one.
pub(crate) fn primary(files: &[SourceFile]) -> Result<&SourceFile> {
    files
        .first()
        .ok_or_else(|| HarnessError::InvalidInput("at least one source file is required".to_string()))
}

/// Static type of a literal, for statically typed targets that need a typed
/// collection initialiser (`new int[]{...}`, `[]float64{...}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LiteralType {
    Int,
    /// Integer outside the 32-bit range.
    Wide,
    Float,
    Bool,
    Str,
    Any,
    List(Box<LiteralType>),
    Map(Box<LiteralType>),
}

impl LiteralType {
    /// `None` for null, which has no type of its own.
    pub fn of(value: &Value) -> Option<LiteralType> {
        match value {
            Value::Null | Value::Undefined => None,
            Value::Bool(_) => Some(LiteralType::Bool),
            Value::Int(i) if is_wide(*i) => Some(LiteralType::Wide),
            Value::Int(_) => Some(LiteralType::Int),
            Value::Float(_) => Some(LiteralType::Float),
            Value::String(_) => Some(LiteralType::Str),
            Value::Array(items) => Some(LiteralType::List(Box::new(Self::common(
                items.iter(),
                LiteralType::Int,
            )))),
            Value::Object(entries) => Some(LiteralType::Map(Box::new(Self::common(
                entries.iter().map(|(_, v)| v),
                LiteralType::Any,
            )))),
        }
    }

    /// Whether `null` fits this type in every target. Go strings cannot be
    /// `nil`, so strings mixed with null widen to the dynamic type everywhere.
    fn nullable(&self) -> bool {
        matches!(
            self,
            LiteralType::Any | LiteralType::List(_) | LiteralType::Map(_)
        )
    }

    fn unify(a: Option<LiteralType>, b: Option<LiteralType>) -> Option<LiteralType> {
        match (a, b) {
            (None, None) => None,
            (Some(t), None) | (None, Some(t)) if t.nullable() => Some(t),
            (Some(_), None) | (None, Some(_)) => Some(LiteralType::Any),
            (Some(x), Some(y)) if x == y => Some(x),
            (Some(x), Some(y)) => match (x, y) {
                (LiteralType::Int, LiteralType::Wide) | (LiteralType::Wide, LiteralType::Int) => {
                    Some(LiteralType::Wide)
                }
                (LiteralType::List(a), LiteralType::List(b)) => Some(LiteralType::List(Box::new(
                    Self::unify(Some(*a), Some(*b)).unwrap_or(LiteralType::Any),
                ))),
                (LiteralType::Map(a), LiteralType::Map(b)) => Some(LiteralType::Map(Box::new(
                    Self::unify(Some(*a), Some(*b)).unwrap_or(LiteralType::Any),
                ))),
                (LiteralType::Int | LiteralType::Wide, LiteralType::Float)
                | (LiteralType::Float, LiteralType::Int | LiteralType::Wide) => Some(LiteralType::Float),
                _ => Some(LiteralType::Any),
            },
        }
    }

    /// The type every value fits, or `empty` when there are no values.
    pub fn common<'a>(values: impl Iterator<Item = &'a Value>, empty: LiteralType) -> LiteralType {
        let mut values = values.peekable();
        if values.peek().is_none() {
            return empty;
        }
        values
            .map(LiteralType::of)
            .reduce(LiteralType::unify)
            .flatten()
            .unwrap_or(LiteralType::Any)
    }
}
