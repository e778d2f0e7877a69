//! Go backend.
//!
//! The solution is merged into `harness_main.go` under `package main`: its own
//! package clause is dropped, its imports join the runtime's import block,
//! and a user `func main()` is renamed out of the way. Expected values are
//! decoded with `encoding/json` in `UseNumber` mode so integers and floats
//! stay apart; panics are recovered per case.
//!
//! Calls to functions with several results are unpacked in the thunk: a
//! trailing non-nil `error` fails the case, the remaining results become the
//! actual value (a slice when more than one is left).

use super::{
    call_texts, expected_lines_payload, fill, is_wide, non_finite, primary, quote_string,
    Backend, ControlEscape, LiteralType, Payload,
};
use crate::error::Result;
use crate::hygiene::{self, ImportStyle};
use crate::program::{GenerateOptions, GeneratedProgram, ProgramMode, SourceFile, TestCase};
use crate::value::{float_text, Value};

const RUNTIME: &str = include_str!("runtime/harness_main.go");

/// Name of the generated entry file.
pub const MAIN_FILE: &str = "harness_main.go";

/// Packages the runtime itself uses. Go rejects unused imports, so this list
/// must match the template exactly.
const RUNTIME_IMPORTS: &[&str] = &[
    "\"encoding/json\"",
    "\"fmt\"",
    "\"io\"",
    "\"math\"",
    "\"os\"",
    "\"reflect\"",
    "\"runtime\"",
    "\"sort\"",
    "\"strconv\"",
    "\"strings\"",
];

pub struct Go;

fn quote(s: &str) -> String {
    quote_string(s, ControlEscape::Hex, &[])
}

/// Go spelling of a literal type, for typed slice and map literals.
fn type_name(t: &LiteralType) -> String {
    match t {
        LiteralType::Int => "int".to_string(),
        LiteralType::Wide => "int64".to_string(),
        LiteralType::Float => "float64".to_string(),
        LiteralType::Bool => "bool".to_string(),
        LiteralType::Str => "string".to_string(),
        LiteralType::Any => "interface{}".to_string(),
        LiteralType::List(inner) => format!("[]{}", type_name(inner)),
        LiteralType::Map(inner) => format!("map[string]{}", type_name(inner)),
    }
}

impl Go {
    fn render_as(&self, value: &Value, target: &LiteralType) -> Result<String> {
        match (value, target) {
            (Value::Int(i), LiteralType::Wide) => Ok(i.to_string()),
            (Value::Int(i), LiteralType::Float) => Ok(float_text(*i as f64)),
            (Value::Array(items), LiteralType::List(element)) => self.slice(items, element),
            (Value::Object(entries), LiteralType::Map(element)) => self.map(entries, element),
            _ => self.render(value),
        }
    }

    fn slice(&self, items: &[Value], element: &LiteralType) -> Result<String> {
        let parts = items
            .iter()
            .map(|v| self.render_as(v, element))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("[]{}{{{}}}", type_name(element), parts.join(", ")))
    }

    fn map(&self, entries: &[(String, Value)], element: &LiteralType) -> Result<String> {
        let parts = entries
            .iter()
            .map(|(k, v)| Ok(format!("{}: {}", quote(k), self.render_as(v, element)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("map[string]{}{{{}}}", type_name(element), parts.join(", ")))
    }
}

/// Rename a top-level `func main()` so the runtime's entry point is the only one.
fn rename_user_main(source: &str) -> String {
    let mut out: Vec<String> = source
        .lines()
        .map(|line| match line.strip_prefix("func main()") {
            Some(rest) => format!("func hUserMain(){}", rest),
            None => line.to_string(),
        })
        .collect();
    out.push(String::new());
    out.join("\n")
}

/// Result types of the top-level function or method `name`, in order.
/// Empty when the declaration is not found or returns nothing.
fn result_types(source: &str, name: &str) -> Vec<String> {
    let chars: Vec<char> = source.chars().collect();
    let mut from = 0;
    while let Some(offset) = source[from..].find("func") {
        let start = from + offset;
        from = start + "func".len();
        let keyword = source[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        let mut i = source[..from].chars().count();
        if !keyword || !chars.get(i).is_some_and(|c| *c == ' ' || *c == '\t') {
            continue;
        }
        i = skip_space(&chars, i);
        if chars.get(i) == Some(&'(') {
            i = skip_group(&chars, i);
            i = skip_space(&chars, i);
        }
        let ident: String = chars[i.min(chars.len())..]
            .iter()
            .take_while(|c| c.is_alphanumeric() || **c == '_')
            .collect();
        if ident != name {
            continue;
        }
        i = skip_space(&chars, i + ident.chars().count());
        if chars.get(i) == Some(&'[') {
            i = skip_group(&chars, i);
        }
        if chars.get(i) != Some(&'(') {
            continue;
        }
        i = skip_space(&chars, skip_group(&chars, i));
        if chars.get(i) == Some(&'(') {
            let end = skip_group(&chars, i);
            let inner: String = chars[i + 1..end.saturating_sub(1).max(i + 1)].iter().collect();
            return split_top_level(&inner)
                .iter()
                .filter_map(|part| part.split_whitespace().last().map(str::to_string))
                .collect();
        }
        let single: String = chars[i.min(chars.len())..]
            .iter()
            .take_while(|c| **c != '{' && **c != '\n')
            .collect();
        let single = single.trim();
        return if single.is_empty() {
            Vec::new()
        } else {
            vec![single.to_string()]
        };
    }
    Vec::new()
}

fn skip_space(chars: &[char], mut i: usize) -> usize {
    while chars.get(i).is_some_and(|c| *c == ' ' || *c == '\t') {
        i += 1;
    }
    i
}

/// Index just past the bracket group opening at `i`.
fn skip_group(chars: &[char], mut i: usize) -> usize {
    let mut depth = 0usize;
    while i < chars.len() {
        match chars[i] {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    i
}

fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

/// A thunk returning the call's value, unpacking multiple results.
fn thunk(call: &str, source: &str) -> String {
    let results = hygiene::call_name(call)
        .map(|name| result_types(source, &name))
        .unwrap_or_default();
    let with_error = results.last().is_some_and(|t| t == "error");
    let values = results.len() - usize::from(with_error);
    let body = match (results.len(), with_error) {
        (0 | 1, _) => format!("return {}", call),
        (2, true) => format!(
            "v, err := {}; if err != nil {{ return err }}; return v",
            call
        ),
        _ => {
            let mut names: Vec<String> = (0..values).map(|n| format!("r{}", n)).collect();
            let packed = format!("return []interface{{}}{{{}}}", names.join(", "));
            if with_error {
                names.push("err".to_string());
                format!(
                    "{} := {}; if err != nil {{ return err }}; {}",
                    names.join(", "),
                    call,
                    packed
                )
            } else {
                format!("{} := {}; {}", names.join(", "), call, packed)
            }
        }
    };
    format!("\t\tfunc() interface{{}} {{ {} }},", body)
}

impl Backend for Go {
    fn name(&self) -> &'static str {
        "go"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["go", "golang"]
    }

    fn render(&self, value: &Value) -> Result<String> {
        Ok(match value {
            Value::Null | Value::Undefined => "nil".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) if is_wide(*i) => format!("int64({})", i),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => match non_finite(*f, "math.NaN()", "math.Inf(1)", "math.Inf(-1)") {
                Some(constant) => constant.to_string(),
                None => float_text(*f),
            },
            Value::String(s) => quote(s),
            Value::Array(items) => {
                self.slice(items, &LiteralType::common(items.iter(), LiteralType::Int))?
            }
            Value::Object(entries) => self.map(
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
        let (source, _) = hygiene::strip_package(&solution.content, "package");
        let (user_imports, body) = hygiene::hoist_imports(&source, ImportStyle::Go);
        let body = rename_user_main(&body);

        let specs = hygiene::dedupe(
            RUNTIME_IMPORTS.iter().map(|s| s.to_string()).chain(
                user_imports
                    .iter()
                    .map(|line| line.trim_start_matches("import").trim().to_string()),
            ),
        );
        let import_lines: Vec<String> = specs.iter().map(|spec| format!("\t{}", spec)).collect();
        let import_block = format!("import (\n{}\n)", import_lines.join("\n"));

        let calls = call_texts(self, cases, options.call_mode)?;
        let thunks: Vec<String> = calls
            .iter()
            .map(|call| thunk(call, &body))
            .collect();
        let payload = Payload::route(expected_lines_payload(cases), options.expected_delivery);
        let has_payload = payload.embedded.is_some().to_string();

        let main = fill(
            RUNTIME,
            &[
                ("IMPORTS", &import_block),
                ("USER_SOURCE", body.trim_end()),
                ("CALLS", &thunks.join("\n")),
                ("PAYLOAD", &payload.literal(quote, "\"\"")),
                ("HAS_PAYLOAD", &has_payload),
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
