//! Source hygiene for targets that compile one entry file.
//!
//! User code and generated runner code end up in a single compilation unit,
//! so the user's source is massaged first: package declarations are removed,
//! imports are hoisted and de-duplicated, extra `public` types are demoted,
//! and unqualified calls are prefixed with the user's primary type.
//!
//! These are text transforms, not a parser. They track braces, string and
//! comment boundaries well enough for submission-sized files.

/// Import syntax to hoist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStyle {
    /// `import a.b.C;` / `import static a.b.C.m;`
    Java,
    /// `import "fmt"` and `import ( ... )` blocks
    Go,
    /// `using System;` / `using static System.Math;` / `using A = B;`
    CSharp,
}

/// Per-line nesting info: how many non-namespace blocks enclose the line start.
fn type_depths(source: &str) -> Vec<usize> {
    #[derive(PartialEq)]
    enum Block {
        Namespace,
        Other,
    }
    let mut depths = Vec::new();
    let mut stack: Vec<Block> = Vec::new();
    let mut header = String::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;
    let depth_of = |stack: &Vec<Block>| stack.iter().filter(|b| **b == Block::Other).count();
    depths.push(0);

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                depths.push(depth_of(&stack));
                header.push(' ');
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    if chars[i] == '\n' {
                        depths.push(depth_of(&stack));
                    }
                    i += 1;
                }
                i += 2;
                continue;
            }
            '"' | '\'' | '`' => {
                let quote = c;
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    if chars[i] == '\\' && quote != '`' {
                        i += 1;
                    } else if chars[i] == '\n' {
                        depths.push(depth_of(&stack));
                    }
                    i += 1;
                }
            }
            '{' => {
                let kind = if header.trim_start().starts_with("namespace ") {
                    Block::Namespace
                } else {
                    Block::Other
                };
                stack.push(kind);
                header.clear();
            }
            '}' => {
                stack.pop();
                header.clear();
            }
            ';' => header.clear(),
            _ => header.push(c),
        }
        i += 1;
    }
    depths
}

/// Remove a top-level `package x.y;` (Java) or `package x` (Go) declaration,
/// or a file-scoped C# `namespace X;`. Returns the remaining source and the
/// declared name.
pub fn strip_package(source: &str, keyword: &str) -> (String, Option<String>) {
    let depths = type_depths(source);
    let prefix = format!("{} ", keyword);
    let mut name = None;
    let mut kept = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        let top = depths.get(idx).copied().unwrap_or(0) == 0;
        let is_decl = top
            && name.is_none()
            && trimmed.starts_with(&prefix)
            && !trimmed.contains('{')
            && (keyword != "namespace" || trimmed.ends_with(';'));
        if is_decl {
            name = Some(
                trimmed[prefix.len()..]
                    .trim()
                    .trim_end_matches(';')
                    .trim()
                    .to_string(),
            );
            continue;
        }
        kept.push(line);
    }
    (join_lines(&kept), name)
}

/// Extract top-level import statements. Returns them (normalised to one
/// statement per entry, in source order) and the source without them.
pub fn hoist_imports(source: &str, style: ImportStyle) -> (Vec<String>, String) {
    let depths = type_depths(source);
    let mut imports = Vec::new();
    let mut kept = Vec::new();
    let mut in_go_block = false;

    for (idx, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        let top = depths.get(idx).copied().unwrap_or(0) == 0;

        if in_go_block {
            if trimmed.starts_with(')') {
                in_go_block = false;
            } else if !trimmed.is_empty() && !trimmed.starts_with("//") {
                imports.push(format!("import {}", trimmed));
            }
            continue;
        }
        if !top {
            kept.push(line);
            continue;
        }
        match style {
            ImportStyle::Java if trimmed.starts_with("import ") && trimmed.ends_with(';') => {
                imports.push(trimmed.to_string());
            }
            ImportStyle::CSharp
                if (trimmed.starts_with("using ") || trimmed.starts_with("global using "))
                    && trimmed.ends_with(';')
                    && !trimmed.contains('(') =>
            {
                imports.push(trimmed.to_string());
            }
            ImportStyle::Go if trimmed == "import (" || trimmed == "import(" => {
                in_go_block = true;
            }
            ImportStyle::Go if trimmed.starts_with("import ") => {
                imports.push(trimmed.to_string());
            }
            _ => kept.push(line),
        }
    }
    (imports, join_lines(&kept))
}

/// Keep the first occurrence of each item, preserving order.
pub fn dedupe<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

const TYPE_KEYWORDS: &[&str] = &["class", "interface", "enum", "record", "struct", "@interface"];

/// The type keyword and name declared on this line, if any.
fn declared_type(line: &str) -> Option<String> {
    let words: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == '{' || c == '<' || c == '(' || c == ':')
        .filter(|w| !w.is_empty())
        .collect();
    let pos = words.iter().position(|w| TYPE_KEYWORDS.contains(w))?;
    if words[..pos].iter().any(|w| w.contains('=') || w.contains('.')) {
        return None;
    }
    let name = words.get(pos + 1)?;
    if name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_') {
        Some(name.to_string())
    } else {
        None
    }
}

/// Drop `public` from top-level type declarations.
pub fn demote_public_types(source: &str) -> String {
    let depths = type_depths(source);
    let lines: Vec<String> = source
        .lines()
        .enumerate()
        .map(|(idx, line)| {
            let top = depths.get(idx).copied().unwrap_or(0) == 0;
            let trimmed = line.trim_start();
            if top && trimmed.starts_with("public ") && declared_type(trimmed).is_some() {
                let indent = &line[..line.len() - trimmed.len()];
                format!("{}{}", indent, &trimmed["public ".len()..])
            } else {
                line.to_string()
            }
        })
        .collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    join_lines(&refs)
}

/// The user's primary type: the first top-level `public` type, else the first
/// top-level type of any visibility.
pub fn primary_type(source: &str) -> Option<String> {
    let depths = type_depths(source);
    let mut first = None;
    for (idx, line) in source.lines().enumerate() {
        if depths.get(idx).copied().unwrap_or(0) != 0 {
            continue;
        }
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") || trimmed.starts_with('*') {
            continue;
        }
        if let Some(name) = declared_type(trimmed) {
            if trimmed.starts_with("public ") {
                return Some(name);
            }
            first.get_or_insert(name);
        }
    }
    first
}

/// A C# block namespace (`namespace X {` / `namespace X` + newline + `{`).
pub fn block_namespace(source: &str) -> Option<String> {
    source.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("namespace ")?;
        if rest.trim_end().ends_with(';') {
            return None;
        }
        let name = rest.trim_end_matches('{').trim();
        (!name.is_empty()).then(|| name.to_string())
    })
}

/// `name(...)` with no receiver, qualifier or `new`.
pub fn is_unqualified_call(call: &str) -> bool {
    call_name(call).is_some()
}

/// The callee of an unqualified call: `add` for `add(1, 2)`.
pub fn call_name(call: &str) -> Option<String> {
    let trimmed = call.trim_start();
    let ident: String = trimmed
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    if ident.is_empty() || ident == "new" || ident.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    trimmed[ident.len()..]
        .trim_start()
        .starts_with('(')
        .then_some(ident)
}

/// Whether `source` declares `name` as a static method.
pub fn has_static_method(source: &str, name: &str) -> bool {
    source.lines().any(|line| {
        let words: Vec<&str> = line.split_whitespace().collect();
        words.contains(&"static") && contains_call_site(line, name)
    })
}

fn contains_call_site(line: &str, name: &str) -> bool {
    line.match_indices(name).any(|(pos, _)| {
        let before_ok = line[..pos]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        let after = line[pos + name.len()..].trim_start();
        before_ok && after.starts_with('(')
    })
}

/// The top-level type whose body mentions `method(`, or `None` when a
/// top-level (free) function of that name comes first. An out-of-class
/// definition `Type::method(` counts for `Type`.
pub fn owning_type(source: &str, method: &str) -> Option<String> {
    let depths = type_depths(source);
    let mut current: Option<String> = None;
    for (idx, line) in source.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") || trimmed.starts_with('*') || trimmed.starts_with('#') {
            continue;
        }
        if depths.get(idx).copied().unwrap_or(0) == 0 {
            if let Some(name) = declared_type(trimmed) {
                current = Some(name);
            } else if contains_call_site(line, method) {
                return scope_qualifier(line, method);
            } else if !(trimmed.is_empty()
                || trimmed.starts_with('{')
                || trimmed.starts_with('}')
                || trimmed.starts_with("template"))
            {
                current = None;
            }
            continue;
        }
        if let Some(name) = &current {
            if contains_call_site(line, method) {
                return Some(name.clone());
            }
        }
    }
    None
}

/// `Type` in an out-of-class definition such as `int Type::method(`.
fn scope_qualifier(line: &str, method: &str) -> Option<String> {
    let pos = line.find(&format!("::{}", method))?;
    let owner: Vec<char> = line[..pos]
        .chars()
        .rev()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    (!owner.is_empty()).then(|| owner.into_iter().rev().collect())
}

/// How a call is routed through a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// `Type.f(...)` for static methods, `new Type().f(...)` otherwise (Java, C#)
    New,
    /// `Type::f(...)` for static methods, `Type().f(...)` otherwise (C++)
    Scoped,
}

/// Prefix an unqualified call with the primary type: `Type.f(...)` for static
/// methods, `new Type().f(...)` otherwise. Qualified calls pass through.
pub fn qualify_call(call: &str, type_name: &str, source: &str) -> String {
    qualify_call_as(call, type_name, source, Receiver::New)
}

/// [`qualify_call`] with the receiver syntax of the target.
pub fn qualify_call_as(call: &str, type_name: &str, source: &str, receiver: Receiver) -> String {
    let trimmed = call.trim();
    let Some(method) = call_name(trimmed) else {
        return trimmed.to_string();
    };
    match (receiver, has_static_method(source, &method)) {
        (Receiver::New, true) => format!("{}.{}", type_name, trimmed),
        (Receiver::New, false) => format!("new {}().{}", type_name, trimmed),
        (Receiver::Scoped, true) => format!("{}::{}", type_name, trimmed),
        (Receiver::Scoped, false) => format!("{}().{}", type_name, trimmed),
    }
}

fn join_lines(lines: &[&str]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
