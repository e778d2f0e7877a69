//! Float/int fidelity across generic JSON parsers.
//!
//! Many JSON parsers read `1.0` back as the integer `1`. To keep the float tag,
//! the raw text goes through a placeholder pass first:
//!
//! 1. [`protect`] scans the text outside quoted strings and swaps every
//!    float-looking numeric token (one containing `.`, `e` or `E`) and every
//!    bare `NaN` / `Infinity` / `-Infinity` for a unique placeholder string.
//! 2. The protected text is handed to a generic JSON parser.
//! 3. [`restore`] walks the parsed tree and replaces each placeholder with a
//!    tagged float wrapper (`{"__type__":"float","value":"1.0"}`), which
//!    [`Value::from_json`] turns into [`Value::Float`].

use crate::error::Result;
use crate::value::{marker, Value};
use serde_json::Map;

/// Protected JSON text plus the original tokens, indexed by placeholder.
#[derive(Debug, Clone)]
pub struct Protected {
    pub text: String,
    prefix: String,
    tokens: Vec<String>,
}

impl Protected {
    fn placeholder(&self, index: usize) -> String {
        format!("{}{}__", self.prefix, index)
    }

    /// Original token for a placeholder string, if `s` is one of ours.
    fn token_for(&self, s: &str) -> Option<&str> {
        let rest = s.strip_prefix(&self.prefix)?;
        let index: usize = rest.strip_suffix("__")?.parse().ok()?;
        self.tokens.get(index).map(String::as_str)
    }

    /// Number of float tokens that were replaced.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Replace float tokens outside quoted strings with placeholders.
pub fn protect(text: &str) -> Protected {
    let mut prefix = String::from("__harness_float_");
    while text.contains(&prefix) {
        prefix.insert(0, '_');
    }
    let mut protected = Protected {
        text: String::with_capacity(text.len()),
        prefix,
        tokens: Vec::new(),
    };

    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    let mut out = String::with_capacity(text.len());
    while i < chars.len() {
        let c = chars[i];
        if c == '"' {
            let end = skip_string(&chars, i);
            out.extend(&chars[i..end]);
            i = end;
            continue;
        }
        if c == '-' || c.is_ascii_digit() {
            let end = scan_number(&chars, i);
            if end > i && !(c == '-' && end == i + 1) {
                let token: String = chars[i..end].iter().collect();
                if token.contains(['.', 'e', 'E']) {
                    push_placeholder(&mut protected, &mut out, token);
                } else {
                    out.push_str(&token);
                }
                i = end;
                continue;
            }
        }
        if let Some(word) = non_finite_word(&chars, i) {
            i += word.chars().count();
            push_placeholder(&mut protected, &mut out, word.to_string());
            continue;
        }
        out.push(c);
        i += 1;
    }
    protected.text = out;
    protected
}

fn push_placeholder(protected: &mut Protected, out: &mut String, token: String) {
    let placeholder = protected.placeholder(protected.tokens.len());
    out.push('"');
    out.push_str(&placeholder);
    out.push('"');
    protected.tokens.push(token);
}

/// Index just past the closing quote of the string starting at `start`.
fn skip_string(chars: &[char], start: usize) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '"' => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Index just past a JSON number token starting at `start`.
fn scan_number(chars: &[char], start: usize) -> usize {
    let mut i = start;
    if chars[i] == '-' {
        i += 1;
    }
    while i < chars.len() {
        match chars[i] {
            '0'..='9' | '.' => i += 1,
            'e' | 'E' => {
                i += 1;
                if i < chars.len() && (chars[i] == '+' || chars[i] == '-') {
                    i += 1;
                }
            }
            _ => break,
        }
    }
    i
}

/// `NaN`, `Infinity` or `-Infinity` as a bare word at `i`.
fn non_finite_word(chars: &[char], i: usize) -> Option<&'static str> {
    if i > 0 && (chars[i - 1].is_ascii_alphanumeric() || chars[i - 1] == '_') {
        return None;
    }
    ["-Infinity", "Infinity", "NaN"].into_iter().find(|word| {
        let len = word.chars().count();
        i + len <= chars.len()
            && chars[i..i + len].iter().copied().eq(word.chars())
            && chars
                .get(i + len)
                .is_none_or(|c| !c.is_ascii_alphanumeric() && *c != '_')
    })
}

/// Replace placeholders in a parsed tree with tagged float wrappers and decode
/// the result into a [`Value`].
pub fn restore(json: serde_json::Value, protected: &Protected) -> Value {
    Value::from_json(&restore_json(json, protected))
}

fn restore_json(json: serde_json::Value, protected: &Protected) -> serde_json::Value {
    use serde_json::Value as J;
    match json {
        J::String(s) => match protected.token_for(&s) {
            Some(token) => {
                let mut wrapper = Map::new();
                wrapper.insert(marker::TYPE_KEY.to_string(), J::String(marker::FLOAT.to_string()));
                wrapper.insert(marker::VALUE_KEY.to_string(), J::String(token.to_string()));
                J::Object(wrapper)
            }
            None => J::String(s),
        },
        J::Array(items) => J::Array(items.into_iter().map(|v| restore_json(v, protected)).collect()),
        J::Object(map) => J::Object(
            map.into_iter()
                .map(|(k, v)| (k, restore_json(v, protected)))
                .collect(),
        ),
        other => other,
    }
}

/// Parse JSON text into a [`Value`], keeping float tags and accepting bare
/// `NaN` / `Infinity` tokens.
pub fn parse_json_preserving_floats(text: &str) -> Result<Value> {
    let protected = protect(text);
    let json: serde_json::Value = serde_json::from_str(&protected.text)?;
    Ok(restore(json, &protected))
}
