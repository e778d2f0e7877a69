//! Call-expression parser: `name(args)` / `a.b.c(args)` → [`Invocation`].
//!
//! Arguments are literal-only: numbers, strings (single, double or backtick
//! quoted without interpolation), booleans, `null`, `undefined`, `NaN`,
//! `Infinity`, arrays, objects, and arithmetic on those literals. Arithmetic is
//! folded to a constant while parsing; no expression tree survives.
//!
//! Before the grammar runs, [`rewrite_tuples`] turns scripting-language tuple
//! syntax `(1, "a")` into `[1, "a"]`. The rewrite is positional: a `(` right
//! after an identifier character, `)` or `]` opens a call; any other `(`
//! opens a tuple if it holds a top-level comma (or nothing at all), and is a
//! plain grouping parenthesis otherwise. The rewrite is one character for one
//! character, so error offsets point into the original text.

use crate::error::ParseError;
use crate::value::Value;
use serde::Serialize;

type Result<T> = std::result::Result<T, ParseError>;

/// A parsed call: dotted function path plus constant arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub function_name: String,
    pub args: Vec<Value>,
}

/// Parse a call expression.
///
/// # Errors
/// - [`ParseError::Empty`] for empty or whitespace-only input
/// - [`ParseError::NotACall`] when the root is not `path(...)`
/// - construct-specific errors for nested calls, ternaries, spreads,
///   interpolation, computed keys and unknown identifiers
pub fn parse(text: &str) -> Result<Invocation> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let rewritten = rewrite_tuples(text);
    let tokens = tokenize(&rewritten)?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.call()
}

// ============================================================================
// Tuple pre-pass
// ============================================================================

enum Frame {
    Call,
    Paren { open: usize, comma: bool },
    Bracket,
}

/// Rewrite parenthesised tuples into bracket arrays, leaving call and grouping
/// parentheses untouched. Quoted text is copied verbatim.
pub fn rewrite_tuples(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out: Vec<char> = Vec::with_capacity(chars.len());
    let mut stack: Vec<Frame> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' | '`' => {
                let end = string_end(&chars, i);
                out.extend_from_slice(&chars[i..end]);
                i = end;
                continue;
            }
            '(' => {
                let prev = out.iter().rev().find(|ch| !ch.is_whitespace()).copied();
                let is_call = matches!(prev, Some(p) if is_ident_char(p) || p == ')' || p == ']');
                if is_call {
                    stack.push(Frame::Call);
                } else {
                    stack.push(Frame::Paren {
                        open: out.len(),
                        comma: false,
                    });
                }
                out.push('(');
            }
            '[' | '{' => {
                stack.push(Frame::Bracket);
                out.push(c);
            }
            ']' | '}' => {
                if matches!(stack.last(), Some(Frame::Bracket)) {
                    stack.pop();
                }
                out.push(c);
            }
            ',' => {
                if let Some(Frame::Paren { comma, .. }) = stack.last_mut() {
                    *comma = true;
                }
                out.push(',');
            }
            ')' => match stack.pop() {
                Some(Frame::Paren { open, comma })
                    if comma || out[open + 1..].iter().all(|ch| ch.is_whitespace()) =>
                {
                    out[open] = '[';
                    out.push(']');
                }
                _ => out.push(')'),
            },
            _ => out.push(c),
        }
        i += 1;
    }
    out.into_iter().collect()
}

/// Index just past the closing quote of the literal opened at `start`
/// (end of input if unterminated).
fn string_end(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(String),
    Str(String),
    Ident(String),
    Punct(&'static str),
    Eof,
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    offset: usize,
}

const PUNCTS: &[&str] = &[
    "...", "**", "=>", "??", "?.", "(", ")", "[", "]", "{", "}", ",", ":", ".", "+", "-", "*",
    "/", "%", "?",
];

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    'outer: while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        let offset = i;

        if c == '"' || c == '\'' || c == '`' {
            let (s, end) = lex_string(&chars, i)?;
            tokens.push(Token {
                tok: Tok::Str(s),
                offset,
            });
            i = end;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())) {
            let end = lex_number(&chars, i);
            tokens.push(Token {
                tok: Tok::Num(chars[i..end].iter().collect()),
                offset,
            });
            i = end;
            continue;
        }

        if is_ident_start(c) {
            let mut end = i + 1;
            while end < chars.len() && is_ident_char(chars[end]) {
                end += 1;
            }
            tokens.push(Token {
                tok: Tok::Ident(chars[i..end].iter().collect()),
                offset,
            });
            i = end;
            continue;
        }

        for p in PUNCTS {
            let len = p.len();
            if i + len <= chars.len() && chars[i..i + len].iter().copied().eq(p.chars()) {
                tokens.push(Token {
                    tok: Tok::Punct(p),
                    offset,
                });
                i += len;
                continue 'outer;
            }
        }

        return Err(ParseError::Unexpected {
            offset,
            found: format!("character '{}'", c),
        });
    }

    tokens.push(Token {
        tok: Tok::Eof,
        offset: chars.len(),
    });
    Ok(tokens)
}

/// Lex a quoted literal, returning its unescaped content and the end index.
fn lex_string(chars: &[char], start: usize) -> Result<(String, usize)> {
    let quote = chars[start];
    let mut out = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        if c == quote {
            return Ok((out, i + 1));
        }
        if quote == '`' && c == '$' && chars.get(i + 1) == Some(&'{') {
            return Err(ParseError::Interpolation);
        }
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }
        let Some(&esc) = chars.get(i + 1) else {
            break;
        };
        i += 2;
        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            'x' => {
                let (ch, used) = hex_escape(chars, i, 2);
                out.push(ch);
                i += used;
            }
            'u' if chars.get(i) == Some(&'{') => {
                let close = chars[i..].iter().position(|ch| *ch == '}');
                match close {
                    Some(rel) => {
                        let hex: String = chars[i + 1..i + rel].iter().collect();
                        let ch = u32::from_str_radix(&hex, 16)
                            .ok()
                            .and_then(char::from_u32)
                            .unwrap_or('\u{fffd}');
                        out.push(ch);
                        i += rel + 1;
                    }
                    None => out.push('u'),
                }
            }
            'u' => {
                let (ch, used) = hex_escape(chars, i, 4);
                out.push(ch);
                i += used;
            }
            '\n' => {}
            other => out.push(other),
        }
    }
    Err(ParseError::UnterminatedString(start))
}

/// Decode `width` hex digits at `i`. Returns the char and digits consumed;
/// a short or invalid escape decodes to U+FFFD.
fn hex_escape(chars: &[char], i: usize, width: usize) -> (char, usize) {
    let digits: String = chars[i..]
        .iter()
        .take(width)
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    if digits.len() != width {
        return ('\u{fffd}', digits.len());
    }
    let ch = u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or('\u{fffd}');
    (ch, width)
}

fn lex_number(chars: &[char], start: usize) -> usize {
    let mut i = start;
    if chars[i] == '0' && matches!(chars.get(i + 1), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')) {
        i += 2;
        while i < chars.len() && (chars[i].is_ascii_hexdigit() || chars[i] == '_') {
            i += 1;
        }
        return i;
    }
    while i < chars.len() {
        match chars[i] {
            '0'..='9' | '_' => i += 1,
            '.' if chars.get(i + 1).is_none_or(|c| *c != '.') => i += 1,
            'e' | 'E' => {
                i += 1;
                if matches!(chars.get(i), Some('+' | '-')) {
                    i += 1;
                }
            }
            _ => break,
        }
    }
    i
}

/// Convert a numeric token to `Int` or `Float`. Presence of `.`, `e` or `E`
/// means float; decimal integers beyond `i64` degrade to `Float`.
fn number_value(text: &str) -> Result<Value> {
    let clean: String = text.chars().filter(|c| *c != '_').collect();
    let invalid = || ParseError::InvalidNumber(text.to_string());

    let radix = match clean.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &clean[2..];
        return u64::from_str_radix(digits, radix)
            .map_err(|_| invalid())
            .map(|n| i64::try_from(n).map(Value::Int).unwrap_or(Value::Float(n as f64)));
    }

    if clean.contains(['.', 'e', 'E']) {
        return clean.parse::<f64>().map(Value::Float).map_err(|_| invalid());
    }
    match clean.parse::<i64>() {
        Ok(i) => Ok(Value::Int(i)),
        Err(_) => clean.parse::<f64>().map(Value::Float).map_err(|_| invalid()),
    }
}

// ============================================================================
// Grammar
// ============================================================================

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Tok {
        &self.tokens[self.pos].tok
    }

    fn peek_at(&self, ahead: usize) -> &Tok {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx].tok
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn is_punct(&self, p: &str) -> bool {
        matches!(self.peek(), Tok::Punct(q) if *q == p)
    }

    fn eat(&mut self, p: &str) -> bool {
        if self.is_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> ParseError {
        let token = &self.tokens[self.pos];
        let found = match &token.tok {
            Tok::Num(n) => format!("number '{}'", n),
            Tok::Str(_) => "string literal".to_string(),
            Tok::Ident(name) => format!("identifier '{}'", name),
            Tok::Punct(p) => format!("'{}'", p),
            Tok::Eof => "end of input".to_string(),
        };
        ParseError::Unexpected {
            offset: token.offset,
            found,
        }
    }

    fn expect(&mut self, p: &str) -> Result<()> {
        if self.eat(p) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// `path '(' args ')' EOF`
    fn call(&mut self) -> Result<Invocation> {
        let Tok::Ident(first) = self.peek().clone() else {
            return Err(ParseError::NotACall);
        };
        self.advance();
        let mut function_name = first;
        while self.is_punct(".") {
            self.advance();
            match self.peek().clone() {
                Tok::Ident(segment) => {
                    self.advance();
                    function_name.push('.');
                    function_name.push_str(&segment);
                }
                _ => return Err(ParseError::NotACall),
            }
        }
        if !self.eat("(") {
            return Err(ParseError::NotACall);
        }
        let args = self.list(")")?;
        if *self.peek() != Tok::Eof {
            return Err(self.unexpected());
        }
        Ok(Invocation {
            function_name,
            args,
        })
    }

    /// Comma-separated expressions up to `close`; trailing comma allowed.
    fn list(&mut self, close: &str) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.expr()?);
            if self.eat(",") {
                continue;
            }
            self.expect(close)?;
            return Ok(items);
        }
    }

    fn expr(&mut self) -> Result<Value> {
        let value = self.additive()?;
        if self.is_punct("?") {
            return Err(ParseError::Ternary);
        }
        Ok(value)
    }

    fn additive(&mut self) -> Result<Value> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = if self.is_punct("+") {
                "+"
            } else if self.is_punct("-") {
                "-"
            } else {
                return Ok(lhs);
            };
            self.advance();
            let rhs = self.multiplicative()?;
            lhs = binary(op, lhs, rhs)?;
        }
    }

    fn multiplicative(&mut self) -> Result<Value> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Tok::Punct("*") => "*",
                Tok::Punct("/") => "/",
                Tok::Punct("%") => "%",
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs)?;
        }
    }

    fn unary(&mut self) -> Result<Value> {
        if self.eat("-") {
            if let Some(min) = self.negated_literal() {
                return Ok(min);
            }
            let operand = self.unary()?;
            return match operand {
                Value::Int(i) => Ok(i
                    .checked_neg()
                    .map(Value::Int)
                    .unwrap_or(Value::Float(-(i as f64)))),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(ParseError::InvalidOperand {
                    op: "-",
                    kind: other.kind(),
                }),
            };
        }
        if self.eat("+") {
            let operand = self.unary()?;
            return match operand {
                Value::Int(_) | Value::Float(_) => Ok(operand),
                other => Err(ParseError::InvalidOperand {
                    op: "+",
                    kind: other.kind(),
                }),
            };
        }
        self.power()
    }

    /// `-9223372036854775808` only fits `i64` once the sign is attached, so
    /// a bare decimal literal after `-` is read together with it.
    fn negated_literal(&mut self) -> Option<Value> {
        let Tok::Num(text) = self.peek() else {
            return None;
        };
        if matches!(self.peek_at(1), Tok::Punct("**")) {
            return None;
        }
        let clean: String = text.chars().filter(|c| *c != '_').collect();
        if !clean.chars().all(|c| c.is_ascii_digit()) || clean.parse::<i64>().is_ok() {
            return None;
        }
        let value = format!("-{}", clean).parse::<i64>().ok().map(Value::Int)?;
        self.advance();
        Some(value)
    }

    fn power(&mut self) -> Result<Value> {
        let base = self.primary()?;
        if self.eat("**") {
            let exponent = self.unary()?;
            return binary("**", base, exponent);
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Value> {
        match self.peek().clone() {
            Tok::Num(text) => {
                self.advance();
                number_value(&text)
            }
            Tok::Str(s) => {
                self.advance();
                Ok(Value::String(s))
            }
            Tok::Punct("[") => {
                self.advance();
                Ok(Value::Array(self.list("]")?))
            }
            Tok::Punct("{") => {
                self.advance();
                self.object()
            }
            Tok::Punct("(") => {
                self.advance();
                let inner = self.expr()?;
                self.expect(")")?;
                Ok(inner)
            }
            Tok::Punct("...") => Err(ParseError::Spread),
            Tok::Punct("?") => Err(ParseError::Ternary),
            Tok::Ident(name) => self.identifier(name),
            _ => Err(self.unexpected()),
        }
    }

    /// Keyword literal, or an error naming the unsupported identifier use.
    fn identifier(&mut self, name: String) -> Result<Value> {
        let mut path = name;
        let mut ahead = 1;
        while matches!(self.peek_at(ahead), Tok::Punct(".")) {
            match self.peek_at(ahead + 1) {
                Tok::Ident(segment) => {
                    path.push('.');
                    path.push_str(segment);
                    ahead += 2;
                }
                _ => break,
            }
        }
        if matches!(self.peek_at(ahead), Tok::Punct("(")) {
            return Err(ParseError::NestedCall(path));
        }
        if ahead > 1 {
            return Err(ParseError::UnknownIdentifier(path));
        }
        let value = match path.as_str() {
            "null" => Value::Null,
            "undefined" => Value::Undefined,
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "NaN" => Value::Float(f64::NAN),
            "Infinity" => Value::Float(f64::INFINITY),
            _ => return Err(ParseError::UnknownIdentifier(path)),
        };
        self.advance();
        Ok(value)
    }

    fn object(&mut self) -> Result<Value> {
        let mut entries: Vec<(String, Value)> = Vec::new();
        loop {
            if self.eat("}") {
                return Ok(Value::Object(entries));
            }
            let key = match self.peek().clone() {
                Tok::Ident(name) => name,
                Tok::Str(s) => s,
                Tok::Num(text) => match number_value(&text)? {
                    Value::Int(i) => i.to_string(),
                    Value::Float(f) => crate::value::float_text(f),
                    _ => text,
                },
                Tok::Punct("[") => return Err(ParseError::ComputedKey),
                Tok::Punct("...") => return Err(ParseError::Spread),
                _ => return Err(self.unexpected()),
            };
            let was_ident = matches!(self.peek(), Tok::Ident(_));
            self.advance();
            if !self.eat(":") {
                if was_ident && (self.is_punct(",") || self.is_punct("}")) {
                    return Err(ParseError::UnknownIdentifier(key));
                }
                return Err(self.unexpected());
            }
            let value = self.expr()?;
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
            if self.eat(",") {
                continue;
            }
            self.expect("}")?;
            return Ok(Value::Object(entries));
        }
    }
}

/// Fold a binary operation on two constants.
fn binary(op: &'static str, lhs: Value, rhs: Value) -> Result<Value> {
    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => int_op(op, *a, *b),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            Ok(Value::Float(float_op(op, as_f64(&lhs), as_f64(&rhs))))
        }
        (Value::String(a), Value::String(b)) if op == "+" => Ok(Value::String(format!("{}{}", a, b))),
        _ => Err(ParseError::InvalidOperands {
            op,
            lhs: lhs.kind(),
            rhs: rhs.kind(),
        }),
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        _ => f64::NAN,
    }
}

fn int_op(op: &'static str, a: i64, b: i64) -> Result<Value> {
    let checked = match op {
        "+" => a.checked_add(b),
        "-" => a.checked_sub(b),
        "*" => a.checked_mul(b),
        "%" => {
            if b == 0 {
                return Err(ParseError::DivisionByZero);
            }
            a.checked_rem(b)
        }
        "**" if b >= 0 => u32::try_from(b).ok().and_then(|e| a.checked_pow(e)),
        _ => None,
    };
    Ok(checked
        .map(Value::Int)
        .unwrap_or_else(|| Value::Float(float_op(op, a as f64, b as f64))))
}

fn float_op(op: &str, a: f64, b: f64) -> f64 {
    match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" => a / b,
        "%" => a % b,
        _ => a.powf(b),
    }
}
