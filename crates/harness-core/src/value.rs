//! Canonical value model shared by the parser, the backends and the outcome
//! reader.
//!
//! `Value` mirrors JSON but keeps integers and floats apart (`1` and `1.0` are
//! different values) and can hold NaN, ±Infinity and `undefined`. Objects are
//! `Vec<(String, Value)>` so insertion order survives without `IndexMap`.
//!
//! On the wire every value that JSON cannot express is written as a *marker*
//! object keyed by [`marker::TYPE_KEY`]:
//!
//! ```text
//! {"__type__":"NaN"}                      {"__type__":"Set","value":[1,2]}
//! {"__type__":"Infinity"}                 {"__type__":"Map","value":[[1,"a"]]}
//! {"__type__":"-Infinity"}                {"__type__":"tuple","value":[1,"a"]}
//! {"__type__":"undefined"}                {"__type__":"char","value":"x"}
//! {"__type__":"float","value":1.0}        {"__type__":"bigint","value":"9223372036854775808"}
//! ```
//!
//! The first five decode into native `Value` tags. The structural markers have
//! no dedicated tag; they stay `Object`s and [`deep_equal`] understands them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number};

/// Marker vocabulary used by every generated runtime.
pub mod marker {
    pub const TYPE_KEY: &str = "__type__";
    pub const VALUE_KEY: &str = "value";

    pub const NAN: &str = "NaN";
    pub const INFINITY: &str = "Infinity";
    pub const NEG_INFINITY: &str = "-Infinity";
    pub const UNDEFINED: &str = "undefined";
    pub const FLOAT: &str = "float";
    pub const CHAR: &str = "char";
    pub const BIGINT: &str = "bigint";
    pub const TUPLE: &str = "tuple";
    pub const SET: &str = "Set";
    pub const MAP: &str = "Map";
}

/// A JSON-like value with int/float distinguished and non-finite floats
/// representable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    /// Key-value pairs in insertion order.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Short tag name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Build a structural marker object, e.g. `Value::marker("Set", Value::Array(..))`.
    pub fn marker(kind: &str, value: Value) -> Value {
        Value::Object(vec![
            (marker::TYPE_KEY.to_string(), Value::String(kind.to_string())),
            (marker::VALUE_KEY.to_string(), value),
        ])
    }

    /// If this is a marker object, return its type name and payload.
    pub fn as_marker(&self) -> Option<(&str, Option<&Value>)> {
        let Value::Object(entries) = self else {
            return None;
        };
        if entries.is_empty() || entries.len() > 2 {
            return None;
        }
        let mut kind = None;
        let mut payload = None;
        for (key, val) in entries {
            match (key.as_str(), val) {
                (marker::TYPE_KEY, Value::String(s)) => kind = Some(s.as_str()),
                (marker::VALUE_KEY, v) => payload = Some(v),
                _ => return None,
            }
        }
        kind.map(|k| (k, payload))
    }

    /// Look up a key in an object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Encode into `serde_json::Value`, writing markers for what JSON lacks.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as J;
        match self {
            Value::Null => J::Null,
            Value::Undefined => simple_marker(marker::UNDEFINED),
            Value::Bool(b) => J::Bool(*b),
            Value::Int(i) => J::Number(Number::from(*i)),
            Value::Float(f) if f.is_nan() => simple_marker(marker::NAN),
            Value::Float(f) if f.is_infinite() => simple_marker(if *f > 0.0 {
                marker::INFINITY
            } else {
                marker::NEG_INFINITY
            }),
            Value::Float(f) => Number::from_f64(*f).map(J::Number).unwrap_or(J::Null),
            Value::String(s) => J::String(s.clone()),
            Value::Array(items) => J::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(entries) => {
                let mut map = Map::new();
                for (key, val) in entries {
                    map.insert(key.clone(), val.to_json());
                }
                J::Object(map)
            }
        }
    }

    /// Compact JSON text for this value (markers included).
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    /// Decode from `serde_json::Value`, turning scalar markers back into
    /// native tags. Structural markers are kept as objects.
    ///
    /// Integers beyond `i64` become `bigint` markers rather than silently
    /// losing precision as floats.
    pub fn from_json(json: &serde_json::Value) -> Value {
        use serde_json::Value as J;
        match json {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(*b),
            J::Number(n) => number_value(n),
            J::String(s) => Value::String(s.clone()),
            J::Array(items) => Value::Array(items.iter().map(Value::from_json).collect()),
            J::Object(map) => {
                let entries: Vec<(String, Value)> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect();
                let object = Value::Object(entries);
                decode_scalar_marker(&object).unwrap_or(object)
            }
        }
    }
}

fn simple_marker(kind: &str) -> serde_json::Value {
    let mut map = Map::new();
    map.insert(
        marker::TYPE_KEY.to_string(),
        serde_json::Value::String(kind.to_string()),
    );
    serde_json::Value::Object(map)
}

fn number_value(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        return Value::Int(i);
    }
    if n.is_u64() {
        return Value::marker(marker::BIGINT, Value::String(n.to_string()));
    }
    Value::Float(n.as_f64().unwrap_or(f64::NAN))
}

/// Decode `NaN`, `±Infinity`, `undefined` and `float` markers.
fn decode_scalar_marker(object: &Value) -> Option<Value> {
    let (kind, payload) = object.as_marker()?;
    match (kind, payload) {
        (marker::NAN, None) => Some(Value::Float(f64::NAN)),
        (marker::INFINITY, None) => Some(Value::Float(f64::INFINITY)),
        (marker::NEG_INFINITY, None) => Some(Value::Float(f64::NEG_INFINITY)),
        (marker::UNDEFINED, None) => Some(Value::Undefined),
        (marker::FLOAT, Some(Value::Float(f))) => Some(Value::Float(*f)),
        (marker::FLOAT, Some(Value::Int(i))) => Some(Value::Float(*i as f64)),
        (marker::FLOAT, Some(Value::String(text))) => parse_float_text(text).map(Value::Float),
        _ => None,
    }
}

/// Parse float text including the spellings runtimes use for non-finite values.
pub(crate) fn parse_float_text(text: &str) -> Option<f64> {
    match text.trim() {
        "NaN" | "nan" => Some(f64::NAN),
        "Infinity" | "inf" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" | "-inf" => Some(f64::NEG_INFINITY),
        other => other.parse().ok(),
    }
}

/// Format a finite float so it always shows a decimal point: `1.0`, `0.5`,
/// `1.0e20`. Non-finite values return Rust's own spelling and must be handled
/// by the caller.
pub fn float_text(f: f64) -> String {
    let s = format!("{:?}", f);
    if !f.is_finite() || s.contains('.') {
        return s;
    }
    match s.find('e') {
        Some(pos) => format!("{}.0{}", &s[..pos], &s[pos..]),
        None => format!("{}.0", s),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(|json| Value::from_json(&json))
    }
}

// ============================================================================
// Deep equality
// ============================================================================

/// Comparison view: folds markers onto the shape they stand for.
enum View<'a> {
    Null,
    Undefined,
    Bool(bool),
    Int(i64),
    BigInt(&'a str),
    Float(f64),
    Str(&'a str),
    Seq(&'a [Value]),
    Set(&'a [Value]),
    Map(Vec<(&'a Value, &'a Value)>),
    Object(&'a [(String, Value)]),
    Opaque,
}

fn view(value: &Value) -> View<'_> {
    match value {
        Value::Null => View::Null,
        Value::Undefined => View::Undefined,
        Value::Bool(b) => View::Bool(*b),
        Value::Int(i) => View::Int(*i),
        Value::Float(f) => View::Float(*f),
        Value::String(s) => View::Str(s),
        Value::Array(items) => View::Seq(items),
        Value::Object(entries) => match value.as_marker() {
            Some((marker::TUPLE, Some(Value::Array(items)))) => View::Seq(items),
            Some((marker::SET, Some(Value::Array(items)))) => View::Set(items),
            Some((marker::CHAR, Some(Value::String(s)))) => View::Str(s),
            Some((marker::BIGINT, Some(Value::String(s)))) => View::BigInt(s),
            Some((marker::MAP, Some(Value::Array(pairs)))) => {
                let mut entries = Vec::with_capacity(pairs.len());
                for pair in pairs {
                    match pair {
                        Value::Array(kv) if kv.len() == 2 => entries.push((&kv[0], &kv[1])),
                        _ => return View::Opaque,
                    }
                }
                View::Map(entries)
            }
            Some((marker::TUPLE | marker::SET | marker::MAP | marker::CHAR | marker::BIGINT, _)) => {
                View::Opaque
            }
            _ => View::Object(entries),
        },
    }
}

/// Structural equality used to judge an actual value against an expectation.
///
/// - NaN equals NaN; infinities must agree in sign.
/// - `Int` never equals `Float`, even when numerically equal.
/// - Arrays (and tuples) compare in order; sets and maps by membership.
/// - Map keys are matched literally first, then by their string form, which
///   reconciles typed keys with keys a JSON hop coerced to strings.
/// - A `char` equals the one-character string, a `bigint` the `Int` with the
///   same decimal text.
pub fn deep_equal(actual: &Value, expected: &Value) -> bool {
    match (view(actual), view(expected)) {
        (View::Null, View::Null) | (View::Undefined, View::Undefined) => true,
        (View::Bool(a), View::Bool(b)) => a == b,
        (View::Int(a), View::Int(b)) => a == b,
        (View::BigInt(a), View::BigInt(b)) => a.trim_start_matches('+') == b.trim_start_matches('+'),
        (View::BigInt(a), View::Int(b)) | (View::Int(b), View::BigInt(a)) => {
            a.trim_start_matches('+') == b.to_string()
        }
        (View::Float(a), View::Float(b)) => floats_equal(a, b),
        (View::Str(a), View::Str(b)) => a == b,
        (View::Seq(a), View::Seq(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (View::Set(a), View::Set(b) | View::Seq(b)) | (View::Seq(a), View::Set(b)) => {
            same_members(a, b)
        }
        (View::Object(a), View::Object(b)) => {
            let left: Vec<(Value, &Value)> =
                a.iter().map(|(k, v)| (Value::String(k.clone()), v)).collect();
            let right: Vec<(Value, &Value)> =
                b.iter().map(|(k, v)| (Value::String(k.clone()), v)).collect();
            same_entries(&left, &right)
        }
        (View::Map(a), View::Map(b)) => {
            let left: Vec<(Value, &Value)> = a.iter().map(|(k, v)| ((*k).clone(), *v)).collect();
            let right: Vec<(Value, &Value)> = b.iter().map(|(k, v)| ((*k).clone(), *v)).collect();
            same_entries(&left, &right)
        }
        (View::Map(m), View::Object(o)) | (View::Object(o), View::Map(m)) => {
            let typed: Vec<(Value, &Value)> = m.iter().map(|(k, v)| ((*k).clone(), *v)).collect();
            let plain: Vec<(Value, &Value)> =
                o.iter().map(|(k, v)| (Value::String(k.clone()), v)).collect();
            same_entries(&typed, &plain)
        }
        _ => false,
    }
}

fn floats_equal(a: f64, b: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    a == b
}

/// Multiset equality: each member of `a` claims a distinct equal member of `b`.
fn same_members(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut claimed = vec![false; b.len()];
    a.iter().all(|x| {
        let slot = b
            .iter()
            .enumerate()
            .position(|(i, y)| !claimed[i] && deep_equal(x, y));
        match slot {
            Some(i) => {
                claimed[i] = true;
                true
            }
            None => false,
        }
    })
}

fn same_entries(a: &[(Value, &Value)], b: &[(Value, &Value)]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|(key, val)| match lookup_key(b, key) {
        Some(other) => deep_equal(val, other),
        None => false,
    })
}

/// Find `key` in `entries`: literal match first, then string form.
fn lookup_key<'a>(entries: &'a [(Value, &'a Value)], key: &Value) -> Option<&'a Value> {
    if let Some((_, v)) = entries.iter().find(|(k, _)| deep_equal(k, key)) {
        return Some(v);
    }
    let wanted = key_string(key);
    entries
        .iter()
        .find(|(k, _)| key_string(k) == wanted)
        .map(|(_, v)| *v)
}

/// The string a JSON hop would have turned this key into.
fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) if f.is_finite() => float_text(*f),
        Value::Float(f) if f.is_nan() => "NaN".to_string(),
        Value::Float(f) if *f > 0.0 => "Infinity".to_string(),
        Value::Float(_) => "-Infinity".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Undefined => "null".to_string(),
        other => match other.as_marker() {
            Some((marker::CHAR | marker::BIGINT, Some(Value::String(s)))) => s.clone(),
            _ => other.to_json_string(),
        },
    }
}
