{{USER_SOURCE}}

// ---- generated test harness ----
#[allow(dead_code, clippy::all)]
mod harness_rt {
    use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

    #[derive(Clone, Debug)]
    pub enum Jv {
        Null,
        Bool(bool),
        Int(i64),
        Big(String),
        Float(f64),
        Str(String),
        Char(char),
        Arr(Vec<Jv>),
        Set(Vec<Jv>),
        Obj(Vec<(String, Jv)>),
        Map(Vec<(Jv, Jv)>),
    }

    /// Raised (via `panic_any`) when a call returns `Err`.
    pub struct ReturnedErr(pub String);

    pub trait ToJv {
        fn to_jv(&self) -> Jv;
    }

    macro_rules! integer_to_jv {
        ($($t:ty),*) => {
            $(impl ToJv for $t {
                fn to_jv(&self) -> Jv {
                    match i64::try_from(*self) {
                        Ok(i) => Jv::Int(i),
                        Err(_) => Jv::Big(self.to_string()),
                    }
                }
            })*
        };
    }

    integer_to_jv!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

    impl ToJv for f64 {
        fn to_jv(&self) -> Jv {
            Jv::Float(*self)
        }
    }

    impl ToJv for f32 {
        fn to_jv(&self) -> Jv {
            // Through text, so 0.1f32 stays 0.1 rather than 0.10000000149.
            Jv::Float(self.to_string().parse().unwrap_or(f64::from(*self)))
        }
    }

    impl ToJv for bool {
        fn to_jv(&self) -> Jv {
            Jv::Bool(*self)
        }
    }

    impl ToJv for char {
        fn to_jv(&self) -> Jv {
            Jv::Char(*self)
        }
    }

    impl ToJv for str {
        fn to_jv(&self) -> Jv {
            Jv::Str(self.to_string())
        }
    }

    impl ToJv for String {
        fn to_jv(&self) -> Jv {
            Jv::Str(self.clone())
        }
    }

    impl ToJv for () {
        fn to_jv(&self) -> Jv {
            Jv::Null
        }
    }

    impl<T: ToJv + ?Sized> ToJv for &T {
        fn to_jv(&self) -> Jv {
            (**self).to_jv()
        }
    }

    impl<T: ToJv + ?Sized> ToJv for Box<T> {
        fn to_jv(&self) -> Jv {
            (**self).to_jv()
        }
    }

    impl<T: ToJv> ToJv for Option<T> {
        fn to_jv(&self) -> Jv {
            match self {
                Some(v) => v.to_jv(),
                None => Jv::Null,
            }
        }
    }

    impl<T: ToJv, E: std::fmt::Debug> ToJv for Result<T, E> {
        fn to_jv(&self) -> Jv {
            match self {
                Ok(v) => v.to_jv(),
                Err(e) => std::panic::panic_any(ReturnedErr(format!("{:?}", e))),
            }
        }
    }

    impl<T: ToJv> ToJv for [T] {
        fn to_jv(&self) -> Jv {
            Jv::Arr(self.iter().map(ToJv::to_jv).collect())
        }
    }

    impl<T: ToJv, const N: usize> ToJv for [T; N] {
        fn to_jv(&self) -> Jv {
            self[..].to_jv()
        }
    }

    impl<T: ToJv> ToJv for Vec<T> {
        fn to_jv(&self) -> Jv {
            self[..].to_jv()
        }
    }

    impl<T: ToJv> ToJv for VecDeque<T> {
        fn to_jv(&self) -> Jv {
            Jv::Arr(self.iter().map(ToJv::to_jv).collect())
        }
    }

    impl<T: ToJv, S> ToJv for HashSet<T, S> {
        fn to_jv(&self) -> Jv {
            Jv::Set(self.iter().map(ToJv::to_jv).collect())
        }
    }

    impl<T: ToJv> ToJv for BTreeSet<T> {
        fn to_jv(&self) -> Jv {
            Jv::Set(self.iter().map(ToJv::to_jv).collect())
        }
    }

    fn mapping<'a, K, V, I>(entries: I) -> Jv
    where
        K: ToJv + 'a,
        V: ToJv + 'a,
        I: Iterator<Item = (&'a K, &'a V)>,
    {
        let pairs: Vec<(Jv, Jv)> = entries.map(|(k, v)| (k.to_jv(), v.to_jv())).collect();
        if pairs.iter().all(|(k, _)| matches!(k, Jv::Str(_))) {
            let mut fields: Vec<(String, Jv)> = pairs
                .into_iter()
                .map(|(k, v)| match k {
                    Jv::Str(s) => (s, v),
                    _ => unreachable!(),
                })
                .collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            Jv::Obj(fields)
        } else {
            Jv::Map(pairs)
        }
    }

    impl<K: ToJv, V: ToJv, S> ToJv for HashMap<K, V, S> {
        fn to_jv(&self) -> Jv {
            mapping(self.iter())
        }
    }

    impl<K: ToJv, V: ToJv> ToJv for BTreeMap<K, V> {
        fn to_jv(&self) -> Jv {
            mapping(self.iter())
        }
    }

    macro_rules! tuple_to_jv {
        ($($name:ident),+) => {
            impl<$($name: ToJv),+> ToJv for ($($name,)+) {
                #[allow(non_snake_case)]
                fn to_jv(&self) -> Jv {
                    let ($($name,)+) = self;
                    Jv::Arr(vec![$($name.to_jv()),+])
                }
            }
        };
    }

    tuple_to_jv!(A);
    tuple_to_jv!(A, B);
    tuple_to_jv!(A, B, C);
    tuple_to_jv!(A, B, C, D);
    tuple_to_jv!(A, B, C, D, E);
    tuple_to_jv!(A, B, C, D, E, F);

    // ---- JSON reader: `.`, `e` or `E` makes a Float ----

    pub struct Reader<'a> {
        s: &'a [u8],
        i: usize,
    }

    impl<'a> Reader<'a> {
        pub fn new(text: &'a str) -> Self {
            Reader { s: text.as_bytes(), i: 0 }
        }

        pub fn read(mut self) -> Result<Jv, String> {
            let v = self.value(0)?;
            self.ws();
            if self.i != self.s.len() {
                return Err(format!("trailing characters at offset {}", self.i));
            }
            Ok(v)
        }

        fn ws(&mut self) {
            while self.i < self.s.len() && self.s[self.i].is_ascii_whitespace() {
                self.i += 1;
            }
        }

        fn take(&mut self, c: u8) -> bool {
            self.ws();
            if self.s.get(self.i) == Some(&c) {
                self.i += 1;
                true
            } else {
                false
            }
        }

        fn expect(&mut self, c: u8) -> Result<(), String> {
            if self.take(c) {
                Ok(())
            } else {
                Err(format!("expected '{}' at offset {}", c as char, self.i))
            }
        }

        fn value(&mut self, depth: usize) -> Result<Jv, String> {
            if depth > 512 {
                return Err("nesting too deep".to_string());
            }
            self.ws();
            let s: &'a [u8] = self.s;
            let rest = &s[self.i..];
            match rest.first() {
                None => Err("unexpected end of JSON".to_string()),
                Some(b'{') => {
                    self.i += 1;
                    let mut fields = Vec::new();
                    if self.take(b'}') {
                        return Ok(Jv::Obj(fields));
                    }
                    loop {
                        self.ws();
                        let key = self.string()?;
                        self.expect(b':')?;
                        fields.push((key, self.value(depth + 1)?));
                        if !self.take(b',') {
                            break;
                        }
                    }
                    self.expect(b'}')?;
                    Ok(Jv::Obj(fields))
                }
                Some(b'[') => {
                    self.i += 1;
                    let mut items = Vec::new();
                    if self.take(b']') {
                        return Ok(Jv::Arr(items));
                    }
                    loop {
                        items.push(self.value(depth + 1)?);
                        if !self.take(b',') {
                            break;
                        }
                    }
                    self.expect(b']')?;
                    Ok(Jv::Arr(items))
                }
                Some(b'"') => Ok(Jv::Str(self.string()?)),
                _ if rest.starts_with(b"true") => {
                    self.i += 4;
                    Ok(Jv::Bool(true))
                }
                _ if rest.starts_with(b"false") => {
                    self.i += 5;
                    Ok(Jv::Bool(false))
                }
                _ if rest.starts_with(b"null") => {
                    self.i += 4;
                    Ok(Jv::Null)
                }
                _ => self.number(),
            }
        }

        fn hex4(&mut self) -> Result<u32, String> {
            let digits = self
                .s
                .get(self.i..self.i + 4)
                .and_then(|d| std::str::from_utf8(d).ok())
                .ok_or("short unicode escape")?;
            self.i += 4;
            u32::from_str_radix(digits, 16).map_err(|e| e.to_string())
        }

        fn string(&mut self) -> Result<String, String> {
            self.expect(b'"')?;
            let mut out: Vec<u8> = Vec::new();
            loop {
                let c = *self.s.get(self.i).ok_or("unterminated string")?;
                self.i += 1;
                match c {
                    b'"' => return String::from_utf8(out).map_err(|e| e.to_string()),
                    b'\\' => {
                        let esc = *self.s.get(self.i).ok_or("unterminated escape")?;
                        self.i += 1;
                        let ch = match esc {
                            b'n' => '\n',
                            b't' => '\t',
                            b'r' => '\r',
                            b'b' => '\u{8}',
                            b'f' => '\u{c}',
                            b'u' => {
                                let mut cp = self.hex4()?;
                                if (0xD800..0xDC00).contains(&cp) && self.s[self.i..].starts_with(b"\\u") {
                                    self.i += 2;
                                    let low = self.hex4()?;
                                    cp = 0x10000 + ((cp - 0xD800) << 10) + (low.wrapping_sub(0xDC00));
                                }
                                char::from_u32(cp).unwrap_or('\u{fffd}')
                            }
                            other => other as char,
                        };
                        let mut buf = [0u8; 4];
                        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    }
                    other => out.push(other),
                }
            }
        }

        fn number(&mut self) -> Result<Jv, String> {
            let start = self.i;
            while self.i < self.s.len() && b"+-0123456789.eE".contains(&self.s[self.i]) {
                self.i += 1;
            }
            let text = std::str::from_utf8(&self.s[start..self.i]).map_err(|e| e.to_string())?;
            if text.is_empty() {
                return Err(format!("unexpected character at offset {}", start));
            }
            if text.contains(['.', 'e', 'E']) {
                return text.parse().map(Jv::Float).map_err(|e| format!("{}: {}", text, e));
            }
            Ok(match text.parse::<i64>() {
                Ok(i) => Jv::Int(i),
                Err(_) => Jv::Big(text.to_string()),
            })
        }
    }

    fn field<'a>(fields: &'a [(String, Jv)], key: &str) -> Option<&'a Jv> {
        fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn decode(v: Jv) -> Jv {
        match v {
            Jv::Arr(items) => Jv::Arr(items.into_iter().map(decode).collect()),
            Jv::Obj(fields) => {
                let marker_keys = fields.iter().all(|(k, _)| k == "__type__" || k == "value");
                if let (true, Some(Jv::Str(kind))) = (marker_keys, field(&fields, "__type__")) {
                    let payload = field(&fields, "value").cloned();
                    let decoded = match (kind.as_str(), payload) {
                        ("NaN", _) => Some(Jv::Float(f64::NAN)),
                        ("Infinity", _) => Some(Jv::Float(f64::INFINITY)),
                        ("-Infinity", _) => Some(Jv::Float(f64::NEG_INFINITY)),
                        ("undefined", _) => Some(Jv::Null),
                        ("float", Some(Jv::Str(text))) => text.parse().ok().map(Jv::Float),
                        ("float", Some(Jv::Int(i))) => Some(Jv::Float(i as f64)),
                        ("float", Some(Jv::Float(f))) => Some(Jv::Float(f)),
                        ("bigint", Some(Jv::Str(text))) => Reader::new(&text).number().ok(),
                        ("char", Some(Jv::Str(text))) => text.chars().next().map(Jv::Char),
                        ("tuple", Some(inner)) => Some(decode(inner)),
                        ("Set", Some(Jv::Arr(items))) => Some(Jv::Set(items.into_iter().map(decode).collect())),
                        ("Map", Some(Jv::Arr(pairs))) => Some(Jv::Map(
                            pairs
                                .into_iter()
                                .filter_map(|pair| match pair {
                                    Jv::Arr(mut kv) if kv.len() == 2 => {
                                        let value = kv.pop()?;
                                        let key = kv.pop()?;
                                        Some((decode(key), decode(value)))
                                    }
                                    _ => None,
                                })
                                .collect(),
                        )),
                        _ => None,
                    };
                    if let Some(decoded) = decoded {
                        return decoded;
                    }
                }
                Jv::Obj(fields.into_iter().map(|(k, v)| (k, decode(v))).collect())
            }
            other => other,
        }
    }

    // ---- JSON writer ----

    pub fn quote(out: &mut String, s: &str) {
        out.push('"');
        for c in s.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        }
        out.push('"');
    }

    fn write(out: &mut String, v: &Jv) {
        match v {
            Jv::Null => out.push_str("null"),
            Jv::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Jv::Int(i) => out.push_str(&i.to_string()),
            Jv::Big(s) => {
                out.push_str("{\"__type__\":\"bigint\",\"value\":");
                quote(out, s);
                out.push('}');
            }
            Jv::Float(f) if f.is_nan() => out.push_str("{\"__type__\":\"NaN\"}"),
            Jv::Float(f) if f.is_infinite() && *f > 0.0 => out.push_str("{\"__type__\":\"Infinity\"}"),
            Jv::Float(f) if f.is_infinite() => out.push_str("{\"__type__\":\"-Infinity\"}"),
            Jv::Float(f) => out.push_str(&format!("{:?}", f)),
            Jv::Str(s) => quote(out, s),
            Jv::Char(c) => {
                out.push_str("{\"__type__\":\"char\",\"value\":");
                quote(out, &c.to_string());
                out.push('}');
            }
            Jv::Arr(items) => {
                out.push('[');
                for (k, item) in items.iter().enumerate() {
                    if k > 0 {
                        out.push(',');
                    }
                    write(out, item);
                }
                out.push(']');
            }
            Jv::Set(items) => {
                let mut parts: Vec<String> = items.iter().map(encode).collect();
                parts.sort();
                out.push_str("{\"__type__\":\"Set\",\"value\":[");
                out.push_str(&parts.join(","));
                out.push_str("]}");
            }
            Jv::Obj(fields) => {
                out.push('{');
                for (k, (key, item)) in fields.iter().enumerate() {
                    if k > 0 {
                        out.push(',');
                    }
                    quote(out, key);
                    out.push(':');
                    write(out, item);
                }
                out.push('}');
            }
            Jv::Map(pairs) => {
                let parts: Vec<String> = pairs
                    .iter()
                    .map(|(k, v)| format!("[{},{}]", encode(k), encode(v)))
                    .collect();
                out.push_str("{\"__type__\":\"Map\",\"value\":[");
                out.push_str(&parts.join(","));
                out.push_str("]}");
            }
        }
    }

    pub fn encode(v: &Jv) -> String {
        let mut out = String::new();
        write(&mut out, v);
        out
    }

    // ---- deep comparator ----

    fn text(v: &Jv) -> Option<String> {
        match v {
            Jv::Str(s) => Some(s.clone()),
            Jv::Char(c) => Some(c.to_string()),
            _ => None,
        }
    }

    fn items(v: &Jv) -> Option<&[Jv]> {
        match v {
            Jv::Arr(items) | Jv::Set(items) => Some(items),
            _ => None,
        }
    }

    fn entries(v: &Jv) -> Option<Vec<(Jv, &Jv)>> {
        match v {
            Jv::Obj(fields) => Some(fields.iter().map(|(k, v)| (Jv::Str(k.clone()), v)).collect()),
            Jv::Map(pairs) => Some(pairs.iter().map(|(k, v)| (k.clone(), v)).collect()),
            _ => None,
        }
    }

    fn key_text(k: &Jv) -> String {
        text(k).unwrap_or_else(|| encode(k))
    }

    fn same_members(left: &[Jv], right: &[Jv]) -> bool {
        left.len() == right.len()
            && left.iter().all(|x| right.iter().any(|y| equal(x, y)))
            && right.iter().all(|y| left.iter().any(|x| equal(x, y)))
    }

    pub fn equal(a: &Jv, e: &Jv) -> bool {
        match (a, e) {
            (Jv::Null, Jv::Null) => true,
            (Jv::Null, _) | (_, Jv::Null) => false,
            (Jv::Float(x), Jv::Float(y)) if x.is_nan() || y.is_nan() => x.is_nan() && y.is_nan(),
            (Jv::Float(x), Jv::Float(y)) => x == y,
            (Jv::Float(_), _) | (_, Jv::Float(_)) => false,
            (Jv::Int(x), Jv::Int(y)) => x == y,
            (Jv::Big(x), Jv::Big(y)) => x == y,
            (Jv::Bool(x), Jv::Bool(y)) => x == y,
            (Jv::Set(_), _) | (_, Jv::Set(_)) => match (items(a), items(e)) {
                (Some(x), Some(y)) => same_members(x, y),
                _ => false,
            },
            (Jv::Arr(x), Jv::Arr(y)) => x.len() == y.len() && x.iter().zip(y).all(|(p, q)| equal(p, q)),
            _ => {
                if let (Some(x), Some(y)) = (text(a), text(e)) {
                    return x == y;
                }
                let (Some(left), Some(right)) = (entries(a), entries(e)) else {
                    return false;
                };
                left.len() == right.len()
                    && left.iter().all(|(k, v)| {
                        let found = right
                            .iter()
                            .find(|(k2, _)| equal(k, k2))
                            .or_else(|| right.iter().find(|(k2, _)| key_text(k2) == key_text(k)));
                        found.is_some_and(|(_, v2)| equal(v, v2))
                    })
            }
        }
    }

    pub fn panic_text(payload: &(dyn std::any::Any + Send)) -> String {
        if let Some(err) = payload.downcast_ref::<ReturnedErr>() {
            return format!("Error: {}", err.0);
        }
        if let Some(s) = payload.downcast_ref::<&str>() {
            return format!("Panic: {}", s);
        }
        if let Some(s) = payload.downcast_ref::<String>() {
            return format!("Panic: {}", s);
        }
        "Panic: non-string panic payload".to_string()
    }

    pub const EMBEDDED: Option<&str> = {{PAYLOAD}};
}

fn main() {
    use harness_rt::Jv;
    use std::io::Read;

    let mut cases: Vec<Box<dyn Fn() -> Jv>> = Vec::new();
{{CALLS}}

    let payload = match harness_rt::EMBEDDED {
        Some(text) => text.to_string(),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .expect("reading stdin");
            text
        }
    };
    let expected: Vec<Jv> = payload
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            harness_rt::Reader::new(line)
                .read()
                .map(harness_rt::decode)
                .expect("invalid expected value")
        })
        .collect();

    std::panic::set_hook(Box::new(|_| {}));
    let mut parts = Vec::with_capacity(cases.len());
    for (index, thunk) in cases.iter().enumerate() {
        let want = expected.get(index).cloned().unwrap_or(Jv::Null);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| thunk()));
        let mut part = format!("{{\"index\":{},", index);
        match result {
            Ok(actual) => {
                let passed = harness_rt::equal(&actual, &want);
                part.push_str(&format!(
                    "\"actual\":{},\"passed\":{},\"error\":null}}",
                    harness_rt::encode(&actual),
                    passed
                ));
            }
            Err(payload) => {
                part.push_str("\"actual\":null,\"passed\":false,\"error\":");
                harness_rt::quote(&mut part, &harness_rt::panic_text(payload.as_ref()));
                part.push('}');
            }
        }
        parts.push(part);
    }
    println!();
    println!("[{}]", parts.join(","));
}
