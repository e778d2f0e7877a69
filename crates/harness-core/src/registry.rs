//! Language registry with alias lookup.
//!
//! Every native backend registers its aliases in one table, built on first
//! use. Lookups never fail: identifiers nothing claims resolve to the
//! [`Generic`] fallback.

use crate::backend::cpp::Cpp;
use crate::backend::csharp::CSharp;
use crate::backend::generic::Generic;
use crate::backend::go::Go;
use crate::backend::java::Java;
use crate::backend::javascript::{JavaScript, TypeScript};
use crate::backend::python::Python;
use crate::backend::ruby::Ruby;
use crate::backend::rust::Rust;
use crate::backend::Backend;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Native backends, in listing order.
static BACKENDS: &[&'static dyn Backend] = &[
    &Python,
    &JavaScript,
    &TypeScript,
    &Ruby,
    &Java,
    &Cpp,
    &Go,
    &Rust,
    &CSharp,
];

static GENERIC: Generic = Generic;

/// Cached alias → backend lookup table.
static ALIAS_MAP: OnceLock<HashMap<&'static str, &'static dyn Backend>> = OnceLock::new();

fn alias_map() -> &'static HashMap<&'static str, &'static dyn Backend> {
    ALIAS_MAP.get_or_init(|| {
        let mut map = HashMap::new();
        for backend in BACKENDS {
            for alias in backend.aliases() {
                map.insert(*alias, *backend);
            }
        }
        map
    })
}

/// Lower-case and keep only `[a-z0-9+#]`: `"C#"` → `"c#"`, `"Python 3"` → `"python3"`.
pub fn normalize_language_id(id: &str) -> String {
    id.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '+' || *c == '#')
        .collect()
}

/// Find the backend for a language identifier.
///
/// Tries the normalised identifier, then the identifier with trailing version
/// digits removed (`java17` → `java`, `c++17` → `c++`), then falls back to
/// [`Generic`].
pub fn resolve(language: &str) -> &'static dyn Backend {
    let id = normalize_language_id(language);
    let map = alias_map();
    if let Some(backend) = map.get(id.as_str()) {
        debug!(language, backend = backend.name(), "resolved language");
        return *backend;
    }
    let unversioned = id.trim_end_matches(|c: char| c.is_ascii_digit());
    if unversioned != id {
        if let Some(backend) = map.get(unversioned) {
            debug!(language, backend = backend.name(), "resolved language without version");
            return *backend;
        }
    }
    warn!(language, "no native backend, using generic fallback");
    &GENERIC
}

/// Canonical names of the native backends.
pub fn supported_languages() -> Vec<&'static str> {
    BACKENDS.iter().map(|b| b.name()).collect()
}

/// Each native backend's canonical name with its aliases.
pub fn language_aliases() -> Vec<(&'static str, &'static [&'static str])> {
    BACKENDS.iter().map(|b| (b.name(), b.aliases())).collect()
}
