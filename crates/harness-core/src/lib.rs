//! # harness-core
//!
//! Generates self-judging test programs for user code in many languages.
//!
//! A request names a language, carries the user's source files and a list of
//! test cases (`call` text plus the `expected` value). [`generate`] picks a
//! backend and returns a [`GeneratedProgram`]: the files to write, the entry
//! point, the stdin payload and a mode. Run it in a sandbox, then hand its
//! stdout to [`collect_outcomes`] to get one [`Outcome`] per case.
//!
//! ## Quick start
//!
//! ```rust
//! use harness_core::{generate, GenerateRequest, ProgramMode, SourceFile, TestCase, Value};
//!
//! let request = GenerateRequest {
//!     language: "Python3".to_string(),
//!     files: vec![SourceFile::new("solution.py", "def add(a, b):\n    return a + b\n")],
//!     test_cases: vec![TestCase::new("add(1, 2)", Value::Int(3))],
//!     options: Default::default(),
//! };
//! let program = generate(&request).unwrap();
//! assert_eq!(program.mode, ProgramMode::Native);
//! assert_eq!(program.entry_point, "_harness_runner.py");
//! ```
//!
//! ## Modules
//!
//! - [`value`]: canonical value model, marker vocabulary, deep equality
//! - [`fidelity`]: float-preserving JSON parsing
//! - [`parser`]: call-expression parser for structured mode
//! - [`backend`]: per-language generators and their embedded runtimes
//! - [`hygiene`]: source massaging for single-unit compiled targets
//! - [`registry`]: language identifier → backend
//! - [`outcome`]: the result contract printed by generated programs
//! - [`program`]: request and program types
//! - [`error`]: error types

pub mod backend;
pub mod error;
pub mod fidelity;
pub mod hygiene;
pub mod outcome;
pub mod parser;
pub mod program;
pub mod registry;
pub mod value;

pub use backend::Backend;
pub use error::{HarnessError, ParseError, Result};
pub use fidelity::parse_json_preserving_floats;
pub use outcome::{collect_outcomes, fallback_outcomes, parse_outcomes, Outcome};
pub use parser::{parse, Invocation};
pub use program::{
    CallMode, ExpectedDelivery, GenerateOptions, GenerateRequest, GeneratedProgram, ProgramMode,
    SourceFile, TestCase,
};
pub use registry::{normalize_language_id, resolve, supported_languages};
pub use value::{deep_equal, Value};

use tracing::debug;

/// Validate a request and build its program with the resolved backend.
///
/// # Errors
/// - [`HarnessError::InvalidInput`] for a blank language, no files, an
///   unnamed file or a blank call
/// - [`HarnessError::Parse`] when a call does not parse (structured mode)
/// - [`HarnessError::UnsupportedValue`] when an argument has no literal form
///   in the target language
pub fn generate(request: &GenerateRequest) -> Result<GeneratedProgram> {
    request.validate()?;
    let backend = resolve(&request.language);
    let program = backend.generate(&request.files, &request.test_cases, &request.options)?;
    debug!(
        language = %request.language,
        backend = backend.name(),
        cases = request.test_cases.len(),
        files = program.files.len(),
        "generated program"
    );
    Ok(program)
}

/// Render a value as a source literal for `language`.
///
/// # Errors
/// Returns [`HarnessError::UnsupportedValue`] if the language has no literal
/// for the value, which is always the case for the generic fallback.
pub fn render(value: &Value, language: &str) -> Result<String> {
    resolve(language).render(value)
}
