//! Error types for harness generation and result parsing.

use thiserror::Error;

/// Errors raised while parsing a call expression.
///
/// Every variant names the offending construct so callers can show it to the
/// submitter verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("call expression must be non-empty string")]
    Empty,

    #[error("expected a function call")]
    NotACall,

    #[error("nested calls are not supported: '{0}(...)'")]
    NestedCall(String),

    #[error("ternary expressions are not supported")]
    Ternary,

    #[error("spread syntax is not supported")]
    Spread,

    #[error("template interpolation is not supported")]
    Interpolation,

    #[error("computed object keys are not supported")]
    ComputedKey,

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("unexpected {found} at offset {offset}")]
    Unexpected { offset: usize, found: String },

    #[error("integer division by zero in constant expression")]
    DivisionByZero,

    #[error("operator '{op}' cannot be applied to {kind}")]
    InvalidOperand { op: &'static str, kind: &'static str },

    #[error("operator '{op}' cannot be applied to {lhs} and {rhs}")]
    InvalidOperands {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
}

/// Errors that can occur while generating a harness or reading its output.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// The request was malformed (empty call, missing files, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A call expression failed to parse (structured mode only).
    #[error("parse error in call {index}: {source}")]
    Parse {
        index: usize,
        #[source]
        source: ParseError,
    },

    /// A value has no literal form in the target language.
    #[error("unsupported value type: {kind} has no {language} literal")]
    UnsupportedValue {
        kind: &'static str,
        language: &'static str,
    },

    /// The generated program's stdout did not honour the outcome contract.
    #[error("output contract violated: {0}")]
    Contract(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ParseError> for HarnessError {
    fn from(source: ParseError) -> Self {
        HarnessError::Parse { index: 0, source }
    }
}

/// Convenience alias used throughout harness-core.
pub type Result<T> = std::result::Result<T, HarnessError>;
