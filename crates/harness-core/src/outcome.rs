//! Result contract: the outcome array every generated program prints as its
//! last stdout line, and the reader that turns it back into [`Outcome`]s.
//!
//! ```text
//! [{"index":0,"actual":3,"passed":true,"error":null},
//!  {"index":1,"actual":null,"passed":false,"error":"ZeroDivisionError: division by zero"}]
//! ```
//!
//! Output that breaks the contract (not JSON, not an array, wrong length,
//! out-of-order indices) fails the whole batch. Partial output is never
//! attributed to individual cases.

use crate::error::{HarnessError, Result};
use crate::fidelity::parse_json_preserving_floats;
use crate::program::{ProgramMode, TestCase};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Result of one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub index: usize,
    pub actual: Value,
    pub passed: bool,
    pub error: Option<String>,
}

impl Outcome {
    /// A failed case with no actual value.
    pub fn failed(index: usize, error: impl Into<String>) -> Self {
        Self {
            index,
            actual: Value::Null,
            passed: false,
            error: Some(error.into()),
        }
    }
}

/// Parse a generated program's stdout into exactly `expected_count` outcomes.
///
/// Only the last non-empty line is read, so stray output the user code
/// printed earlier does not break the contract.
///
/// # Errors
/// Returns [`HarnessError::Contract`] if that line is missing, is not a JSON
/// array, has the wrong length, or contains a malformed record.
pub fn parse_outcomes(stdout: &str, expected_count: usize) -> Result<Vec<Outcome>> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| HarnessError::Contract("program produced no output".to_string()))?;

    let value = parse_json_preserving_floats(line)
        .map_err(|e| HarnessError::Contract(format!("last stdout line is not JSON: {}", e)))?;
    let Value::Array(records) = value else {
        return Err(HarnessError::Contract(format!(
            "expected a JSON array of outcomes, found {}",
            value.kind()
        )));
    };
    if records.len() != expected_count {
        return Err(HarnessError::Contract(format!(
            "expected {} outcomes, found {}",
            expected_count,
            records.len()
        )));
    }

    records
        .iter()
        .enumerate()
        .map(|(position, record)| outcome_from_record(position, record))
        .collect()
}

fn outcome_from_record(position: usize, record: &Value) -> Result<Outcome> {
    let bad = |what: &str| HarnessError::Contract(format!("outcome {}: {}", position, what));
    if !matches!(record, Value::Object(_)) {
        return Err(bad("record is not an object"));
    }
    match record.get("index") {
        Some(Value::Int(i)) if usize::try_from(*i).ok() == Some(position) => {}
        Some(Value::Int(i)) => return Err(bad(&format!("index {} out of order", i))),
        _ => return Err(bad("missing integer index")),
    }
    let passed = match record.get("passed") {
        Some(Value::Bool(b)) => *b,
        _ => return Err(bad("missing boolean 'passed'")),
    };
    let error = match record.get("error") {
        None | Some(Value::Null) | Some(Value::Undefined) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(bad("'error' must be a string or null")),
    };
    let actual = record.get("actual").cloned().unwrap_or(Value::Null);
    Ok(Outcome {
        index: position,
        actual,
        passed: passed && error.is_none(),
        error,
    })
}

/// Outcomes for a fallback program: nothing was judged, so every case fails
/// with an explanation.
pub fn fallback_outcomes(cases: &[TestCase], language: &str) -> Vec<Outcome> {
    let message = format!(
        "Unverified: no native harness for language '{}'; the case was not executed or judged",
        language
    );
    (0..cases.len())
        .map(|index| Outcome::failed(index, message.clone()))
        .collect()
}

/// Caller-facing judgement of a finished run.
///
/// Fallback programs yield [`fallback_outcomes`]. A contract violation marks
/// every case failed with the violation message.
pub fn collect_outcomes(
    mode: ProgramMode,
    language: &str,
    stdout: &str,
    cases: &[TestCase],
) -> Vec<Outcome> {
    if mode == ProgramMode::Fallback {
        return fallback_outcomes(cases, language);
    }
    match parse_outcomes(stdout, cases.len()) {
        Ok(outcomes) => outcomes,
        Err(err) => {
            warn!(language, error = %err, "discarding batch output");
            let message = err.to_string();
            (0..cases.len())
                .map(|index| Outcome::failed(index, message.clone()))
                .collect()
        }
    }
}
