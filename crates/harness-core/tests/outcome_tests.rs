//! Result-contract tests: reading the outcome line a generated program prints.

use harness_core::{
    collect_outcomes, fallback_outcomes, parse_outcomes, HarnessError, Outcome, ProgramMode,
    TestCase, Value,
};

fn cases(n: usize) -> Vec<TestCase> {
    (0..n)
        .map(|i| TestCase::new(format!("f({})", i), Value::Int(i as i64)))
        .collect()
}

// ============================================================================
// parse_outcomes
// ============================================================================

#[test]
fn reads_the_last_non_empty_line() {
    let stdout = "debug noise\n[1, 2]\n\n[{\"index\":0,\"actual\":3,\"passed\":true,\"error\":null}]\n\n";
    let outcomes = parse_outcomes(stdout, 1).unwrap();
    assert_eq!(
        outcomes,
        vec![Outcome {
            index: 0,
            actual: Value::Int(3),
            passed: true,
            error: None,
        }]
    );
}

#[test]
fn float_actuals_keep_their_tag() {
    let stdout = r#"[{"index":0,"actual":1.0,"passed":false,"error":null}]"#;
    let outcomes = parse_outcomes(stdout, 1).unwrap();
    assert_eq!(outcomes[0].actual, Value::Float(1.0));
}

#[test]
fn marker_actuals_decode() {
    let stdout = r#"[{"index":0,"actual":{"__type__":"Infinity"},"passed":true,"error":null}]"#;
    let outcomes = parse_outcomes(stdout, 1).unwrap();
    assert_eq!(outcomes[0].actual, Value::Float(f64::INFINITY));
}

#[test]
fn captured_fault_is_a_failed_case() {
    let stdout = concat!(
        r#"[{"index":0,"actual":5,"passed":true,"error":null},"#,
        r#"{"index":1,"actual":null,"passed":false,"error":"ZeroDivisionError: division by zero"}]"#
    );
    let outcomes = parse_outcomes(stdout, 2).unwrap();
    assert!(outcomes[0].passed);
    assert!(!outcomes[1].passed);
    assert_eq!(
        outcomes[1].error.as_deref(),
        Some("ZeroDivisionError: division by zero")
    );
}

#[test]
fn an_error_forces_passed_false() {
    let stdout = r#"[{"index":0,"actual":null,"passed":true,"error":"Boom: x"}]"#;
    let outcomes = parse_outcomes(stdout, 1).unwrap();
    assert!(!outcomes[0].passed);
}

#[test]
fn missing_actual_reads_as_null() {
    let stdout = r#"[{"index":0,"passed":false,"error":"E: m"}]"#;
    assert_eq!(parse_outcomes(stdout, 1).unwrap()[0].actual, Value::Null);
}

#[test]
fn empty_output_violates_the_contract() {
    assert!(matches!(
        parse_outcomes("\n  \n", 1),
        Err(HarnessError::Contract(_))
    ));
}

#[test]
fn non_json_last_line_violates_the_contract() {
    assert!(matches!(
        parse_outcomes("[{\"index\":0}]\nTraceback (most recent call last):", 1),
        Err(HarnessError::Contract(_))
    ));
}

#[test]
fn non_array_violates_the_contract() {
    let err = parse_outcomes(r#"{"index":0}"#, 1).unwrap_err();
    assert!(err.to_string().contains("found object"));
}

#[test]
fn wrong_length_violates_the_contract() {
    let stdout = r#"[{"index":0,"actual":1,"passed":true,"error":null}]"#;
    let err = parse_outcomes(stdout, 2).unwrap_err();
    assert!(err.to_string().contains("expected 2 outcomes, found 1"));
}

#[test]
fn out_of_order_index_violates_the_contract() {
    let stdout = concat!(
        r#"[{"index":1,"actual":1,"passed":true,"error":null},"#,
        r#"{"index":0,"actual":1,"passed":true,"error":null}]"#
    );
    let err = parse_outcomes(stdout, 2).unwrap_err();
    assert!(err.to_string().contains("out of order"));
}

#[test]
fn malformed_record_violates_the_contract() {
    assert!(parse_outcomes(r#"[{"index":0,"passed":"yes"}]"#, 1).is_err());
    assert!(parse_outcomes(r#"[{"index":0,"passed":true,"error":3}]"#, 1).is_err());
    assert!(parse_outcomes(r#"[7]"#, 1).is_err());
}

#[test]
fn zero_cases_accept_an_empty_array() {
    assert!(parse_outcomes("[]", 0).unwrap().is_empty());
}

// ============================================================================
// collect_outcomes / fallback_outcomes
// ============================================================================

#[test]
fn fallback_cases_are_unverified() {
    let outcomes = fallback_outcomes(&cases(2), "brainfck");
    assert_eq!(outcomes.len(), 2);
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.index, i);
        assert!(!outcome.passed);
        assert_eq!(outcome.actual, Value::Null);
        let error = outcome.error.as_deref().unwrap();
        assert!(error.starts_with("Unverified"));
        assert!(error.contains("brainfck"));
    }
}

#[test]
fn collect_ignores_stdout_in_fallback_mode() {
    let stdout = r#"[{"index":0,"actual":0,"passed":true,"error":null}]"#;
    let outcomes = collect_outcomes(ProgramMode::Fallback, "cobol", stdout, &cases(1));
    assert!(!outcomes[0].passed);
}

#[test]
fn collect_passes_through_a_valid_batch() {
    let stdout = r#"[{"index":0,"actual":0,"passed":true,"error":null}]"#;
    let outcomes = collect_outcomes(ProgramMode::Native, "python", stdout, &cases(1));
    assert!(outcomes[0].passed);
}

#[test]
fn contract_failure_fails_every_case_with_the_same_message() {
    let outcomes = collect_outcomes(ProgramMode::Native, "python", "Segmentation fault", &cases(3));
    assert_eq!(outcomes.len(), 3);
    let first = outcomes[0].error.clone().unwrap();
    assert!(first.starts_with("output contract violated"));
    assert!(outcomes.iter().all(|o| !o.passed && o.error.as_deref() == Some(first.as_str())));
}

#[test]
fn outcome_serializes_with_contract_field_names() {
    let outcome = Outcome::failed(2, "KeyError: 'x'");
    assert_eq!(
        serde_json::to_string(&outcome).unwrap(),
        r#"{"index":2,"actual":null,"passed":false,"error":"KeyError: 'x'"}"#
    );
}
