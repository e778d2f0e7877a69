//! Request and program types exchanged with the surrounding service.
//!
//! Wire names are camelCase: a request looks like
//! `{"language":"python","files":[{"name":"solution.py","content":"..."}],
//! "testCases":[{"call":"add(1, 2)","expected":3}]}` and a program like
//! `{"files":[...],"entryPoint":"...","stdin":"...","mode":"native"}`.

use crate::error::{HarnessError, Result};
use crate::value::Value;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

/// A named source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// File name without directories or the last extension: `src/solution.py` → `solution`.
    pub fn stem(&self) -> &str {
        let base = self.name.rsplit(['/', '\\']).next().unwrap_or(&self.name);
        match base.rfind('.') {
            Some(0) | None => base,
            Some(dot) => &base[..dot],
        }
    }
}

/// One call to run and the value it must produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCase {
    pub call: String,
    pub expected: Value,
    /// `expected` exactly as written in the request, when it came from JSON.
    #[serde(skip)]
    pub expected_text: Option<String>,
}

impl TestCase {
    pub fn new(call: impl Into<String>, expected: Value) -> Self {
        Self {
            call: call.into(),
            expected,
            expected_text: None,
        }
    }

    /// The expected value as JSON text: the request's own spelling when
    /// known, else the encoded value.
    pub fn expected_json(&self) -> String {
        match &self.expected_text {
            Some(text) => text.clone(),
            None => self.expected.to_json_string(),
        }
    }
}

impl<'de> Deserialize<'de> for TestCase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Wire {
            call: String,
            expected: Box<RawValue>,
        }
        let wire = Wire::deserialize(deserializer)?;
        let json: serde_json::Value =
            serde_json::from_str(wire.expected.get()).map_err(D::Error::custom)?;
        Ok(TestCase {
            call: wire.call,
            expected: Value::from_json(&json),
            expected_text: Some(wire.expected.get().to_string()),
        })
    }
}

/// How call text reaches the generated program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallMode {
    /// Raw call text, compiled in verbatim or evaluated natively at run time.
    #[default]
    PassThrough,
    /// Calls parsed into [`Invocation`](crate::Invocation)s and re-rendered
    /// from literal values.
    Structured,
}

/// Where expected values (or pass-through records) are read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpectedDelivery {
    #[default]
    Stdin,
    /// Escaped into the generated source as a string literal.
    Embedded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    pub call_mode: CallMode,
    pub expected_delivery: ExpectedDelivery,
}

/// Inbound generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub language: String,
    pub files: Vec<SourceFile>,
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub options: GenerateOptions,
}

impl GenerateRequest {
    /// Reject malformed requests before any generation happens.
    ///
    /// # Errors
    /// Returns [`HarnessError::InvalidInput`] when the language is blank, no
    /// files are given, a file has no name, or a call is blank.
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(HarnessError::InvalidInput(
                "language must be non-empty string".to_string(),
            ));
        }
        if self.files.is_empty() {
            return Err(HarnessError::InvalidInput(
                "at least one source file is required".to_string(),
            ));
        }
        if let Some(pos) = self.files.iter().position(|f| f.name.trim().is_empty()) {
            return Err(HarnessError::InvalidInput(format!(
                "file {} has an empty name",
                pos
            )));
        }
        if let Some(pos) = self.test_cases.iter().position(|c| c.call.trim().is_empty()) {
            return Err(HarnessError::InvalidInput(format!(
                "test case {}: call must be non-empty string",
                pos
            )));
        }
        Ok(())
    }
}

/// Whether a program judges its own cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramMode {
    Native,
    Fallback,
}

/// A program ready for the execution service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedProgram {
    pub files: Vec<SourceFile>,
    pub entry_point: String,
    pub stdin: String,
    pub mode: ProgramMode,
}

impl GeneratedProgram {
    /// Look up a generated file by name.
    pub fn file(&self, name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// The entry-point file.
    pub fn entry(&self) -> Option<&SourceFile> {
        self.file(&self.entry_point)
    }
}
