/// Test-result input data
///
/// This module defines the test cases a report is built from, as they
/// arrive in the cases JSON file, plus the summary printed after a run.
use indexmap::IndexMap;
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};

/// Conditions checked against one recorded file, and whether they held
pub type ConditionCheck = (Vec<String>, bool);

/// Outcome of a test case
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CaseResult {
    Passed,
    Failed,
    /// Any other verdict, kept verbatim (may be empty)
    Other(String),
}

impl CaseResult {
    pub fn as_str(&self) -> &str {
        match self {
            CaseResult::Passed => "PASSED",
            CaseResult::Failed => "FAILED",
            CaseResult::Other(s) => s,
        }
    }
}

impl Default for CaseResult {
    fn default() -> Self {
        CaseResult::Other(String::new())
    }
}

impl From<String> for CaseResult {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PASSED" => CaseResult::Passed,
            "FAILED" => CaseResult::Failed,
            _ => CaseResult::Other(s),
        }
    }
}

impl From<CaseResult> for String {
    fn from(r: CaseResult) -> Self {
        r.as_str().to_string()
    }
}

impl fmt::Display for CaseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One test case as read from the cases file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TestCase {
    pub title: String,                                         // "CCRs_AEB_test_case_1"
    pub result: CaseResult,                                    // "PASSED" | "FAILED" | other
    pub settings: IndexMap<String, serde_json::Value>,         // {"gvt": "30km/h"}, in input order
    pub condition_result: IndexMap<String, Vec<ConditionCheck>>, // file -> [(conditions, passed)]
    pub image_path: PathBuf,                                   // image index JSON, empty for none
}

impl TestCase {
    /// The settings as `"k: v, k2: v2"`, in input order
    pub fn settings_line(&self) -> String {
        self.settings
            .iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => format!("{}: {}", k, s),
                other => format!("{}: {}", k, other),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Read a JSON array of test cases
pub fn load_cases(path: &Path) -> Result<Vec<TestCase>, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read cases file {}: {}", path.display(), e))?;
    let cases: Vec<TestCase> =
        serde_json::from_str(&content).map_err(|e| format!("Invalid cases file {}: {}", path.display(), e))?;
    debug!("Loaded {} test cases from {:?}", cases.len(), path);
    Ok(cases)
}

/// Pass/fail counts over a set of cases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub other: usize,
}

impl ReportSummary {
    pub fn from_cases(cases: &[TestCase]) -> Self {
        let mut summary = ReportSummary { total: cases.len(), ..Default::default() };
        for case in cases {
            match case.result {
                CaseResult::Passed => summary.passed += 1,
                CaseResult::Failed => summary.failed += 1,
                CaseResult::Other(_) => summary.other += 1,
            }
        }
        summary
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.other == 0
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
