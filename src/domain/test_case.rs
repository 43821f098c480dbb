use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::{AppError, Result};

/// Status vocabulary shared with the backend. Anything else in a payload is
/// rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    Pass,
    Fail,
    Blocked,
    #[serde(rename = "NA")]
    Na,
}

impl Default for RunStatus {
    fn default() -> Self {
        RunStatus::NotStarted
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunStatus::NotStarted => "Not Started",
            RunStatus::Pass => "Pass",
            RunStatus::Fail => "Fail",
            RunStatus::Blocked => "Blocked",
            RunStatus::Na => "NA",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    #[serde(default)]
    pub test_date: String,
    #[serde(default)]
    pub actual_result: String,
    #[serde(default)]
    pub status: RunStatus,
    #[serde(default)]
    pub bug_id: String,
    #[serde(default)]
    pub commit_id: String,
}

/// The four editable fields of the review surface, handed to Save and Skip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDraft {
    pub actual_result: String,
    pub status: RunStatus,
    pub bug_id: String,
    pub commit_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub ts_id: String,
    pub tc_id: String,
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub steps: String,
    #[serde(default)]
    pub expected_result: String,
    #[serde(default)]
    pub runs: Vec<RunRecord>,
}

impl TestCase {
    /// Converts one entry of a generation response. Every field except
    /// `tc_id` falls back to its default; `tc_id` keys all later result
    /// writes, so an entry without one is unusable.
    pub fn from_generated(value: serde_json::Value) -> Result<TestCase> {
        let test_case: TestCase = serde_json::from_value(value)
            .map_err(|e| AppError::ParseError(format!("Malformed test case entry: {}", e)))?;
        if test_case.tc_id.trim().is_empty() {
            return Err(AppError::ParseError(
                "Malformed test case entry: tc_id is empty".to_string(),
            ));
        }
        Ok(test_case)
    }
}
