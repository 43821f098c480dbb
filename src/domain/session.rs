use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::test_case::{RunDraft, RunRecord, TestCase};

const SYNTHETIC_RUN_LABEL: &str = "Run1";

/// Splits the intake form's comma-separated run-date text. Entries are
/// trimmed and blanks dropped, so an all-whitespace input yields no labels.
pub fn parse_run_dates(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// One generation-to-review lifecycle: the generated test cases plus the
/// run labels every test case shares. Plain data, no I/O.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSession {
    id: String,
    test_cases: Vec<TestCase>,
    run_dates: Vec<String>,
}

impl ReviewSession {
    /// Builds a session from a generation outcome. Explicit run dates win
    /// when present; otherwise the labels embedded in the first test case's
    /// runs are used; otherwise a single synthetic label. A session without
    /// test cases cannot be reviewed and is rejected here.
    pub fn create(
        id: impl Into<String>,
        test_cases: Vec<TestCase>,
        explicit_run_dates: Vec<String>,
    ) -> Result<ReviewSession> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Session id is required.".to_string(),
            ));
        }
        if test_cases.is_empty() {
            return Err(AppError::ValidationError(
                "Session has no test cases.".to_string(),
            ));
        }
        let run_dates = derive_run_dates(explicit_run_dates, &test_cases);
        Ok(ReviewSession {
            id,
            test_cases,
            run_dates,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_cases
    }

    pub fn run_dates(&self) -> &[String] {
        &self.run_dates
    }

    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }

    pub fn test_case(&self, index: usize) -> Option<&TestCase> {
        self.test_cases.get(index)
    }

    /// Reads the run at `(test_case_index, run_index)`. An absent slot comes
    /// back as a default record carrying its run label; nothing is stored by
    /// reading.
    pub fn run(&self, test_case_index: usize, run_index: usize) -> Result<RunRecord> {
        let test_case = self.test_cases.get(test_case_index).ok_or_else(|| {
            AppError::Internal(format!("Test case index {} out of range", test_case_index))
        })?;
        if run_index >= self.run_dates.len() {
            return Err(AppError::Internal(format!(
                "Run index {} out of range",
                run_index
            )));
        }
        Ok(test_case
            .runs
            .get(run_index)
            .cloned()
            .unwrap_or_else(|| self.default_run(run_index)))
    }

    /// Writes the draft into the run at `(test_case_index, run_index)`,
    /// materializing any missing slots up to that index first. The slot's
    /// run label survives the write; only the four result fields change.
    pub fn write_run(
        &mut self,
        test_case_index: usize,
        run_index: usize,
        draft: &RunDraft,
    ) -> Result<()> {
        if run_index >= self.run_dates.len() {
            return Err(AppError::Internal(format!(
                "Run index {} out of range",
                run_index
            )));
        }
        let test_case = self.test_cases.get_mut(test_case_index).ok_or_else(|| {
            AppError::Internal(format!("Test case index {} out of range", test_case_index))
        })?;
        while test_case.runs.len() <= run_index {
            let slot = test_case.runs.len();
            test_case.runs.push(RunRecord {
                test_date: self.run_dates.get(slot).cloned().unwrap_or_default(),
                ..RunRecord::default()
            });
        }
        let run = &mut test_case.runs[run_index];
        run.actual_result = draft.actual_result.clone();
        run.status = draft.status;
        run.bug_id = draft.bug_id.clone();
        run.commit_id = draft.commit_id.clone();
        Ok(())
    }

    fn default_run(&self, run_index: usize) -> RunRecord {
        RunRecord {
            test_date: self.run_dates.get(run_index).cloned().unwrap_or_default(),
            ..RunRecord::default()
        }
    }
}

fn derive_run_dates(explicit: Vec<String>, test_cases: &[TestCase]) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit;
    }
    if let Some(first) = test_cases.first() {
        // Labels stay aligned with run slots, so a partially blank list is
        // taken verbatim rather than compacted.
        let embedded: Vec<String> = first.runs.iter().map(|run| run.test_date.clone()).collect();
        if embedded.iter().any(|label| !label.trim().is_empty()) {
            return embedded;
        }
    }
    vec![SYNTHETIC_RUN_LABEL.to_string()]
}
