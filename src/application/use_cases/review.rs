use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::session::{parse_run_dates, ReviewSession};
use crate::domain::test_case::{RunDraft, RunRecord, RunStatus, TestCase};
use crate::infrastructure::backend::{
    GenerateRequest, GenerateResponse, ResultEntry, ResultsPayload, ReviewBackend,
};

/// How long the save signal stays visible, matching the transient banner on
/// the review surface.
const SAVE_STATUS_TTL_MS: i64 = 1400;

/// Outcome of the most recent persistence request. Advisory only: the
/// optimistic local write stands whatever this says, and navigation is
/// never blocked on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveStatus {
    Pending,
    Saved,
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct SaveSignal {
    status: SaveStatus,
    set_at_ms: i64,
}

/// Banner data for a freshly loaded session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub test_case_count: usize,
    pub used_fallback_model: bool,
}

/// Everything the review surface renders for the current position. Rebuilt
/// after every transition so the edit fields are never stale.
#[derive(Debug, Clone)]
pub struct ReviewCard<'a> {
    pub test_case: &'a TestCase,
    pub run: RunRecord,
    pub run_dates: &'a [String],
    pub active_run: usize,
    pub index: usize,
    pub total: usize,
}

pub struct ReviewController {
    backend: Arc<dyn ReviewBackend + Send + Sync>,
    session: Option<ReviewSession>,
    current_index: usize,
    active_run: usize,
    save_signal: Option<SaveSignal>,
}

impl ReviewController {
    pub fn new(backend: Arc<dyn ReviewBackend + Send + Sync>) -> Self {
        Self {
            backend,
            session: None,
            current_index: 0,
            active_run: 0,
            save_signal: None,
        }
    }

    /// Submits the intake form and loads the produced session. A prior
    /// session stays untouched on every failure path.
    pub async fn generate(&mut self, request: &GenerateRequest) -> Result<SessionSummary> {
        if request.screenshot.is_empty() || request.description.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Please provide a screenshot and description.".to_string(),
            ));
        }
        let response = self.backend.generate(request).await?;
        self.load_session(response, &request.run_dates)
    }

    /// Interprets a generation outcome and replaces the current session,
    /// resetting the position to the first test case and first run.
    /// `raw_run_dates` is the intake form's comma-separated run-date text,
    /// which wins over labels embedded in the generated runs.
    pub fn load_session(
        &mut self,
        response: GenerateResponse,
        raw_run_dates: &str,
    ) -> Result<SessionSummary> {
        if !response.success {
            let message = response.error.unwrap_or_else(|| "Unknown".to_string());
            return Err(AppError::GenerationError(message));
        }
        let session_id = match response.session_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => {
                return Err(AppError::ParseError(
                    "Generation response carries no session id.".to_string(),
                ))
            }
        };

        let mut test_cases = Vec::with_capacity(response.test_cases.len());
        for entry in response.test_cases {
            match TestCase::from_generated(entry) {
                Ok(test_case) => test_cases.push(test_case),
                Err(e) => {
                    warn!(
                        error = %e,
                        session_id = %session_id,
                        "Dropping malformed test case entry"
                    );
                }
            }
        }

        let session = ReviewSession::create(session_id, test_cases, parse_run_dates(raw_run_dates))?;
        let summary = SessionSummary {
            session_id: session.id().to_string(),
            test_case_count: session.len(),
            used_fallback_model: response.used_fallback_model,
        };
        info!(
            session_id = %summary.session_id,
            test_cases = summary.test_case_count,
            runs = session.run_dates().len(),
            used_fallback_model = summary.used_fallback_model,
            "Loaded review session"
        );
        self.session = Some(session);
        self.current_index = 0;
        self.active_run = 0;
        self.save_signal = None;
        Ok(summary)
    }

    /// Moves to the next test case. At the last one this is a no-op and
    /// returns false.
    pub fn next(&mut self) -> bool {
        let last = match self.session.as_ref() {
            Some(session) => session.len() - 1,
            None => return false,
        };
        if self.current_index < last {
            self.current_index += 1;
            return true;
        }
        false
    }

    /// Moves to the previous test case. At the first one this is a no-op and
    /// returns false.
    pub fn previous(&mut self) -> bool {
        if self.session.is_none() || self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        true
    }

    /// Activates the run at `index` for every test case. An out-of-range
    /// index comes from an integration bug, not a user, and is rejected
    /// rather than clamped.
    pub fn select_run(&mut self, index: usize) -> bool {
        let session = match self.session.as_ref() {
            Some(session) => session,
            None => return false,
        };
        if index >= session.run_dates().len() {
            return false;
        }
        self.active_run = index;
        true
    }

    /// Writes the draft into the current `(test case, run)` slot and asks the
    /// backend to persist exactly that result. The local write is optimistic:
    /// it stands regardless of the backend's answer, which only feeds the
    /// advisory save signal. The position never moves here.
    pub async fn save(&mut self, draft: &RunDraft) -> Result<SaveStatus> {
        let payload = self.apply_draft(draft)?;
        self.set_save_signal(SaveStatus::Pending);

        let status = match self.backend.log_results(&payload).await {
            Ok(ack) if ack.success => SaveStatus::Saved,
            Ok(_) => {
                warn!(
                    session_id = %payload.session_id,
                    "Backend rejected result save"
                );
                SaveStatus::Failed
            }
            Err(e) => {
                warn!(
                    error = %e,
                    session_id = %payload.session_id,
                    "Result save failed"
                );
                SaveStatus::Failed
            }
        };
        self.set_save_signal(status);
        Ok(status)
    }

    /// Marks the current test case's active run as skipped (status NA,
    /// actual result "Skipped"), saves it, then advances like Next unless
    /// already at the last test case. Bug and commit ids keep whatever is on
    /// the edit surface.
    pub async fn skip(&mut self, draft: &RunDraft) -> Result<SaveStatus> {
        let mut skipped = draft.clone();
        skipped.status = RunStatus::Na;
        skipped.actual_result = "Skipped".to_string();
        let status = self.save(&skipped).await?;
        self.next();
        Ok(status)
    }

    /// Export location for the loaded session. Fails locally when nothing is
    /// loaded; no request happens here.
    pub fn export_url(&self) -> Result<String> {
        let session = match self.session.as_ref() {
            Some(session) => session,
            None => {
                return Err(AppError::ValidationError(
                    "No session loaded.".to_string(),
                ))
            }
        };
        Ok(self.backend.export_url(session.id()))
    }

    /// Snapshot for the review surface at the current position. `None` until
    /// a session is loaded.
    pub fn current_card(&self) -> Option<ReviewCard<'_>> {
        let session = self.session.as_ref()?;
        let test_case = session.test_case(self.current_index)?;
        let run = session.run(self.current_index, self.active_run).ok()?;
        Some(ReviewCard {
            test_case,
            run,
            run_dates: session.run_dates(),
            active_run: self.active_run,
            index: self.current_index,
            total: session.len(),
        })
    }

    /// The save signal from the most recent save, if still within its
    /// display window.
    pub fn save_status(&self) -> Option<SaveStatus> {
        self.save_status_as_of(chrono::Utc::now().timestamp_millis())
    }

    pub fn session(&self) -> Option<&ReviewSession> {
        self.session.as_ref()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn active_run(&self) -> usize {
        self.active_run
    }

    /// The synchronous half of Save: the optimistic local write plus the
    /// persistence payload describing it.
    fn apply_draft(&mut self, draft: &RunDraft) -> Result<ResultsPayload> {
        let current_index = self.current_index;
        let active_run = self.active_run;
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => {
                return Err(AppError::ValidationError(
                    "No session loaded.".to_string(),
                ))
            }
        };
        session.write_run(current_index, active_run, draft)?;
        let test_case = session.test_case(current_index).ok_or_else(|| {
            AppError::Internal(format!("Test case index {} out of range", current_index))
        })?;
        Ok(ResultsPayload {
            session_id: session.id().to_string(),
            results: vec![ResultEntry {
                tc_id: test_case.tc_id.clone(),
                run_index: active_run,
                status: draft.status,
                actual_result: draft.actual_result.clone(),
                bug_id: draft.bug_id.clone(),
                commit_id: draft.commit_id.clone(),
            }],
        })
    }

    fn save_status_as_of(&self, now_ms: i64) -> Option<SaveStatus> {
        let signal = self.save_signal?;
        if now_ms.saturating_sub(signal.set_at_ms) > SAVE_STATUS_TTL_MS {
            return None;
        }
        Some(signal.status)
    }

    fn set_save_signal(&mut self, status: SaveStatus) {
        self.save_signal = Some(SaveSignal {
            status,
            set_at_ms: chrono::Utc::now().timestamp_millis(),
        });
    }
}
