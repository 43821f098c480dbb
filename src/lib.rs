//! Review sessions for machine-generated test cases.
//!
//! A screenshot plus a short description goes to a generation backend, which
//! answers with a batch of test cases. This crate owns the resulting review
//! session: one card per test case, shared run labels, optimistic result
//! saves and spreadsheet export, all against a pluggable HTTP backend.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::use_cases::review::{
    ReviewCard, ReviewController, SaveStatus, SessionSummary,
};
pub use domain::error::{AppError, Result};
pub use domain::session::{parse_run_dates, ReviewSession};
pub use domain::test_case::{RunDraft, RunRecord, RunStatus, TestCase};
pub use infrastructure::backend::{
    GenerateRequest, GenerateResponse, HttpBackend, ResultEntry, ResultsAck, ResultsPayload,
    ReviewBackend,
};
pub use infrastructure::config::BackendConfig;
