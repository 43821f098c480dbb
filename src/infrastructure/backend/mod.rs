pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::error::Result;
use crate::domain::test_case::RunStatus;

pub use http::HttpBackend;

/// Intake form for one generation call. The screenshot travels as raw bytes;
/// picking the file and rendering previews belong to the embedder.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub screenshot: Vec<u8>,
    pub screenshot_filename: String,
    pub description: String,
    pub release_version: String,
    pub tester_name: String,
    pub run_dates: String,
    pub expected_count: u32,
    pub model_override: Option<String>,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            screenshot: Vec::new(),
            screenshot_filename: String::new(),
            description: String::new(),
            release_version: String::new(),
            tester_name: String::new(),
            run_dates: String::new(),
            expected_count: 8,
            model_override: None,
        }
    }
}

/// Generation response envelope. `test_cases` stays untyped here; entries
/// are validated one at a time when the session is built.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub test_cases: Vec<serde_json::Value>,
    #[serde(default)]
    pub used_fallback_model: bool,
}

/// One persistence call: a single result row keyed by `(tc_id, run_index)`.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsPayload {
    pub session_id: String,
    pub results: Vec<ResultEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultEntry {
    pub tc_id: String,
    pub run_index: usize,
    pub status: RunStatus,
    pub actual_result: String,
    pub bug_id: String,
    pub commit_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultsAck {
    pub success: bool,
}

/// The generation, persistence and export backend as the review core sees
/// it. Transport failures surface as errors; a business rejection travels
/// inside the response envelope.
#[async_trait]
pub trait ReviewBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;

    async fn log_results(&self, payload: &ResultsPayload) -> Result<ResultsAck>;

    /// Spreadsheet location for a session. No request is made here; the
    /// embedder opens the returned URL.
    fn export_url(&self, session_id: &str) -> String;
}
