use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::BackendConfig;

use super::{GenerateRequest, GenerateResponse, ResultsAck, ResultsPayload, ReviewBackend};

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn build_form(request: &GenerateRequest) -> Result<Form> {
        let screenshot = Part::bytes(request.screenshot.clone())
            .file_name(request.screenshot_filename.clone())
            .mime_str(screenshot_mime(&request.screenshot_filename))
            .map_err(|_| AppError::Internal("Invalid screenshot content type.".to_string()))?;

        let mut form = Form::new()
            .part("screenshot", screenshot)
            .text("description", request.description.clone())
            .text("release_version", request.release_version.clone())
            .text("tester_name", request.tester_name.clone())
            .text("run_dates", request.run_dates.clone())
            .text("expected_count", request.expected_count.to_string());
        if let Some(model) = request
            .model_override
            .as_ref()
            .filter(|model| !model.trim().is_empty())
        {
            form = form.text("model_override", model.clone());
        }
        Ok(form)
    }
}

#[async_trait]
impl ReviewBackend for HttpBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let form = Self::build_form(request)?;

        let response = self
            .client
            .post(self.endpoint("generate-tests"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::GenerationError(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::GenerationError(format!("Failed to read response: {}", e)))?;

        // The backend answers business failures with an error status AND the
        // usual envelope, so the body is parsed before the status is judged.
        match serde_json::from_str::<GenerateResponse>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(AppError::GenerationError(format!(
                "API error ({}): {}",
                status,
                preview_text(&body, 300)
            ))),
            Err(e) => Err(AppError::ParseError(format!("Failed to parse JSON: {}", e))),
        }
    }

    async fn log_results(&self, payload: &ResultsPayload) -> Result<ResultsAck> {
        let response = self
            .client
            .post(self.endpoint("log-results"))
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::PersistenceError(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::PersistenceError(format!("Failed to read response: {}", e)))?;

        match serde_json::from_str::<ResultsAck>(&body) {
            Ok(ack) => Ok(ack),
            Err(_) if !status.is_success() => Err(AppError::PersistenceError(format!(
                "API error ({}): {}",
                status,
                preview_text(&body, 300)
            ))),
            Err(e) => Err(AppError::ParseError(format!("Failed to parse JSON: {}", e))),
        }
    }

    fn export_url(&self, session_id: &str) -> String {
        self.endpoint(&format!("export-excel/{}", session_id))
    }
}

/// MIME type for the screenshot part, decided by file name the same way the
/// backend does, with JPEG as the fallback.
fn screenshot_mime(filename: &str) -> &'static str {
    let lower = filename.to_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

fn preview_text(value: &str, limit: usize) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let snippet: String = trimmed.chars().take(limit).collect();
    if trimmed.chars().count() > limit {
        format!("{}…", snippet)
    } else {
        snippet
    }
}
