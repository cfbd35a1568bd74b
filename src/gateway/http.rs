use super::GradingService;
use crate::model::Submission;
use anyhow::Context;
use reqwest::blocking::Client;
use serde_json::json;
use std::time::Duration;

/// Blocking client for the grading service's REST surface:
/// `GET /api/submissions`, `POST /api/submissions/{id}/grade`,
/// `POST /api/submissions/{id}/release`.
pub struct HttpGradingService {
    base_url: String,
    client: Client,
}

impl HttpGradingService {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to construct HTTP client")?;
        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> anyhow::Result<serde_json::Value> {
        let url = self.url(path);
        self.client
            .get(&url)
            .send()
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned an error status"))?
            .json::<serde_json::Value>()
            .with_context(|| format!("GET {url} returned a non-JSON body"))
    }

    fn post(&self, path: &str, body: serde_json::Value) -> anyhow::Result<serde_json::Value> {
        let url = self.url(path);
        self.client
            .post(&url)
            .json(&body)
            .send()
            .with_context(|| format!("POST {url} failed"))?
            .error_for_status()
            .with_context(|| format!("POST {url} returned an error status"))?
            .json::<serde_json::Value>()
            .with_context(|| format!("POST {url} returned a non-JSON body"))
    }
}

impl GradingService for HttpGradingService {
    fn name(&self) -> &'static str {
        "http"
    }

    fn list_submissions(&self) -> anyhow::Result<serde_json::Value> {
        self.get("/api/submissions")
    }

    fn request_grade(&self, submission: &Submission) -> anyhow::Result<serde_json::Value> {
        self.post(
            &format!("/api/submissions/{}/grade", submission.id),
            json!({
                "filename": submission.filename,
                "assignment_type": submission.assignment_type,
            }),
        )
    }

    fn request_release(&self, submission: &Submission) -> anyhow::Result<serde_json::Value> {
        self.post(
            &format!("/api/submissions/{}/release", submission.id),
            json!({}),
        )
    }
}
