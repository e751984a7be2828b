//! Job service REST client.
//!
//! Two calls make up the whole protocol:
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | POST | `/jobs` | [`SubmitRequest`] | [`SubmitResponse`] |
//! | GET | `/jobs/{id}` | (none) | [`JobStatusResponse`] |

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{RestError, RestResult};

/// Job service REST client.
pub struct RestClient {
    /// HTTP client with timeouts configured.
    client: Client,
    /// API base URL (without trailing slash).
    base_url: String,
    /// Bearer token, if the service requires one.
    token: Option<String>,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl RestClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> RestResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(RestError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Handle HTTP response: deserialize JSON or return an error.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> RestResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.json().await?;
            Ok(body)
        } else {
            let message = response.text().await.unwrap_or_default();
            match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Err(RestError::AuthFailed(message))
                }
                StatusCode::NOT_FOUND => Err(RestError::JobNotFound(message)),
                _ => Err(RestError::ApiError {
                    status: status.as_u16(),
                    message,
                }),
            }
        }
    }

    /// Submit a job for execution.
    #[instrument(skip(self, req))]
    pub async fn submit_job(&self, req: &SubmitRequest) -> RestResult<SubmitResponse> {
        debug!("Submitting job ({} shots, qpu {})", req.shots, req.qpu);
        let response = self
            .authorize(self.client.post(self.url("jobs")).json(req))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Get the current status, and results once completed, of a job.
    #[instrument(skip(self))]
    pub async fn get_job(&self, job_id: &str) -> RestResult<JobStatusResponse> {
        debug!("Getting job status for {}", job_id);
        let response = self
            .authorize(self.client.get(self.url(&format!("jobs/{job_id}"))))
            .send()
            .await?;
        match self.handle_response(response).await {
            Err(RestError::JobNotFound(_)) => Err(RestError::JobNotFound(job_id.to_string())),
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response serde types
// ---------------------------------------------------------------------------

/// Request body for `POST /jobs`.
#[derive(Debug, Serialize)]
pub struct SubmitRequest {
    /// Program text, passed through untouched.
    pub program: String,
    /// Number of measured positions.
    pub num_measured: u32,
    /// Number of shots.
    pub shots: u32,
    /// Target QPU index.
    pub qpu: usize,
    /// Optional job label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Response from `POST /jobs`.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Assigned job identifier.
    pub job: String,
}

/// Response from `GET /jobs/{id}`.
#[derive(Debug, Deserialize)]
pub struct JobStatusResponse {
    /// Current status: `queued`, `submitted`, `running`, `completed`,
    /// `failed`, `cancelled`.
    pub status: String,
    /// Outcome histogram, populated when completed.
    #[serde(default)]
    pub results: Option<BTreeMap<String, u64>>,
    /// Error message if the job failed.
    #[serde(default)]
    pub error: Option<String>,
    /// Queue position (present while queued).
    #[serde(rename = "queue-position", default)]
    pub queue_position: Option<u32>,
}

impl JobStatusResponse {
    /// Whether the job has started executing.
    pub fn is_running(&self) -> bool {
        self.status.eq_ignore_ascii_case("running")
    }

    /// Whether the job completed successfully.
    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case("completed")
    }

    /// Whether the job failed.
    pub fn is_failed(&self) -> bool {
        self.status.eq_ignore_ascii_case("failed")
    }

    /// Whether the job was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self.status.to_lowercase().as_str(),
            "canceled" | "cancelled"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_serialization() {
        let req = SubmitRequest {
            program: "h q[0];".into(),
            num_measured: 2,
            shots: 1000,
            qpu: 1,
            name: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "program": "h q[0];",
                "num_measured": 2,
                "shots": 1000,
                "qpu": 1
            })
        );
    }

    #[test]
    fn test_job_status_response_states() {
        let mut resp: JobStatusResponse =
            serde_json::from_str(r#"{"status":"running","queue-position":null}"#).unwrap();
        assert!(resp.is_running());
        assert!(!resp.is_completed());

        resp.status = "COMPLETED".into();
        assert!(resp.is_completed());

        resp.status = "failed".into();
        assert!(resp.is_failed());

        resp.status = "canceled".into();
        assert!(resp.is_cancelled());
    }

    #[test]
    fn test_job_status_response_with_results() {
        let resp: JobStatusResponse = serde_json::from_str(
            r#"{"status":"completed","results":{"00":498,"11":502}}"#,
        )
        .unwrap();
        let results = resp.results.unwrap();
        assert_eq!(results["00"], 498);
        assert_eq!(results["11"], 502);
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = RestClient::new("https://jobs.example.com/v1/", None).unwrap();
        assert_eq!(client.base_url(), "https://jobs.example.com/v1");
        assert_eq!(client.url("/jobs/abc"), "https://jobs.example.com/v1/jobs/abc");
    }

    #[test]
    fn test_client_debug_redacts_token() {
        let client = RestClient::new("https://jobs.example.com", Some("s3cret".into())).unwrap();
        assert!(!format!("{client:?}").contains("s3cret"));
    }
}
