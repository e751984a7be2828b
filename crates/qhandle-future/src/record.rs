//! Text form of a handle.
//!
//! A [`HandleRecord`] is the platform-independent snapshot of a handle:
//! identifier, status, payload when ready, diagnostic when failed, and
//! optional submission metadata. It is what gets written to and read from
//! a handle file:
//!
//! ```text
//! {
//!   "identifier": "5b0c…",
//!   "status": "ready",
//!   "payload": { "00": 500, "11": 500 },
//!   "platform": "mock",
//!   "shots": 1000,
//!   "qpu": 0,
//!   "submitted_at": "2026-10-19T12:00:00Z"
//! }
//! ```
//!
//! `identifier` and `status` are required. `payload` appears exactly when
//! the status is `ready`, `error` exactly when it is `failed`. Unknown
//! fields are rejected.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use qhandle_hal::{Counts, JobId};

use crate::error::{HandleError, HandleResult};

/// Coarse status of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleStatus {
    /// The job has not been observed to finish.
    Pending,
    /// The job finished and its payload is held by the handle.
    Ready,
    /// The job finished without a payload.
    Failed,
}

impl fmt::Display for HandleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleStatus::Pending => write!(f, "pending"),
            HandleStatus::Ready => write!(f, "ready"),
            HandleStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Status together with the data that belongs to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleState {
    /// Not yet resolved.
    Pending,
    /// Resolved with a payload.
    Ready(Counts),
    /// Resolved with a platform diagnostic.
    Failed(String),
}

impl HandleState {
    /// The coarse status.
    pub fn status(&self) -> HandleStatus {
        match self {
            HandleState::Pending => HandleStatus::Pending,
            HandleState::Ready(_) => HandleStatus::Ready,
            HandleState::Failed(_) => HandleStatus::Failed,
        }
    }
}

/// Where and how a job was submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandleMetadata {
    /// Name of the platform that issued the identifier.
    pub platform: Option<String>,
    /// Shots requested at submission.
    pub shots: Option<u32>,
    /// QPU the job was routed to.
    pub qpu: Option<usize>,
    /// Submission time.
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Serializable snapshot of a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleRecord {
    /// Platform-issued job identifier.
    pub id: JobId,
    /// Status and its data.
    pub state: HandleState,
    /// Submission metadata.
    pub metadata: HandleMetadata,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
    identifier: String,
    status: HandleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Counts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shots: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    qpu: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    submitted_at: Option<DateTime<Utc>>,
}

impl HandleRecord {
    /// A pending record with no metadata.
    pub fn pending(id: impl Into<JobId>) -> Self {
        Self {
            id: id.into(),
            state: HandleState::Pending,
            metadata: HandleMetadata::default(),
        }
    }

    /// Replace the state.
    pub fn with_state(mut self, state: HandleState) -> Self {
        self.state = state;
        self
    }

    /// Replace the metadata.
    pub fn with_metadata(mut self, metadata: HandleMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// The coarse status.
    pub fn status(&self) -> HandleStatus {
        self.state.status()
    }

    /// Encode as pretty-printed JSON. The output is deterministic.
    pub fn encode(&self) -> HandleResult<String> {
        let (payload, error) = match &self.state {
            HandleState::Pending => (None, None),
            HandleState::Ready(counts) => (Some(counts.clone()), None),
            HandleState::Failed(msg) => (None, Some(msg.clone())),
        };
        let doc = Document {
            identifier: self.id.0.clone(),
            status: self.status(),
            payload,
            error,
            platform: self.metadata.platform.clone(),
            shots: self.metadata.shots,
            qpu: self.metadata.qpu,
            submitted_at: self.metadata.submitted_at,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Decode and validate text produced by [`encode`](Self::encode).
    ///
    /// Either the whole record is valid or an error is returned; there is
    /// no partial reconstruction.
    pub fn decode(text: &str) -> HandleResult<Self> {
        let doc: Document = serde_json::from_str(text)
            .map_err(|e| HandleError::MalformedHandle(e.to_string()))?;

        if doc.identifier.trim().is_empty() {
            return Err(malformed("identifier is empty"));
        }
        if doc.shots == Some(0) {
            return Err(malformed("shots must be at least 1"));
        }

        let state = match doc.status {
            HandleStatus::Pending => {
                if doc.payload.is_some() {
                    return Err(malformed("pending handle carries a payload"));
                }
                if doc.error.is_some() {
                    return Err(malformed("pending handle carries an error"));
                }
                HandleState::Pending
            }
            HandleStatus::Ready => {
                if doc.error.is_some() {
                    return Err(malformed("ready handle carries an error"));
                }
                let counts = doc
                    .payload
                    .ok_or_else(|| malformed("ready handle has no payload"))?;
                if counts.is_empty() {
                    return Err(malformed("ready handle has an empty payload"));
                }
                counts
                    .validate()
                    .map_err(|e| HandleError::MalformedHandle(format!("payload: {e}")))?;
                let total = counts
                    .checked_total()
                    .ok_or_else(|| malformed("payload counts overflow"))?;
                if let Some(shots) = doc.shots {
                    if total != u64::from(shots) {
                        return Err(HandleError::MalformedHandle(format!(
                            "payload counts sum to {total} but {shots} shots were requested"
                        )));
                    }
                }
                HandleState::Ready(counts)
            }
            HandleStatus::Failed => {
                if doc.payload.is_some() {
                    return Err(malformed("failed handle carries a payload"));
                }
                let msg = doc
                    .error
                    .ok_or_else(|| malformed("failed handle has no error message"))?;
                HandleState::Failed(msg)
            }
        };

        Ok(Self {
            id: JobId::new(doc.identifier),
            state,
            metadata: HandleMetadata {
                platform: doc.platform,
                shots: doc.shots,
                qpu: doc.qpu,
                submitted_at: doc.submitted_at,
            },
        })
    }
}

fn malformed(reason: &str) -> HandleError {
    HandleError::MalformedHandle(reason.to_string())
}
