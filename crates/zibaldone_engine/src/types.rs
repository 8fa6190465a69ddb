use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type BatchId = u64;
pub type RequestId = u64;

/// Item record exactly as `GET /items` and the upload endpoints return it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: String,
    pub status: String,
    pub original_filename: String,
    pub storage_path: String,
    pub created_at: String,
    /// Serialized JSON object; may be absent, null or malformed.
    #[serde(default)]
    pub metadata_json: Option<String>,
}

/// Answer of `GET /upload/params`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadParams {
    pub mode: String,
    #[serde(default)]
    pub upload_url: Option<String>,
    #[serde(default)]
    pub storage_path: Option<String>,
}

impl UploadParams {
    /// Resolve the declared mode into a strategy, once per file.
    pub fn into_strategy(self) -> Result<UploadStrategy, ApiError> {
        if !self.mode.eq_ignore_ascii_case("s3") {
            return Ok(UploadStrategy::Proxied);
        }
        match (self.upload_url, self.storage_path) {
            (Some(upload_url), Some(storage_path))
                if !upload_url.is_empty() && !storage_path.is_empty() =>
            {
                Ok(UploadStrategy::Direct {
                    upload_url,
                    storage_path,
                })
            }
            _ => Err(ApiError::new(
                FailureKind::InvalidResponse,
                "direct upload parameters lack upload_url or storage_path",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStrategy {
    /// Write bytes straight to object storage, then finalize.
    Direct {
        upload_url: String,
        storage_path: String,
    },
    /// Send bytes and metadata to the backend in one request.
    Proxied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadBody {
    File(PathBuf),
    Memory(Bytes),
}

/// One file handed to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub body: UploadBody,
    /// JSON object sent as the `metadata` form field.
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub batch_id: BatchId,
    pub attempted: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Poll,
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Polling { interval: Duration },
    Connected,
    Reconnecting { attempt: u32, delay: Duration },
    FellBackToPolling { interval: Duration },
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    UploadCompleted {
        batch_id: BatchId,
        filename: String,
        result: Result<RemoteItem, UploadError>,
    },
    BatchCompleted(BatchReport),
    ItemsFetched {
        request: RequestId,
        result: Result<Vec<RemoteItem>, RefreshError>,
    },
    DeleteCompleted {
        id: String,
        result: Result<(), DeleteError>,
    },
    RefreshDue {
        source: TriggerSource,
    },
    SyncStatus(SyncStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Timeout,
    Network,
    HttpStatus(u16),
    InvalidResponse,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to upload {filename}: {kind} ({message})")]
pub struct UploadError {
    pub filename: String,
    pub kind: FailureKind,
    pub message: String,
}

impl UploadError {
    pub(crate) fn from_api(filename: &str, err: ApiError) -> Self {
        Self {
            filename: filename.to_string(),
            kind: err.kind,
            message: err.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to delete {id}: {kind} ({message})")]
pub struct DeleteError {
    pub id: String,
    pub kind: FailureKind,
    pub message: String,
}

impl DeleteError {
    pub(crate) fn from_api(id: &str, err: ApiError) -> Self {
        Self {
            id: id.to_string(),
            kind: err.kind,
            message: err.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to refresh items: {kind} ({message})")]
pub struct RefreshError {
    pub kind: FailureKind,
    pub message: String,
}

impl From<ApiError> for RefreshError {
    fn from(err: ApiError) -> Self {
        Self {
            kind: err.kind,
            message: err.message,
        }
    }
}
