use std::path::PathBuf;

use crate::{ItemId, Metadata};

pub type BatchId = u64;

/// A file the user dropped, before the backend has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadIntent {
    pub filename: String,
    pub path: PathBuf,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { item_id: ItemId },
    Failed { cause: String },
}

/// How loudly per-file upload failures are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadNotice {
    /// Inline message only.
    #[default]
    Inline,
    /// Inline message plus a blocking alert per failed file.
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    pub filename: String,
    pub cause: String,
}

/// Progress of one dropped batch while its files are being attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<UploadFailure>,
}

impl BatchProgress {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: 0,
            failures: Vec::new(),
        }
    }

    pub fn attempted(&self) -> usize {
        self.succeeded + self.failures.len()
    }
}

pub(crate) fn upload_failure_message(filename: &str) -> String {
    format!("Failed to upload {filename}. Please try again.")
}
