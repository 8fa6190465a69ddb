use std::sync::Arc;

use bytes::Bytes;
use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::{
    ApiError, ArchiveApi, BatchId, BatchReport, EngineEvent, EventSink, FailureKind, RemoteItem,
    UploadBody, UploadError, UploadFile, UploadStrategy,
};

/// Drives one file at a time through the direct or proxied upload path.
#[derive(Clone)]
pub struct Uploader {
    api: Arc<dyn ArchiveApi>,
}

impl Uploader {
    pub fn new(api: Arc<dyn ArchiveApi>) -> Self {
        Self { api }
    }

    /// Upload a single file. Errors always carry the original filename.
    pub async fn upload(&self, file: &UploadFile) -> Result<RemoteItem, UploadError> {
        self.upload_inner(file)
            .await
            .map_err(|err| UploadError::from_api(&file.filename, err))
    }

    /// Attempt every file in order, each awaited before the next starts.
    ///
    /// Emits one `UploadCompleted` per file and then exactly one
    /// `BatchCompleted`, regardless of how many files failed.
    pub async fn upload_batch(
        &self,
        batch_id: BatchId,
        files: &[UploadFile],
        sink: &dyn EventSink,
    ) -> BatchReport {
        let mut failed = 0;
        for file in files {
            let result = self.upload(file).await;
            match &result {
                Ok(item) => engine_info!(
                    "Batch {}: uploaded {} as {}",
                    batch_id,
                    file.filename,
                    item.id
                ),
                Err(err) => {
                    failed += 1;
                    engine_warn!("Batch {}: {}", batch_id, err);
                }
            }
            sink.emit(EngineEvent::UploadCompleted {
                batch_id,
                filename: file.filename.clone(),
                result,
            });
        }

        let report = BatchReport {
            batch_id,
            attempted: files.len(),
            failed,
        };
        sink.emit(EngineEvent::BatchCompleted(report));
        report
    }

    async fn upload_inner(&self, file: &UploadFile) -> Result<RemoteItem, ApiError> {
        let strategy = self.api.upload_params(&file.filename).await?.into_strategy()?;
        let bytes = read_body(&file.body).await?;
        let metadata_json = file.metadata.to_string();
        engine_debug!(
            "Uploading {} ({} bytes) via {:?}",
            file.filename,
            bytes.len(),
            strategy
        );

        match strategy {
            UploadStrategy::Direct {
                upload_url,
                storage_path,
            } => {
                self.api
                    .put_object(&upload_url, &file.content_type, bytes)
                    .await?;
                // Finalize is the point of truth; a failure here orphans the object.
                self.api
                    .finalize(&file.filename, &storage_path, &metadata_json)
                    .await
            }
            UploadStrategy::Proxied => {
                self.api
                    .upload_proxied(&file.filename, &file.content_type, bytes, &metadata_json)
                    .await
            }
        }
    }
}

async fn read_body(body: &UploadBody) -> Result<Bytes, ApiError> {
    match body {
        UploadBody::Memory(bytes) => Ok(bytes.clone()),
        UploadBody::File(path) => tokio::fs::read(path)
            .await
            .map(Bytes::from)
            .map_err(|err| ApiError::new(FailureKind::Io, format!("{}: {err}", path.display()))),
    }
}
