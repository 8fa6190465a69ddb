use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use engine_logging::{engine_debug, engine_info, engine_warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::sync::run_triggers;
use crate::{
    ApiError, ArchiveApi, BatchId, ClientSettings, DeleteError, EngineEvent, EventFeed, EventSink,
    ReqwestArchiveApi, RequestId, Synchronizer, SyncSettings, UploadFile, Uploader,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] ApiError),
}

enum EngineCommand {
    UploadBatch {
        batch_id: BatchId,
        files: Vec<UploadFile>,
    },
    Refresh {
        request: RequestId,
    },
    Delete {
        id: String,
    },
    StartSync(SyncSettings),
    StopSync,
}

/// Handle to the engine thread. Commands are fire-and-forget; every result
/// comes back through the `EventSink` given at construction.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

#[derive(Clone)]
struct Workers {
    uploader: Uploader,
    synchronizer: Synchronizer,
    api: Arc<dyn ArchiveApi>,
    sink: Arc<dyn EventSink>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let api = Arc::new(ReqwestArchiveApi::new(settings)?);
        Self::with_backend(api.clone(), api, sink)
    }

    /// Build on an arbitrary backend, e.g. a stub in tests.
    pub fn with_backend(
        api: Arc<dyn ArchiveApi>,
        feed: Arc<dyn EventFeed>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("zibaldone-engine")
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let workers = Workers {
            uploader: Uploader::new(api.clone()),
            synchronizer: Synchronizer::new(api.clone()),
            api,
            sink,
        };

        thread::spawn(move || {
            let mut sync: Option<CancellationToken> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::StartSync(settings) => {
                        if let Some(previous) = sync.take() {
                            previous.cancel();
                        }
                        let token = CancellationToken::new();
                        runtime.spawn(run_triggers(
                            settings,
                            feed.clone(),
                            token.clone(),
                            workers.sink.clone(),
                        ));
                        sync = Some(token);
                    }
                    EngineCommand::StopSync => {
                        if let Some(token) = sync.take() {
                            token.cancel();
                        }
                    }
                    command => {
                        let workers = workers.clone();
                        runtime.spawn(async move {
                            handle_command(&workers, command).await;
                        });
                    }
                }
            }
            if let Some(token) = sync.take() {
                token.cancel();
            }
            engine_debug!("Engine command channel closed");
        });

        Ok(Self { cmd_tx })
    }

    pub fn upload_batch(&self, batch_id: BatchId, files: Vec<UploadFile>) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::UploadBatch { batch_id, files });
    }

    pub fn refresh(&self, request: RequestId) {
        let _ = self.cmd_tx.send(EngineCommand::Refresh { request });
    }

    pub fn delete(&self, id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Delete { id: id.into() });
    }

    pub fn start_sync(&self, settings: SyncSettings) {
        let _ = self.cmd_tx.send(EngineCommand::StartSync(settings));
    }

    pub fn stop_sync(&self) {
        let _ = self.cmd_tx.send(EngineCommand::StopSync);
    }
}

async fn handle_command(workers: &Workers, command: EngineCommand) {
    match command {
        EngineCommand::UploadBatch { batch_id, files } => {
            let report = workers
                .uploader
                .upload_batch(batch_id, &files, workers.sink.as_ref())
                .await;
            engine_info!(
                "Batch {} done: {} attempted, {} failed",
                report.batch_id,
                report.attempted,
                report.failed
            );
        }
        EngineCommand::Refresh { request } => {
            workers
                .synchronizer
                .refresh_into(request, workers.sink.as_ref())
                .await;
        }
        EngineCommand::Delete { id } => {
            let result = workers
                .api
                .delete_item(&id)
                .await
                .map_err(|err| DeleteError::from_api(&id, err));
            if let Err(err) = &result {
                engine_warn!("{}", err);
            }
            workers
                .sink
                .emit(EngineEvent::DeleteCompleted { id, result });
        }
        EngineCommand::StartSync(_) | EngineCommand::StopSync => {}
    }
}
