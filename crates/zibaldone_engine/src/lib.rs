//! Zibaldone engine: backend API client, upload orchestration, list refresh
//! and sync triggers, run on a background runtime.
mod api;
mod engine;
mod persist;
mod settings;
mod sink;
mod sse;
mod sync;
mod types;
mod uploader;

pub use api::{ArchiveApi, ByteStream, EventFeed, ReqwestArchiveApi};
pub use engine::{EngineError, EngineHandle};
pub use persist::{ensure_state_dir, AtomicFileWriter, PersistError};
pub use settings::{ClientSettings, ReconnectPolicy, SyncMode, SyncSettings, DEFAULT_BASE_URL};
pub use sink::{ChannelSink, EventSink};
pub use sse::{parse_notification, Notification, SseDecoder, SseEvent};
pub use sync::{run_polling, run_push, run_triggers, Synchronizer};
pub use types::{
    ApiError, BatchId, BatchReport, DeleteError, EngineEvent, FailureKind, RefreshError,
    RemoteItem, RequestId, SyncStatus, TriggerSource, UploadBody, UploadError, UploadFile,
    UploadParams, UploadStrategy,
};
pub use uploader::Uploader;
