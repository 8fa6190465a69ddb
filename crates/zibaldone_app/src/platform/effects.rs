use std::sync::{mpsc, Arc};

use engine_logging::{engine_debug, engine_info, engine_warn};
use zibaldone_core::{Effect, Item, Msg, UploadOutcome};
use zibaldone_engine::{
    ClientSettings, EngineError, EngineEvent, EngineHandle, EventSink, RemoteItem, SyncSettings,
    SyncStatus,
};

use super::intents;
use super::ui::prompt::Prompter;

/// Turns core effects into engine commands and prompts.
pub struct EffectRunner {
    engine: EngineHandle,
    msg_tx: mpsc::Sender<Msg>,
    /// `None` for one-shot commands: `StartSync` is then a no-op.
    sync: Option<SyncSettings>,
    prompter: Box<dyn Prompter>,
}

impl EffectRunner {
    pub fn new(
        settings: ClientSettings,
        sync: Option<SyncSettings>,
        prompter: Box<dyn Prompter>,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Result<Self, EngineError> {
        let engine = EngineHandle::new(settings, Arc::new(MsgSink::new(msg_tx.clone())))?;
        Ok(Self {
            engine,
            msg_tx,
            sync,
            prompter,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::UploadBatch { batch_id, intents } => {
                    engine_info!("UploadBatch batch_id={} files={}", batch_id, intents.len());
                    let files = intents.into_iter().map(intents::upload_file).collect();
                    self.engine.upload_batch(batch_id, files);
                }
                Effect::Refresh { request } => {
                    engine_debug!("Refresh request={}", request);
                    self.engine.refresh(request);
                }
                Effect::ConfirmDelete { id, filename } => {
                    let msg = if self.prompter.confirm_delete(&filename) {
                        Msg::DeleteConfirmed { id }
                    } else {
                        Msg::DeleteCancelled { id }
                    };
                    let _ = self.msg_tx.send(msg);
                }
                Effect::DeleteItem { id } => {
                    engine_info!("DeleteItem id={}", id);
                    self.engine.delete(id);
                }
                Effect::Alert { message } => {
                    self.prompter.alert(&message);
                    let _ = self.msg_tx.send(Msg::AlertDismissed);
                }
                Effect::StartSync => match &self.sync {
                    Some(settings) => self.engine.start_sync(settings.clone()),
                    None => engine_debug!("No refresh trigger for this command"),
                },
                Effect::StopSync => self.engine.stop_sync(),
            }
        }
    }
}

/// Feeds engine results back into the app's message queue.
struct MsgSink {
    msg_tx: mpsc::Sender<Msg>,
}

impl MsgSink {
    fn new(msg_tx: mpsc::Sender<Msg>) -> Self {
        Self { msg_tx }
    }
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        if let Some(msg) = event_to_msg(event) {
            let _ = self.msg_tx.send(msg);
        }
    }
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::UploadCompleted {
            batch_id,
            filename,
            result,
        } => Msg::UploadFinished {
            batch_id,
            filename,
            outcome: match result {
                Ok(item) => UploadOutcome::Uploaded { item_id: item.id },
                Err(err) => UploadOutcome::Failed {
                    cause: format!("{} ({})", err.kind, err.message),
                },
            },
        },
        EngineEvent::BatchCompleted(report) => Msg::BatchFinished {
            batch_id: report.batch_id,
        },
        EngineEvent::ItemsFetched { request, result } => match result {
            Ok(items) => Msg::ItemsRefreshed {
                request,
                items: items.iter().map(to_item).collect(),
            },
            Err(err) => Msg::RefreshFailed {
                request,
                cause: err.to_string(),
            },
        },
        EngineEvent::DeleteCompleted { id, result } => Msg::DeleteFinished {
            id,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::RefreshDue { source } => {
            engine_debug!("Refresh due ({:?})", source);
            Msg::RefreshRequested
        }
        EngineEvent::SyncStatus(status) => {
            log_sync_status(&status);
            return None;
        }
    };
    Some(msg)
}

fn log_sync_status(status: &SyncStatus) {
    match status {
        SyncStatus::FellBackToPolling { interval } => {
            engine_warn!("Live updates unavailable, polling every {:?}", interval)
        }
        SyncStatus::Reconnecting { attempt, delay } => {
            engine_debug!("Reconnecting to live updates (attempt {}, in {:?})", attempt, delay)
        }
        _ => {}
    }
}

fn to_item(remote: &RemoteItem) -> Item {
    Item::from_wire(
        remote.id.clone(),
        &remote.status,
        remote.original_filename.clone(),
        remote.storage_path.clone(),
        &remote.created_at,
        remote.metadata_json.as_deref(),
    )
}
