use crate::{AppState, Effect, Msg, UploadNotice};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    // Results that land after teardown are dropped without touching state.
    if state.is_torn_down() && is_engine_result(&msg) {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::Mounted => {
            if state.mount() {
                vec![
                    Effect::Refresh {
                        request: state.next_refresh(),
                    },
                    Effect::StartSync,
                ]
            } else {
                Vec::new()
            }
        }
        Msg::Unmounted => {
            if state.tear_down() {
                vec![Effect::StopSync]
            } else {
                Vec::new()
            }
        }
        Msg::FilesDropped(intents) => {
            if intents.is_empty() || state.is_torn_down() {
                return (state, Vec::new());
            }
            let batch_id = state.open_batch(&intents);
            vec![Effect::UploadBatch { batch_id, intents }]
        }
        Msg::UploadFinished {
            batch_id,
            filename,
            outcome,
        } => match state.record_upload(batch_id, filename, outcome) {
            Some(message) if state.upload_notice() == UploadNotice::Alert => {
                state.raise_alert(&message);
                vec![Effect::Alert { message }]
            }
            _ => Vec::new(),
        },
        Msg::BatchFinished { batch_id } => {
            // Exactly one refresh per batch, whatever the per-file outcomes were.
            if state.close_batch(batch_id).is_some() {
                vec![Effect::Refresh {
                    request: state.next_refresh(),
                }]
            } else {
                Vec::new()
            }
        }
        Msg::RefreshRequested => {
            if state.is_torn_down() {
                Vec::new()
            } else {
                vec![Effect::Refresh {
                    request: state.next_refresh(),
                }]
            }
        }
        Msg::ItemsRefreshed { request, items } => {
            state.apply_refresh(request, items);
            Vec::new()
        }
        Msg::RefreshFailed { request, cause } => {
            state.refresh_failed(request, &cause);
            Vec::new()
        }
        Msg::DeleteRequested { id } => {
            if state.is_torn_down() {
                return (state, Vec::new());
            }
            match state.request_delete(&id) {
                Some(filename) => vec![Effect::ConfirmDelete { id, filename }],
                None => Vec::new(),
            }
        }
        Msg::DeleteConfirmed { id } => {
            if state.confirm_delete(&id) {
                vec![Effect::DeleteItem { id }]
            } else {
                Vec::new()
            }
        }
        Msg::DeleteCancelled { id } => {
            state.cancel_delete(&id);
            Vec::new()
        }
        Msg::DeleteFinished { id, result } => match state.finish_delete(&id, result) {
            Some(message) => vec![Effect::Alert { message }],
            None => Vec::new(),
        },
        Msg::AlertDismissed => {
            state.dismiss_alert();
            Vec::new()
        }
    };

    (state, effects)
}

fn is_engine_result(msg: &Msg) -> bool {
    matches!(
        msg,
        Msg::UploadFinished { .. }
            | Msg::BatchFinished { .. }
            | Msg::ItemsRefreshed { .. }
            | Msg::RefreshFailed { .. }
            | Msg::DeleteFinished { .. }
    )
}
