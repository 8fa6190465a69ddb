use std::path::PathBuf;
use std::sync::Once;

use pretty_assertions::assert_eq;
use zibaldone_core::{
    update, AppState, Effect, Metadata, Msg, UploadIntent, UploadNotice, UploadOutcome,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn intent(name: &str) -> UploadIntent {
    UploadIntent {
        filename: name.to_string(),
        path: PathBuf::from(format!("/tmp/{name}")),
        metadata: Metadata::new().with("size", 3),
    }
}

fn refresh_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::Refresh { .. }))
        .count()
}

#[test]
fn drop_opens_batch_and_emits_upload_effect() {
    init_logging();
    let intents = vec![intent("a.txt"), intent("b.txt")];

    let (mut state, effects) = update(AppState::new(), Msg::FilesDropped(intents.clone()));

    assert_eq!(
        effects,
        vec![Effect::UploadBatch {
            batch_id: 1,
            intents,
        }]
    );
    assert_eq!(state.view().uploads_in_flight, 2);
    assert!(state.has_open_batches());
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn batch_ids_are_monotonic() {
    init_logging();
    let (state, first) = update(AppState::new(), Msg::FilesDropped(vec![intent("a")]));
    let (_state, second) = update(state, Msg::FilesDropped(vec![intent("b")]));

    assert!(matches!(first[0], Effect::UploadBatch { batch_id: 1, .. }));
    assert!(matches!(second[0], Effect::UploadBatch { batch_id: 2, .. }));
}

#[test]
fn partial_failure_reports_file_and_refreshes_once_after_batch() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::FilesDropped(vec![intent("first.pdf"), intent("second.pdf")]),
    );

    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            batch_id: 1,
            filename: "first.pdf".to_string(),
            outcome: UploadOutcome::Uploaded {
                item_id: "item-1".to_string(),
            },
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().uploads_in_flight, 1);

    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            batch_id: 1,
            filename: "second.pdf".to_string(),
            outcome: UploadOutcome::Failed {
                cause: "timeout".to_string(),
            },
        },
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.upload_error(),
        Some("Failed to upload second.pdf. Please try again.")
    );
    let batch = state.batch(1).unwrap();
    assert_eq!(batch.attempted(), 2);
    assert_eq!(batch.succeeded, 1);
    assert_eq!(batch.failures[0].filename, "second.pdf");
    assert_eq!(batch.failures[0].cause, "timeout");

    // No refresh until the whole batch has been attempted.
    let (state, effects) = update(state, Msg::BatchFinished { batch_id: 1 });
    assert_eq!(effects, vec![Effect::Refresh { request: 1 }]);
    assert!(!state.has_open_batches());

    // A repeated completion must not trigger a second refresh.
    let (_state, effects) = update(state, Msg::BatchFinished { batch_id: 1 });
    assert_eq!(refresh_count(&effects), 0);
}

#[test]
fn every_file_failing_still_refreshes() {
    init_logging();
    let (mut state, _) = update(
        AppState::new(),
        Msg::FilesDropped(vec![intent("a"), intent("b"), intent("c")]),
    );
    for name in ["a", "b", "c"] {
        let (next, effects) = update(
            state,
            Msg::UploadFinished {
                batch_id: 1,
                filename: name.to_string(),
                outcome: UploadOutcome::Failed {
                    cause: "http status 500".to_string(),
                },
            },
        );
        assert!(effects.is_empty());
        state = next;
    }
    assert_eq!(state.upload_error(), Some("Failed to upload c. Please try again."));

    let (_state, effects) = update(state, Msg::BatchFinished { batch_id: 1 });
    assert_eq!(refresh_count(&effects), 1);
}

#[test]
fn alert_notice_raises_blocking_alert_per_failure() {
    init_logging();
    let state = AppState::new().with_upload_notice(UploadNotice::Alert);
    let (state, _) = update(state, Msg::FilesDropped(vec![intent("x.bin")]));

    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            batch_id: 1,
            filename: "x.bin".to_string(),
            outcome: UploadOutcome::Failed {
                cause: "network error".to_string(),
            },
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Alert {
            message: "Failed to upload x.bin. Please try again.".to_string()
        }]
    );
    assert_eq!(state.alert(), Some("Failed to upload x.bin. Please try again."));

    let (state, effects) = update(state, Msg::AlertDismissed);
    assert!(effects.is_empty());
    assert_eq!(state.alert(), None);
}

#[test]
fn new_drop_clears_previous_upload_error() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FilesDropped(vec![intent("a")]));
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            batch_id: 1,
            filename: "a".to_string(),
            outcome: UploadOutcome::Failed {
                cause: "boom".to_string(),
            },
        },
    );
    assert!(state.upload_error().is_some());

    let (state, _) = update(state, Msg::FilesDropped(vec![intent("b")]));
    assert_eq!(state.upload_error(), None);
}

#[test]
fn results_for_unknown_batch_are_ignored() {
    init_logging();
    let state = AppState::new();
    let (next, effects) = update(
        state.clone(),
        Msg::UploadFinished {
            batch_id: 42,
            filename: "ghost".to_string(),
            outcome: UploadOutcome::Failed {
                cause: "late".to_string(),
            },
        },
    );

    assert!(effects.is_empty());
    assert_eq!(next, state);
}

#[test]
fn extra_results_for_a_settled_batch_are_ignored() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FilesDropped(vec![intent("a")]));
    let failed = Msg::UploadFinished {
        batch_id: 1,
        filename: "a".to_string(),
        outcome: UploadOutcome::Failed {
            cause: "timeout".to_string(),
        },
    };

    let (state, _) = update(state, failed.clone());
    let (state, effects) = update(state, failed);

    assert!(effects.is_empty());
    assert_eq!(state.view().uploads_in_flight, 0);
    let batch = state.batch(1).unwrap();
    assert_eq!(batch.attempted(), 1);
    assert_eq!(batch.failures.len(), 1);
}
