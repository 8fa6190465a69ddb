use zibaldone_core::{update, AppState, Lifecycle, Msg};

#[test]
fn dismissing_without_an_alert_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::AlertDismissed);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn empty_drop_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::FilesDropped(Vec::new()));

    assert_eq!(state, next);
    assert!(effects.is_empty());
    assert_eq!(next.lifecycle(), Lifecycle::Idle);
}
