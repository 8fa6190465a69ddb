use zibaldone_core::{update, AppState, DeleteStage, Effect, Item, Msg};

fn seeded() -> AppState {
    let items = vec![
        Item::from_wire(
            "a",
            "tagged",
            "notes.md",
            "blob/a",
            "2024-01-02T00:00:00",
            None,
        ),
        Item::from_wire(
            "b",
            "indexed",
            "paper.pdf",
            "blob/b",
            "2024-01-01T00:00:00",
            Some("{\"size\":1024}"),
        ),
    ];
    update(AppState::new(), Msg::ItemsRefreshed { request: 1, items }).0
}

fn request(state: AppState, id: &str) -> (AppState, Vec<Effect>) {
    update(state, Msg::DeleteRequested { id: id.to_string() })
}

#[test]
fn delete_goes_through_confirmation_gate() {
    let (state, effects) = request(seeded(), "b");
    assert_eq!(
        effects,
        vec![Effect::ConfirmDelete {
            id: "b".to_string(),
            filename: "paper.pdf".to_string(),
        }]
    );
    assert_eq!(state.delete_stage("b"), Some(DeleteStage::AwaitingConfirmation));
    assert_eq!(state.items().len(), 2);

    let (state, effects) = update(state, Msg::DeleteConfirmed { id: "b".to_string() });
    assert_eq!(effects, vec![Effect::DeleteItem { id: "b".to_string() }]);
    assert_eq!(state.delete_stage("b"), Some(DeleteStage::InFlight));
}

#[test]
fn confirmed_delete_removes_item_without_refresh() {
    let (state, _) = request(seeded(), "a");
    let (state, _) = update(state, Msg::DeleteConfirmed { id: "a".to_string() });

    let (state, effects) = update(
        state,
        Msg::DeleteFinished {
            id: "a".to_string(),
            result: Ok(()),
        },
    );

    assert!(effects.is_empty());
    assert!(!state.items().contains("a"));
    assert_eq!(state.items().len(), 1);
    assert_eq!(state.delete_stage("a"), None);
}

#[test]
fn failed_delete_keeps_list_and_alerts() {
    let before = seeded();
    let (state, _) = request(before.clone(), "a");
    let (state, _) = update(state, Msg::DeleteConfirmed { id: "a".to_string() });

    let (state, effects) = update(
        state,
        Msg::DeleteFinished {
            id: "a".to_string(),
            result: Err("http status 500".to_string()),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Alert {
            message: "Failed to delete item".to_string()
        }]
    );
    assert_eq!(state.items(), before.items());
    assert_eq!(state.alert(), Some("Failed to delete item"));
    assert_eq!(state.view().pending_deletes, 0);
}

#[test]
fn cancelled_delete_sends_nothing() {
    let (state, _) = request(seeded(), "a");
    let (state, effects) = update(state, Msg::DeleteCancelled { id: "a".to_string() });
    assert!(effects.is_empty());
    assert_eq!(state.delete_stage("a"), None);

    // Confirming after a cancel is too late.
    let (state, effects) = update(state, Msg::DeleteConfirmed { id: "a".to_string() });
    assert!(effects.is_empty());
    assert_eq!(state.items().len(), 2);
}

#[test]
fn unknown_id_is_a_noop() {
    let before = seeded();
    let (state, effects) = request(before.clone(), "missing");
    assert!(effects.is_empty());
    assert_eq!(state, before);

    let (state, effects) = update(
        state,
        Msg::DeleteFinished {
            id: "missing".to_string(),
            result: Ok(()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.items(), before.items());
}

#[test]
fn duplicate_delete_request_is_ignored_while_pending() {
    let (state, _) = request(seeded(), "a");
    let (state, effects) = request(state, "a");
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::DeleteConfirmed { id: "a".to_string() });
    let (_state, effects) = request(state, "a");
    assert!(effects.is_empty());
}

#[test]
fn delete_result_before_confirmation_is_ignored() {
    let (state, _) = request(seeded(), "a");
    let (state, _) = update(
        state,
        Msg::DeleteFinished {
            id: "a".to_string(),
            result: Ok(()),
        },
    );

    assert!(state.items().contains("a"));
    assert_eq!(state.delete_stage("a"), Some(DeleteStage::AwaitingConfirmation));
}

fn listed(ids: &[&str]) -> Vec<Item> {
    ids.iter()
        .map(|id| {
            Item::from_wire(
                *id,
                "tagged",
                format!("{id}.md"),
                format!("blob/{id}"),
                "2024-01-01T00:00:00",
                None,
            )
        })
        .collect()
}

fn ids(state: &AppState) -> Vec<String> {
    state.items().iter().map(|item| item.id.clone()).collect()
}

#[test]
fn refresh_issued_before_delete_does_not_resurrect_item() {
    let (state, _) = update(AppState::new(), Msg::Mounted);
    let (state, _) = update(
        state,
        Msg::ItemsRefreshed {
            request: 1,
            items: listed(&["a", "b"]),
        },
    );
    let (state, effects) = update(state, Msg::RefreshRequested);
    assert_eq!(effects, vec![Effect::Refresh { request: 2 }]);

    let (state, _) = request(state, "a");
    let (state, _) = update(state, Msg::DeleteConfirmed { id: "a".to_string() });
    let (state, _) = update(
        state,
        Msg::DeleteFinished {
            id: "a".to_string(),
            result: Ok(()),
        },
    );
    assert_eq!(ids(&state), vec!["b".to_string()]);

    // Answer to the refresh issued before the delete settled.
    let (state, _) = update(
        state,
        Msg::ItemsRefreshed {
            request: 2,
            items: listed(&["a", "b"]),
        },
    );
    assert_eq!(ids(&state), vec!["b".to_string()]);

    // A refresh issued afterwards is authoritative again.
    let (state, effects) = update(state, Msg::RefreshRequested);
    assert_eq!(effects, vec![Effect::Refresh { request: 3 }]);
    let (state, _) = update(
        state,
        Msg::ItemsRefreshed {
            request: 3,
            items: listed(&["a", "b"]),
        },
    );
    assert_eq!(ids(&state), vec!["a".to_string(), "b".to_string()]);
}
