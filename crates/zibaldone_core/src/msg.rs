#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The list view came up; load items and start synchronizing.
    Mounted,
    /// The list view is going away; stop synchronizing, ignore late results.
    Unmounted,
    /// User dropped a batch of files.
    FilesDropped(Vec<crate::UploadIntent>),
    /// Engine finished one file of a batch.
    UploadFinished {
        batch_id: crate::BatchId,
        filename: String,
        outcome: crate::UploadOutcome,
    },
    /// Engine attempted every file of a batch.
    BatchFinished { batch_id: crate::BatchId },
    /// Timer, push notification or user asked for a fresh list.
    RefreshRequested,
    /// Engine fetched the item list.
    ItemsRefreshed {
        request: crate::RefreshId,
        items: Vec<crate::Item>,
    },
    /// Engine failed to fetch the item list.
    RefreshFailed {
        request: crate::RefreshId,
        cause: String,
    },
    /// User clicked delete on an item.
    DeleteRequested { id: crate::ItemId },
    /// User answered yes at the confirmation gate.
    DeleteConfirmed { id: crate::ItemId },
    /// User answered no at the confirmation gate.
    DeleteCancelled { id: crate::ItemId },
    /// Engine finished a delete call.
    DeleteFinished {
        id: crate::ItemId,
        result: Result<(), String>,
    },
    /// User acknowledged the current alert.
    AlertDismissed,
}
