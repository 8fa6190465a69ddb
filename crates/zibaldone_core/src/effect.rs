#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    UploadBatch {
        batch_id: crate::BatchId,
        intents: Vec<crate::UploadIntent>,
    },
    Refresh { request: crate::RefreshId },
    /// Blocking yes/no gate before a delete goes out.
    ConfirmDelete { id: crate::ItemId, filename: String },
    DeleteItem { id: crate::ItemId },
    /// Blocking notification the user has to see.
    Alert { message: String },
    StartSync,
    StopSync,
}
