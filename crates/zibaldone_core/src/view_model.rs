use chrono::{DateTime, Utc};

use crate::{Item, ItemId, ItemStatus, Lifecycle};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub lifecycle: Lifecycle,
    pub items: Vec<ItemRowView>,
    /// Files dropped but not attempted yet, across all open batches.
    pub uploads_in_flight: usize,
    pub upload_error: Option<String>,
    pub alert: Option<String>,
    pub pending_deletes: usize,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRowView {
    pub id: ItemId,
    pub filename: String,
    pub status: ItemStatus,
    pub size: String,
    pub kind: String,
    pub created_at: Option<DateTime<Utc>>,
    pub metadata: String,
}

impl ItemRowView {
    pub(crate) fn from_item(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            filename: item.original_filename.clone(),
            status: item.status.clone(),
            size: item.metadata.size_label(),
            kind: item.metadata.type_label(),
            created_at: item.created_at,
            metadata: item.metadata.summary(),
        }
    }
}
