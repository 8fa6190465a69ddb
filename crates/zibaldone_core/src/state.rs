use std::collections::BTreeMap;

use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::upload::upload_failure_message;
use crate::view_model::{AppViewModel, ItemRowView};
use crate::{
    BatchId, BatchProgress, Item, ItemId, ItemList, UploadFailure, UploadIntent, UploadNotice,
    UploadOutcome,
};

pub type RefreshId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Not mounted yet; one-shot commands run here.
    #[default]
    Idle,
    Mounted,
    /// Torn down; late engine results are dropped.
    TornDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStage {
    AwaitingConfirmation,
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    lifecycle: Lifecycle,
    items: ItemList,
    batches: BTreeMap<BatchId, BatchProgress>,
    next_batch_id: BatchId,
    last_issued_refresh: RefreshId,
    last_applied_refresh: RefreshId,
    refreshes_completed: u64,
    deletes: BTreeMap<ItemId, DeleteStage>,
    /// Deleted ids with the newest refresh issued before the delete settled.
    tombstones: BTreeMap<ItemId, RefreshId>,
    upload_notice: UploadNotice,
    upload_error: Option<String>,
    alert: Option<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            lifecycle: Lifecycle::Idle,
            items: ItemList::new(),
            batches: BTreeMap::new(),
            next_batch_id: 1,
            last_issued_refresh: 0,
            last_applied_refresh: 0,
            refreshes_completed: 0,
            deletes: BTreeMap::new(),
            tombstones: BTreeMap::new(),
            upload_notice: UploadNotice::Inline,
            upload_error: None,
            alert: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload_notice(mut self, notice: UploadNotice) -> Self {
        self.upload_notice = notice;
        self
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            lifecycle: self.lifecycle,
            items: self.items.iter().map(ItemRowView::from_item).collect(),
            uploads_in_flight: self
                .batches
                .values()
                .map(|batch| batch.total.saturating_sub(batch.attempted()))
                .sum(),
            upload_error: self.upload_error.clone(),
            alert: self.alert.clone(),
            pending_deletes: self.deletes.len(),
            dirty: self.dirty,
        }
    }

    /// Ordered item list; newest first.
    pub fn items(&self) -> &ItemList {
        &self.items
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn batch(&self, batch_id: BatchId) -> Option<&BatchProgress> {
        self.batches.get(&batch_id)
    }

    pub fn has_open_batches(&self) -> bool {
        !self.batches.is_empty()
    }

    /// True while a refresh has been issued whose answer has not arrived.
    pub fn refresh_pending(&self) -> bool {
        self.last_issued_refresh > self.last_applied_refresh
    }

    /// Number of refresh responses (success or failure) accepted so far.
    pub fn refreshes_completed(&self) -> u64 {
        self.refreshes_completed
    }

    pub fn delete_stage(&self, id: &str) -> Option<DeleteStage> {
        self.deletes.get(id).copied()
    }

    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Returns whether the view changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_torn_down(&self) -> bool {
        self.lifecycle == Lifecycle::TornDown
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mount(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Idle {
            return false;
        }
        self.lifecycle = Lifecycle::Mounted;
        self.mark_dirty();
        true
    }

    /// Returns whether synchronization was running and has to be stopped.
    pub(crate) fn tear_down(&mut self) -> bool {
        let was_mounted = self.lifecycle == Lifecycle::Mounted;
        if self.lifecycle != Lifecycle::TornDown {
            self.lifecycle = Lifecycle::TornDown;
            self.mark_dirty();
        }
        was_mounted
    }

    pub(crate) fn next_refresh(&mut self) -> RefreshId {
        self.last_issued_refresh = self.last_issued_refresh.max(self.last_applied_refresh) + 1;
        self.last_issued_refresh
    }

    pub(crate) fn open_batch(&mut self, intents: &[UploadIntent]) -> BatchId {
        let batch_id = self.next_batch_id;
        self.next_batch_id += 1;
        self.batches
            .insert(batch_id, BatchProgress::new(intents.len()));
        self.upload_error = None;
        self.mark_dirty();
        engine_info!("Batch {} opened with {} file(s)", batch_id, intents.len());
        batch_id
    }

    /// Records one file's outcome; returns the failure message when it failed.
    pub(crate) fn record_upload(
        &mut self,
        batch_id: BatchId,
        filename: String,
        outcome: UploadOutcome,
    ) -> Option<String> {
        let Some(batch) = self.batches.get_mut(&batch_id) else {
            engine_debug!("Upload result for unknown batch {} ignored", batch_id);
            return None;
        };
        if batch.attempted() >= batch.total {
            engine_debug!(
                "Extra upload result for {} in batch {} ignored",
                filename,
                batch_id
            );
            return None;
        }
        self.dirty = true;
        match outcome {
            UploadOutcome::Uploaded { item_id } => {
                engine_info!("Uploaded {} as item {}", filename, item_id);
                batch.succeeded += 1;
                None
            }
            UploadOutcome::Failed { cause } => {
                engine_warn!("Upload of {} failed: {}", filename, cause);
                let message = upload_failure_message(&filename);
                batch.failures.push(UploadFailure { filename, cause });
                self.upload_error = Some(message.clone());
                Some(message)
            }
        }
    }

    pub(crate) fn close_batch(&mut self, batch_id: BatchId) -> Option<BatchProgress> {
        let closed = self.batches.remove(&batch_id)?;
        self.mark_dirty();
        Some(closed)
    }

    /// Applies a fetched list unless a newer response was already applied.
    pub(crate) fn apply_refresh(&mut self, request: RefreshId, items: Vec<Item>) -> bool {
        if request <= self.last_applied_refresh {
            engine_debug!(
                "Stale refresh {} ignored (latest applied {})",
                request,
                self.last_applied_refresh
            );
            return false;
        }
        self.last_applied_refresh = request;
        self.refreshes_completed += 1;
        let items = self.without_tombstoned(request, items);
        self.items.replace(items);
        self.mark_dirty();
        true
    }

    /// Drops ids deleted after `request` was issued; forgets tombstones older than it.
    fn without_tombstoned(&mut self, request: RefreshId, mut items: Vec<Item>) -> Vec<Item> {
        if self.tombstones.is_empty() {
            return items;
        }
        items.retain(|item| match self.tombstones.get(&item.id) {
            Some(&issued) if request <= issued => {
                engine_debug!("Refresh {} still lists deleted item {}", request, item.id);
                false
            }
            _ => true,
        });
        self.tombstones.retain(|_, issued| request < *issued);
        items
    }

    /// Keeps the current list; only bookkeeping moves forward.
    pub(crate) fn refresh_failed(&mut self, request: RefreshId, cause: &str) {
        engine_warn!("Refresh {} failed, keeping current list: {}", request, cause);
        if request > self.last_applied_refresh {
            self.last_applied_refresh = request;
            self.refreshes_completed += 1;
        }
    }

    /// Starts the delete gate; returns the filename to confirm.
    pub(crate) fn request_delete(&mut self, id: &str) -> Option<String> {
        if self.deletes.contains_key(id) {
            engine_debug!("Delete for {} already in progress", id);
            return None;
        }
        let Some(item) = self.items.get(id) else {
            engine_debug!("Delete requested for unknown item {}", id);
            return None;
        };
        let filename = item.original_filename.clone();
        self.deletes
            .insert(id.to_string(), DeleteStage::AwaitingConfirmation);
        self.mark_dirty();
        Some(filename)
    }

    pub(crate) fn confirm_delete(&mut self, id: &str) -> bool {
        match self.deletes.get_mut(id) {
            Some(stage @ DeleteStage::AwaitingConfirmation) => {
                *stage = DeleteStage::InFlight;
                self.mark_dirty();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn cancel_delete(&mut self, id: &str) {
        if self.deletes.get(id) == Some(&DeleteStage::AwaitingConfirmation) {
            self.deletes.remove(id);
            self.mark_dirty();
        }
    }

    /// Settles an in-flight delete; returns the alert text on failure.
    pub(crate) fn finish_delete(&mut self, id: &str, result: Result<(), String>) -> Option<String> {
        if self.deletes.get(id) != Some(&DeleteStage::InFlight) {
            engine_debug!("Delete result for {} without a pending delete ignored", id);
            return None;
        }
        self.deletes.remove(id);
        self.mark_dirty();
        match result {
            Ok(()) => {
                engine_info!("Deleted item {}", id);
                self.items.remove(id);
                if self.refresh_pending() {
                    self.tombstones
                        .insert(id.to_string(), self.last_issued_refresh);
                }
                None
            }
            Err(cause) => {
                engine_warn!("Failed to delete item {}: {}", id, cause);
                let message = "Failed to delete item".to_string();
                self.alert = Some(message.clone());
                Some(message)
            }
        }
    }

    pub(crate) fn raise_alert(&mut self, message: &str) {
        self.alert = Some(message.to_string());
        self.mark_dirty();
    }

    pub(crate) fn dismiss_alert(&mut self) {
        if self.alert.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn upload_notice(&self) -> UploadNotice {
        self.upload_notice
    }
}
