//! Zibaldone core: pure state machine for the archive item list, upload
//! batches and the delete lifecycle, plus view-model helpers.
mod effect;
mod item;
mod list;
mod metadata;
mod msg;
mod state;
mod update;
mod upload;
mod view_model;

pub use effect::Effect;
pub use item::{parse_created_at, Item, ItemId, ItemStatus};
pub use list::ItemList;
pub use metadata::Metadata;
pub use msg::Msg;
pub use state::{AppState, DeleteStage, Lifecycle, RefreshId};
pub use update::update;
pub use upload::{BatchId, BatchProgress, UploadFailure, UploadIntent, UploadNotice, UploadOutcome};
pub use view_model::{AppViewModel, ItemRowView};
