use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use engine_logging::engine_warn;

use crate::Metadata;

pub type ItemId = String;

/// Processing state of an archived file. Only the backend moves an item
/// between states; the client reflects whatever the last refresh returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    Unprocessed,
    Tagged,
    Indexed,
    Pending,
    Processing,
    Done,
    Error,
    Other(String),
}

impl ItemStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "unprocessed" => ItemStatus::Unprocessed,
            "tagged" => ItemStatus::Tagged,
            "indexed" => ItemStatus::Indexed,
            "pending" => ItemStatus::Pending,
            "processing" => ItemStatus::Processing,
            "done" => ItemStatus::Done,
            "error" => ItemStatus::Error,
            _ => ItemStatus::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ItemStatus::Unprocessed => "unprocessed",
            ItemStatus::Tagged => "tagged",
            ItemStatus::Indexed => "indexed",
            ItemStatus::Pending => "pending",
            ItemStatus::Processing => "processing",
            ItemStatus::Done => "done",
            ItemStatus::Error => "error",
            ItemStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One archived file as known to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub status: ItemStatus,
    pub original_filename: String,
    pub storage_path: String,
    /// Sole sort key. `None` when the backend sent something unparseable.
    pub created_at: Option<DateTime<Utc>>,
    pub metadata: Metadata,
}

impl Item {
    /// Build an item from the raw strings the backend sends.
    pub fn from_wire(
        id: impl Into<ItemId>,
        status: &str,
        original_filename: impl Into<String>,
        storage_path: impl Into<String>,
        created_at: &str,
        metadata_json: Option<&str>,
    ) -> Self {
        let id = id.into();
        let parsed_at = parse_created_at(created_at);
        if parsed_at.is_none() {
            engine_warn!("Item {} has unparseable created_at {:?}", id, created_at);
        }
        Self {
            status: ItemStatus::parse(status),
            original_filename: original_filename.into(),
            storage_path: storage_path.into(),
            created_at: parsed_at,
            metadata: Metadata::parse(metadata_json),
            id,
        }
    }
}

/// Parse a backend timestamp.
///
/// RFC 3339 values keep their offset; naive ISO-8601 values (what the backend
/// emits for `utcnow()`) are read as UTC.
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
