use engine_logging::engine_warn;
use serde_json::{Map, Value};

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Open key/value description of a file (size, MIME type, timestamps).
///
/// Arrives from the backend as a serialized JSON string that may be missing or
/// malformed; both cases degrade to an empty mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(raw: Option<&str>) -> Self {
        let raw = match raw.map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => return Self::default(),
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Self(map),
            Ok(other) => {
                engine_warn!("Ignoring non-object metadata: {}", other);
                Self::default()
            }
            Err(err) => {
                engine_warn!("Failed to parse metadata {:?}: {}", raw, err);
                Self::default()
            }
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Compact JSON form, as sent in the `metadata` form field.
    pub fn to_json_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    pub fn size(&self) -> Option<u64> {
        self.0.get("size").and_then(Value::as_u64)
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.0
            .get("type")
            .and_then(Value::as_str)
            .filter(|mime| !mime.is_empty())
    }

    /// Human-readable size; `N/A` when unknown or zero.
    pub fn size_label(&self) -> String {
        match self.size() {
            Some(bytes) if bytes > 0 => format_size(bytes),
            _ => "N/A".to_string(),
        }
    }

    /// Upper-cased MIME subtype, `FILE` when there is none.
    pub fn type_label(&self) -> String {
        self.mime_type()
            .and_then(|mime| mime.split('/').nth(1))
            .filter(|subtype| !subtype.is_empty())
            .map(str::to_ascii_uppercase)
            .unwrap_or_else(|| "FILE".to_string())
    }

    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "no metadata".to_string();
        }
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.to_json_string())
    }
}

impl From<Map<String, Value>> for Metadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", SIZE_UNITS[unit])
}
