#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use serde_json::{json, Value};
use zibaldone_engine::{ClientSettings, EngineEvent, EventSink};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[derive(Clone, Default)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }

    pub fn snapshot(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Poll until `done` holds for the collected events or the deadline passes.
    pub async fn wait_for(&self, timeout: Duration, done: impl Fn(&[EngineEvent]) -> bool) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if done(&self.events.lock().unwrap()) {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn settings_for(uri: &str) -> ClientSettings {
    ClientSettings::default().with_base_url(format!("{uri}/api"))
}

pub fn item_json(id: &str, filename: &str, created_at: &str, metadata: &str) -> Value {
    json!({
        "id": id,
        "status": "unprocessed",
        "original_filename": filename,
        "storage_path": format!("blob/{filename}"),
        "created_at": created_at,
        "metadata_json": metadata,
    })
}
