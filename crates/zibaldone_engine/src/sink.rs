use std::sync::mpsc;

use crate::EngineEvent;

/// Where the engine reports results. Must never block for long.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: EngineEvent) {
        // The receiver may be gone after teardown; late results are dropped.
        let _ = self.tx.send(event);
    }
}
