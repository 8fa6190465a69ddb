use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::StreamExt;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::sse::{parse_notification, SseDecoder};
use crate::{
    ApiError, ArchiveApi, EngineEvent, EventFeed, EventSink, RefreshError, RemoteItem, RequestId,
    SyncMode, SyncSettings, SyncStatus, TriggerSource,
};

/// Fetches the full item list. Ordering and dedupe are the caller's job.
#[derive(Clone)]
pub struct Synchronizer {
    api: Arc<dyn ArchiveApi>,
}

impl Synchronizer {
    pub fn new(api: Arc<dyn ArchiveApi>) -> Self {
        Self { api }
    }

    pub async fn refresh(&self) -> Result<Vec<RemoteItem>, RefreshError> {
        self.api.list_items().await.map_err(RefreshError::from)
    }

    /// Refresh and report through the sink; failures are logged, never raised.
    pub async fn refresh_into(&self, request: RequestId, sink: &dyn EventSink) {
        let result = self.refresh().await;
        match &result {
            Ok(items) => engine_debug!("Refresh {} returned {} item(s)", request, items.len()),
            Err(err) => engine_warn!("Refresh {} failed: {}", request, err),
        }
        sink.emit(EngineEvent::ItemsFetched { request, result });
    }
}

/// Run the configured refresh trigger until `cancel` fires.
pub async fn run_triggers(
    settings: SyncSettings,
    feed: Arc<dyn EventFeed>,
    cancel: CancellationToken,
    sink: Arc<dyn EventSink>,
) {
    match settings.mode {
        SyncMode::Polling => {
            report(sink.as_ref(), SyncStatus::Polling {
                interval: settings.poll_interval,
            });
            run_polling(settings.poll_interval, &cancel, sink.as_ref()).await;
        }
        SyncMode::Push => run_push(&settings, feed.as_ref(), &cancel, sink.as_ref()).await,
    }
    report(sink.as_ref(), SyncStatus::Stopped);
}

/// Emit `RefreshDue` every `interval`. The first tick is one interval out.
pub async fn run_polling(interval: Duration, cancel: &CancellationToken, sink: &dyn EventSink) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => sink.emit(EngineEvent::RefreshDue {
                source: TriggerSource::Poll,
            }),
        }
    }
}

/// Follow the event stream, reconnecting with bounded backoff; falls back to
/// polling once the reconnect budget is spent.
pub async fn run_push(
    settings: &SyncSettings,
    feed: &dyn EventFeed,
    cancel: &CancellationToken,
    sink: &dyn EventSink,
) {
    let mut failures: u32 = 0;
    let mut connections: u32 = 0;
    loop {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => return,
            outcome = follow_stream(feed, connections, sink) => outcome,
        };
        if outcome.connected {
            connections += 1;
            failures = 0;
        }
        match &outcome.error {
            Some(err) => engine_warn!("Event stream dropped: {}", err),
            None => engine_info!("Event stream closed by server"),
        }

        failures += 1;
        let Some(delay) = settings.reconnect.delay_for(failures) else {
            engine_warn!(
                "Event stream unavailable after {} attempts, polling every {:?}",
                failures - 1,
                settings.poll_interval
            );
            report(sink, SyncStatus::FellBackToPolling {
                interval: settings.poll_interval,
            });
            run_polling(settings.poll_interval, cancel, sink).await;
            return;
        };
        report(sink, SyncStatus::Reconnecting {
            attempt: failures,
            delay,
        });
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

struct StreamOutcome {
    connected: bool,
    error: Option<ApiError>,
}

async fn follow_stream(feed: &dyn EventFeed, connections: u32, sink: &dyn EventSink) -> StreamOutcome {
    let mut stream = match feed.subscribe().await {
        Ok(stream) => stream,
        Err(err) => {
            return StreamOutcome {
                connected: false,
                error: Some(err),
            }
        }
    };
    report(sink, SyncStatus::Connected);
    // Catch up on whatever changed while we were disconnected.
    if connections > 0 {
        sink.emit(EngineEvent::RefreshDue {
            source: TriggerSource::Push,
        });
    }

    let mut decoder = SseDecoder::new();
    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                return StreamOutcome {
                    connected: true,
                    error: Some(err),
                }
            }
        };
        for event in decoder.push(&chunk) {
            match parse_notification(&event.data) {
                Some(notification) if notification.is_update() => {
                    engine_debug!("Update event for {:?}", notification.item_id);
                    sink.emit(EngineEvent::RefreshDue {
                        source: TriggerSource::Push,
                    });
                }
                Some(notification) => {
                    engine_debug!("Ignoring event of type {:?}", notification.kind);
                }
                None => {}
            }
        }
    }
    StreamOutcome {
        connected: true,
        error: None,
    }
}

fn report(sink: &dyn EventSink, status: SyncStatus) {
    engine_info!("Sync status: {:?}", status);
    sink.emit(EngineEvent::SyncStatus(status));
}
