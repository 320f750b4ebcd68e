//! `GET /stream` — relays progress updates to the browser as server-sent events.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName},
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
};
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::info;

use crate::progress::{ProgressChannel, ProgressUpdate};
use crate::state::AppState;

/// Payload of one `data:` line on the event stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Connected,
    Ping,
    Update(ProgressUpdate),
}

impl StreamEvent {
    fn into_sse(self) -> Result<Event, axum::Error> {
        Event::default().json_data(self)
    }
}

/// Logs when the client goes away, whichever way the stream is dropped.
struct ConnectionGuard;

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        info!("Client disconnected from SSE stream");
    }
}

/// Builds the event sequence for one connection: `connected`, then every
/// queued update as it arrives, with a `ping` whenever `ping_interval` passes
/// without traffic. Ends after `lifetime`; the browser reconnects and
/// undelivered updates wait in the queue.
pub fn progress_events(
    channel: Arc<ProgressChannel>,
    ping_interval: Duration,
    lifetime: Duration,
) -> impl Stream<Item = StreamEvent> {
    async_stream::stream! {
        let _guard = ConnectionGuard;
        yield StreamEvent::Connected;

        let deadline = tokio::time::sleep(lifetime);
        tokio::pin!(deadline);

        let mut heartbeat = interval_at(Instant::now() + ping_interval, ping_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let next = tokio::select! {
                _ = &mut deadline => None,
                update = channel.recv() => {
                    heartbeat.reset();
                    Some(StreamEvent::Update(update))
                }
                _ = heartbeat.tick() => Some(StreamEvent::Ping),
            };
            match next {
                Some(event) => yield event,
                None => {
                    info!("SSE stream reached its {}s lifetime", lifetime.as_secs());
                    break;
                }
            }
        }
    }
}

/// GET /stream
pub async fn handle_stream(State(state): State<AppState>) -> impl IntoResponse {
    info!(
        "New client connected to SSE stream ({} pending updates)",
        state.progress.len()
    );

    let events = progress_events(
        Arc::clone(&state.progress),
        state.config.ping_interval,
        state.config.stream_timeout,
    )
    .map(StreamEvent::into_sse);

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Sse::new(events),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Category;

    #[test]
    fn test_stream_event_wire_format() {
        assert_eq!(
            serde_json::to_value(StreamEvent::Connected).unwrap(),
            serde_json::json!({"type": "connected"})
        );
        assert_eq!(
            serde_json::to_value(StreamEvent::Ping).unwrap(),
            serde_json::json!({"type": "ping"})
        );

        let update = ProgressUpdate::new("AI response received", Category::Info);
        let value = serde_json::to_value(StreamEvent::Update(update)).unwrap();
        assert_eq!(value["type"], "update");
        assert_eq!(value["message"], "AI response received");
        assert_eq!(value["category"], "info");
    }

    #[tokio::test(start_paused = true)]
    async fn test_connected_then_updates() {
        let channel = Arc::new(ProgressChannel::new(10));
        channel.info("Generating resume...");

        let events = progress_events(
            Arc::clone(&channel),
            Duration::from_secs(5),
            Duration::from_secs(300),
        );
        futures::pin_mut!(events);

        assert_eq!(events.next().await, Some(StreamEvent::Connected));
        match events.next().await {
            Some(StreamEvent::Update(update)) => assert_eq!(update.message, "Generating resume..."),
            other => panic!("expected update, got {other:?}"),
        }
        assert!(channel.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_when_idle() {
        let channel = Arc::new(ProgressChannel::new(10));
        let events = progress_events(channel, Duration::from_secs(5), Duration::from_secs(300));
        futures::pin_mut!(events);

        assert_eq!(events.next().await, Some(StreamEvent::Connected));

        let started = Instant::now();
        assert_eq!(events.next().await, Some(StreamEvent::Ping));
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(events.next().await, Some(StreamEvent::Ping));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_postpones_heartbeat() {
        let channel = Arc::new(ProgressChannel::new(10));
        let started = Instant::now();
        let events = progress_events(
            Arc::clone(&channel),
            Duration::from_secs(5),
            Duration::from_secs(300),
        );
        futures::pin_mut!(events);

        assert_eq!(events.next().await, Some(StreamEvent::Connected));

        let sender = Arc::clone(&channel);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            sender.info("Generating resume...");
        });

        match events.next().await {
            Some(StreamEvent::Update(update)) => assert_eq!(update.message, "Generating resume..."),
            other => panic!("expected update, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(5));

        // No ping at t=5s: the update restarted the idle window.
        assert_eq!(events.next().await, Some(StreamEvent::Ping));
        assert!(started.elapsed() >= Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_ends_after_lifetime_and_keeps_pending() {
        let channel = Arc::new(ProgressChannel::new(10));
        let events = progress_events(
            Arc::clone(&channel),
            Duration::from_secs(5),
            Duration::from_secs(12),
        );
        futures::pin_mut!(events);

        assert_eq!(events.next().await, Some(StreamEvent::Connected));
        assert_eq!(events.next().await, Some(StreamEvent::Ping));
        assert_eq!(events.next().await, Some(StreamEvent::Ping));
        assert_eq!(events.next().await, None);

        channel.info("for the next connection");
        assert_eq!(channel.len(), 1);
    }
}
