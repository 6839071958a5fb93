//! In-process change feed
//!
//! Mutations publish a [`SyncPayload`] on the [`EventBus`]; SSE handlers
//! subscribe and forward. A slow client that falls behind the channel
//! capacity skips the missed messages and keeps streaming; the per-resource
//! version in each payload lets it notice the gap and refetch.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use shared::message::{SyncPayload, resource};
use tokio::sync::broadcast::{self, error::RecvError};

/// Messages retained by the shared channel; a receiver that falls further
/// behind than this skips ahead and loses the oldest ones
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

const KEEP_ALIVE_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SyncPayload>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish to every subscriber; returns how many received it
    pub fn publish(&self, payload: SyncPayload) -> usize {
        match self.tx.send(payload) {
            Ok(n) => n,
            Err(_) => {
                tracing::trace!("Event published with no active subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncPayload> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver → stream of payloads accepted by `filter`, skipping lag gaps
pub fn payload_stream<F>(
    rx: broadcast::Receiver<SyncPayload>,
    filter: F,
) -> impl Stream<Item = SyncPayload> + Send + 'static
where
    F: Fn(&SyncPayload) -> bool + Send + Sync + 'static,
{
    futures::stream::unfold((rx, filter), |(mut rx, filter)| async move {
        loop {
            match rx.recv().await {
                Ok(payload) if filter(&payload) => return Some((payload, (rx, filter))),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "SSE subscriber lagged, skipping missed events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

/// Only changes to one order
pub fn order_filter(order_id: i64) -> impl Fn(&SyncPayload) -> bool + Send + Sync + 'static {
    let id = order_id.to_string();
    move |p: &SyncPayload| p.resource == resource::ORDER && p.id == id
}

fn to_event(payload: &SyncPayload) -> Event {
    match Event::default().event(payload.event_name()).json_data(payload) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize sync payload");
            Event::default().event("error").data("serialization failed")
        }
    }
}

/// Wrap a receiver as an SSE response
pub fn sse_response<F>(
    rx: broadcast::Receiver<SyncPayload>,
    filter: F,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    F: Fn(&SyncPayload) -> bool + Send + Sync + 'static,
{
    let stream = payload_stream(rx, filter).map(|p| Ok::<_, Infallible>(to_event(&p)));
    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(KEEP_ALIVE_SECS)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(resource: &str, id: &str) -> SyncPayload {
        SyncPayload {
            resource: resource.to_string(),
            version: 1,
            action: "updated".to_string(),
            id: id.to_string(),
            data: None,
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(payload("order", "1")), 0);

        let mut rx = bus.subscribe();
        assert_eq!(bus.publish(payload("order", "1")), 1);
        assert_eq!(rx.recv().await.unwrap().id, "1");
    }

    #[tokio::test]
    async fn test_order_filter_stream() {
        let bus = EventBus::new();
        let stream = payload_stream(bus.subscribe(), order_filter(7));
        bus.publish(payload("order", "8"));
        bus.publish(payload("table", "7"));
        bus.publish(payload("order", "7"));
        drop(bus);

        let got: Vec<SyncPayload> = stream.collect().await;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, "7");
    }

    #[tokio::test]
    async fn test_lagged_subscriber_keeps_going() {
        let bus = EventBus::new();
        let stream = payload_stream(bus.subscribe(), |_| true);
        for i in 0..(EVENT_CHANNEL_CAPACITY + 10) {
            bus.publish(payload("order", &i.to_string()));
        }
        drop(bus);

        let got: Vec<SyncPayload> = stream.collect().await;
        assert_eq!(got.len(), EVENT_CHANNEL_CAPACITY);
        assert_eq!(
            got.last().map(|p| p.id.clone()),
            Some((EVENT_CHANNEL_CAPACITY + 9).to_string())
        );
    }
}
