//! In-process event bus for a single server instance

use async_trait::async_trait;
use collab_core::{DomainEvent, EventEnvelope, EventPublisher, EventStream, RepoResult, Snowflake};
use dashmap::DashMap;
use futures::stream;
use tokio::sync::broadcast;

/// One broadcast channel per collaboration channel, created on first subscribe
#[derive(Debug)]
pub struct LocalEventBus {
    senders: DashMap<Snowflake, broadcast::Sender<EventEnvelope>>,
    capacity: usize,
}

impl LocalEventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            senders: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Channels that currently have a broadcast sender
    pub fn active_channels(&self) -> usize {
        self.senders.len()
    }
}

impl Default for LocalEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EventPublisher for LocalEventBus {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()> {
        let channel_id = event.channel_id();
        if let Some(tx) = self.senders.get(&channel_id) {
            // Err only means nobody is listening
            let _ = tx.send(EventEnvelope::now(event.clone()));
        }
        self.senders
            .remove_if(&channel_id, |_, tx| tx.receiver_count() == 0);
        Ok(())
    }

    async fn subscribe(&self, channel_id: Snowflake) -> RepoResult<EventStream> {
        let rx = self
            .senders
            .entry(channel_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();

        let events = stream::unfold(rx, move |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(envelope) => return Some((envelope, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(channel_id = %channel_id, skipped, "Event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        Ok(Box::pin(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::time::Duration;

    fn updated(id: i64) -> DomainEvent {
        DomainEvent::ChannelUpdated {
            channel_id: Snowflake::new(id),
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_channel_events() {
        let bus = LocalEventBus::default();
        let mut events = bus.subscribe(Snowflake::new(1)).await.unwrap();

        bus.publish(&updated(1)).await.unwrap();

        let envelope = events.next().await.unwrap();
        assert_eq!(envelope.event, updated(1));
    }

    #[tokio::test]
    async fn test_events_stay_in_their_channel() {
        let bus = LocalEventBus::default();
        let mut events = bus.subscribe(Snowflake::new(1)).await.unwrap();

        bus.publish(&updated(2)).await.unwrap();

        let next = tokio::time::timeout(Duration::from_millis(50), events.next()).await;
        assert!(next.is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = LocalEventBus::default();
        bus.publish(&updated(3)).await.unwrap();
        assert_eq!(bus.active_channels(), 0);
    }

    #[tokio::test]
    async fn test_dropped_subscribers_are_pruned() {
        let bus = LocalEventBus::default();
        let events = bus.subscribe(Snowflake::new(4)).await.unwrap();
        assert_eq!(bus.active_channels(), 1);

        drop(events);
        bus.publish(&updated(4)).await.unwrap();
        assert_eq!(bus.active_channels(), 0);
    }
}
