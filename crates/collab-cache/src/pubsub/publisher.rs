//! Redis-backed event bus: PUBLISH on write, shared subscriber on read

use std::sync::Arc;

use async_trait::async_trait;
use collab_core::{
    DomainError, DomainEvent, EventEnvelope, EventPublisher, EventStream, RepoResult, Snowflake,
};
use futures::stream;

use super::channels::channel_topic;
use super::subscriber::{Subscriber, SubscriberConfig};
use crate::pool::RedisPool;

/// Event bus that fans events out to every server instance
#[derive(Clone)]
pub struct RedisEventBus {
    pool: RedisPool,
    subscriber: Arc<Subscriber>,
}

impl std::fmt::Debug for RedisEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisEventBus")
            .field("subscriber", &self.subscriber)
            .finish()
    }
}

impl RedisEventBus {
    /// Must be called inside a Tokio runtime; the subscriber spawns its listener.
    pub fn new(pool: RedisPool, config: SubscriberConfig) -> Self {
        Self {
            pool,
            subscriber: Arc::new(Subscriber::new(config)),
        }
    }

    /// Subscriber settings derived from the pool's URL
    pub fn connect(pool: RedisPool) -> Self {
        let config = SubscriberConfig {
            redis_url: pool.url().to_string(),
            ..Default::default()
        };
        Self::new(pool, config)
    }
}

#[async_trait]
impl EventPublisher for RedisEventBus {
    #[tracing::instrument(skip(self, event), fields(event_type = event.event_type()))]
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()> {
        let envelope = EventEnvelope::now(event.clone());
        let payload = serde_json::to_string(&envelope)
            .map_err(|e| DomainError::InternalError(e.to_string()))?;

        let receivers = self
            .pool
            .publish(&channel_topic(event.channel_id()), &payload)
            .await?;
        tracing::trace!(receivers, "Published event");
        Ok(())
    }

    async fn subscribe(&self, channel_id: Snowflake) -> RepoResult<EventStream> {
        let subscription = self.subscriber.subscribe(channel_topic(channel_id));

        let events = stream::unfold(subscription, |mut subscription| async move {
            loop {
                let payload = subscription.next_payload().await?;
                match serde_json::from_str::<EventEnvelope>(&payload) {
                    Ok(envelope) => return Some((envelope, subscription)),
                    Err(e) => tracing::warn!(error = %e, "Dropping malformed event payload"),
                }
            }
        });
        Ok(Box::pin(events))
    }
}
