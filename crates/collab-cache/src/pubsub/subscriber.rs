//! Redis Pub/Sub subscriber.
//!
//! One dedicated connection listens on every topic some local consumer is
//! interested in and rebroadcasts payloads in-process. Topics are subscribed
//! on first interest and dropped when the last [`Subscription`] goes away.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::StreamExt;
use parking_lot::Mutex;
use redis::Client;
use tokio::sync::{broadcast, mpsc, RwLock};

/// Error type for subscriber operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Channel closed")]
    ChannelClosed,
}

/// Result type for subscriber operations
pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// Payload received on a topic
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub topic: String,
    pub payload: String,
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Channel buffer size for broadcast
    pub broadcast_buffer: usize,
    /// Reconnection delay in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

/// Commands for subscription management
#[derive(Debug)]
enum SubscriberCommand {
    Subscribe(String),
    Unsubscribe(String),
}

type Interest = Arc<Mutex<HashMap<String, usize>>>;

/// Redis Pub/Sub subscriber
pub struct Subscriber {
    /// Number of live subscriptions per topic
    interest: Interest,
    broadcast_tx: broadcast::Sender<ReceivedMessage>,
    control_tx: mpsc::UnboundedSender<SubscriberCommand>,
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("topics", &self.interest.lock().len())
            .finish()
    }
}

impl Subscriber {
    /// Create a new subscriber and start the background listener
    pub fn new(config: SubscriberConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.broadcast_buffer);
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        tokio::spawn(Self::listener_loop(config, broadcast_tx.clone(), control_rx));

        Self {
            interest: Arc::new(Mutex::new(HashMap::new())),
            broadcast_tx,
            control_tx,
        }
    }

    /// Background listener loop
    async fn listener_loop(
        config: SubscriberConfig,
        broadcast_tx: broadcast::Sender<ReceivedMessage>,
        mut control_rx: mpsc::UnboundedReceiver<SubscriberCommand>,
    ) {
        let subscribed = RwLock::new(HashSet::new());
        loop {
            match Self::run_listener(&config, &subscribed, &broadcast_tx, &mut control_rx).await {
                Ok(()) => {
                    tracing::info!("Subscriber shutting down");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Subscriber error, reconnecting...");
                    tokio::time::sleep(tokio::time::Duration::from_millis(
                        config.reconnect_delay_ms,
                    ))
                    .await;
                }
            }
        }
    }

    /// Run the listener until error or until every handle is gone
    async fn run_listener(
        config: &SubscriberConfig,
        subscribed: &RwLock<HashSet<String>>,
        broadcast_tx: &broadcast::Sender<ReceivedMessage>,
        control_rx: &mut mpsc::UnboundedReceiver<SubscriberCommand>,
    ) -> SubscriberResult<()> {
        let client = Client::open(config.redis_url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;

        // Resubscribe after a reconnect
        for topic in subscribed.read().await.iter() {
            pubsub.subscribe(topic).await?;
        }

        tracing::info!("Subscriber connected to Redis");

        let mut stream = pubsub.on_message();

        loop {
            tokio::select! {
                msg = stream.next() => {
                    let Some(msg) = msg else {
                        tracing::warn!("Pub/Sub stream ended");
                        return Err(SubscriberError::ChannelClosed);
                    };
                    let topic = msg.get_channel_name().to_string();
                    let payload: String = msg.get_payload().unwrap_or_default();
                    tracing::trace!(topic = %topic, "Received Pub/Sub message");

                    // No local receivers is not an error
                    let _ = broadcast_tx.send(ReceivedMessage { topic, payload });
                }

                cmd = control_rx.recv() => {
                    // Need to drop stream to access pubsub
                    drop(stream);
                    match cmd {
                        Some(SubscriberCommand::Subscribe(topic)) => {
                            pubsub.subscribe(&topic).await?;
                            tracing::debug!(topic = %topic, "Subscribed to topic");
                            subscribed.write().await.insert(topic);
                        }
                        Some(SubscriberCommand::Unsubscribe(topic)) => {
                            pubsub.unsubscribe(&topic).await?;
                            tracing::debug!(topic = %topic, "Unsubscribed from topic");
                            subscribed.write().await.remove(&topic);
                        }
                        None => return Ok(()),
                    }
                    stream = pubsub.on_message();
                }
            }
        }
    }

    /// Register interest in a topic. Payloads published after Redis
    /// acknowledges the subscription are delivered to the handle.
    pub fn subscribe(&self, topic: String) -> Subscription {
        let rx = self.broadcast_tx.subscribe();
        {
            let mut interest = self.interest.lock();
            let count = interest.entry(topic.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                let _ = self.control_tx.send(SubscriberCommand::Subscribe(topic.clone()));
            }
        }

        Subscription {
            topic,
            rx,
            interest: Arc::clone(&self.interest),
            control_tx: self.control_tx.clone(),
        }
    }

    /// Topics with at least one live subscription
    pub fn topics(&self) -> Vec<String> {
        self.interest.lock().keys().cloned().collect()
    }
}

/// Handle receiving the payloads of one topic
pub struct Subscription {
    topic: String,
    rx: broadcast::Receiver<ReceivedMessage>,
    interest: Interest,
    control_tx: mpsc::UnboundedSender<SubscriberCommand>,
}

impl Subscription {
    /// Next payload on this topic; `None` once the subscriber stopped
    pub async fn next_payload(&mut self) -> Option<String> {
        loop {
            match self.rx.recv().await {
                Ok(msg) if msg.topic == self.topic => return Some(msg.payload),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %self.topic, skipped, "Subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut interest = self.interest.lock();
        if let Some(count) = interest.get_mut(&self.topic) {
            *count -= 1;
            if *count == 0 {
                interest.remove(&self.topic);
                let _ = self
                    .control_tx
                    .send(SubscriberCommand::Unsubscribe(self.topic.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_config_default() {
        let config = SubscriberConfig::default();
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.broadcast_buffer, 1024);
        assert_eq!(config.reconnect_delay_ms, 1000);
    }

    #[tokio::test]
    async fn test_interest_is_reference_counted() {
        // Nothing listens on this port; the listener keeps retrying in the background
        let subscriber = Subscriber::new(SubscriberConfig {
            redis_url: "redis://127.0.0.1:1".to_string(),
            reconnect_delay_ms: 50,
            ..Default::default()
        });

        let first = subscriber.subscribe("channel:1".to_string());
        let second = subscriber.subscribe("channel:1".to_string());
        assert_eq!(subscriber.topics(), vec!["channel:1".to_string()]);

        drop(first);
        assert_eq!(subscriber.topics().len(), 1);
        drop(second);
        assert!(subscriber.topics().is_empty());
    }
}
