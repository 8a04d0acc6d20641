//! Channel-scoped event distribution

mod channels;
mod local;
mod publisher;
mod subscriber;

pub use channels::{channel_topic, parse_channel_topic, CHANNEL_PREFIX};
pub use local::LocalEventBus;
pub use publisher::RedisEventBus;
pub use subscriber::{
    ReceivedMessage, Subscriber, SubscriberConfig, SubscriberError, SubscriberResult, Subscription,
};
