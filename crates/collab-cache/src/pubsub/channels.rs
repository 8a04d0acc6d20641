//! Pub/Sub topic naming.

use collab_core::Snowflake;

/// Topic prefix for channel-scoped events
pub const CHANNEL_PREFIX: &str = "channel:";

/// Redis topic carrying the events of one channel
#[must_use]
pub fn channel_topic(channel_id: Snowflake) -> String {
    format!("{CHANNEL_PREFIX}{channel_id}")
}

/// Inverse of [`channel_topic`]
#[must_use]
pub fn parse_channel_topic(topic: &str) -> Option<Snowflake> {
    topic
        .strip_prefix(CHANNEL_PREFIX)
        .and_then(|id| Snowflake::parse(id).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_round_trip() {
        let id = Snowflake::new(123_456);
        assert_eq!(channel_topic(id), "channel:123456");
        assert_eq!(parse_channel_topic(&channel_topic(id)), Some(id));
    }

    #[test]
    fn test_foreign_topics_ignored() {
        assert_eq!(parse_channel_topic("user:1"), None);
        assert_eq!(parse_channel_topic("channel:abc"), None);
    }
}
