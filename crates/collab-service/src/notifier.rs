//! Notification dispatchers
//!
//! Push delivery belongs to another system; these adapters either log the
//! intent or keep it for inspection.

use async_trait::async_trait;
use collab_core::{Notification, NotificationDispatcher, RepoResult};
use parking_lot::Mutex;
use tracing::info;

/// Logs every notification intent
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl NotificationDispatcher for LoggingNotifier {
    async fn dispatch(&self, notification: Notification) -> RepoResult<()> {
        info!(
            user_id = %notification.user_id,
            kind = ?notification.kind,
            payload = %notification.payload,
            "Notification dispatched"
        );
        Ok(())
    }
}

/// Keeps notifications in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything dispatched so far, oldest first
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    /// Drain the recorded notifications
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.sent.lock())
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn dispatch(&self, notification: Notification) -> RepoResult<()> {
        self.sent.lock().push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collab_core::{NotificationKind, Snowflake};

    #[tokio::test]
    async fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier
            .dispatch(Notification {
                user_id: Snowflake::new(1),
                kind: NotificationKind::Mention,
                payload: serde_json::json!({ "message_id": "5" }),
            })
            .await
            .unwrap();

        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(notifier.take()[0].user_id, Snowflake::new(1));
        assert!(notifier.sent().is_empty());
    }
}
