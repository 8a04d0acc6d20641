//! Ports to collaborators outside the collaboration core

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::entities::{Employee, FileRef, Principal};
use crate::events::{DomainEvent, EventEnvelope};
use crate::traits::RepoResult;
use crate::value_objects::Snowflake;

/// Turns a credential into a caller identity
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, credential: &str) -> RepoResult<Principal>;
}

/// Organizational directory
#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn list_employees(&self) -> RepoResult<Vec<Employee>>;

    async fn find_employee(&self, id: Snowflake) -> RepoResult<Option<Employee>> {
        Ok(self.list_employees().await?.into_iter().find(|e| e.id == id))
    }
}

/// Blob storage. The core only keeps the returned reference.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, name: &str, mime: &str) -> RepoResult<FileRef>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Mention,
    DirectMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: Snowflake,
    pub kind: NotificationKind,
    pub payload: serde_json::Value,
}

/// Push delivery. Fire-and-forget from the core's point of view.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: Notification) -> RepoResult<()>;
}

/// Stream of events for one channel
pub type EventStream = BoxStream<'static, EventEnvelope>;

/// Channel-scoped event bus
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()>;

    /// Events published after the call returns. Delivery is best-effort.
    async fn subscribe(&self, channel_id: Snowflake) -> RepoResult<EventStream>;
}
