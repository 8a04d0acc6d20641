//! Service context - dependency container for services
//!
//! Holds every repository, collaborator port and shared setting the services
//! need. Postgres and Redis handles are optional so that the same context can
//! run on the in-memory adapters.

use std::sync::Arc;

use collab_cache::RedisPool;
use collab_common::AppConfig;
use collab_core::traits::{
    CategoryRepository, ChannelRepository, DirectoryService, EventPublisher, FileStore,
    MemberRepository, MessageRepository, NotificationDispatcher, PollRepository,
    PresenceRepository, QuickReplyRepository, ReactionRepository, ReadStateRepository,
    SavedItemRepository,
};
use collab_core::{DomainEvent, MentionPolicy, Notification, Snowflake, SnowflakeGenerator};
use collab_db::{InMemoryStore, PgPool};
use tracing::warn;

use super::error::{ServiceError, ServiceResult};

/// Behaviour knobs shared by the services
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub mention_policy: MentionPolicy,
    pub max_file_size_bytes: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            mention_policy: MentionPolicy::default(),
            max_file_size_bytes: 25 * 1024 * 1024,
        }
    }
}

impl From<&AppConfig> for ServiceSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            mention_policy: config.collab.mention_policy,
            max_file_size_bytes: config.files.max_file_size_bytes(),
        }
    }
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Infrastructure handles, absent on the in-memory backend
    pool: Option<PgPool>,
    redis_pool: Option<RedisPool>,

    // Repositories
    channel_repo: Arc<dyn ChannelRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    member_repo: Arc<dyn MemberRepository>,
    message_repo: Arc<dyn MessageRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,
    poll_repo: Arc<dyn PollRepository>,
    read_state_repo: Arc<dyn ReadStateRepository>,
    saved_item_repo: Arc<dyn SavedItemRepository>,
    quick_reply_repo: Arc<dyn QuickReplyRepository>,
    presence_repo: Arc<dyn PresenceRepository>,

    // Collaborators
    directory: Arc<dyn DirectoryService>,
    file_store: Arc<dyn FileStore>,
    notifier: Arc<dyn NotificationDispatcher>,
    events: Arc<dyn EventPublisher>,

    snowflake_generator: Arc<SnowflakeGenerator>,
    settings: ServiceSettings,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Infrastructure ===

    /// PostgreSQL pool, when running on Postgres
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Redis pool, when running with Redis
    pub fn redis_pool(&self) -> Option<&RedisPool> {
        self.redis_pool.as_ref()
    }

    // === Repositories ===

    pub fn channel_repo(&self) -> &dyn ChannelRepository {
        self.channel_repo.as_ref()
    }

    pub fn category_repo(&self) -> &dyn CategoryRepository {
        self.category_repo.as_ref()
    }

    pub fn member_repo(&self) -> &dyn MemberRepository {
        self.member_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    pub fn poll_repo(&self) -> &dyn PollRepository {
        self.poll_repo.as_ref()
    }

    pub fn read_state_repo(&self) -> &dyn ReadStateRepository {
        self.read_state_repo.as_ref()
    }

    pub fn saved_item_repo(&self) -> &dyn SavedItemRepository {
        self.saved_item_repo.as_ref()
    }

    pub fn quick_reply_repo(&self) -> &dyn QuickReplyRepository {
        self.quick_reply_repo.as_ref()
    }

    pub fn presence_repo(&self) -> &dyn PresenceRepository {
        self.presence_repo.as_ref()
    }

    // === Collaborators ===

    pub fn directory(&self) -> &dyn DirectoryService {
        self.directory.as_ref()
    }

    pub fn file_store(&self) -> &dyn FileStore {
        self.file_store.as_ref()
    }

    /// Event bus, shared with the WebSocket relay
    pub fn events(&self) -> &dyn EventPublisher {
        self.events.as_ref()
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    /// Publish to the channel stream. Failures are logged, never returned.
    pub async fn publish(&self, event: DomainEvent) {
        if let Err(e) = self.events.publish(&event).await {
            warn!(
                error = %e,
                event_type = event.event_type(),
                channel_id = %event.channel_id(),
                "Failed to publish event"
            );
        }
    }

    /// Hand a notification to the dispatcher. Failures are logged, never returned.
    pub async fn notify(&self, notification: Notification) {
        let user_id = notification.user_id;
        if let Err(e) = self.notifier.dispatch(notification).await {
            warn!(error = %e, user_id = %user_id, "Failed to dispatch notification");
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &self.pool.as_ref().map(|_| "PgPool"))
            .field("redis_pool", &self.redis_pool)
            .field("repositories", &"...")
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    redis_pool: Option<RedisPool>,
    channel_repo: Option<Arc<dyn ChannelRepository>>,
    category_repo: Option<Arc<dyn CategoryRepository>>,
    member_repo: Option<Arc<dyn MemberRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    poll_repo: Option<Arc<dyn PollRepository>>,
    read_state_repo: Option<Arc<dyn ReadStateRepository>>,
    saved_item_repo: Option<Arc<dyn SavedItemRepository>>,
    quick_reply_repo: Option<Arc<dyn QuickReplyRepository>>,
    presence_repo: Option<Arc<dyn PresenceRepository>>,
    directory: Option<Arc<dyn DirectoryService>>,
    file_store: Option<Arc<dyn FileStore>>,
    notifier: Option<Arc<dyn NotificationDispatcher>>,
    events: Option<Arc<dyn EventPublisher>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    settings: ServiceSettings,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn redis_pool(mut self, redis_pool: RedisPool) -> Self {
        self.redis_pool = Some(redis_pool);
        self
    }

    /// Use one in-memory store for every repository
    pub fn memory_store(self, store: Arc<InMemoryStore>) -> Self {
        self.channel_repo(store.clone())
            .category_repo(store.clone())
            .member_repo(store.clone())
            .message_repo(store.clone())
            .reaction_repo(store.clone())
            .poll_repo(store.clone())
            .read_state_repo(store.clone())
            .saved_item_repo(store.clone())
            .quick_reply_repo(store.clone())
            .presence_repo(store)
    }

    pub fn channel_repo(mut self, repo: Arc<dyn ChannelRepository>) -> Self {
        self.channel_repo = Some(repo);
        self
    }

    pub fn category_repo(mut self, repo: Arc<dyn CategoryRepository>) -> Self {
        self.category_repo = Some(repo);
        self
    }

    pub fn member_repo(mut self, repo: Arc<dyn MemberRepository>) -> Self {
        self.member_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn poll_repo(mut self, repo: Arc<dyn PollRepository>) -> Self {
        self.poll_repo = Some(repo);
        self
    }

    pub fn read_state_repo(mut self, repo: Arc<dyn ReadStateRepository>) -> Self {
        self.read_state_repo = Some(repo);
        self
    }

    pub fn saved_item_repo(mut self, repo: Arc<dyn SavedItemRepository>) -> Self {
        self.saved_item_repo = Some(repo);
        self
    }

    pub fn quick_reply_repo(mut self, repo: Arc<dyn QuickReplyRepository>) -> Self {
        self.quick_reply_repo = Some(repo);
        self
    }

    pub fn presence_repo(mut self, repo: Arc<dyn PresenceRepository>) -> Self {
        self.presence_repo = Some(repo);
        self
    }

    pub fn directory(mut self, directory: Arc<dyn DirectoryService>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn file_store(mut self, store: Arc<dyn FileStore>) -> Self {
        self.file_store = Some(store);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationDispatcher>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn events(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
        }

        Ok(ServiceContext {
            pool: self.pool,
            redis_pool: self.redis_pool,
            channel_repo: required(self.channel_repo, "channel_repo")?,
            category_repo: required(self.category_repo, "category_repo")?,
            member_repo: required(self.member_repo, "member_repo")?,
            message_repo: required(self.message_repo, "message_repo")?,
            reaction_repo: required(self.reaction_repo, "reaction_repo")?,
            poll_repo: required(self.poll_repo, "poll_repo")?,
            read_state_repo: required(self.read_state_repo, "read_state_repo")?,
            saved_item_repo: required(self.saved_item_repo, "saved_item_repo")?,
            quick_reply_repo: required(self.quick_reply_repo, "quick_reply_repo")?,
            presence_repo: required(self.presence_repo, "presence_repo")?,
            directory: required(self.directory, "directory")?,
            file_store: required(self.file_store, "file_store")?,
            notifier: required(self.notifier, "notifier")?,
            events: required(self.events, "events")?,
            snowflake_generator: self
                .snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
            settings: self.settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collab_cache::LocalEventBus;
    use collab_db::{MemoryFileStore, StaticDirectory};

    use crate::notifier::LoggingNotifier;

    #[test]
    fn test_missing_dependency_is_reported() {
        let err = ServiceContextBuilder::new()
            .memory_store(Arc::new(InMemoryStore::new()))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("directory is required"));
    }

    #[test]
    fn test_memory_context_builds() {
        let ctx = ServiceContext::builder()
            .memory_store(Arc::new(InMemoryStore::new()))
            .directory(Arc::new(StaticDirectory::default()))
            .file_store(Arc::new(MemoryFileStore::new("/files")))
            .notifier(Arc::new(LoggingNotifier))
            .events(Arc::new(LocalEventBus::default()))
            .build()
            .unwrap();
        assert!(ctx.pool().is_none());
        assert!(ctx.generate_id() < ctx.generate_id());
    }
}
