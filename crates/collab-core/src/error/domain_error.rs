//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("Category not found: {0}")]
    CategoryNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Poll not found: {0}")]
    PollNotFound(Snowflake),

    #[error("Quick reply not found: {0}")]
    QuickReplyNotFound(Snowflake),

    #[error("Saved item not found: {0}")]
    SavedItemNotFound(Snowflake),

    #[error("User {user_id} is not a member of channel {channel_id}")]
    MemberNotFound {
        channel_id: Snowflake,
        user_id: Snowflake,
    },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Message has neither content nor attachments")]
    EmptyMessage,

    #[error("A poll needs at least {min} non-empty options")]
    TooFewPollOptions { min: usize },

    #[error("Channel {0} is archived")]
    ChannelArchived(Snowflake),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Only the sender may do this")]
    NotMessageSender,

    #[error("Channel admin rights required")]
    NotChannelAdmin,

    // =========================================================================
    // Thread Errors
    // =========================================================================
    #[error("Invalid thread: {0}")]
    InvalidThread(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Message {0} already has a poll")]
    PollAlreadyExists(Snowflake),

    #[error("Already a member of this channel")]
    AlreadyMember,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::CategoryNotFound(_) => "UNKNOWN_CATEGORY",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::PollNotFound(_) => "UNKNOWN_POLL",
            Self::QuickReplyNotFound(_) => "UNKNOWN_QUICK_REPLY",
            Self::SavedItemNotFound(_) => "UNKNOWN_SAVED_ITEM",
            Self::MemberNotFound { .. } => "UNKNOWN_MEMBER",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::EmptyMessage => "EMPTY_MESSAGE",
            Self::TooFewPollOptions { .. } => "TOO_FEW_POLL_OPTIONS",
            Self::ChannelArchived(_) => "CHANNEL_ARCHIVED",

            // Authorization
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::NotMessageSender => "NOT_MESSAGE_SENDER",
            Self::NotChannelAdmin => "NOT_CHANNEL_ADMIN",

            // Threads
            Self::InvalidThread(_) => "INVALID_THREAD",

            // Conflict
            Self::Conflict(_) => "CONFLICT",
            Self::PollAlreadyExists(_) => "POLL_ALREADY_EXISTS",
            Self::AlreadyMember => "ALREADY_MEMBER",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::StorageError(_) => "STORAGE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ChannelNotFound(_)
                | Self::CategoryNotFound(_)
                | Self::MessageNotFound(_)
                | Self::PollNotFound(_)
                | Self::QuickReplyNotFound(_)
                | Self::SavedItemNotFound(_)
                | Self::MemberNotFound { .. }
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::ContentTooLong { .. }
                | Self::EmptyMessage
                | Self::TooFewPollOptions { .. }
                | Self::ChannelArchived(_)
        )
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Unauthenticated(_))
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_) | Self::NotMessageSender | Self::NotChannelAdmin
        )
    }

    pub fn is_invalid_thread(&self) -> bool {
        matches!(self, Self::InvalidThread(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Conflict(_) | Self::PollAlreadyExists(_) | Self::AlreadyMember
        )
    }
}
