//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use mappers::MemberWithPresence;

pub use requests::{
    AddMemberRequest, CreateCategoryRequest, CreateChannelRequest, CreateDmRequest,
    CreateMessageRequest, CreatePollRequest, CreateQuickReplyRequest, MarkReadRequest,
    PresenceQueryRequest, SaveItemRequest, SearchRequest, SetPinnedRequest,
    ToggleReactionRequest, UpdateChannelRequest, UpdateMessageRequest, UpdatePresenceRequest,
    VoteRequest,
};

pub use responses::{
    ApiResponse, CategoryResponse, ChannelResponse, ChannelSummaryResponse, EmployeeResponse,
    HealthChecks, HealthResponse, MemberResponse, MentionResponse, MessageResponse,
    PollOptionResponse, PollResponse, PresenceResponse, QuickReplyResponse, ReactionResponse,
    ReadMarkerResponse, ReadinessResponse, SavedItemResponse, ThreadResponse,
    ToggleReactionResponse, UnreadCountResponse,
};
