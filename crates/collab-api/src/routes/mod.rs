//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use collab_common::AppConfig;

use crate::handlers::{
    channels, directory, dms, events, files, health, members, messages, polls, presence,
    quick_replies, reactions, read_state, saved, search,
};
use crate::state::AppState;

/// Create the main API router (health routes are mounted separately)
pub fn create_router(config: &AppConfig) -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes(config))
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .merge(channel_routes())
        .merge(message_routes())
        .merge(poll_routes())
        .merge(user_routes())
        .merge(file_routes(config.files.max_file_size_bytes()))
}

/// Channels, categories, membership and DMs
fn channel_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/channels",
            get(channels::list_channels).post(channels::create_channel),
        )
        .route("/public-channels", get(channels::list_public_channels))
        .route(
            "/channels/:channel_id",
            get(channels::get_channel).patch(channels::update_channel),
        )
        .route("/channels/:channel_id/archive", post(channels::archive_channel))
        .route(
            "/channels/:channel_id/members",
            get(members::list_members).post(members::add_member),
        )
        .route("/channels/:channel_id/join", post(members::join_channel))
        .route("/channels/:channel_id/leave", post(members::leave_channel))
        .route(
            "/channels/:channel_id/messages",
            get(messages::list_messages).post(messages::post_message),
        )
        .route("/channels/:channel_id/pins", get(messages::list_pinned))
        .route("/channels/:channel_id/read", post(read_state::mark_read))
        .route("/channels/:channel_id/unread", get(read_state::unread_count))
        .route("/channels/:channel_id/events", get(events::channel_events))
        .route(
            "/categories",
            get(channels::list_categories).post(channels::create_category),
        )
        .route("/dms", post(dms::open_dm))
}

/// Single messages: edits, threads, pins, reactions
fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/messages/:message_id",
            get(messages::get_message)
                .patch(messages::edit_message)
                .delete(messages::delete_message),
        )
        .route("/messages/:message_id/thread", get(messages::get_thread))
        .route("/messages/:message_id/pin", put(messages::set_pinned))
        .route("/messages/:message_id/read", post(read_state::mark_read_up_to))
        .route(
            "/messages/:message_id/reactions",
            get(reactions::list_reactions).post(reactions::toggle_reaction),
        )
        .route(
            "/messages/:message_id/poll",
            get(polls::get_message_poll).post(polls::create_poll),
        )
        .route("/search", get(search::search))
}

fn poll_routes() -> Router<AppState> {
    Router::new()
        .route("/polls/:poll_id", get(polls::get_poll))
        .route("/polls/:poll_id/votes", put(polls::vote))
}

/// Per-user state: mentions, saved items, quick replies, presence, directory
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/mentions", get(read_state::pending_mentions))
        .route("/saved", get(saved::list_saved_items).post(saved::save_item))
        .route("/saved/:saved_id", delete(saved::unsave_item))
        .route(
            "/quick-replies",
            get(quick_replies::list_quick_replies).post(quick_replies::create_quick_reply),
        )
        .route("/quick-replies/:id", delete(quick_replies::delete_quick_reply))
        .route("/presence", put(presence::set_presence))
        .route("/presences", post(presence::query_presences))
        .route("/presence/:user_id", get(presence::get_presence))
        .route("/employees", get(directory::list_employees))
}

/// Uploads may exceed axum's default body limit up to the configured size
fn file_routes(max_file_size_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/files",
        post(files::upload_file).layer(DefaultBodyLimit::max(max_file_size_bytes)),
    )
}
