//! API Integration Tests
//!
//! Every test spawns its own server with in-memory storage and the fixture
//! roster, so no external services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use std::time::Duration;

use collab_core::Snowflake;
use futures::StreamExt;
use integration_tests::{
    assert_error, assert_json, assert_status, fixtures::*, TestServer,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message as WsMessage;

async fn create_channel(server: &TestServer, token: &str, name: &str, kind: &str) -> ChannelView {
    let response = server
        .post_auth("/api/v1/channels", token, &channel_body(name, kind))
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn join(server: &TestServer, token: &str, channel_id: Snowflake) {
    let response = server
        .post_auth(&format!("/api/v1/channels/{channel_id}/join"), token, &json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();
}

async fn post_message(
    server: &TestServer,
    token: &str,
    channel_id: Snowflake,
    body: &Value,
) -> MessageView {
    let response = server
        .post_auth(&format!("/api/v1/channels/{channel_id}/messages"), token, body)
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

// ============================================================================
// Health and authentication
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get("/health/ready").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_requests_need_a_valid_token() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/api/v1/channels").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MISSING_AUTHORIZATION");

    let response = server.get_auth("/api/v1/channels", "not-a-jwt").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_employee_directory_is_seeded() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();

    let response = server.get_auth("/api/v1/employees", &alice).await.unwrap();
    let employees: Vec<EmployeeView> = assert_json(response, StatusCode::OK).await.unwrap();

    let names: Vec<&str> = employees.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Alice Kim", "Bob Lee", "Carol Park"]);
    assert_eq!(employees[1].id, BOB);
}

// ============================================================================
// Channels, mentions and read markers
// ============================================================================

#[tokio::test]
async fn test_mention_badges_clear_after_mark_read() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();
    let bob = server.token(BOB).unwrap();

    let channel = create_channel(&server, &alice, "general", "public").await;
    assert_eq!(channel.name, "general");
    assert_eq!(channel.channel_type, "public");
    join(&server, &bob, channel.id).await;

    let message = post_message(&server, &alice, channel.id, &message_body("ping @bob")).await;
    assert_eq!(message.mentions, vec![BOB]);
    assert_eq!(message.sender_id, ALICE);

    let response = server.get_auth("/api/v1/channels", &bob).await.unwrap();
    let summaries: Vec<ChannelSummaryView> = assert_json(response, StatusCode::OK).await.unwrap();
    let summary = summaries.iter().find(|s| s.id == channel.id).unwrap();
    assert_eq!(summary.unread_count, 1);
    assert_eq!(summary.mention_count, 1);

    let response = server.get_auth("/api/v1/mentions", &bob).await.unwrap();
    let mentions: Vec<MentionView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(mentions.len(), 1);
    assert_eq!(mentions[0].message_id, message.id);
    assert_eq!(mentions[0].channel_id, channel.id);

    let response = server
        .post_auth(&format!("/api/v1/channels/{}/read", channel.id), &bob, &json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .get_auth(&format!("/api/v1/channels/{}/unread", channel.id), &bob)
        .await
        .unwrap();
    let unread: UnreadView = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(unread.unread_count, 0);

    let response = server.get_auth("/api/v1/mentions", &bob).await.unwrap();
    let mentions: Vec<MentionView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(mentions.is_empty());
}

#[tokio::test]
async fn test_non_members_cannot_post() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();
    let carol = server.token(CAROL).unwrap();

    let public = create_channel(&server, &alice, "announcements", "public").await;
    let response = server
        .post_auth(
            &format!("/api/v1/channels/{}/messages", public.id),
            &carol,
            &message_body("hello"),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    // Private channels are invisible to outsiders
    let private = create_channel(&server, &alice, "leads", "private").await;
    let response = server
        .get_auth(&format!("/api/v1/channels/{}", private.id), &carol)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_CHANNEL");
}

// ============================================================================
// Direct messages
// ============================================================================

#[tokio::test]
async fn test_direct_channel_is_shared_and_hidden() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();
    let bob = server.token(BOB).unwrap();
    let carol = server.token(CAROL).unwrap();

    let response = server
        .post_auth("/api/v1/dms", &alice, &json!({ "user_id": BOB }))
        .await
        .unwrap();
    let from_alice: ChannelView = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(from_alice.channel_type, "direct");

    let response = server
        .post_auth("/api/v1/dms", &bob, &json!({ "user_id": ALICE }))
        .await
        .unwrap();
    let from_bob: ChannelView = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(from_alice.id, from_bob.id);

    let response = server
        .get_auth(&format!("/api/v1/channels/{}/messages", from_alice.id), &carol)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Threads, reactions and polls
// ============================================================================

#[tokio::test]
async fn test_threads_are_one_level_deep() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();
    let channel = create_channel(&server, &alice, "design", "public").await;

    let root = post_message(&server, &alice, channel.id, &message_body("new logo?")).await;
    let reply = post_message(&server, &alice, channel.id, &reply_body("v2 attached", root.id)).await;
    assert_eq!(reply.parent_id, Some(root.id));

    let response = server
        .post_auth(
            &format!("/api/v1/channels/{}/messages", channel.id),
            &alice,
            &reply_body("nested", reply.id),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_THREAD");

    let response = server
        .get_auth(&format!("/api/v1/messages/{}/thread", root.id), &alice)
        .await
        .unwrap();
    let thread: ThreadView = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(thread.parent.id, root.id);
    assert_eq!(thread.replies.len(), 1);
    assert_eq!(thread.replies[0].content, "v2 attached");

    // The channel timeline only lists roots, with their reply counts
    let response = server
        .get_auth(&format!("/api/v1/channels/{}/messages", channel.id), &alice)
        .await
        .unwrap();
    let timeline: Vec<MessageView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].reply_count, Some(1));
}

#[tokio::test]
async fn test_reaction_toggles() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();
    let channel = create_channel(&server, &alice, "random", "public").await;
    let message = post_message(&server, &alice, channel.id, &message_body("lunch?")).await;
    let path = format!("/api/v1/messages/{}/reactions", message.id);

    let response = server
        .post_auth(&path, &alice, &json!({ "emoji": "👍" }))
        .await
        .unwrap();
    let toggle: ToggleView = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(toggle.added);

    let response = server.get_auth(&path, &alice).await.unwrap();
    let reactions: Vec<ReactionView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(reactions.len(), 1);
    assert_eq!(reactions[0].emoji, "👍");
    assert_eq!(reactions[0].count, 1);
    assert_eq!(reactions[0].users, vec![ALICE]);
    assert!(reactions[0].me);

    let response = server
        .post_auth(&path, &alice, &json!({ "emoji": "👍" }))
        .await
        .unwrap();
    let toggle: ToggleView = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!toggle.added);

    let response = server.get_auth(&path, &alice).await.unwrap();
    let reactions: Vec<ReactionView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(reactions.is_empty());
}

#[tokio::test]
async fn test_single_choice_vote_switches() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();
    let bob = server.token(BOB).unwrap();
    let channel = create_channel(&server, &alice, "offsite", "public").await;
    join(&server, &bob, channel.id).await;
    let message = post_message(&server, &alice, channel.id, &message_body("where to?")).await;

    let response = server
        .post_auth(
            &format!("/api/v1/messages/{}/poll", message.id),
            &alice,
            &json!({ "question": "Venue", "options": ["Beach", "Mountains"] }),
        )
        .await
        .unwrap();
    let poll: PollView = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(poll.message_id, message.id);
    assert_eq!(poll.options.len(), 2);
    let beach = poll.options[0].id;
    let mountains = poll.options[1].id;
    let votes = format!("/api/v1/polls/{}/votes", poll.id);

    let response = server
        .put_auth(&votes, &bob, &json!({ "option_ids": [beach] }))
        .await
        .unwrap();
    let poll: PollView = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(poll.my_votes, vec![beach]);

    let response = server
        .put_auth(&votes, &bob, &json!({ "option_ids": [mountains] }))
        .await
        .unwrap();
    let poll: PollView = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(poll.my_votes, vec![mountains]);
    assert_eq!(poll.total_votes, 1);
    let counts: Vec<(&str, i64)> = poll
        .options
        .iter()
        .map(|o| (o.text.as_str(), o.vote_count))
        .collect();
    assert_eq!(counts, [("Beach", 0), ("Mountains", 1)]);

    // Single choice rejects a ballot with two options
    let response = server
        .put_auth(&votes, &bob, &json!({ "option_ids": [beach, mountains] }))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Search, saved items and quick replies
// ============================================================================

#[tokio::test]
async fn test_search_only_covers_member_channels() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();
    let bob = server.token(BOB).unwrap();

    let open = create_channel(&server, &alice, "product", "public").await;
    join(&server, &bob, open.id).await;
    let closed = create_channel(&server, &alice, "execs", "private").await;

    post_message(&server, &alice, open.id, &message_body("Roadmap draft is up")).await;
    post_message(&server, &alice, closed.id, &message_body("roadmap budget")).await;

    let response = server
        .get_auth("/api/v1/search?q=roadmap", &bob)
        .await
        .unwrap();
    let hits: Vec<MessageView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].channel_id, open.id);

    let response = server
        .get_auth("/api/v1/search?q=roadmap", &alice)
        .await
        .unwrap();
    let hits: Vec<MessageView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn test_saved_items_drop_deleted_messages() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();
    let channel = create_channel(&server, &alice, "notes", "public").await;
    let keep = post_message(&server, &alice, channel.id, &message_body("keep me")).await;
    let gone = post_message(&server, &alice, channel.id, &message_body("delete me")).await;

    for id in [keep.id, gone.id] {
        let response = server
            .post_auth(
                "/api/v1/saved",
                &alice,
                &json!({ "item_type": "message", "item_id": id }),
            )
            .await
            .unwrap();
        assert_status(response, StatusCode::CREATED).await.unwrap();
    }

    let response = server
        .delete_auth(&format!("/api/v1/messages/{}", gone.id), &alice)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get_auth("/api/v1/saved", &alice).await.unwrap();
    let saved: Vec<SavedItemView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].item_id, keep.id);
    assert_eq!(saved[0].message.content, "keep me");

    let response = server
        .delete_auth(&format!("/api/v1/saved/{}", saved[0].id), &alice)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
}

#[tokio::test]
async fn test_quick_replies_are_private() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();
    let bob = server.token(BOB).unwrap();

    let response = server
        .post_auth(
            "/api/v1/quick-replies",
            &alice,
            &json!({ "title": "ooo", "content": "Out of office until Monday" }),
        )
        .await
        .unwrap();
    let reply: QuickReplyView = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(reply.title, "ooo");

    let response = server.get_auth("/api/v1/quick-replies", &bob).await.unwrap();
    let listed: Vec<QuickReplyView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(listed.is_empty());

    let path = format!("/api/v1/quick-replies/{}", reply.id);
    let response = server.delete_auth(&path, &bob).await.unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_QUICK_REPLY");

    let response = server.delete_auth(&path, &alice).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
}

// ============================================================================
// Presence
// ============================================================================

#[tokio::test]
async fn test_presence_round_trip() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();
    let bob = server.token(BOB).unwrap();

    let response = server
        .put_auth(
            "/api/v1/presence",
            &alice,
            &json!({ "status": "away", "status_text": "lunch" }),
        )
        .await
        .unwrap();
    let presence: PresenceView = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(presence.status, "away");

    let response = server
        .get_auth(&format!("/api/v1/presence/{ALICE}"), &bob)
        .await
        .unwrap();
    let presence: PresenceView = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(presence.user_id, ALICE);
    assert_eq!(presence.status, "away");
    assert_eq!(presence.status_text.as_deref(), Some("lunch"));

    let response = server
        .post_auth(
            "/api/v1/presences",
            &bob,
            &json!({ "user_ids": [ALICE, CAROL] }),
        )
        .await
        .unwrap();
    let presences: Vec<PresenceView> = assert_json(response, StatusCode::OK).await.unwrap();
    let status_of = |id: Snowflake| {
        presences
            .iter()
            .find(|p| p.user_id == id)
            .map(|p| p.status.clone())
    };
    assert_eq!(status_of(ALICE).as_deref(), Some("away"));
    assert_eq!(status_of(CAROL).as_deref(), Some("offline"));
}

// ============================================================================
// Files
// ============================================================================

#[tokio::test]
async fn test_uploaded_file_is_served() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();

    let response = server
        .upload(&alice, "agenda.txt", "text/plain", b"1. intros".to_vec())
        .await
        .unwrap();
    let file: FileView = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(file.name, "agenda.txt");
    assert_eq!(file.mime, "text/plain");
    assert_eq!(file.size, 9);
    assert!(file.url.starts_with("/files/"));

    let response = server.get(&file.url).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "1. intros");

    let response = server
        .upload(&alice, "empty.txt", "text/plain", Vec::new())
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Channel events
// ============================================================================

#[tokio::test]
async fn test_event_socket_relays_new_messages() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();
    let channel = create_channel(&server, &alice, "live", "public").await;

    let mut socket = server.connect_events(channel.id, &alice).await.unwrap();
    let message = post_message(&server, &alice, channel.id, &message_body("hello live")).await;

    let event = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(frame) = socket.next().await {
            if let WsMessage::Text(text) = frame.unwrap() {
                let event: Value = serde_json::from_str(&text).unwrap();
                if event["type"] == "message_created" {
                    return event;
                }
            }
        }
        panic!("event socket closed before the message arrived");
    })
    .await
    .expect("no message_created event within 5s");

    assert_eq!(event["channel_id"], json!(channel.id));
    assert_eq!(event["message_id"], json!(message.id));
    assert!(event.get("timestamp").is_some());
}

#[tokio::test]
async fn test_event_socket_requires_read_access() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();
    let carol = server.token(CAROL).unwrap();
    let channel = create_channel(&server, &alice, "hidden", "private").await;

    assert!(server.connect_events(channel.id, &carol).await.is_err());
}

#[tokio::test]
async fn test_event_socket_closes_after_leaving_private_channel() {
    let server = TestServer::start().await.unwrap();
    let alice = server.token(ALICE).unwrap();
    let bob = server.token(BOB).unwrap();
    let channel = create_channel(&server, &alice, "leads", "private").await;

    let response = server
        .post_auth(
            &format!("/api/v1/channels/{}/members", channel.id),
            &alice,
            &json!({ "user_id": BOB }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let mut socket = server.connect_events(channel.id, &bob).await.unwrap();

    let response = server
        .post_auth(&format!("/api/v1/channels/{}/leave", channel.id), &bob, &json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
    post_message(&server, &alice, channel.id, &message_body("after bob left")).await;

    let seen: Vec<String> = tokio::time::timeout(Duration::from_secs(5), async {
        let mut seen = Vec::new();
        while let Some(Ok(frame)) = socket.next().await {
            match frame {
                WsMessage::Text(text) => {
                    let event: Value = serde_json::from_str(&text).unwrap();
                    seen.push(event["type"].as_str().unwrap_or_default().to_string());
                }
                WsMessage::Close(_) => break,
                _ => {}
            }
        }
        seen
    })
    .await
    .expect("event socket stayed open after leaving");

    assert_eq!(seen, ["member_left"]);
}
