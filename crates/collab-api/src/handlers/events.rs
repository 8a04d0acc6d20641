//! Channel event stream over WebSocket
//!
//! After the caller proves read access, every event published to the channel
//! is relayed as one JSON text frame. Client frames are ignored apart from
//! close. When the caller leaves the channel, access is checked again and the
//! stream ends if the channel is no longer readable.

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use collab_core::{DomainEvent, EventPublisher, EventStream, Principal, Snowflake};
use collab_service::PermissionService;
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::extractors::{AuthUser, IdPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /channels/{channel_id}/events
pub async fn channel_events(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(channel_id): IdPath<Snowflake>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    let ctx = state.service_context();
    PermissionService::new(ctx)
        .readable(channel_id, &auth.principal)
        .await?;

    // Subscribe before upgrading so no event is lost in between
    let events = ctx.events().subscribe(channel_id).await?;
    let principal = auth.principal;

    Ok(ws.on_upgrade(move |socket| relay(socket, state, events, channel_id, principal)))
}

/// Whether `event` is the caller's own departure from the channel
fn is_own_departure(event: &DomainEvent, user_id: Snowflake) -> bool {
    matches!(event, DomainEvent::MemberLeft { user_id: left, .. } if *left == user_id)
}

async fn relay(
    socket: WebSocket,
    state: AppState,
    mut events: EventStream,
    channel_id: Snowflake,
    principal: Principal,
) {
    let user_id = principal.user_id;
    debug!(channel_id = %channel_id, user_id = %user_id, "Event stream opened");
    let (mut sink, mut incoming) = socket.split();

    loop {
        tokio::select! {
            event = events.next() => {
                let Some(envelope) = event else { break };
                let text = match serde_json::to_string(&envelope) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "Failed to encode event");
                        continue;
                    }
                };
                if sink.send(WsMessage::Text(text)).await.is_err() {
                    break;
                }
                if is_own_departure(&envelope.event, user_id)
                    && PermissionService::new(state.service_context())
                        .readable(channel_id, &principal)
                        .await
                        .is_err()
                {
                    debug!(channel_id = %channel_id, user_id = %user_id, "Read access lost");
                    let _ = sink.send(WsMessage::Close(None)).await;
                    break;
                }
            }
            frame = incoming.next() => {
                match frame {
                    Some(Ok(WsMessage::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    debug!(channel_id = %channel_id, user_id = %user_id, "Event stream closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_own_departure_rechecks_access() {
        let me = Snowflake::new(2);
        let channel_id = Snowflake::new(10);

        assert!(is_own_departure(
            &DomainEvent::MemberLeft { channel_id, user_id: me },
            me
        ));
        assert!(!is_own_departure(
            &DomainEvent::MemberLeft {
                channel_id,
                user_id: Snowflake::new(3)
            },
            me
        ));
        assert!(!is_own_departure(
            &DomainEvent::MemberJoined { channel_id, user_id: me },
            me
        ));
    }
}
