//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use collab_core::{
    Category, Channel, ChannelMember, Employee, MentionRecord, Message, PollResults,
    PresenceStatus, QuickReply, ReactionSummary, RootMessage, SavedItem, Snowflake, Thread,
};

use super::responses::{
    CategoryResponse, ChannelResponse, EmployeeResponse, MemberResponse, MentionResponse,
    MessageResponse, PollOptionResponse, PollResponse, PresenceResponse, QuickReplyResponse,
    ReactionResponse, SavedItemResponse, ThreadResponse,
};

// ============================================================================
// Channel Mappers
// ============================================================================

impl From<&Channel> for ChannelResponse {
    fn from(channel: &Channel) -> Self {
        Self {
            id: channel.id,
            name: channel.name.clone(),
            description: channel.description.clone(),
            channel_type: channel.channel_type,
            icon: channel.icon.clone(),
            color: channel.color.clone(),
            category_id: channel.category_id,
            created_by: channel.created_by,
            created_at: channel.created_at,
            archived_at: channel.archived_at,
        }
    }
}

impl From<Channel> for ChannelResponse {
    fn from(channel: Channel) -> Self {
        Self::from(&channel)
    }
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            position: category.position,
        }
    }
}

/// A member together with their current presence
#[derive(Debug, Clone)]
pub struct MemberWithPresence {
    pub member: ChannelMember,
    pub presence: PresenceStatus,
}

impl From<MemberWithPresence> for MemberResponse {
    fn from(data: MemberWithPresence) -> Self {
        Self {
            user_id: data.member.user_id,
            display_name: data.member.display_name,
            role: data.member.role,
            joined_at: data.member.joined_at,
            presence: PresenceResponse::from(&data.presence),
        }
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            channel_id: message.channel_id,
            sender_id: message.sender_id,
            content: message.content.clone(),
            content_type: message.content_type,
            created_at: message.created_at,
            edited_at: message.edited_at,
            parent_id: message.parent_id,
            mentions: message.mentions.iter().copied().collect(),
            attachments: message.attachments.clone(),
            is_pinned: message.is_pinned,
            is_deleted: message.is_deleted,
            reply_count: None,
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self::from(&message)
    }
}

impl From<RootMessage> for MessageResponse {
    fn from(root: RootMessage) -> Self {
        Self {
            reply_count: Some(root.reply_count),
            ..Self::from(&root.message)
        }
    }
}

impl From<Thread> for ThreadResponse {
    fn from(thread: Thread) -> Self {
        Self {
            parent: MessageResponse::from(thread.parent),
            replies: thread.replies.into_iter().map(MessageResponse::from).collect(),
        }
    }
}

impl ReactionResponse {
    pub fn from_summary(summary: ReactionSummary, viewer: Snowflake) -> Self {
        Self {
            me: summary.includes(viewer),
            emoji: summary.emoji,
            count: summary.count,
            users: summary.user_ids,
        }
    }
}

// ============================================================================
// Poll Mappers
// ============================================================================

impl From<PollResults> for PollResponse {
    fn from(results: PollResults) -> Self {
        let PollResults {
            poll,
            mut voters,
            my_votes,
        } = results;

        let total_votes = poll.total_votes();
        let options = poll
            .options
            .into_iter()
            .map(|option| PollOptionResponse {
                voters: voters.as_mut().map(|v| v.remove(&option.id).unwrap_or_default()),
                id: option.id,
                text: option.text,
                vote_count: option.vote_count,
            })
            .collect();

        Self {
            id: poll.id,
            message_id: poll.message_id,
            question: poll.question,
            options,
            allow_multiple: poll.allow_multiple,
            is_anonymous: poll.is_anonymous,
            created_by: poll.created_by,
            created_at: poll.created_at,
            total_votes,
            my_votes: my_votes.into_iter().collect(),
        }
    }
}

// ============================================================================
// Read State / Saved / Presence Mappers
// ============================================================================

impl From<&MentionRecord> for MentionResponse {
    fn from(record: &MentionRecord) -> Self {
        Self {
            message_id: record.message_id,
            channel_id: record.channel_id,
            created_at: record.created_at,
        }
    }
}

impl SavedItemResponse {
    pub fn new(item: &SavedItem, message: &Message) -> Self {
        Self {
            id: item.id,
            item_type: item.item_type,
            item_id: item.item_id,
            channel_id: item.channel_id,
            saved_at: item.saved_at,
            message: MessageResponse::from(message),
        }
    }
}

impl From<&QuickReply> for QuickReplyResponse {
    fn from(reply: &QuickReply) -> Self {
        Self {
            id: reply.id,
            title: reply.title.clone(),
            content: reply.content.clone(),
            created_at: reply.created_at,
        }
    }
}

impl From<&PresenceStatus> for PresenceResponse {
    fn from(presence: &PresenceStatus) -> Self {
        Self {
            user_id: presence.user_id,
            status: presence.status,
            status_text: presence.status_text.clone(),
            status_emoji: presence.status_emoji.clone(),
            updated_at: presence.updated_at,
        }
    }
}

impl From<&Employee> for EmployeeResponse {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use collab_core::{Poll, PollOption, PollVote};

    fn poll(is_anonymous: bool) -> Poll {
        Poll {
            id: Snowflake::new(1),
            message_id: Snowflake::new(2),
            question: "Offsite?".to_string(),
            options: vec![
                PollOption {
                    id: Snowflake::new(10),
                    text: "Yes".to_string(),
                    position: 0,
                    vote_count: 1,
                },
                PollOption {
                    id: Snowflake::new(11),
                    text: "No".to_string(),
                    position: 1,
                    vote_count: 0,
                },
            ],
            allow_multiple: false,
            is_anonymous,
            created_by: Snowflake::new(3),
            created_at: Utc::now(),
        }
    }

    fn votes() -> Vec<PollVote> {
        vec![PollVote {
            poll_id: Snowflake::new(1),
            option_id: Snowflake::new(10),
            user_id: Snowflake::new(7),
            voted_at: Utc::now(),
        }]
    }

    #[test]
    fn test_poll_response_lists_voters() {
        let response = PollResponse::from(PollResults::build(poll(false), &votes(), Snowflake::new(7)));
        assert_eq!(response.total_votes, 1);
        assert_eq!(response.options[0].voters, Some(vec![Snowflake::new(7)]));
        assert_eq!(response.options[1].voters, Some(vec![]));
        assert_eq!(response.my_votes, vec![Snowflake::new(10)]);
    }

    #[test]
    fn test_anonymous_poll_response_has_no_voters() {
        let response = PollResponse::from(PollResults::build(poll(true), &votes(), Snowflake::new(7)));
        assert!(response.options.iter().all(|o| o.voters.is_none()));
        assert_eq!(response.my_votes, vec![Snowflake::new(10)]);

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("voters"));
    }

    #[test]
    fn test_root_message_carries_reply_count() {
        let message = Message::new(
            Snowflake::new(1),
            Snowflake::new(2),
            Snowflake::new(3),
            "hi".to_string(),
        );
        let response = MessageResponse::from(RootMessage {
            message,
            reply_count: 4,
        });
        assert_eq!(response.reply_count, Some(4));
    }

    #[test]
    fn test_reaction_response_me_flag() {
        let summary = ReactionSummary {
            emoji: "👍".to_string(),
            count: 2,
            user_ids: vec![Snowflake::new(1), Snowflake::new(2)],
        };
        assert!(ReactionResponse::from_summary(summary.clone(), Snowflake::new(2)).me);
        assert!(!ReactionResponse::from_summary(summary, Snowflake::new(3)).me);
    }
}
