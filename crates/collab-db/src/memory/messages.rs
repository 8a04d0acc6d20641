//! Messages, reactions and polls

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;

use collab_core::entities::{ItemType, Message, Poll, PollVote, Reaction, RootMessage};
use collab_core::error::DomainError;
use collab_core::traits::{
    MessageQuery, MessageRepository, PollRepository, ReactionRepository, RepoResult, SearchQuery,
};
use collab_core::value_objects::Snowflake;

use super::InMemoryStore;

impl InMemoryStore {
    fn has_poll(&self, message_id: Snowflake) -> bool {
        self.poll_by_message.contains_key(&message_id)
    }

    fn matches_search(&self, message: &Message, query: &SearchQuery, terms: &[String]) -> bool {
        let filters = &query.filters;
        let content = message.content.to_lowercase();

        if !terms.iter().all(|t| content.contains(t.as_str())) {
            return false;
        }
        if filters.sender_id.is_some_and(|s| s != message.sender_id) {
            return false;
        }
        if filters.date_from.is_some_and(|from| message.created_at < from) {
            return false;
        }
        if filters.date_to.is_some_and(|to| message.created_at > to) {
            return false;
        }
        if filters
            .has_attachments
            .is_some_and(|want| want != message.has_attachments())
        {
            return false;
        }
        if filters.is_pinned.is_some_and(|want| want != message.is_pinned) {
            return false;
        }
        if filters.channel_id.is_some_and(|c| c != message.channel_id) {
            return false;
        }
        match filters.item_type {
            None => true,
            Some(ItemType::File) => message.has_attachments(),
            Some(ItemType::Poll) => self.has_poll(message.id),
            Some(ItemType::Message) => !message.has_attachments() && !self.has_poll(message.id),
        }
    }

    fn with_vote_counts(&self, mut poll: Poll) -> Poll {
        let votes = self.votes.lock();
        for option in &mut poll.options {
            option.vote_count = votes
                .iter()
                .filter(|v| v.poll_id == poll.id && v.option_id == option.id)
                .count() as i64;
        }
        poll
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self.messages.get(&id).map(|m| m.clone()))
    }

    async fn insert(&self, message: &Message) -> RepoResult<Message> {
        let Some(key) = message.idempotency_key.clone() else {
            self.messages.insert(message.id, message.clone());
            return Ok(message.clone());
        };

        match self
            .idempotency
            .entry((message.channel_id, message.sender_id, key))
        {
            Entry::Occupied(existing) => {
                let id = *existing.get();
                drop(existing);
                self.messages
                    .get(&id)
                    .map(|m| m.clone())
                    .ok_or(DomainError::MessageNotFound(id))
            }
            Entry::Vacant(slot) => {
                self.messages.insert(message.id, message.clone());
                slot.insert(message.id);
                Ok(message.clone())
            }
        }
    }

    async fn update_content(
        &self,
        id: Snowflake,
        content: &str,
        mentions: &BTreeSet<Snowflake>,
        edited_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        match self.messages.get_mut(&id) {
            Some(mut message) if !message.is_deleted => {
                message.content = content.to_string();
                message.mentions.clone_from(mentions);
                message.edited_at = Some(edited_at);
                Ok(())
            }
            _ => Err(DomainError::MessageNotFound(id)),
        }
    }

    async fn soft_delete(&self, id: Snowflake) -> RepoResult<bool> {
        Ok(match self.messages.get_mut(&id) {
            Some(mut message) if !message.is_deleted => {
                message.is_deleted = true;
                true
            }
            _ => false,
        })
    }

    async fn set_pinned(&self, id: Snowflake, pinned: bool) -> RepoResult<()> {
        match self.messages.get_mut(&id) {
            Some(mut message) if !message.is_deleted => {
                message.is_pinned = pinned;
                Ok(())
            }
            _ => Err(DomainError::MessageNotFound(id)),
        }
    }

    async fn list_roots(
        &self,
        channel_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<Vec<RootMessage>> {
        let limit = query.limit.clamp(1, 100) as usize;
        let cursor_key = |id: Snowflake| self.messages.get(&id).map(|m| m.order_key());

        let roots =
            self.messages_where(|m| m.channel_id == channel_id && !m.is_reply() && !m.is_deleted);

        let page: Vec<Message> = match (query.before, query.after) {
            (None, Some(after)) => {
                let Some(key) = cursor_key(after) else {
                    return Ok(Vec::new());
                };
                roots
                    .into_iter()
                    .filter(|m| m.order_key() > key)
                    .take(limit)
                    .collect()
            }
            (before, _) => {
                let older: Vec<Message> = match before {
                    Some(before) => {
                        let Some(key) = cursor_key(before) else {
                            return Ok(Vec::new());
                        };
                        roots.into_iter().filter(|m| m.order_key() < key).collect()
                    }
                    None => roots,
                };
                let skip = older.len().saturating_sub(limit);
                older.into_iter().skip(skip).collect()
            }
        };

        let replies = self.messages_where(|m| m.is_reply() && !m.is_deleted);
        Ok(page
            .into_iter()
            .map(|message| {
                let reply_count = replies
                    .iter()
                    .filter(|r| r.parent_id == Some(message.id))
                    .count() as i64;
                RootMessage {
                    message,
                    reply_count,
                }
            })
            .collect())
    }

    async fn find_replies(&self, parent_id: Snowflake) -> RepoResult<Vec<Message>> {
        Ok(self.messages_where(|m| m.parent_id == Some(parent_id) && !m.is_deleted))
    }

    async fn find_pinned(&self, channel_id: Snowflake) -> RepoResult<Vec<Message>> {
        Ok(self.messages_where(|m| m.channel_id == channel_id && m.is_pinned && !m.is_deleted))
    }

    async fn search(&self, query: &SearchQuery) -> RepoResult<Vec<Message>> {
        let terms = query.terms();
        let phrase = query.phrase();
        let scope: BTreeSet<Snowflake> = query.channel_ids.iter().copied().collect();

        let candidates = self.messages_where(|m| scope.contains(&m.channel_id) && !m.is_deleted);
        let mut hits: Vec<(bool, Message)> = candidates
            .into_iter()
            .filter(|m| self.matches_search(m, query, &terms))
            .map(|m| {
                let exact = phrase
                    .as_deref()
                    .is_some_and(|p| m.content.to_lowercase().contains(p));
                (exact, m)
            })
            .collect();

        // Phrase matches first, newest first within each group
        hits.sort_by(|(a_exact, a), (b_exact, b)| {
            b_exact
                .cmp(a_exact)
                .then_with(|| b.order_key().cmp(&a.order_key()))
        });
        hits.truncate(query.limit.clamp(1, 100) as usize);
        Ok(hits.into_iter().map(|(_, m)| m).collect())
    }
}

#[async_trait]
impl ReactionRepository for InMemoryStore {
    async fn toggle(&self, reaction: &Reaction) -> RepoResult<bool> {
        let key = (reaction.message_id, reaction.emoji.clone(), reaction.user_id);
        Ok(match self.reactions.entry(key) {
            Entry::Occupied(existing) => {
                existing.remove();
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(reaction.clone());
                true
            }
        })
    }

    async fn find_by_message(&self, message_id: Snowflake) -> RepoResult<Vec<Reaction>> {
        let mut reactions: Vec<Reaction> = self
            .reactions
            .iter()
            .filter(|r| r.message_id == message_id)
            .map(|r| r.clone())
            .collect();
        reactions.sort_by(|a, b| {
            (a.created_at, &a.emoji, a.user_id).cmp(&(b.created_at, &b.emoji, b.user_id))
        });
        Ok(reactions)
    }
}

#[async_trait]
impl PollRepository for InMemoryStore {
    async fn create(&self, poll: &Poll) -> RepoResult<()> {
        match self.poll_by_message.entry(poll.message_id) {
            Entry::Occupied(_) => Err(DomainError::PollAlreadyExists(poll.message_id)),
            Entry::Vacant(slot) => {
                self.polls.insert(poll.id, poll.clone());
                slot.insert(poll.id);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Poll>> {
        let poll = self.polls.get(&id).map(|p| p.clone());
        Ok(poll.map(|p| self.with_vote_counts(p)))
    }

    async fn find_by_message(&self, message_id: Snowflake) -> RepoResult<Option<Poll>> {
        let id = match self.poll_by_message.get(&message_id) {
            Some(id) => *id,
            None => return Ok(None),
        };
        PollRepository::find_by_id(self, id).await
    }

    async fn find_votes(&self, poll_id: Snowflake) -> RepoResult<Vec<PollVote>> {
        let mut votes: Vec<PollVote> = self
            .votes
            .lock()
            .iter()
            .filter(|v| v.poll_id == poll_id)
            .cloned()
            .collect();
        votes.sort_by_key(|v| (v.voted_at, v.user_id, v.option_id));
        Ok(votes)
    }

    async fn replace_votes(
        &self,
        poll_id: Snowflake,
        user_id: Snowflake,
        option_ids: &BTreeSet<Snowflake>,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let poll = self
            .polls
            .get(&poll_id)
            .map(|p| p.clone())
            .ok_or(DomainError::PollNotFound(poll_id))?;

        if !option_ids.iter().all(|id| poll.has_option(*id)) {
            return Err(DomainError::Conflict(
                "poll option no longer exists".to_string(),
            ));
        }

        let mut votes = self.votes.lock();
        votes.retain(|v| !(v.poll_id == poll_id && v.user_id == user_id));
        votes.extend(option_ids.iter().map(|option_id| PollVote {
            poll_id,
            option_id: *option_id,
            user_id,
            voted_at: at,
        }));
        Ok(())
    }
}
