//! `@name` extraction and resolution against channel members

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// How a token is compared with a display name
///
/// `Substring` reproduces the long-standing behaviour: `@bob` mentions "Bob
/// Lee" and "Bobby Tran" alike. `Exact` only accepts the first name or the
/// full name written with underscores (`@bob`, `@bob_lee`). Both resolve an
/// ambiguous token to every matching member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionPolicy {
    #[default]
    Substring,
    Exact,
}

impl FromStr for MentionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "exact" => Ok(Self::Exact),
            other => Err(format!("unknown mention policy: {other}")),
        }
    }
}

/// A channel member that may be mentioned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionCandidate {
    pub user_id: Snowflake,
    pub display_name: String,
}

impl MentionCandidate {
    pub fn new(user_id: Snowflake, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lowercased `@token` bodies, in order of appearance
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '@' {
            continue;
        }
        let mut token = String::new();
        while let Some(&(_, next)) = chars.peek() {
            if !is_word_char(next) {
                break;
            }
            token.extend(next.to_lowercase());
            chars.next();
        }
        if !token.is_empty() {
            tokens.push(token);
        }
    }
    tokens
}

fn matches(token: &str, display_name: &str, policy: MentionPolicy) -> bool {
    let name = display_name.trim().to_lowercase();
    if name.is_empty() {
        return false;
    }
    let joined = name.split_whitespace().collect::<Vec<_>>().join("_");

    match policy {
        MentionPolicy::Substring => name.contains(token) || joined.contains(token),
        MentionPolicy::Exact => {
            let first = name.split_whitespace().next().unwrap_or_default();
            token == first || token == joined
        }
    }
}

/// Resolve the mentions in `text` to member ids. Unmatched tokens are ignored.
pub fn extract_mentions(
    text: &str,
    members: &[MentionCandidate],
    policy: MentionPolicy,
) -> BTreeSet<Snowflake> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return BTreeSet::new();
    }

    members
        .iter()
        .filter(|m| tokens.iter().any(|t| matches(t, &m.display_name, policy)))
        .map(|m| m.user_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members() -> Vec<MentionCandidate> {
        vec![
            MentionCandidate::new(Snowflake::new(1), "Alice Kim"),
            MentionCandidate::new(Snowflake::new(2), "Bob Lee"),
            MentionCandidate::new(Snowflake::new(3), "Carol Park"),
            MentionCandidate::new(Snowflake::new(4), "Bobby Tran"),
        ]
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("hi @Bob and @carol_park!"), vec!["bob", "carol_park"]);
        assert!(tokenize("no mentions @ here").is_empty());
        assert_eq!(tokenize("@지민 안녕"), vec!["지민"]);
    }

    #[test]
    fn test_substring_policy_is_broad() {
        let ids = extract_mentions("hello @bob", &members(), MentionPolicy::Substring);
        assert_eq!(ids, [Snowflake::new(2), Snowflake::new(4)].into());
    }

    #[test]
    fn test_exact_policy() {
        let ids = extract_mentions("hello @bob", &members(), MentionPolicy::Exact);
        assert_eq!(ids, [Snowflake::new(2)].into());

        let ids = extract_mentions("ping @Carol_Park", &members(), MentionPolicy::Exact);
        assert_eq!(ids, [Snowflake::new(3)].into());
    }

    #[test]
    fn test_unknown_tokens_ignored() {
        let ids = extract_mentions("@dave @eve", &members(), MentionPolicy::Substring);
        assert!(ids.is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let ids = extract_mentions("@ALICE", &members(), MentionPolicy::Exact);
        assert_eq!(ids, [Snowflake::new(1)].into());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("EXACT".parse::<MentionPolicy>().unwrap(), MentionPolicy::Exact);
        assert!("fuzzy".parse::<MentionPolicy>().is_err());
    }
}
