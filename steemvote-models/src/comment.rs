// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use crate::error::ModelsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use steemvote_time::SteemTime;

/// Identifier of a post or comment: its author and permlink.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentId {
    /// author account name
    pub author: String,
    /// permanent link, unique per author
    pub permlink: String,
}

impl ContentId {
    /// Creates a content id, lowercasing the author name.
    pub fn new(author: &str, permlink: &str) -> Result<Self, ModelsError> {
        if author.is_empty() || permlink.is_empty() || author.contains('/') {
            return Err(ModelsError::InvalidContentId(format!(
                "@{}/{}",
                author, permlink
            )));
        }
        Ok(ContentId {
            author: author.to_ascii_lowercase(),
            permlink: permlink.to_string(),
        })
    }

    /// Key used by the vote store: `author/permlink`.
    pub fn to_key_bytes(&self) -> Vec<u8> {
        format!("{}/{}", self.author, self.permlink).into_bytes()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}/{}", self.author, self.permlink)
    }
}

impl FromStr for ContentId {
    type Err = ModelsError;

    /// ```
    /// # use steemvote_models::comment::ContentId;
    /// # use std::str::FromStr;
    /// let id = ContentId::from_str("@alice/my-first-post").unwrap();
    /// assert_eq!(id.author, "alice");
    /// assert_eq!(id.permlink, "my-first-post");
    /// assert_eq!(id.to_string(), "@alice/my-first-post");
    /// assert!(ContentId::from_str("@alice").is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix('@').unwrap_or(s);
        let (author, permlink) = trimmed
            .split_once('/')
            .ok_or_else(|| ModelsError::InvalidContentId(s.to_string()))?;
        ContentId::new(author, permlink)
    }
}

/// How a candidate reached the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscoveredVia {
    /// published by a tracked author
    Author,
    /// voted on by the named tracked delegate
    Delegate(String),
    /// not classified yet
    Unknown,
}

/// A post or comment that may deserve a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateComment {
    /// content identifier
    pub id: ContentId,
    /// author account name
    pub author: String,
    /// category (main tag) of the root post
    pub category: String,
    /// creation timestamp, as reported by the chain
    pub created_at: SteemTime,
    /// discovery source
    pub discovered_via: DiscoveredVia,
}

impl CandidateComment {
    /// Creates an unclassified candidate.
    pub fn new(id: ContentId, category: &str, created_at: SteemTime) -> Self {
        CandidateComment {
            author: id.author.clone(),
            id,
            category: category.to_ascii_lowercase(),
            created_at,
            discovered_via: DiscoveredVia::Unknown,
        }
    }

    /// Returns the candidate tagged with a discovery source.
    #[must_use]
    pub fn with_source(mut self, discovered_via: DiscoveredVia) -> Self {
        self.discovered_via = discovered_via;
        self
    }

    /// Age of the content at `now`. Content stamped in the future has age zero.
    pub fn age(&self, now: SteemTime) -> SteemTime {
        now.saturating_sub(self.created_at)
    }
}

/// Durable trace of a vote. Written once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// voted content
    pub content_id: ContentId,
    /// time of the successful submission
    pub voted_at: SteemTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_content_id_keeps_slashes_in_permlink() {
        let id = ContentId::new("Bob", "re-alice/2022").unwrap();
        assert_eq!(id.author, "bob");
        assert_eq!(id.to_key_bytes(), b"bob/re-alice/2022".to_vec());
        assert_eq!("@bob/re-alice/2022".parse::<ContentId>().unwrap(), id);
    }

    #[test]
    fn test_content_id_rejects_empty_parts() {
        assert_matches!(
            ContentId::new("", "post"),
            Err(ModelsError::InvalidContentId(_))
        );
        assert_matches!(
            "@alice/".parse::<ContentId>(),
            Err(ModelsError::InvalidContentId(_))
        );
    }

    #[test]
    fn test_candidate_age_saturates() {
        let id = ContentId::new("alice", "post").unwrap();
        let candidate = CandidateComment::new(id, "Life", SteemTime::from_secs(100));
        assert_eq!(candidate.category, "life");
        assert_eq!(
            candidate.age(SteemTime::from_secs(160)),
            SteemTime::from_minutes(1)
        );
        assert_eq!(candidate.age(SteemTime::from_secs(50)), SteemTime::from_millis(0));
    }
}
