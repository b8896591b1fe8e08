// Copyright (c) 2022 THE STEEMVOTE AUTHORS

//! Curation policy: who is tracked, at which priority, and under which
//! age and voting power constraints a vote may be cast.
//!
//! A `Policy` is built once from `PolicySettings` and never mutated, so it
//! can be shared between the monitor and the engine behind an `Arc`.

use crate::comment::{CandidateComment, DiscoveredVia};
use crate::error::{ModelsError, ModelsResult};
use crate::priority::PriorityLevel;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use steemvote_time::SteemTime;

/// An account whose own content is eligible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorEntry {
    /// account name
    pub name: String,
    /// priority tier
    #[serde(default)]
    pub priority: PriorityLevel,
}

/// An account whose votes are trusted as curation signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateEntry {
    /// account name
    pub name: String,
    /// priority tier
    #[serde(default)]
    pub priority: PriorityLevel,
}

/// Minimum voting power (fraction in `[0, 1]`) required per tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VotingPowerPolicy {
    /// threshold for low priority content
    pub low: f64,
    /// threshold for normal priority content
    pub normal: f64,
    /// threshold for high priority content
    pub high: f64,
}

impl VotingPowerPolicy {
    /// Threshold for a tier.
    pub fn min_voting_power_for(&self, priority: PriorityLevel) -> f64 {
        match priority {
            PriorityLevel::Low => self.low,
            PriorityLevel::Normal => self.normal,
            PriorityLevel::High => self.high,
        }
    }

    fn validate(&self) -> ModelsResult<()> {
        for priority in PriorityLevel::ALL {
            let value = self.min_voting_power_for(priority);
            if !(0.0..=1.0).contains(&value) {
                return Err(ModelsError::ConfigError(format!(
                    "voting power threshold for {} priority must be within [0, 1], got {}",
                    priority, value
                )));
            }
        }
        if !(self.low >= self.normal && self.normal >= self.high) {
            return Err(ModelsError::ConfigError(
                "voting power thresholds must be ordered as follows: low >= normal >= high"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Where a content age falls relative to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgePosition {
    /// younger than `min_post_age`
    TooYoung,
    /// within the window, bounds included
    Within,
    /// older than `max_post_age`
    TooOld,
}

/// Accepted content age range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeWindow {
    /// minimum age before voting
    pub min_post_age: SteemTime,
    /// maximum age after which content is never voted
    pub max_post_age: SteemTime,
}

impl AgeWindow {
    /// Creates a window, failing if `min_post_age > max_post_age`.
    pub fn new(min_post_age: SteemTime, max_post_age: SteemTime) -> ModelsResult<Self> {
        if min_post_age > max_post_age {
            return Err(ModelsError::ConfigError(
                "minimum post age cannot be more than maximum post age".to_string(),
            ));
        }
        Ok(AgeWindow {
            min_post_age,
            max_post_age,
        })
    }

    /// Positions an age relative to the window.
    pub fn position(&self, age: SteemTime) -> AgePosition {
        if age < self.min_post_age {
            AgePosition::TooYoung
        } else if age > self.max_post_age {
            AgePosition::TooOld
        } else {
            AgePosition::Within
        }
    }
}

/// Excluded authors and categories. Names are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlacklistSet {
    /// excluded authors
    pub authors: BTreeSet<String>,
    /// excluded categories
    pub categories: BTreeSet<String>,
}

impl BlacklistSet {
    /// Builds the set from raw names.
    pub fn new<A, C>(authors: A, categories: C) -> Self
    where
        A: IntoIterator<Item = String>,
        C: IntoIterator<Item = String>,
    {
        BlacklistSet {
            authors: authors
                .into_iter()
                .map(|name| name.to_ascii_lowercase())
                .collect(),
            categories: categories
                .into_iter()
                .map(|name| name.to_ascii_lowercase())
                .collect(),
        }
    }

    /// true if either the author or the category is excluded
    pub fn contains(&self, author: &str, category: &str) -> bool {
        self.authors.contains(&author.to_ascii_lowercase())
            || self.categories.contains(&category.to_ascii_lowercase())
    }
}

/// Raw policy settings, as read from the configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicySettings {
    /// minimum content age (millis)
    pub min_post_age: SteemTime,
    /// maximum content age (millis)
    pub max_post_age: SteemTime,
    /// minimum voting power for low priority content, in `[0, 1]`
    pub priority_low: f64,
    /// minimum voting power for normal priority content, in `[0, 1]`
    pub priority_normal: f64,
    /// minimum voting power for high priority content, in `[0, 1]`
    pub priority_high: f64,
    /// tracked authors
    #[serde(default)]
    pub authors: Vec<AuthorEntry>,
    /// trusted delegates
    #[serde(default)]
    pub delegates: Vec<DelegateEntry>,
    /// excluded authors
    #[serde(default)]
    pub blacklist_authors: Vec<String>,
    /// excluded categories
    #[serde(default)]
    pub blacklist_categories: Vec<String>,
}

/// Validated, immutable curation policy.
#[derive(Debug, Clone)]
pub struct Policy {
    authors: BTreeMap<String, PriorityLevel>,
    delegates: BTreeMap<String, PriorityLevel>,
    voting_power: VotingPowerPolicy,
    age_window: AgeWindow,
    blacklist: BlacklistSet,
}

fn unique_names<I>(list_name: &str, entries: I) -> ModelsResult<BTreeMap<String, PriorityLevel>>
where
    I: IntoIterator<Item = (String, PriorityLevel)>,
{
    let mut map = BTreeMap::new();
    for (name, priority) in entries {
        let name = name.to_ascii_lowercase();
        if name.is_empty() {
            return Err(ModelsError::ConfigError(format!(
                "empty account name in {} list",
                list_name
            )));
        }
        if map.insert(name.clone(), priority).is_some() {
            return Err(ModelsError::ConfigError(format!(
                "account {} appears twice in {} list",
                name, list_name
            )));
        }
    }
    Ok(map)
}

impl Policy {
    /// Validates the settings and builds the policy.
    pub fn new(settings: PolicySettings) -> ModelsResult<Self> {
        let age_window = AgeWindow::new(settings.min_post_age, settings.max_post_age)?;
        let voting_power = VotingPowerPolicy {
            low: settings.priority_low,
            normal: settings.priority_normal,
            high: settings.priority_high,
        };
        voting_power.validate()?;
        let authors = unique_names(
            "author",
            settings.authors.into_iter().map(|e| (e.name, e.priority)),
        )?;
        let delegates = unique_names(
            "delegate",
            settings.delegates.into_iter().map(|e| (e.name, e.priority)),
        )?;
        Ok(Policy {
            authors,
            delegates,
            voting_power,
            age_window,
            blacklist: BlacklistSet::new(
                settings.blacklist_authors,
                settings.blacklist_categories,
            ),
        })
    }

    /// Priority of an account in either list. An account listed as both
    /// author and delegate gets the higher of its two priorities.
    pub fn priority_of(&self, account: &str) -> Option<PriorityLevel> {
        let account = account.to_ascii_lowercase();
        let as_author = self.authors.get(&account).copied();
        let as_delegate = self.delegates.get(&account).copied();
        as_author.max(as_delegate)
    }

    /// Priority a candidate is evaluated at: the author's priority when the
    /// author is tracked, raised to the delegate's priority when the content
    /// was surfaced by a trusted delegate.
    pub fn priority_for(&self, candidate: &CandidateComment) -> Option<PriorityLevel> {
        let from_author = if self.is_tracked_author(&candidate.author) {
            self.priority_of(&candidate.author)
        } else {
            None
        };
        let from_delegate = match &candidate.discovered_via {
            DiscoveredVia::Delegate(name) => self
                .delegates
                .get(&name.to_ascii_lowercase())
                .copied(),
            DiscoveredVia::Author | DiscoveredVia::Unknown => None,
        };
        from_author.max(from_delegate)
    }

    /// true if the author is in the author list
    pub fn is_tracked_author(&self, account: &str) -> bool {
        self.authors.contains_key(&account.to_ascii_lowercase())
    }

    /// true if the account is in the delegate list
    pub fn is_tracked_delegate(&self, account: &str) -> bool {
        self.delegates.contains_key(&account.to_ascii_lowercase())
    }

    /// Blacklist check. Always wins over priority and voting power.
    pub fn is_blacklisted(&self, author: &str, category: &str) -> bool {
        self.blacklist.contains(author, category)
    }

    /// Minimum voting power for a tier.
    pub fn min_voting_power_for(&self, priority: PriorityLevel) -> f64 {
        self.voting_power.min_voting_power_for(priority)
    }

    /// Accepted age range.
    pub fn age_window(&self) -> AgeWindow {
        self.age_window
    }

    /// Tracked authors, sorted by name.
    pub fn authors(&self) -> Vec<AuthorEntry> {
        self.authors
            .iter()
            .map(|(name, priority)| AuthorEntry {
                name: name.clone(),
                priority: *priority,
            })
            .collect()
    }

    /// Trusted delegates, sorted by name.
    pub fn delegates(&self) -> Vec<DelegateEntry> {
        self.delegates
            .iter()
            .map(|(name, priority)| DelegateEntry {
                name: name.clone(),
                priority: *priority,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::ContentId;
    use assert_matches::assert_matches;

    fn settings() -> PolicySettings {
        PolicySettings {
            min_post_age: SteemTime::from_minutes(1),
            max_post_age: SteemTime::from_minutes(7 * 24 * 60),
            priority_low: 0.9,
            priority_normal: 0.8,
            priority_high: 0.75,
            authors: vec![
                AuthorEntry {
                    name: "alice".into(),
                    priority: PriorityLevel::High,
                },
                AuthorEntry {
                    name: "carol".into(),
                    priority: PriorityLevel::Low,
                },
            ],
            delegates: vec![
                DelegateEntry {
                    name: "carol".into(),
                    priority: PriorityLevel::Normal,
                },
                DelegateEntry {
                    name: "dave".into(),
                    priority: PriorityLevel::High,
                },
            ],
            blacklist_authors: vec!["Mallory".into()],
            blacklist_categories: vec!["spam".into()],
        }
    }

    fn candidate(author: &str, category: &str, via: DiscoveredVia) -> CandidateComment {
        CandidateComment::new(
            ContentId::new(author, "post").unwrap(),
            category,
            SteemTime::from_millis(0),
        )
        .with_source(via)
    }

    #[test]
    fn test_higher_priority_wins_across_lists() {
        let policy = Policy::new(settings()).unwrap();
        assert_eq!(policy.priority_of("carol"), Some(PriorityLevel::Normal));
        assert_eq!(policy.priority_of("alice"), Some(PriorityLevel::High));
        assert_eq!(policy.priority_of("nobody"), None);
    }

    #[test]
    fn test_priority_for_candidate() {
        let policy = Policy::new(settings()).unwrap();
        let by_alice = candidate("alice", "life", DiscoveredVia::Author);
        assert_eq!(policy.priority_for(&by_alice), Some(PriorityLevel::High));

        let by_stranger = candidate("erin", "life", DiscoveredVia::Unknown);
        assert_eq!(policy.priority_for(&by_stranger), None);

        let curated = candidate("erin", "life", DiscoveredVia::Delegate("dave".into()));
        assert_eq!(policy.priority_for(&curated), Some(PriorityLevel::High));

        // delegates' own posts are not eligible through the author path
        let by_dave = candidate("dave", "life", DiscoveredVia::Unknown);
        assert_eq!(policy.priority_for(&by_dave), None);
    }

    #[test]
    fn test_blacklist_is_case_insensitive() {
        let policy = Policy::new(settings()).unwrap();
        assert!(policy.is_blacklisted("mallory", "life"));
        assert!(policy.is_blacklisted("alice", "SPAM"));
        assert!(!policy.is_blacklisted("alice", "life"));
    }

    #[test]
    fn test_lists_are_sorted_by_name() {
        let mut raw = settings();
        raw.authors.reverse();
        let policy = Policy::new(raw).unwrap();
        let names: Vec<String> = policy.authors().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["alice".to_string(), "carol".to_string()]);
    }

    #[test]
    fn test_age_window_positions() {
        let window = Policy::new(settings()).unwrap().age_window();
        assert_eq!(window.position(SteemTime::from_secs(30)), AgePosition::TooYoung);
        assert_eq!(window.position(SteemTime::from_minutes(1)), AgePosition::Within);
        assert_eq!(window.position(SteemTime::from_minutes(2)), AgePosition::Within);
        assert_eq!(
            window.position(SteemTime::from_minutes(7 * 24 * 60 + 1)),
            AgePosition::TooOld
        );
    }

    #[test]
    fn test_invalid_settings() {
        let mut raw = settings();
        raw.min_post_age = SteemTime::from_minutes(10);
        raw.max_post_age = SteemTime::from_minutes(5);
        assert_matches!(Policy::new(raw), Err(ModelsError::ConfigError(_)));

        let mut raw = settings();
        raw.priority_high = 0.95;
        assert_matches!(Policy::new(raw), Err(ModelsError::ConfigError(_)));

        let mut raw = settings();
        raw.priority_low = 1.5;
        assert_matches!(Policy::new(raw), Err(ModelsError::ConfigError(_)));

        let mut raw = settings();
        raw.authors.push(AuthorEntry {
            name: "ALICE".into(),
            priority: PriorityLevel::Low,
        });
        assert_matches!(Policy::new(raw), Err(ModelsError::ConfigError(_)));
    }
}
