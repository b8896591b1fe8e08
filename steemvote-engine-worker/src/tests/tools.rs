// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use crate::VotingEngine;
use std::sync::Arc;
use steemvote_chain_exports::test_exports::TestChain;
use steemvote_db_exports::{VoteStoreConfig, VoteStoreController};
use steemvote_db_worker::VoteStore;
use steemvote_engine_exports::{intake_channel, EngineConfig, IntakeSender, MonitorConfig};
use steemvote_models::{
    AuthorEntry, CandidateComment, ContentId, DelegateEntry, Policy, PolicySettings,
    PriorityLevel,
};
use steemvote_time::SteemTime;
use tempfile::TempDir;

pub const VOTER: &str = "curator";
pub const VOTE_WEIGHT: u16 = 10_000;

/// Policy used by most scenarios: alice is a high priority author, bob a
/// normal one, dave a high priority delegate, mallory is blacklisted and so
/// is the `spam` category.
pub fn policy_settings() -> PolicySettings {
    PolicySettings {
        min_post_age: SteemTime::from_minutes(1),
        max_post_age: SteemTime::from_minutes(7 * 24 * 60),
        priority_low: 0.9,
        priority_normal: 0.8,
        priority_high: 0.75,
        authors: vec![
            AuthorEntry {
                name: "alice".to_string(),
                priority: PriorityLevel::High,
            },
            AuthorEntry {
                name: "bob".to_string(),
                priority: PriorityLevel::Normal,
            },
            AuthorEntry {
                name: "mallory".to_string(),
                priority: PriorityLevel::High,
            },
        ],
        delegates: vec![DelegateEntry {
            name: "dave".to_string(),
            priority: PriorityLevel::High,
        }],
        blacklist_authors: vec!["mallory".to_string()],
        blacklist_categories: vec!["spam".to_string()],
    }
}

pub fn engine_config() -> EngineConfig {
    EngineConfig {
        voter: VOTER.to_string(),
        vote_weight: VOTE_WEIGHT,
        vote_interval: SteemTime::from_secs(1),
        rpc_timeout: SteemTime::from_secs(1),
        max_vote_attempts: 3,
    }
}

pub fn monitor_config() -> MonitorConfig {
    MonitorConfig {
        poll_interval: SteemTime::from_millis(100),
        listing_timeout: SteemTime::from_secs(1),
        start_from: SteemTime::from_millis(0),
    }
}

/// A candidate created `age` ago
pub fn candidate_aged(author: &str, permlink: &str, age: SteemTime) -> CandidateComment {
    let created_at = SteemTime::now().unwrap().saturating_sub(age);
    CandidateComment::new(ContentId::new(author, permlink).unwrap(), "life", created_at)
}

pub fn content_id(author: &str, permlink: &str) -> ContentId {
    ContentId::new(author, permlink).unwrap()
}

/// Engine wired to a scripted chain and a vote store in a temp folder
pub struct EngineTestContext {
    pub engine: VotingEngine,
    pub chain: TestChain,
    pub store: Arc<VoteStore>,
    pub intake: IntakeSender,
    /// keeps the store folder alive
    _temp_dir: TempDir,
}

impl EngineTestContext {
    pub fn new(config: EngineConfig, settings: PolicySettings, voting_power: f64) -> Self {
        let temp_dir = tempfile::tempdir().expect("Unable to create a temp folder");
        let store = Arc::new(
            VoteStore::open(VoteStoreConfig {
                path: temp_dir.path().to_path_buf(),
            })
            .unwrap(),
        );
        let chain = TestChain::new();
        chain.set_voting_power(VOTER, voting_power);
        let (intake, intake_rx) = intake_channel(64);
        let engine = VotingEngine::new(
            config,
            Arc::new(Policy::new(settings).unwrap()),
            Arc::new(chain.clone()),
            store.clone(),
            intake_rx,
        );
        EngineTestContext {
            engine,
            chain,
            store,
            intake,
            _temp_dir: temp_dir,
        }
    }

    pub fn with_voting_power(voting_power: f64) -> Self {
        Self::new(engine_config(), policy_settings(), voting_power)
    }

    pub async fn discover(&self, candidate: CandidateComment) {
        self.intake.send(candidate).await.unwrap();
    }

    pub fn has_voted(&self, content_id: &ContentId) -> bool {
        self.store.has_voted(content_id).unwrap()
    }

    pub fn submitted(&self) -> Vec<ContentId> {
        self.chain
            .submitted_votes()
            .into_iter()
            .map(|(content_id, _)| content_id)
            .collect()
    }
}
