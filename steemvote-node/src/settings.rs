// Copyright (c) 2022 THE STEEMVOTE AUTHORS

//! Build here the default node settings from the configuration file toml
use displaydoc::Display;
use serde::Deserialize;
use std::path::Path;
use steemvote_chain_exports::ChainConfig;
use steemvote_db_exports::VoteStoreConfig;
use steemvote_engine_exports::{EngineConfig, MonitorConfig};
use steemvote_models::settings::build_steemvote_settings;
use steemvote_models::{ModelsError, Policy, PolicySettings};
use steemvote_time::SteemTime;
use thiserror::Error;

/// Shortest accepted vote interval
pub const MIN_VOTE_INTERVAL: SteemTime = SteemTime::from_secs(1);
/// Full vote weight, in basis points
pub const MAX_VOTE_WEIGHT: u16 = 10_000;

/// node settings error
#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum SettingsError {
    /// configuration error: {0}
    ConfigError(String),
    /// invalid policy: {0}
    PolicyError(#[from] ModelsError),
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineSettings {
    pub vote_interval: SteemTime,
    pub update_interval: SteemTime,
    pub max_vote_attempts: u32,
    pub intake_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorSettings {
    pub poll_interval: SteemTime,
    pub content_batch_size: u32,
    pub listing_timeout: SteemTime,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub chain: ChainConfig,
    pub policy: PolicySettings,
    pub engine: EngineSettings,
    pub monitor: MonitorSettings,
    pub store: VoteStoreConfig,
}

fn config_error(message: &str) -> SettingsError {
    SettingsError::ConfigError(message.to_string())
}

impl Settings {
    /// Reads the settings, `override_path` replacing the default override file.
    pub fn load(override_path: Option<&Path>) -> Result<Settings, SettingsError> {
        Ok(build_steemvote_settings(
            "steemvote-node",
            "STEEMVOTE",
            override_path,
        )?)
    }

    /// Checks the settings and builds the curation policy.
    pub fn validate(&self) -> Result<Policy, SettingsError> {
        if self.engine.vote_interval < MIN_VOTE_INTERVAL {
            return Err(config_error(
                "engine.vote_interval must be at least 1000 ms",
            ));
        }
        if self.engine.update_interval == SteemTime::from_millis(0) {
            return Err(config_error("engine.update_interval must not be zero"));
        }
        if self.engine.max_vote_attempts == 0 {
            return Err(config_error("engine.max_vote_attempts must not be zero"));
        }
        if self.engine.intake_capacity == 0 {
            return Err(config_error("engine.intake_capacity must not be zero"));
        }
        if self.monitor.poll_interval == SteemTime::from_millis(0) {
            return Err(config_error("monitor.poll_interval must not be zero"));
        }
        if self.monitor.content_batch_size == 0 {
            return Err(config_error("monitor.content_batch_size must not be zero"));
        }
        if self.chain.rpc_timeout == SteemTime::from_millis(0) {
            return Err(config_error("chain.rpc_timeout must not be zero"));
        }
        if self.monitor.listing_timeout < self.chain.rpc_timeout {
            return Err(config_error(
                "monitor.listing_timeout must not be shorter than chain.rpc_timeout",
            ));
        }
        if !(1..=MAX_VOTE_WEIGHT).contains(&self.chain.vote_weight) {
            return Err(config_error("chain.vote_weight must be between 1 and 10000"));
        }
        if self.chain.voter.is_empty() {
            return Err(config_error("chain.voter must be set"));
        }
        Ok(Policy::new(self.policy.clone())?)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            voter: self.chain.voter.clone(),
            vote_weight: self.chain.vote_weight,
            vote_interval: self.engine.vote_interval,
            rpc_timeout: self.chain.rpc_timeout,
            max_vote_attempts: self.engine.max_vote_attempts,
        }
    }

    /// Monitor configuration, looking for content created after `start_from`.
    pub fn monitor_config(&self, start_from: SteemTime) -> MonitorConfig {
        MonitorConfig {
            poll_interval: self.monitor.poll_interval,
            listing_timeout: self.monitor.listing_timeout,
            start_from,
        }
    }
}
