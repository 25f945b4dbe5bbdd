//! Configuration for the coordinator (the deploy-time parameters).
//!
//! # Config File Format
//!
//! ```toml
//! chain_id = 1
//! staking_amount_per_module = 1000
//! staking_balance_threshold_per_module = 800
//! inactive_slashing_amount_per_module = 100
//! commit_slashing_amount_per_module = 50
//! execution_tax = 10
//! zero_fee_execution_tax = 4
//! protocol_pool_cut_bps = 1000
//! max_reward_per_execution = 20
//! rounds_per_epoch = 4
//! round_duration = 60
//! round_buffer = 15
//! commit_phase_duration = 120
//! reveal_phase_duration = 120
//! slashing_duration = 180
//! minimum_registration_period = 3600
//! ```
//!
//! Missing keys fall back to `CoordinatorConfig::default()`.

use crate::algorithms::BPS_DENOMINATOR;
use crate::domain::{PhaseDurations, MAX_ROUNDS_PER_EPOCH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Coordinator parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Chain / process identity bound into reveal messages
    pub chain_id: u64,
    /// Stake charged per registered module
    pub staking_amount_per_module: u128,
    /// Balance per module below which an executor is deactivated
    pub staking_balance_threshold_per_module: u128,
    pub inactive_slashing_amount_per_module: u128,
    pub commit_slashing_amount_per_module: u128,
    /// Tax per successful job outside the zero-fee window
    pub execution_tax: u128,
    /// Tax per successful job inside the zero-fee window
    pub zero_fee_execution_tax: u128,
    /// Protocol share of the epoch pool, basis points
    pub protocol_pool_cut_bps: u16,
    pub max_reward_per_execution: u128,
    pub rounds_per_epoch: u32,
    pub round_duration: u64,
    pub round_buffer: u64,
    pub commit_phase_duration: u64,
    pub reveal_phase_duration: u64,
    pub slashing_duration: u64,
    /// Seconds after the last stake / module registration before unstake or
    /// deregistration is allowed
    pub minimum_registration_period: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            staking_amount_per_module: 1_000,
            staking_balance_threshold_per_module: 800,
            inactive_slashing_amount_per_module: 100,
            commit_slashing_amount_per_module: 50,
            execution_tax: 10,
            zero_fee_execution_tax: 4,
            protocol_pool_cut_bps: 1_000,
            max_reward_per_execution: 20,
            rounds_per_epoch: 4,
            round_duration: 60,
            round_buffer: 15,
            commit_phase_duration: 120,
            reveal_phase_duration: 120,
            slashing_duration: 180,
            minimum_registration_period: 3_600,
        }
    }
}

impl CoordinatorConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rounds_per_epoch == 0 {
            return Err(ConfigError::Invalid("rounds_per_epoch must be > 0".into()));
        }
        if self.rounds_per_epoch > MAX_ROUNDS_PER_EPOCH {
            return Err(ConfigError::Invalid(format!(
                "rounds_per_epoch {} exceeds {}",
                self.rounds_per_epoch, MAX_ROUNDS_PER_EPOCH
            )));
        }
        if self.round_duration == 0 {
            return Err(ConfigError::Invalid("round_duration must be > 0".into()));
        }
        if self.commit_phase_duration == 0 || self.reveal_phase_duration == 0 {
            return Err(ConfigError::Invalid(
                "commit and reveal phases must be non-empty".into(),
            ));
        }
        if self.protocol_pool_cut_bps as u128 > BPS_DENOMINATOR {
            return Err(ConfigError::Invalid(format!(
                "protocol_pool_cut_bps {} exceeds {}",
                self.protocol_pool_cut_bps, BPS_DENOMINATOR
            )));
        }
        if self.staking_balance_threshold_per_module > self.staking_amount_per_module {
            return Err(ConfigError::Invalid(
                "deactivation threshold exceeds staking amount".into(),
            ));
        }
        let epoch = (self.round_duration as u128 + self.round_buffer as u128)
            * self.rounds_per_epoch as u128
            + self.commit_phase_duration as u128
            + self.reveal_phase_duration as u128
            + self.slashing_duration as u128;
        if epoch > u64::MAX as u128 / 2 {
            return Err(ConfigError::Invalid("epoch duration overflows".into()));
        }
        Ok(())
    }

    pub fn phase_durations(&self) -> PhaseDurations {
        PhaseDurations {
            commit_phase_duration: self.commit_phase_duration,
            reveal_phase_duration: self.reveal_phase_duration,
            round_duration: self.round_duration,
            round_buffer: self.round_buffer,
            rounds_per_epoch: self.rounds_per_epoch,
            slashing_duration: self.slashing_duration,
        }
    }

    pub fn epoch_duration(&self) -> u64 {
        self.phase_durations().epoch_duration()
    }
}
