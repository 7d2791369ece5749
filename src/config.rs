// 7.0 config.rs: all settings in one place. rates, caps, oracle params, presets.
// 7.1 VaultSettings is the governance-owned part, replaced whole on update.

use crate::engine::EngineConfig;
use crate::rate::{Rate, RateError};
use crate::types::{wad, Amount};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/** 7.1: borrowing terms. both rates must stay at or below one */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSettings {
    // Yearly simple interest on outstanding debt
    pub debt_interest_apr: Rate,
    // One-off fee taken from each borrow
    pub organization_fee_rate: Rate,
    // Hard cap on the pool's total debt
    pub borrow_amount_cap: Amount,
    // Smallest borrow, and smallest principal a partial repay may leave behind
    pub min_borrow_amount: Amount,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            debt_interest_apr: Rate::percent(5),
            organization_fee_rate: Rate::bps(50), // 0.5%
            borrow_amount_cap: U256::from(10_000_000u64) * wad(),
            min_borrow_amount: U256::from(100u64) * wad(),
        }
    }
}

impl VaultSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.debt_interest_apr
            .ensure_below_one()
            .map_err(|source| ConfigError::InvalidRate {
                field: "debt_interest_apr",
                source,
            })?;
        self.organization_fee_rate
            .ensure_below_one()
            .map_err(|source| ConfigError::InvalidRate {
                field: "organization_fee_rate",
                source,
            })?;

        if self.min_borrow_amount > self.borrow_amount_cap {
            return Err(ConfigError::InvalidSettings {
                reason: "min borrow exceeds borrow cap".to_string(),
            });
        }
        Ok(())
    }
}

// 7.2: valuation parameters for the single collateral asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleParams {
    // Decimals of the raw collateral token
    pub collateral_decimals: u32,
    // Share of collateral value that can be borrowed
    pub credit_limit_rate: Rate,
    // Share of collateral value at which debt becomes liquidatable
    pub liquidation_limit_rate: Rate,
    // Reject feed rounds older than this. None = only zero checks
    pub max_price_age_secs: Option<u64>,
}

impl Default for OracleParams {
    fn default() -> Self {
        Self {
            collateral_decimals: 18,
            credit_limit_rate: Rate::percent(75),
            liquidation_limit_rate: Rate::percent(85),
            max_price_age_secs: None,
        }
    }
}

/// The complete vault configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    pub settings: VaultSettings,
    pub oracle: OracleParams,
    pub engine: EngineConfig,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            settings: VaultSettings::default(),
            oracle: OracleParams::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl VaultConfig {
    // Lower LTVs, higher rates, staleness checks on
    pub fn conservative() -> Self {
        let mut config = Self::default();
        config.settings.debt_interest_apr = Rate::percent(8);
        config.settings.organization_fee_rate = Rate::percent(1);
        config.settings.borrow_amount_cap = U256::from(1_000_000u64) * wad();
        config.settings.min_borrow_amount = U256::from(500u64) * wad();
        config.oracle.credit_limit_rate = Rate::percent(50);
        config.oracle.liquidation_limit_rate = Rate::percent(66);
        config.oracle.max_price_age_secs = Some(3600);
        config
    }

    // Free borrowing and tiny minimums for test deployments
    pub fn testnet() -> Self {
        let mut config = Self::default();
        config.settings.debt_interest_apr = Rate::percent(1);
        config.settings.organization_fee_rate = Rate::zero();
        config.settings.min_borrow_amount = U256::one();
        config
    }

    // Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.settings.validate()?;

        for (field, rate) in [
            ("credit_limit_rate", self.oracle.credit_limit_rate),
            ("liquidation_limit_rate", self.oracle.liquidation_limit_rate),
        ] {
            rate.ensure_below_one()
                .map_err(|source| ConfigError::InvalidRate { field, source })?;
        }

        // liquidation must start at a worse collateral ratio than borrowing stops,
        // or a maxed-out borrow is liquidatable on the spot
        if self
            .oracle
            .liquidation_limit_rate
            .cmp_value(&self.oracle.credit_limit_rate)
            == Ordering::Less
        {
            return Err(ConfigError::InvalidOracle {
                reason: "liquidation limit rate below credit limit rate".to_string(),
            });
        }

        if self.oracle.collateral_decimals > 36 {
            return Err(ConfigError::InvalidOracle {
                reason: "collateral decimals above 36".to_string(),
            });
        }

        if self.engine.max_events == 0 {
            return Err(ConfigError::InvalidEngine {
                reason: "event buffer must hold at least one event".to_string(),
            });
        }

        Ok(())
    }
}

// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {field}: {source}")]
    InvalidRate {
        field: &'static str,
        #[source]
        source: RateError,
    },

    #[error("Invalid settings: {reason}")]
    InvalidSettings { reason: String },

    #[error("Invalid oracle params: {reason}")]
    InvalidOracle { reason: String },

    #[error("Invalid engine params: {reason}")]
    InvalidEngine { reason: String },
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Testnet,
    Mainnet,
}

impl Environment {
    pub fn config(&self) -> VaultConfig {
        match self {
            Environment::Development => VaultConfig::default(),
            Environment::Testnet => VaultConfig::testnet(),
            Environment::Mainnet => VaultConfig::conservative(),
        }
    }
}
