//! Collateral valuation: feed price -> USD value -> credit and liquidation limits.
//!
//! The credit limit caps new borrowing. The liquidation limit is the debt level at
//! which a position can be seized; it is normally the higher of the two, so a
//! position that just maxed out its credit is not immediately liquidatable.
//! Both multipliers are policies looked up per account and amount.

use crate::debt::mul_div;
use crate::price_feed::{normalize_price, OracleError, PriceFeed};
use crate::rate::{Rate, RateError};
use crate::types::{AccountId, Amount, Timestamp};
use primitive_types::U256;
use std::fmt;

/// Rate multiplier applied to a collateral USD value.
pub trait RatePolicy: fmt::Debug {
    fn rate(&self, account: AccountId, collateral_amount: Amount) -> Rate;
}

/// Same rate for every account and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatRate(pub Rate);

impl RatePolicy for FlatRate {
    fn rate(&self, _account: AccountId, _collateral_amount: Amount) -> Rate {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValuationError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Rate(#[from] RateError),

    #[error("Collateral value overflow")]
    Overflow,
}

#[derive(Debug)]
pub struct OracleAdapter {
    feed: Box<dyn PriceFeed>,
    collateral_decimals: u32,
    max_price_age: Option<u64>,
    credit_limit_rate: Box<dyn RatePolicy>,
    liquidation_limit_rate: Box<dyn RatePolicy>,
}

impl OracleAdapter {
    pub fn new(feed: Box<dyn PriceFeed>, collateral_decimals: u32) -> Self {
        Self {
            feed,
            collateral_decimals,
            max_price_age: None,
            credit_limit_rate: Box::new(FlatRate(Rate::zero())),
            liquidation_limit_rate: Box::new(FlatRate(Rate::zero())),
        }
    }

    pub fn with_max_price_age(mut self, max_age_secs: Option<u64>) -> Self {
        self.max_price_age = max_age_secs;
        self
    }

    pub fn with_credit_limit_rate(mut self, policy: Box<dyn RatePolicy>) -> Self {
        self.credit_limit_rate = policy;
        self
    }

    pub fn with_liquidation_limit_rate(mut self, policy: Box<dyn RatePolicy>) -> Self {
        self.liquidation_limit_rate = policy;
        self
    }

    pub fn collateral_decimals(&self) -> u32 {
        self.collateral_decimals
    }

    /// USD per whole collateral token, 18 decimals.
    pub fn price(&self, now: Timestamp) -> Result<U256, OracleError> {
        let round = self.feed.latest_round()?;

        if round.answer <= 0 || round.updated_at.is_zero() {
            return Err(OracleError::InvalidOracleResult {
                answer: round.answer,
                updated_at: round.updated_at,
            });
        }

        if let Some(max_age) = self.max_price_age {
            let age = now.seconds_since(round.updated_at);
            if age > max_age {
                return Err(OracleError::StalePrice { age, max_age });
            }
        }

        normalize_price(U256::from(round.answer as u128), self.feed.decimals())
    }

    /// USD value (18 decimals) of `amount` raw collateral units.
    pub fn usd_value(&self, amount: Amount, now: Timestamp) -> Result<U256, ValuationError> {
        if amount.is_zero() {
            return Ok(U256::zero());
        }
        let price = self.price(now)?;
        mul_div(price, amount, U256::exp10(self.collateral_decimals as usize))
            .ok_or(ValuationError::Overflow)
    }

    pub fn credit_limit(
        &self,
        account: AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<U256, ValuationError> {
        let value = self.usd_value(amount, now)?;
        Ok(self.credit_limit_rate.rate(account, amount).apply(value)?)
    }

    pub fn liquidation_limit(
        &self,
        account: AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<U256, ValuationError> {
        let value = self.usd_value(amount, now)?;
        Ok(self.liquidation_limit_rate.rate(account, amount).apply(value)?)
    }
}
