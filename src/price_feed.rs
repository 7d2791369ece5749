// Price Feed Integration
//
// The engine never talks to an oracle network directly. A feed implements
// `PriceFeed` (latest round + decimals, the shape Chainlink-style aggregators
// expose) and the valuation layer normalizes whatever it returns to 18 decimals.

use crate::types::{Timestamp, WAD_DECIMALS};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Largest power of ten a U256 can hold.
const MAX_EXP10: u32 = 77;

/// One answer from a feed. `answer` is signed because aggregators are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundData {
    pub answer: i128,
    pub updated_at: Timestamp,
}

impl RoundData {
    pub fn new(answer: i128, updated_at: Timestamp) -> Self {
        Self { answer, updated_at }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("Invalid oracle result: answer {answer}, updated at {updated_at}")]
    InvalidOracleResult { answer: i128, updated_at: Timestamp },

    #[error("Stale price: {age}s old, max {max_age}s")]
    StalePrice { age: u64, max_age: u64 },

    #[error("Price feed unavailable")]
    FeedUnavailable,

    #[error("Price normalization overflow ({decimals} feed decimals)")]
    Overflow { decimals: u8 },
}

/// Source of raw collateral prices in USD.
pub trait PriceFeed: fmt::Debug {
    fn latest_round(&self) -> Result<RoundData, OracleError>;

    fn decimals(&self) -> u8;
}

// scale a positive feed answer to 18 decimals
pub fn normalize_price(answer: U256, feed_decimals: u8) -> Result<U256, OracleError> {
    let overflow = OracleError::Overflow {
        decimals: feed_decimals,
    };
    let feed_decimals_u32 = u32::from(feed_decimals);

    if feed_decimals_u32 <= WAD_DECIMALS {
        let gap = WAD_DECIMALS - feed_decimals_u32;
        answer.checked_mul(U256::exp10(gap as usize)).ok_or(overflow)
    } else {
        let gap = feed_decimals_u32 - WAD_DECIMALS;
        if gap > MAX_EXP10 {
            return Err(overflow);
        }
        Ok(answer / U256::exp10(gap as usize))
    }
}

/// Test and simulation feed. Clones share one round, so a caller can keep a
/// handle and move the price after handing the feed to the engine.
#[derive(Debug, Clone)]
pub struct MockPriceFeed {
    round: Rc<Cell<RoundData>>,
    healthy: Rc<Cell<bool>>,
    decimals: u8,
}

impl MockPriceFeed {
    pub fn new(answer: i128, decimals: u8, updated_at: Timestamp) -> Self {
        Self {
            round: Rc::new(Cell::new(RoundData::new(answer, updated_at))),
            healthy: Rc::new(Cell::new(true)),
            decimals,
        }
    }

    pub fn set_round(&self, answer: i128, updated_at: Timestamp) {
        self.round.set(RoundData::new(answer, updated_at));
    }

    pub fn set_answer(&self, answer: i128) {
        let round = self.round.get();
        self.round.set(RoundData::new(answer, round.updated_at));
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.set(healthy);
    }

    pub fn round(&self) -> RoundData {
        self.round.get()
    }
}

impl PriceFeed for MockPriceFeed {
    fn latest_round(&self) -> Result<RoundData, OracleError> {
        if !self.healthy.get() {
            return Err(OracleError::FeedUnavailable);
        }
        Ok(self.round.get())
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }
}
