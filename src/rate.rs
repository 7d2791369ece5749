//! Fixed-point fractions for interest, fee and collateral rates.
//!
//! A rate is an exact numerator/denominator pair so that applying it to an
//! amount is a single floor mul-div with no intermediate rounding.

use crate::debt::mul_div;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    numerator: U256,
    denominator: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    #[error("Rate denominator must be non-zero")]
    ZeroDenominator,

    #[error("Rate {0} must not exceed one")]
    AboveOne(Rate),

    #[error("Rate cannot be negative: {0}")]
    Negative(Decimal),

    #[error("Rate overflow applying {rate} to {amount}")]
    Overflow { rate: Rate, amount: U256 },
}

impl Rate {
    pub fn new(numerator: impl Into<U256>, denominator: impl Into<U256>) -> Result<Self, RateError> {
        let denominator = denominator.into();
        if denominator.is_zero() {
            return Err(RateError::ZeroDenominator);
        }
        Ok(Self {
            numerator: numerator.into(),
            denominator,
        })
    }

    pub fn zero() -> Self {
        Self {
            numerator: U256::zero(),
            denominator: U256::one(),
        }
    }

    pub fn one() -> Self {
        Self {
            numerator: U256::one(),
            denominator: U256::one(),
        }
    }

    // 0.125 -> 125/1000. exact, no float detour.
    pub fn from_decimal(value: Decimal) -> Result<Self, RateError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(RateError::Negative(value));
        }
        let value = value.normalize();
        let numerator = U256::from(value.mantissa().unsigned_abs());
        let denominator = U256::exp10(value.scale() as usize);
        Self::new(numerator, denominator)
    }

    pub fn percent(pct: u64) -> Self {
        Self {
            numerator: U256::from(pct),
            denominator: U256::from(100u64),
        }
    }

    // 50 bps = 0.5%
    pub fn bps(bps: u64) -> Self {
        Self {
            numerator: U256::from(bps),
            denominator: U256::from(10_000u64),
        }
    }

    pub fn numerator(&self) -> U256 {
        self.numerator
    }

    pub fn denominator(&self) -> U256 {
        self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    /// numerator <= denominator, i.e. the rate never scales an amount up.
    pub fn is_below_one(&self) -> bool {
        self.numerator <= self.denominator
    }

    /// numerator >= denominator.
    pub fn is_above_one(&self) -> bool {
        self.numerator >= self.denominator
    }

    pub fn is_valid(&self) -> bool {
        !self.denominator.is_zero()
    }

    // checks used for fee and interest rates before they are accepted
    pub fn ensure_below_one(self) -> Result<Self, RateError> {
        if !self.is_valid() {
            return Err(RateError::ZeroDenominator);
        }
        if !self.is_below_one() {
            return Err(RateError::AboveOne(self));
        }
        Ok(self)
    }

    /// Compares the fractions by value, 3/6 == 1/2.
    pub fn cmp_value(&self, other: &Rate) -> Ordering {
        self.numerator
            .full_mul(other.denominator)
            .cmp(&other.numerator.full_mul(self.denominator))
    }

    /// amount * numerator / denominator, floored.
    pub fn apply(&self, amount: U256) -> Result<U256, RateError> {
        mul_div(amount, self.numerator, self.denominator).ok_or(RateError::Overflow {
            rate: *self,
            amount,
        })
    }

    // lossy, for display and logs only
    pub fn to_decimal(&self) -> Option<Decimal> {
        let scaled = mul_div(self.numerator, U256::exp10(18), self.denominator)?;
        crate::types::amount_to_decimal(scaled, 18).map(|d| d.normalize())
    }
}

impl Default for Rate {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Some(d) => write!(f, "{}", d),
            None => write!(f, "{}/{}", self.numerator, self.denominator),
        }
    }
}
