// 1.0: all the primitives live here. account ids, amounts, timestamps.
// amounts are raw token units in U256; Decimal only shows up at the human edge.

use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u64);

impl AccountId {
    // the zero id is reserved, adapters reject it the way tokens reject address(0)
    pub const ZERO: AccountId = AccountId(0);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// 1.1: raw token amount. collateral, debt, portions and fees all use this.
pub type Amount = U256;

/// Decimals of the stable asset and of normalized USD values.
pub const WAD_DECIMALS: u32 = 18;

pub fn wad() -> U256 {
    U256::exp10(WAD_DECIMALS as usize)
}

// 1.2: Decimal -> raw units. truncates digits beyond `decimals`, rejects negatives.
pub fn amount_from_decimal(value: Decimal, decimals: u32) -> Option<Amount> {
    if value.is_sign_negative() {
        return None;
    }
    let value = value.normalize();
    let mantissa = U256::from(u128::try_from(value.mantissa()).ok()?);
    let scale = value.scale();

    if scale <= decimals {
        mantissa.checked_mul(U256::exp10((decimals - scale) as usize))
    } else {
        Some(mantissa / U256::exp10((scale - decimals) as usize))
    }
}

// 1.3: raw units -> Decimal for display. None if it doesn't fit a Decimal.
pub fn amount_to_decimal(amount: Amount, decimals: u32) -> Option<Decimal> {
    if amount > U256::from(i128::MAX as u128) {
        return None;
    }
    Decimal::try_from_i128_with_scale(amount.as_u128() as i128, decimals).ok()
}

// 1.4: unix timestamp in seconds. interest accrues per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp().max(0) as u64)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    // clock never runs backwards for accrual purposes
    pub fn seconds_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decimal_to_wad_units() {
        assert_eq!(amount_from_decimal(dec!(1), 18).unwrap(), wad());
        assert_eq!(
            amount_from_decimal(dec!(1000.5), 18).unwrap(),
            U256::from(1_000_500_000_000_000_000_000u128)
        );
        // digits past the token precision are dropped
        assert_eq!(amount_from_decimal(dec!(1.239), 2).unwrap(), U256::from(123));
        assert!(amount_from_decimal(dec!(-1), 18).is_none());
    }

    #[test]
    fn wad_units_to_decimal() {
        let amount = U256::from(2_500_000_000_000_000_000u128);
        assert_eq!(amount_to_decimal(amount, 18).unwrap(), dec!(2.5));
        assert!(amount_to_decimal(U256::MAX, 18).is_none());
    }

    #[test]
    fn timestamp_elapsed_saturates() {
        let t0 = Timestamp::from_secs(100);
        let t1 = t0.plus_secs(50);
        assert_eq!(t1.seconds_since(t0), 50);
        assert_eq!(t0.seconds_since(t1), 0);
    }
}
