// 3.0 debt.rs: the shared debt pool.
// positions hold a portion of the pool, the pool holds the debt. accrual only
// touches the pool, so interest lands on every position in O(1).
// 3.1 portion math, 3.2 accrual, 3.3 GlobalLedger.

use crate::rate::Rate;
use crate::types::{Amount, Timestamp};
use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};

/// 365.25 days.
pub const SECONDS_PER_YEAR: u64 = 31_557_600;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Arithmetic overflow in debt ledger")]
    Overflow,

    #[error("Debt ledger underflow: {0}")]
    Underflow(&'static str),
}

/// a * b / c with a 512-bit intermediate, floored. None on c == 0 or overflow.
pub fn mul_div(a: U256, b: U256, c: U256) -> Option<U256> {
    if c.is_zero() {
        return None;
    }
    let q = a.full_mul(b) / U512::from(c);
    U256::try_from(q).ok()
}

// 3.1: amount -> portion at the current exchange rate.
// an empty pool (or a pool whose debt rounded away) bootstraps 1:1.
pub fn portion_for(amount: Amount, total_portion: U256, total_debt: Amount) -> Result<U256, LedgerError> {
    if total_portion.is_zero() || total_debt.is_zero() {
        return Ok(amount);
    }
    mul_div(total_portion, amount, total_debt).ok_or(LedgerError::Overflow)
}

// portion -> amount. no pool, no debt.
pub fn debt_for(portion: U256, total_portion: U256, total_debt: Amount) -> Result<Amount, LedgerError> {
    if total_portion.is_zero() {
        return Ok(U256::zero());
    }
    mul_div(total_debt, portion, total_portion).ok_or(LedgerError::Overflow)
}

// 3.2: simple interest on the pool for `elapsed` seconds.
pub fn accrued_interest(total_debt: Amount, apr: &Rate, elapsed: u64) -> Result<Amount, LedgerError> {
    if elapsed == 0 || total_debt.is_zero() || apr.is_zero() {
        return Ok(U256::zero());
    }
    let debt_time = total_debt
        .checked_mul(U256::from(elapsed))
        .ok_or(LedgerError::Overflow)?;
    let yearly = mul_div(debt_time, apr.numerator(), apr.denominator()).ok_or(LedgerError::Overflow)?;
    Ok(yearly / U256::from(SECONDS_PER_YEAR))
}

/** 3.3: global pool state. one per engine */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalLedger {
    pub total_debt_amount: Amount,
    pub total_debt_portion: U256,
    pub total_fee_collected: Amount,
    pub last_accrual: Timestamp,
}

impl GlobalLedger {
    pub fn new(now: Timestamp) -> Self {
        Self {
            total_debt_amount: U256::zero(),
            total_debt_portion: U256::zero(),
            total_fee_collected: U256::zero(),
            last_accrual: now,
        }
    }

    /// Interest that `accrue` would add at `now`.
    pub fn pending_interest(&self, now: Timestamp, apr: &Rate) -> Result<Amount, LedgerError> {
        accrued_interest(self.total_debt_amount, apr, now.seconds_since(self.last_accrual))
    }

    /// Materializes elapsed interest into the pool. Returns the interest added.
    /// Same-instant calls are no-ops.
    pub fn accrue(&mut self, now: Timestamp, apr: &Rate) -> Result<Amount, LedgerError> {
        if now <= self.last_accrual {
            return Ok(U256::zero());
        }
        let interest = self.pending_interest(now, apr)?;

        self.total_debt_amount = self
            .total_debt_amount
            .checked_add(interest)
            .ok_or(LedgerError::Overflow)?;
        self.total_fee_collected = self
            .total_fee_collected
            .checked_add(interest)
            .ok_or(LedgerError::Overflow)?;
        self.last_accrual = now;

        Ok(interest)
    }

    /// Copy of the ledger as it would look after accruing at `now`.
    pub fn preview(&self, now: Timestamp, apr: &Rate) -> Result<Self, LedgerError> {
        let mut preview = self.clone();
        preview.accrue(now, apr)?;
        Ok(preview)
    }

    pub fn debt_of(&self, portion: U256) -> Result<Amount, LedgerError> {
        debt_for(portion, self.total_debt_portion, self.total_debt_amount)
    }

    pub fn portion_of(&self, amount: Amount) -> Result<U256, LedgerError> {
        portion_for(amount, self.total_debt_portion, self.total_debt_amount)
    }

    pub(crate) fn add_debt(&mut self, amount: Amount, portion: U256) -> Result<(), LedgerError> {
        self.total_debt_amount = self
            .total_debt_amount
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.total_debt_portion = self
            .total_debt_portion
            .checked_add(portion)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    // amount saturates: an effective debt pinned to principal can sit a unit or
    // two above the pool's floor-rounded share. portions must match exactly.
    pub(crate) fn remove_debt(&mut self, amount: Amount, portion: U256) -> Result<(), LedgerError> {
        self.total_debt_portion = self
            .total_debt_portion
            .checked_sub(portion)
            .ok_or(LedgerError::Underflow("total_debt_portion"))?;
        self.total_debt_amount = self.total_debt_amount.saturating_sub(amount);
        Ok(())
    }

    pub(crate) fn add_fee(&mut self, fee: Amount) -> Result<(), LedgerError> {
        self.total_fee_collected = self
            .total_fee_collected
            .checked_add(fee)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    pub(crate) fn take_fees(&mut self) -> Amount {
        std::mem::take(&mut self.total_fee_collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u128) -> U256 {
        U256::from(v)
    }

    #[test]
    fn portion_bootstrap_is_one_to_one() {
        assert_eq!(portion_for(u(500), U256::zero(), U256::zero()).unwrap(), u(500));
        assert_eq!(debt_for(u(500), U256::zero(), u(1000)).unwrap(), U256::zero());
    }

    #[test]
    fn portion_tracks_exchange_rate() {
        // pool grew 1000 -> 1100 on 1000 portion. 110 debt buys 100 portion.
        assert_eq!(portion_for(u(110), u(1000), u(1100)).unwrap(), u(100));
        assert_eq!(debt_for(u(100), u(1000), u(1100)).unwrap(), u(110));
    }

    #[test]
    fn portion_math_floors() {
        assert_eq!(portion_for(u(10), u(3), u(7)).unwrap(), u(4)); // 30/7
        assert_eq!(debt_for(u(1), u(3), u(10)).unwrap(), u(3)); // 10/3
    }

    #[test]
    fn one_year_at_ten_percent() {
        let apr = Rate::new(1u64, 10u64).unwrap();
        let interest = accrued_interest(u(1000), &apr, SECONDS_PER_YEAR).unwrap();
        assert_eq!(interest, u(100));
    }

    #[test]
    fn accrue_moves_debt_and_fees() {
        let apr = Rate::new(1u64, 10u64).unwrap();
        let mut ledger = GlobalLedger::new(Timestamp::from_secs(1));
        ledger.add_debt(u(1000), u(1000)).unwrap();

        let now = Timestamp::from_secs(1 + SECONDS_PER_YEAR);
        assert_eq!(ledger.accrue(now, &apr).unwrap(), u(100));
        assert_eq!(ledger.total_debt_amount, u(1100));
        assert_eq!(ledger.total_fee_collected, u(100));
        assert_eq!(ledger.total_debt_portion, u(1000));
        assert_eq!(ledger.last_accrual, now);

        // second call at the same instant changes nothing
        let snapshot = ledger.clone();
        assert_eq!(ledger.accrue(now, &apr).unwrap(), U256::zero());
        assert_eq!(ledger, snapshot);
    }

    #[test]
    fn accrue_with_empty_pool_only_moves_clock() {
        let apr = Rate::new(1u64, 10u64).unwrap();
        let mut ledger = GlobalLedger::new(Timestamp::from_secs(10));
        ledger.accrue(Timestamp::from_secs(500), &apr).unwrap();
        assert_eq!(ledger.total_debt_amount, U256::zero());
        assert_eq!(ledger.last_accrual, Timestamp::from_secs(500));
    }

    #[test]
    fn preview_does_not_mutate() {
        let apr = Rate::new(1u64, 10u64).unwrap();
        let mut ledger = GlobalLedger::new(Timestamp::from_secs(0));
        ledger.add_debt(u(1000), u(1000)).unwrap();

        let preview = ledger.preview(Timestamp::from_secs(SECONDS_PER_YEAR), &apr).unwrap();
        assert_eq!(preview.total_debt_amount, u(1100));
        assert_eq!(ledger.total_debt_amount, u(1000));
    }

    #[test]
    fn remove_debt_rejects_portion_underflow() {
        let mut ledger = GlobalLedger::new(Timestamp::from_secs(0));
        ledger.add_debt(u(10), u(10)).unwrap();
        assert!(matches!(ledger.remove_debt(u(1), u(11)), Err(LedgerError::Underflow(_))));
        // amount side saturates
        ledger.remove_debt(u(12), u(10)).unwrap();
        assert_eq!(ledger.total_debt_amount, U256::zero());
    }
}
