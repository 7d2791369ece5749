//! Per-account collateral and debt records.
//!
//! A position stores collateral in whatever unit the collateral strategy
//! records (adapter shares or raw tokens), the principal actually borrowed, and
//! its portion of the shared debt pool. Its real debt is derived from the pool.

use crate::debt::{GlobalLedger, LedgerError};
use crate::types::Amount;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub collateral: Amount,
    pub debt_principal: Amount,
    pub debt_portion: U256,
}

/// Debt figures for one position against a ledger snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebtBreakdown {
    /// Pool share, floor-rounded.
    pub computed: Amount,
    /// max(computed, principal). Used for every credit check.
    pub effective: Amount,
    pub principal: Amount,
    pub interest: Amount,
}

impl Position {
    pub fn new(collateral: Amount) -> Self {
        Self {
            collateral,
            ..Default::default()
        }
    }

    pub fn has_debt(&self) -> bool {
        !self.debt_portion.is_zero() || !self.debt_principal.is_zero()
    }

    // floor rounding can leave the pool share a unit or two under principal right
    // after a borrow. principal is the floor for what the account owes.
    pub fn debt(&self, ledger: &GlobalLedger) -> Result<DebtBreakdown, LedgerError> {
        let computed = ledger.debt_of(self.debt_portion)?;
        let effective = computed.max(self.debt_principal);
        Ok(DebtBreakdown {
            computed,
            effective,
            principal: self.debt_principal,
            interest: effective.saturating_sub(self.debt_principal),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timestamp;

    fn ledger(total_debt: u64, total_portion: u64) -> GlobalLedger {
        let mut ledger = GlobalLedger::new(Timestamp::from_secs(0));
        ledger.total_debt_amount = U256::from(total_debt);
        ledger.total_debt_portion = U256::from(total_portion);
        ledger
    }

    #[test]
    fn interest_is_growth_over_principal() {
        let position = Position {
            collateral: U256::from(10u64),
            debt_principal: U256::from(100u64),
            debt_portion: U256::from(100u64),
        };
        let debt = position.debt(&ledger(220, 200)).unwrap();
        assert_eq!(debt.computed, U256::from(110u64));
        assert_eq!(debt.effective, U256::from(110u64));
        assert_eq!(debt.interest, U256::from(10u64));
    }

    #[test]
    fn effective_debt_never_below_principal() {
        // 100 * 3 / 301 floors to 0, yet 1 unit was borrowed
        let position = Position {
            collateral: U256::from(10u64),
            debt_principal: U256::from(1u64),
            debt_portion: U256::from(3u64),
        };
        let debt = position.debt(&ledger(100, 301)).unwrap();
        assert_eq!(debt.computed, U256::zero());
        assert_eq!(debt.effective, U256::from(1u64));
        assert_eq!(debt.interest, U256::zero());
    }

    #[test]
    fn fresh_position_has_no_debt() {
        let position = Position::new(U256::from(5u64));
        assert!(!position.has_debt());
        let debt = position.debt(&ledger(0, 0)).unwrap();
        assert!(debt.effective.is_zero());
    }
}
