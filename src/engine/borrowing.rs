// 8.3 engine/borrowing.rs: accrual, borrow, repay, fee collection.
// every public entry accrues first so debt is priced at the current instant.

use super::core::Engine;
use super::results::{BorrowResult, EngineError, RepayResult};
use crate::access::Role;
use crate::events::{AccruedEvent, BorrowedEvent, EventPayload, FeesCollectedEvent, RepaidEvent};
use crate::types::{AccountId, Amount};
use log::{debug, info};

impl Engine {
    /// Materializes interest up to the current time. Returns the interest added.
    pub fn accrue(&mut self) -> Result<Amount, EngineError> {
        self.guarded("accrue", |engine| engine.accrue_inner())
    }

    pub fn borrow(&mut self, caller: AccountId, amount: Amount) -> Result<BorrowResult, EngineError> {
        self.guarded("borrow", |engine| {
            engine.accrue_inner()?;
            engine.borrow_inner(caller, caller, amount)
        })
    }

    // operator borrows against `account`. proceeds go to the operator
    pub fn borrow_for(
        &mut self,
        caller: AccountId,
        account: AccountId,
        amount: Amount,
    ) -> Result<BorrowResult, EngineError> {
        self.guarded("borrow_for", |engine| {
            engine.access.ensure(caller, Role::Operator)?;
            engine.accrue_inner()?;
            engine.borrow_inner(account, caller, amount)
        })
    }

    pub fn repay(&mut self, caller: AccountId, amount: Amount) -> Result<RepayResult, EngineError> {
        self.guarded("repay", |engine| {
            engine.accrue_inner()?;
            engine.repay_inner(caller, caller, amount)
        })
    }

    // anyone may pay down someone else's debt
    pub fn repay_for(
        &mut self,
        caller: AccountId,
        account: AccountId,
        amount: Amount,
    ) -> Result<RepayResult, EngineError> {
        self.guarded("repay_for", |engine| {
            engine.accrue_inner()?;
            engine.repay_inner(caller, account, amount)
        })
    }

    /// Mints every collected fee and interest unit to the collector.
    pub fn collect_fees(&mut self, caller: AccountId) -> Result<Amount, EngineError> {
        self.guarded("collect_fees", |engine| {
            engine.access.ensure(caller, Role::FeeCollector)?;
            engine.accrue_inner()?;

            let amount = engine.ledger.take_fees();
            if !amount.is_zero() {
                engine.stable.mint(caller, amount)?;
                info!("fees collected by {}: {}", caller, amount);
                engine.emit_event(EventPayload::FeesCollected(FeesCollectedEvent {
                    collector: caller,
                    amount,
                }));
            }
            Ok(amount)
        })
    }

    pub(super) fn accrue_inner(&mut self) -> Result<Amount, EngineError> {
        let interest = self
            .ledger
            .accrue(self.current_time, &self.settings.debt_interest_apr)?;

        if !interest.is_zero() {
            debug!("accrued {} interest, total debt {}", interest, self.ledger.total_debt_amount);
            self.emit_event(EventPayload::Accrued(AccruedEvent {
                interest,
                total_debt: self.ledger.total_debt_amount,
            }));
        }
        Ok(interest)
    }

    /** 8.3.1: borrow. checks run in order: minimum, pool cap, credit limit */
    pub(super) fn borrow_inner(
        &mut self,
        account: AccountId,
        receiver: AccountId,
        amount: Amount,
    ) -> Result<BorrowResult, EngineError> {
        if amount.is_zero() {
            return Err(EngineError::ZeroAmount);
        }
        if amount < self.settings.min_borrow_amount {
            return Err(EngineError::BelowMinimumBorrow {
                amount,
                minimum: self.settings.min_borrow_amount,
            });
        }

        let total_debt = self.ledger.total_debt_amount;
        let new_total = total_debt.checked_add(amount).ok_or(EngineError::Overflow)?;
        if new_total > self.settings.borrow_amount_cap {
            return Err(EngineError::BorrowCapReached {
                total_debt,
                amount,
                cap: self.settings.borrow_amount_cap,
            });
        }

        let position = self.positions.get(&account).cloned().unwrap_or_default();
        let debt = position.debt(&self.ledger)?;
        let limit = self.credit_limit_of(account, position.collateral)?;
        let new_debt = debt.effective.checked_add(amount).ok_or(EngineError::Overflow)?;
        if new_debt > limit {
            return Err(EngineError::CreditLimitExceeded { debt: new_debt, limit });
        }

        let fee = self.settings.organization_fee_rate.apply(amount)?;
        let portion = self.ledger.portion_of(amount)?;
        self.ledger.add_fee(fee)?;
        self.ledger.add_debt(amount, portion)?;

        self.touch_position(account);
        let position = self
            .positions
            .get_mut(&account)
            .ok_or(EngineError::PositionNotFound(account))?;
        position.debt_principal = position
            .debt_principal
            .checked_add(amount)
            .ok_or(EngineError::Overflow)?;
        position.debt_portion = position
            .debt_portion
            .checked_add(portion)
            .ok_or(EngineError::Overflow)?;

        let minted = amount - fee;
        if !minted.is_zero() {
            self.stable.mint(receiver, minted)?;
        }

        self.emit_event(EventPayload::Borrowed(BorrowedEvent {
            account,
            receiver,
            amount,
            fee,
            portion,
        }));

        Ok(BorrowResult {
            amount,
            fee,
            minted,
            portion,
        })
    }

    /** 8.3.2: repay. interest is paid before principal, overpayment is capped */
    pub(super) fn repay_inner(
        &mut self,
        payer: AccountId,
        account: AccountId,
        amount: Amount,
    ) -> Result<RepayResult, EngineError> {
        if amount.is_zero() {
            return Err(EngineError::ZeroAmount);
        }

        let position = self
            .positions
            .get(&account)
            .cloned()
            .ok_or(EngineError::PositionNotFound(account))?;
        let debt = position.debt(&self.ledger)?;
        if debt.effective.is_zero() {
            return Err(EngineError::NoDebt(account));
        }

        let repaid = amount.min(debt.effective);
        let principal_paid = repaid.saturating_sub(debt.interest).min(debt.principal);
        let interest_paid = repaid - principal_paid;
        let remaining_principal = debt.principal - principal_paid;

        if !remaining_principal.is_zero() && remaining_principal < self.settings.min_borrow_amount {
            return Err(EngineError::DebtBelowMinimum {
                remaining: remaining_principal,
                minimum: self.settings.min_borrow_amount,
            });
        }

        // clearing the principal releases the whole portion so no dust share is left
        let portion = if remaining_principal.is_zero() {
            position.debt_portion
        } else {
            self.ledger.portion_of(repaid)?.min(position.debt_portion)
        };

        self.stable.burn_from(payer, repaid)?;
        self.ledger.remove_debt(repaid, portion)?;

        self.touch_position(account);
        let position = self
            .positions
            .get_mut(&account)
            .ok_or(EngineError::PositionNotFound(account))?;
        position.debt_principal = remaining_principal;
        position.debt_portion -= portion;

        self.emit_event(EventPayload::Repaid(RepaidEvent {
            account,
            payer,
            amount: repaid,
            principal_paid,
            interest_paid,
            portion,
        }));

        Ok(RepayResult {
            repaid,
            principal_paid,
            interest_paid,
            portion,
        })
    }
}
