// 8.4 engine/collateral.rs: deposits and withdrawals of collateral.

use super::core::Engine;
use super::results::{EngineError, WithdrawResult};
use crate::access::Role;
use crate::adapter::AdapterError;
use crate::collateral::CollateralError;
use crate::events::{CollateralAddedEvent, CollateralRemovedEvent, EventPayload};
use crate::types::{AccountId, Amount};
use log::debug;

impl Engine {
    /// Deposits `amount` of the caller's collateral tokens into the caller's
    /// position. Returns the units recorded on the position.
    pub fn add_collateral(&mut self, caller: AccountId, amount: Amount) -> Result<Amount, EngineError> {
        self.guarded("add_collateral", |engine| engine.add_collateral_inner(caller, caller, amount))
    }

    // operator funds someone else's position from its own balance
    pub fn add_collateral_for(
        &mut self,
        caller: AccountId,
        account: AccountId,
        amount: Amount,
    ) -> Result<Amount, EngineError> {
        self.guarded("add_collateral_for", |engine| {
            engine.access.ensure(caller, Role::Operator)?;
            engine.add_collateral_inner(caller, account, amount)
        })
    }

    /// Withdraws `amount` recorded units back to the caller. Whatever debt is
    /// left must stay within the credit limit of the remaining collateral.
    pub fn remove_collateral(&mut self, caller: AccountId, amount: Amount) -> Result<WithdrawResult, EngineError> {
        self.guarded("remove_collateral", |engine| {
            engine.accrue_inner()?;
            engine.remove_collateral_inner(caller, caller, amount)
        })
    }

    pub(super) fn add_collateral_inner(
        &mut self,
        from: AccountId,
        account: AccountId,
        amount: Amount,
    ) -> Result<Amount, EngineError> {
        if amount.is_zero() {
            return Err(EngineError::ZeroAmount);
        }

        let recorded = self.collateral.deposit(from, account, amount)?;
        // an adapter may round a small deposit down to nothing
        if recorded.is_zero() {
            return Err(CollateralError::from(AdapterError::InvalidAmount(amount)).into());
        }

        self.touch_position(account);
        let position = self.positions.entry(account).or_default();
        position.collateral = position
            .collateral
            .checked_add(recorded)
            .ok_or(EngineError::Overflow)?;
        if self.active_accounts.insert(account) {
            debug!("position opened for {}", account);
        }

        self.emit_event(EventPayload::CollateralAdded(CollateralAddedEvent {
            from,
            account,
            amount,
            recorded,
        }));
        Ok(recorded)
    }

    pub(super) fn remove_collateral_inner(
        &mut self,
        account: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<WithdrawResult, EngineError> {
        if amount.is_zero() {
            return Err(EngineError::ZeroAmount);
        }

        let position = self
            .positions
            .get(&account)
            .cloned()
            .ok_or(EngineError::PositionNotFound(account))?;
        if amount > position.collateral {
            return Err(EngineError::InsufficientCollateral {
                requested: amount,
                available: position.collateral,
            });
        }
        let remaining = position.collateral - amount;

        // debt-free withdrawals never touch the price feed
        let debt = position.debt(&self.ledger)?;
        if !debt.effective.is_zero() {
            let limit = self.credit_limit_of(account, remaining)?;
            if debt.effective > limit {
                return Err(EngineError::InsufficientCollateralValue {
                    debt: debt.effective,
                    limit,
                });
            }
        }

        let transferred = self.collateral.withdraw(account, amount, to)?;

        // zero collateral with debt left already failed the limit check above
        let position_closed = remaining.is_zero();
        self.touch_position(account);
        if position_closed {
            self.positions.remove(&account);
            self.active_accounts.remove(&account);
            debug!("position closed for {}", account);
        } else if let Some(position) = self.positions.get_mut(&account) {
            position.collateral = remaining;
        }

        self.emit_event(EventPayload::CollateralRemoved(CollateralRemovedEvent {
            account,
            to,
            recorded: amount,
            transferred,
            position_closed,
        }));

        Ok(WithdrawResult {
            recorded: amount,
            transferred,
            position_closed,
        })
    }
}
