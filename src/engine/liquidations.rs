// 8.5 engine/liquidations.rs: whole-position liquidation.
// the liquidator burns the full effective debt and takes all the collateral.
// no partial liquidation, no bonus beyond the collateral surplus.

use super::core::Engine;
use super::results::{EngineError, LiquidationResult};
use crate::access::Role;
use crate::events::{EventPayload, LiquidatedEvent};
use crate::types::AccountId;
use log::info;

impl Engine {
    pub fn liquidate(
        &mut self,
        caller: AccountId,
        owner: AccountId,
        recipient: AccountId,
    ) -> Result<LiquidationResult, EngineError> {
        self.guarded("liquidate", |engine| {
            engine.accrue_inner()?;
            engine.liquidate_inner(caller, owner, recipient)
        })
    }

    pub(super) fn liquidate_inner(
        &mut self,
        liquidator: AccountId,
        owner: AccountId,
        recipient: AccountId,
    ) -> Result<LiquidationResult, EngineError> {
        self.access.ensure(liquidator, Role::Liquidator)?;

        let position = self
            .positions
            .get(&owner)
            .cloned()
            .ok_or(EngineError::PositionNotFound(owner))?;
        let debt = position.debt(&self.ledger)?;
        let limit = self.liquidation_limit_of(owner, position.collateral)?;

        if debt.effective.is_zero() || debt.effective < limit {
            return Err(EngineError::NotLiquidatable {
                account: owner,
                debt: debt.effective,
                limit,
            });
        }

        self.stable.burn_from(liquidator, debt.effective)?;
        self.ledger.remove_debt(debt.effective, position.debt_portion)?;

        let transferred = if position.collateral.is_zero() {
            position.collateral
        } else {
            self.collateral.withdraw(owner, position.collateral, recipient)?
        };

        self.touch_position(owner);
        self.positions.remove(&owner);
        self.active_accounts.remove(&owner);

        info!(
            "liquidated {} by {}: debt {} repaid, {} collateral to {}",
            owner, liquidator, debt.effective, transferred, recipient
        );
        self.emit_event(EventPayload::Liquidated(LiquidatedEvent {
            owner,
            liquidator,
            recipient,
            debt_repaid: debt.effective,
            collateral_seized: position.collateral,
        }));

        Ok(LiquidationResult {
            owner,
            debt_repaid: debt.effective,
            collateral_seized: position.collateral,
            collateral_transferred: transferred,
        })
    }
}
