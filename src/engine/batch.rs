// 8.6 engine/batch.rs: several position actions in one atomic call.
// accrual happens once, right before the first action that reads debt.
// one failing action rolls back the whole batch.

use super::core::Engine;
use super::results::{ActionOutcome, EngineError};
use crate::access::Role;
use crate::actions::{decode_batch, Action};
use crate::types::AccountId;
use log::debug;

impl Engine {
    /// Runs `actions` against `account`'s position. Tokens move to and from
    /// the caller; acting on another account needs the operator role.
    pub fn execute(
        &mut self,
        caller: AccountId,
        account: AccountId,
        actions: &[Action],
    ) -> Result<Vec<ActionOutcome>, EngineError> {
        self.guarded("execute", |engine| engine.execute_inner(caller, account, actions))
    }

    /// Same as [`Engine::execute`] for raw (code, blob) pairs. The whole batch
    /// is decoded before any action runs.
    pub fn execute_encoded(
        &mut self,
        caller: AccountId,
        account: AccountId,
        codes: &[u8],
        params: &[Vec<u8>],
    ) -> Result<Vec<ActionOutcome>, EngineError> {
        let actions = decode_batch(codes, params)?;
        self.execute(caller, account, &actions)
    }

    fn execute_inner(
        &mut self,
        caller: AccountId,
        account: AccountId,
        actions: &[Action],
    ) -> Result<Vec<ActionOutcome>, EngineError> {
        if caller != account {
            self.access.ensure(caller, Role::Operator)?;
        }
        debug!("batch of {} actions by {} on {}", actions.len(), caller, account);

        let mut accrued = false;
        let mut outcomes = Vec::with_capacity(actions.len());

        for action in actions {
            if action.requires_accrual() && !accrued {
                self.accrue_inner()?;
                accrued = true;
            }

            let outcome = match *action {
                Action::AddCollateral { amount } => ActionOutcome::CollateralAdded {
                    recorded: self.add_collateral_inner(caller, account, amount)?,
                },
                Action::RemoveCollateral { amount } => {
                    ActionOutcome::CollateralRemoved(self.remove_collateral_inner(account, caller, amount)?)
                }
                Action::Borrow { amount } => ActionOutcome::Borrowed(self.borrow_inner(account, caller, amount)?),
                Action::Repay { amount } => ActionOutcome::Repaid(self.repay_inner(caller, account, amount)?),
                Action::Liquidate { owner, recipient } => {
                    ActionOutcome::Liquidated(self.liquidate_inner(caller, owner, recipient)?)
                }
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}
