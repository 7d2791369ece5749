// 8.7 engine/queries.rs: read-only views. debt figures are priced as if the
// ledger were accrued to the current time, without mutating it.

use super::core::Engine;
use super::results::EngineError;
use crate::collateral::CollateralStrategy;
use crate::config::VaultSettings;
use crate::debt::GlobalLedger;
use crate::position::{DebtBreakdown, Position};
use crate::token::StableAsset;
use crate::types::{AccountId, Amount};

impl Engine {
    pub fn settings(&self) -> &VaultSettings {
        &self.settings
    }

    /// Ledger as last stored. See [`Engine::current_ledger`] for accrued figures.
    pub fn ledger(&self) -> &GlobalLedger {
        &self.ledger
    }

    pub fn current_ledger(&self) -> Result<GlobalLedger, EngineError> {
        Ok(self
            .ledger
            .preview(self.current_time, &self.settings.debt_interest_apr)?)
    }

    pub fn position(&self, account: AccountId) -> Option<&Position> {
        self.positions.get(&account)
    }

    /// Accounts holding a position, in id order.
    pub fn active_accounts(&self) -> Vec<AccountId> {
        self.active_accounts.iter().copied().collect()
    }

    pub fn current_debt(&self, account: AccountId) -> Result<DebtBreakdown, EngineError> {
        let ledger = self.current_ledger()?;
        let position = self.positions.get(&account).cloned().unwrap_or_default();
        Ok(position.debt(&ledger)?)
    }

    pub fn outstanding_interest(&self, account: AccountId) -> Result<Amount, EngineError> {
        Ok(self.current_debt(account)?.interest)
    }

    /// Underlying collateral tokens backing the position.
    pub fn collateral_amount(&self, account: AccountId) -> Result<Amount, EngineError> {
        let recorded = self.recorded_collateral(account);
        Ok(self.collateral.to_underlying(recorded)?)
    }

    pub fn collateral_value(&self, account: AccountId) -> Result<Amount, EngineError> {
        let amount = self.collateral_amount(account)?;
        Ok(self.oracle.usd_value(amount, self.current_time)?)
    }

    pub fn credit_limit(&self, account: AccountId) -> Result<Amount, EngineError> {
        self.credit_limit_of(account, self.recorded_collateral(account))
    }

    pub fn liquidation_limit(&self, account: AccountId) -> Result<Amount, EngineError> {
        self.liquidation_limit_of(account, self.recorded_collateral(account))
    }

    // debt > 0 and debt >= liquidation limit
    pub fn is_liquidatable(&self, account: AccountId) -> Result<bool, EngineError> {
        let debt = self.current_debt(account)?;
        if debt.effective.is_zero() {
            return Ok(false);
        }
        Ok(debt.effective >= self.liquidation_limit(account)?)
    }

    /// Active accounts that can be liquidated right now.
    pub fn liquidatable_accounts(&self) -> Result<Vec<AccountId>, EngineError> {
        let mut out = Vec::new();
        for &account in &self.active_accounts {
            if self.is_liquidatable(account)? {
                out.push(account);
            }
        }
        Ok(out)
    }

    /// Largest additional borrow the credit limit allows, ignoring cap and minimum.
    pub fn available_credit(&self, account: AccountId) -> Result<Amount, EngineError> {
        let debt = self.current_debt(account)?;
        Ok(self.credit_limit(account)?.saturating_sub(debt.effective))
    }

    pub fn stable_asset(&self) -> &dyn StableAsset {
        self.stable.as_ref()
    }

    pub fn collateral_strategy(&self) -> &dyn CollateralStrategy {
        self.collateral.as_ref()
    }

    fn recorded_collateral(&self, account: AccountId) -> Amount {
        self.positions
            .get(&account)
            .map(|p| p.collateral)
            .unwrap_or_default()
    }

    pub(super) fn credit_limit_of(&self, account: AccountId, recorded: Amount) -> Result<Amount, EngineError> {
        let underlying = self.collateral.to_underlying(recorded)?;
        Ok(self.oracle.credit_limit(account, underlying, self.current_time)?)
    }

    pub(super) fn liquidation_limit_of(&self, account: AccountId, recorded: Amount) -> Result<Amount, EngineError> {
        let underlying = self.collateral.to_underlying(recorded)?;
        Ok(self.oracle.liquidation_limit(account, underlying, self.current_time)?)
    }
}
