// 8.0.2: result types and errors for engine operations.

use crate::access::AccessError;
use crate::actions::ActionError;
use crate::collateral::CollateralError;
use crate::config::ConfigError;
use crate::debt::LedgerError;
use crate::price_feed::OracleError;
use crate::rate::RateError;
use crate::token::TokenError;
use crate::types::{AccountId, Amount};
use crate::valuation::ValuationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowResult {
    pub amount: Amount,
    pub fee: Amount,
    /// amount - fee, minted to the receiver
    pub minted: Amount,
    pub portion: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepayResult {
    /// What the payer was actually debited, capped at the debt.
    pub repaid: Amount,
    pub principal_paid: Amount,
    pub interest_paid: Amount,
    pub portion: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawResult {
    pub recorded: Amount,
    pub transferred: Amount,
    pub position_closed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidationResult {
    pub owner: AccountId,
    pub debt_repaid: Amount,
    pub collateral_seized: Amount,
    pub collateral_transferred: Amount,
}

/// Per-action result of a batch, in batch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    CollateralAdded { recorded: Amount },
    CollateralRemoved(WithdrawResult),
    Borrowed(BorrowResult),
    Repaid(RepayResult),
    Liquidated(LiquidationResult),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Amount must be non-zero")]
    ZeroAmount,

    #[error("Borrow of {amount} is below the minimum {minimum}")]
    BelowMinimumBorrow { amount: Amount, minimum: Amount },

    #[error("Borrow cap reached: total debt {total_debt} + {amount} exceeds {cap}")]
    BorrowCapReached { total_debt: Amount, amount: Amount, cap: Amount },

    #[error("Credit limit exceeded: debt would be {debt}, limit {limit}")]
    CreditLimitExceeded { debt: Amount, limit: Amount },

    #[error("Insufficient collateral value: debt {debt}, remaining limit {limit}")]
    InsufficientCollateralValue { debt: Amount, limit: Amount },

    #[error("Remaining principal {remaining} below minimum {minimum}")]
    DebtBelowMinimum { remaining: Amount, minimum: Amount },

    #[error("Account {0} has no debt")]
    NoDebt(AccountId),

    #[error("No position for account {0}")]
    PositionNotFound(AccountId),

    #[error("Insufficient collateral: requested {requested}, available {available}")]
    InsufficientCollateral { requested: Amount, available: Amount },

    #[error("Account {account} is not liquidatable: debt {debt}, liquidation limit {limit}")]
    NotLiquidatable { account: AccountId, debt: Amount, limit: Amount },

    #[error("Re-entrant call rejected")]
    Reentrancy,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Rate error: {0}")]
    Rate(#[from] RateError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Collateral error: {0}")]
    Collateral(#[from] CollateralError),

    #[error("Stable asset error: {0}")]
    StableAsset(#[from] TokenError),

    #[error("Batch error: {0}")]
    Action(#[from] ActionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<ValuationError> for EngineError {
    fn from(err: ValuationError) -> Self {
        match err {
            ValuationError::Oracle(e) => EngineError::Oracle(e),
            ValuationError::Rate(e) => EngineError::Rate(e),
            ValuationError::Overflow => EngineError::Overflow,
        }
    }
}
