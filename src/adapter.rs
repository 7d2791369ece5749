//! Yield-bearing collateral adapters.
//!
//! An adapter takes raw collateral on behalf of an account and hands back
//! shares. The vault records shares; for valuation it converts them back into
//! underlying units, so any yield the adapter earns raises the account's credit.

use crate::debt::mul_div;
use crate::journal::{Journal, Transactional};
use crate::types::{AccountId, Amount};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("Zero amount")]
    ZeroAmount,

    #[error("Zero account")]
    ZeroAddress,

    #[error("Invalid amount {0}: converts to zero shares")]
    InvalidAmount(Amount),

    #[error("Insufficient shares for {account}: requested {requested}, available {available}")]
    InsufficientAmount {
        account: AccountId,
        requested: Amount,
        available: Amount,
    },

    #[error("Caller {0} is not the adapter operator")]
    Unauthorized(AccountId),

    #[error("Adapter arithmetic overflow")]
    Overflow,
}

/// Contract the vault expects from a yield adapter. `caller` is whoever drives
/// the adapter, normally the vault itself.
pub trait CollateralAdapter: Transactional + fmt::Debug {
    /// Credits `amount` underlying to `account`. Returns shares minted.
    fn deposit(&mut self, caller: AccountId, account: AccountId, amount: Amount) -> Result<Amount, AdapterError>;

    /// Burns `shares` of `account`. Returns underlying released.
    fn withdraw(&mut self, caller: AccountId, account: AccountId, shares: Amount) -> Result<Amount, AdapterError>;

    fn to_amount(&self, shares: Amount) -> Result<Amount, AdapterError>;

    fn underlying_amount(&self, account: AccountId) -> Result<Amount, AdapterError>;

    /// Account holding the adapter's underlying tokens.
    fn custody_account(&self) -> AccountId;
}

/// Share vault whose exchange rate only moves up when yield is reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareVault {
    operator: AccountId,
    custody: AccountId,
    total_shares: Amount,
    total_underlying: Amount,
    shares: HashMap<AccountId, Amount>,
    #[serde(skip)]
    journal: Journal<AccountId, Amount>,
    // (total_shares, total_underlying) when the open call began
    #[serde(skip)]
    saved_totals: Option<(Amount, Amount)>,
}

impl ShareVault {
    pub fn new(operator: AccountId, custody: AccountId) -> Self {
        Self {
            operator,
            custody,
            total_shares: U256::zero(),
            total_underlying: U256::zero(),
            shares: HashMap::new(),
            journal: Journal::default(),
            saved_totals: None,
        }
    }

    pub fn shares_of(&self, account: AccountId) -> Amount {
        self.shares.get(&account).copied().unwrap_or_default()
    }

    pub fn total_shares(&self) -> Amount {
        self.total_shares
    }

    pub fn total_underlying(&self) -> Amount {
        self.total_underlying
    }

    // caller is responsible for moving the matching tokens into custody
    pub fn report_yield(&mut self, amount: Amount) -> Result<(), AdapterError> {
        self.total_underlying = self
            .total_underlying
            .checked_add(amount)
            .ok_or(AdapterError::Overflow)?;
        Ok(())
    }

    fn to_shares(&self, amount: Amount) -> Result<Amount, AdapterError> {
        if self.total_shares.is_zero() || self.total_underlying.is_zero() {
            return Ok(amount);
        }
        mul_div(amount, self.total_shares, self.total_underlying).ok_or(AdapterError::Overflow)
    }

    fn ensure_operator(&self, caller: AccountId) -> Result<(), AdapterError> {
        if caller != self.operator {
            return Err(AdapterError::Unauthorized(caller));
        }
        Ok(())
    }
}

impl CollateralAdapter for ShareVault {
    fn deposit(&mut self, caller: AccountId, account: AccountId, amount: Amount) -> Result<Amount, AdapterError> {
        self.ensure_operator(caller)?;
        if account.is_zero() {
            return Err(AdapterError::ZeroAddress);
        }
        if amount.is_zero() {
            return Err(AdapterError::ZeroAmount);
        }

        let minted = self.to_shares(amount)?;
        if minted.is_zero() {
            return Err(AdapterError::InvalidAmount(amount));
        }

        self.total_shares = self.total_shares.checked_add(minted).ok_or(AdapterError::Overflow)?;
        self.total_underlying = self
            .total_underlying
            .checked_add(amount)
            .ok_or(AdapterError::Overflow)?;
        let held = self.shares_of(account).checked_add(minted).ok_or(AdapterError::Overflow)?;
        self.journal.touch(&self.shares, account);
        self.shares.insert(account, held);

        Ok(minted)
    }

    fn withdraw(&mut self, caller: AccountId, account: AccountId, shares: Amount) -> Result<Amount, AdapterError> {
        self.ensure_operator(caller)?;
        if account.is_zero() {
            return Err(AdapterError::ZeroAddress);
        }
        if shares.is_zero() {
            return Err(AdapterError::ZeroAmount);
        }

        let available = self.shares_of(account);
        if shares > available {
            return Err(AdapterError::InsufficientAmount {
                account,
                requested: shares,
                available,
            });
        }

        let amount = self.to_amount(shares)?;
        self.total_shares -= shares;
        self.total_underlying = self.total_underlying.saturating_sub(amount);

        let remaining = available - shares;
        self.journal.touch(&self.shares, account);
        if remaining.is_zero() {
            self.shares.remove(&account);
        } else {
            self.shares.insert(account, remaining);
        }

        Ok(amount)
    }

    fn to_amount(&self, shares: Amount) -> Result<Amount, AdapterError> {
        if self.total_shares.is_zero() {
            return Ok(shares);
        }
        mul_div(shares, self.total_underlying, self.total_shares).ok_or(AdapterError::Overflow)
    }

    fn underlying_amount(&self, account: AccountId) -> Result<Amount, AdapterError> {
        self.to_amount(self.shares_of(account))
    }

    fn custody_account(&self) -> AccountId {
        self.custody
    }
}

impl Transactional for ShareVault {
    fn begin(&mut self) {
        self.journal.begin();
        self.saved_totals = Some((self.total_shares, self.total_underlying));
    }

    fn commit(&mut self) {
        self.journal.commit();
        self.saved_totals = None;
    }

    fn rollback(&mut self) {
        self.journal.rollback(&mut self.shares);
        if let Some((shares, underlying)) = self.saved_totals.take() {
            self.total_shares = shares;
            self.total_underlying = underlying;
        }
    }
}
