// 9.3 collateral.rs: how deposited collateral is held.
// plain: tokens sit in the vault's custody account, recorded 1:1.
// adapter: tokens go to a yield adapter, the vault records the adapter's shares.
// the engine only sees the CollateralStrategy trait.

use crate::adapter::{AdapterError, CollateralAdapter};
use crate::journal::Transactional;
use crate::token::{CollateralToken, TokenError};
use crate::types::{AccountId, Amount};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollateralError {
    #[error("Collateral token error: {0}")]
    Token(#[from] TokenError),

    #[error("Collateral adapter error: {0}")]
    Adapter(#[from] AdapterError),
}

pub trait CollateralStrategy: Transactional + fmt::Debug {
    /// Pulls `amount` from `from` into custody for `account`. Returns the units to record.
    fn deposit(&mut self, from: AccountId, account: AccountId, amount: Amount) -> Result<Amount, CollateralError>;

    /// Releases `recorded` units held for `account` to `to`. Returns the underlying sent.
    fn withdraw(&mut self, account: AccountId, recorded: Amount, to: AccountId) -> Result<Amount, CollateralError>;

    /// Recorded units -> underlying token units, for valuation.
    fn to_underlying(&self, recorded: Amount) -> Result<Amount, CollateralError>;

    fn token(&self) -> &dyn CollateralToken;
}

#[derive(Debug)]
pub struct PlainCollateral {
    token: Box<dyn CollateralToken>,
    custody: AccountId,
}

impl PlainCollateral {
    pub fn new(token: Box<dyn CollateralToken>, custody: AccountId) -> Self {
        Self { token, custody }
    }
}

impl CollateralStrategy for PlainCollateral {
    fn deposit(&mut self, from: AccountId, _account: AccountId, amount: Amount) -> Result<Amount, CollateralError> {
        self.token.transfer(from, self.custody, amount)?;
        Ok(amount)
    }

    fn withdraw(&mut self, _account: AccountId, recorded: Amount, to: AccountId) -> Result<Amount, CollateralError> {
        self.token.transfer(self.custody, to, recorded)?;
        Ok(recorded)
    }

    fn to_underlying(&self, recorded: Amount) -> Result<Amount, CollateralError> {
        Ok(recorded)
    }

    fn token(&self) -> &dyn CollateralToken {
        self.token.as_ref()
    }
}

impl Transactional for PlainCollateral {
    fn begin(&mut self) {
        self.token.begin();
    }

    fn commit(&mut self) {
        self.token.commit();
    }

    fn rollback(&mut self) {
        self.token.rollback();
    }
}

#[derive(Debug)]
pub struct AdapterCollateral {
    token: Box<dyn CollateralToken>,
    adapter: Box<dyn CollateralAdapter>,
    // identity the vault uses when driving the adapter
    operator: AccountId,
}

impl AdapterCollateral {
    pub fn new(token: Box<dyn CollateralToken>, adapter: Box<dyn CollateralAdapter>, operator: AccountId) -> Self {
        Self {
            token,
            adapter,
            operator,
        }
    }

    pub fn adapter(&self) -> &dyn CollateralAdapter {
        self.adapter.as_ref()
    }
}

impl CollateralStrategy for AdapterCollateral {
    fn deposit(&mut self, from: AccountId, account: AccountId, amount: Amount) -> Result<Amount, CollateralError> {
        self.token.transfer(from, self.adapter.custody_account(), amount)?;
        let shares = self.adapter.deposit(self.operator, account, amount)?;
        Ok(shares)
    }

    // the adapter decides how much underlying the shares are worth right now
    fn withdraw(&mut self, account: AccountId, recorded: Amount, to: AccountId) -> Result<Amount, CollateralError> {
        let amount = self.adapter.withdraw(self.operator, account, recorded)?;
        self.token.transfer(self.adapter.custody_account(), to, amount)?;
        Ok(amount)
    }

    fn to_underlying(&self, recorded: Amount) -> Result<Amount, CollateralError> {
        Ok(self.adapter.to_amount(recorded)?)
    }

    fn token(&self) -> &dyn CollateralToken {
        self.token.as_ref()
    }
}

impl Transactional for AdapterCollateral {
    fn begin(&mut self) {
        self.token.begin();
        self.adapter.begin();
    }

    fn commit(&mut self) {
        self.token.commit();
        self.adapter.commit();
    }

    fn rollback(&mut self) {
        self.adapter.rollback();
        self.token.rollback();
    }
}
