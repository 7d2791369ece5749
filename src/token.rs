// 9.2 token.rs: token collaborators. the collateral asset the vault takes into
// custody, and the stable asset it mints and burns. TokenLedger is the in-memory
// implementation of both, just balances and supply.

use crate::journal::{Journal, Transactional};
use crate::types::{AccountId, Amount};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Insufficient balance for {account}: requested {requested}, available {available}")]
    InsufficientBalance {
        account: AccountId,
        requested: Amount,
        available: Amount,
    },

    #[error("Token supply overflow")]
    SupplyOverflow,

    #[error("Zero account is not a valid token holder")]
    ZeroAccount,
}

/// Fungible collateral asset.
pub trait CollateralToken: Transactional + fmt::Debug {
    fn symbol(&self) -> &str;

    fn decimals(&self) -> u32;

    fn balance_of(&self, account: AccountId) -> Amount;

    fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<(), TokenError>;
}

/// Mint/burn authority over the synthetic stable asset.
pub trait StableAsset: Transactional + fmt::Debug {
    fn mint(&mut self, to: AccountId, amount: Amount) -> Result<(), TokenError>;

    fn burn_from(&mut self, from: AccountId, amount: Amount) -> Result<(), TokenError>;

    fn balance_of(&self, account: AccountId) -> Amount;

    fn total_supply(&self) -> Amount;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    symbol: String,
    decimals: u32,
    balances: HashMap<AccountId, Amount>,
    total_supply: Amount,
    #[serde(skip)]
    journal: Journal<AccountId, Amount>,
    #[serde(skip)]
    saved_supply: Option<Amount>,
}

impl TokenLedger {
    pub fn new(symbol: &str, decimals: u32) -> Self {
        Self {
            symbol: symbol.to_string(),
            decimals,
            balances: HashMap::new(),
            total_supply: U256::zero(),
            journal: Journal::default(),
            saved_supply: None,
        }
    }

    /// Ledger seeded with opening balances.
    pub fn with_balances(symbol: &str, decimals: u32, balances: &[(AccountId, Amount)]) -> Result<Self, TokenError> {
        let mut ledger = Self::new(symbol, decimals);
        for &(account, amount) in balances {
            ledger.issue(account, amount)?;
        }
        Ok(ledger)
    }

    pub fn balance(&self, account: AccountId) -> Amount {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    pub fn supply(&self) -> Amount {
        self.total_supply
    }

    pub fn issue(&mut self, to: AccountId, amount: Amount) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::ZeroAccount);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow)?;
        self.credit(to, amount)?;
        self.total_supply = supply;
        Ok(())
    }

    pub fn destroy(&mut self, from: AccountId, amount: Amount) -> Result<(), TokenError> {
        self.debit(from, amount)?;
        self.total_supply = self.total_supply.saturating_sub(amount);
        Ok(())
    }

    pub fn move_balance(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::ZeroAccount);
        }
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    fn credit(&mut self, to: AccountId, amount: Amount) -> Result<(), TokenError> {
        let balance = self.balance(to).checked_add(amount).ok_or(TokenError::SupplyOverflow)?;
        self.journal.touch(&self.balances, to);
        self.balances.insert(to, balance);
        Ok(())
    }

    fn debit(&mut self, from: AccountId, amount: Amount) -> Result<(), TokenError> {
        let available = self.balance(from);
        if amount > available {
            return Err(TokenError::InsufficientBalance {
                account: from,
                requested: amount,
                available,
            });
        }
        let remaining = available - amount;
        self.journal.touch(&self.balances, from);
        if remaining.is_zero() {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, remaining);
        }
        Ok(())
    }
}

impl CollateralToken for TokenLedger {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn decimals(&self) -> u32 {
        self.decimals
    }

    fn balance_of(&self, account: AccountId) -> Amount {
        self.balance(account)
    }

    fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<(), TokenError> {
        self.move_balance(from, to, amount)
    }
}

impl StableAsset for TokenLedger {
    fn mint(&mut self, to: AccountId, amount: Amount) -> Result<(), TokenError> {
        self.issue(to, amount)
    }

    fn burn_from(&mut self, from: AccountId, amount: Amount) -> Result<(), TokenError> {
        self.destroy(from, amount)
    }

    fn balance_of(&self, account: AccountId) -> Amount {
        self.balance(account)
    }

    fn total_supply(&self) -> Amount {
        self.supply()
    }
}

impl Transactional for TokenLedger {
    fn begin(&mut self) {
        self.journal.begin();
        self.saved_supply = Some(self.total_supply);
    }

    fn commit(&mut self) {
        self.journal.commit();
        self.saved_supply = None;
    }

    fn rollback(&mut self) {
        self.journal.rollback(&mut self.balances);
        if let Some(supply) = self.saved_supply.take() {
            self.total_supply = supply;
        }
    }
}
