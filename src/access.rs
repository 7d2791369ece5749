//! Capability checks for gated operations.
//!
//! Each account carries a set of roles. Gated entry points check the caller's
//! set before touching any state; there is no role hierarchy.

use crate::types::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Settings updates and role management.
    Admin,
    /// May liquidate unsafe positions.
    Liquidator,
    /// Receives collected protocol fees.
    FeeCollector,
    /// May deposit, borrow or run batches for other accounts.
    Operator,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("Account {account} lacks the {role:?} role")]
    Unauthorized { account: AccountId, role: Role },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessControl {
    roles: HashMap<AccountId, BTreeSet<Role>>,
}

impl AccessControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admin(admin: AccountId) -> Self {
        let mut access = Self::new();
        access.grant(admin, Role::Admin);
        access
    }

    pub fn has_role(&self, account: AccountId, role: Role) -> bool {
        self.roles
            .get(&account)
            .map(|set| set.contains(&role))
            .unwrap_or(false)
    }

    pub fn ensure(&self, account: AccountId, role: Role) -> Result<(), AccessError> {
        if self.has_role(account, role) {
            Ok(())
        } else {
            Err(AccessError::Unauthorized { account, role })
        }
    }

    pub fn grant(&mut self, account: AccountId, role: Role) -> bool {
        self.roles.entry(account).or_default().insert(role)
    }

    pub fn revoke(&mut self, account: AccountId, role: Role) -> bool {
        let Some(set) = self.roles.get_mut(&account) else {
            return false;
        };
        let removed = set.remove(&role);
        if set.is_empty() {
            self.roles.remove(&account);
        }
        removed
    }

    pub fn roles_of(&self, account: AccountId) -> Vec<Role> {
        self.roles
            .get(&account)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_check_revoke() {
        let admin = AccountId(1);
        let bot = AccountId(2);
        let mut access = AccessControl::with_admin(admin);

        assert!(access.ensure(admin, Role::Admin).is_ok());
        assert_eq!(
            access.ensure(bot, Role::Liquidator),
            Err(AccessError::Unauthorized {
                account: bot,
                role: Role::Liquidator
            })
        );

        assert!(access.grant(bot, Role::Liquidator));
        assert!(!access.grant(bot, Role::Liquidator));
        assert!(access.has_role(bot, Role::Liquidator));
        // roles don't imply each other
        assert!(!access.has_role(admin, Role::Liquidator));

        assert!(access.revoke(bot, Role::Liquidator));
        assert!(access.roles_of(bot).is_empty());
        assert!(!access.revoke(bot, Role::Liquidator));
    }
}
