//! Engine configuration options.

use crate::types::AccountId;
use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of events to retain in memory.
    pub max_events: usize,
    /// Identity of the vault itself: holds plain collateral and drives the adapter.
    pub vault_account: AccountId,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_events: 100_000,
            vault_account: AccountId(u64::MAX),
        }
    }
}
