// 11.0: every state change produces an event. used for audit trails and for
// notifying external systems. events from a rolled-back call never land.

use crate::access::Role;
use crate::config::VaultSettings;
use crate::types::{AccountId, Amount, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // Ledger events
    Accrued(AccruedEvent),
    FeesCollected(FeesCollectedEvent),

    // Position events
    CollateralAdded(CollateralAddedEvent),
    CollateralRemoved(CollateralRemovedEvent),
    Borrowed(BorrowedEvent),
    Repaid(RepaidEvent),
    Liquidated(LiquidatedEvent),

    // Governance events
    SettingsUpdated(SettingsUpdatedEvent),
    RoleGranted(RoleChangedEvent),
    RoleRevoked(RoleChangedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccruedEvent {
    pub interest: Amount,
    pub total_debt: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeesCollectedEvent {
    pub collector: AccountId,
    pub amount: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralAddedEvent {
    pub from: AccountId,
    pub account: AccountId,
    pub amount: Amount,
    /// Units recorded on the position (adapter shares when wrapped).
    pub recorded: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralRemovedEvent {
    pub account: AccountId,
    pub to: AccountId,
    pub recorded: Amount,
    pub transferred: Amount,
    pub position_closed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowedEvent {
    pub account: AccountId,
    pub receiver: AccountId,
    pub amount: Amount,
    pub fee: Amount,
    pub portion: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaidEvent {
    pub account: AccountId,
    pub payer: AccountId,
    pub amount: Amount,
    pub principal_paid: Amount,
    pub interest_paid: Amount,
    pub portion: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidatedEvent {
    pub owner: AccountId,
    pub liquidator: AccountId,
    pub recipient: AccountId,
    pub debt_repaid: Amount,
    pub collateral_seized: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsUpdatedEvent {
    pub by: AccountId,
    pub settings: VaultSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleChangedEvent {
    pub by: AccountId,
    pub account: AccountId,
    pub role: Role,
}
