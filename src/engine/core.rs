// 8.0 engine/core.rs: the vault engine. owns the debt pool, every position,
// roles, the price adapter and both token collaborators.

use super::config::EngineConfig;
use super::results::EngineError;
use crate::access::{AccessControl, Role};
use crate::adapter::CollateralAdapter;
use crate::collateral::{AdapterCollateral, CollateralStrategy, PlainCollateral};
use crate::config::{ConfigError, VaultConfig, VaultSettings};
use crate::debt::GlobalLedger;
use crate::events::{Event, EventId, EventPayload, RoleChangedEvent, SettingsUpdatedEvent};
use crate::journal::{Journal, Transactional};
use crate::position::Position;
use crate::price_feed::PriceFeed;
use crate::token::{CollateralToken, StableAsset};
use crate::types::{AccountId, Timestamp};
use crate::valuation::{FlatRate, OracleAdapter, RatePolicy};
use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap};

/** 8.1: main engine struct. all state lives here */
#[derive(Debug)]
pub struct Engine {
    pub(super) config: EngineConfig,
    pub(super) settings: VaultSettings,
    pub(super) ledger: GlobalLedger,
    pub(super) positions: HashMap<AccountId, Position>,
    pub(super) active_accounts: BTreeSet<AccountId>,
    pub(super) access: AccessControl,
    pub(super) oracle: OracleAdapter,
    pub(super) collateral: Box<dyn CollateralStrategy>,
    pub(super) stable: Box<dyn StableAsset>,
    pub(super) events: Vec<Event>,
    // events of the call in flight. committed on success, dropped on rollback
    pub(super) pending_events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) current_time: Timestamp,
    pub(super) entered: bool,
    // prior values for the call in flight. positions are journaled per account
    pub(super) savepoint: Option<Savepoint>,
    pub(super) journal: Journal<AccountId, Position>,
}

/// Scalar state as it stood when the open call began.
#[derive(Debug, Clone)]
pub(super) struct Savepoint {
    ledger: GlobalLedger,
    settings: VaultSettings,
    next_event_id: u64,
}

impl Engine {
    pub fn new(
        config: VaultConfig,
        admin: AccountId,
        feed: Box<dyn PriceFeed>,
        collateral: Box<dyn CollateralStrategy>,
        stable: Box<dyn StableAsset>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let token_decimals = collateral.token().decimals();
        if token_decimals != config.oracle.collateral_decimals {
            return Err(ConfigError::InvalidOracle {
                reason: format!(
                    "collateral token has {} decimals, oracle expects {}",
                    token_decimals, config.oracle.collateral_decimals
                ),
            }
            .into());
        }

        let oracle = OracleAdapter::new(feed, config.oracle.collateral_decimals)
            .with_max_price_age(config.oracle.max_price_age_secs)
            .with_credit_limit_rate(Box::new(FlatRate(config.oracle.credit_limit_rate)))
            .with_liquidation_limit_rate(Box::new(FlatRate(config.oracle.liquidation_limit_rate)));

        let current_time = Timestamp::from_secs(0);
        info!(
            "vault created: admin {}, apr {}, fee {}, credit {}, liquidation {}",
            admin,
            config.settings.debt_interest_apr,
            config.settings.organization_fee_rate,
            config.oracle.credit_limit_rate,
            config.oracle.liquidation_limit_rate
        );

        Ok(Self {
            config: config.engine,
            settings: config.settings,
            ledger: GlobalLedger::new(current_time),
            positions: HashMap::new(),
            active_accounts: BTreeSet::new(),
            access: AccessControl::with_admin(admin),
            oracle,
            collateral,
            stable,
            events: Vec::new(),
            pending_events: Vec::new(),
            next_event_id: 1,
            current_time,
            entered: false,
            savepoint: None,
            journal: Journal::default(),
        })
    }

    /// Vault holding the raw token itself, in the engine's own account.
    pub fn with_plain_collateral(
        config: VaultConfig,
        admin: AccountId,
        feed: Box<dyn PriceFeed>,
        token: Box<dyn CollateralToken>,
        stable: Box<dyn StableAsset>,
    ) -> Result<Self, EngineError> {
        let custody = config.engine.vault_account;
        Self::new(config, admin, feed, Box::new(PlainCollateral::new(token, custody)), stable)
    }

    /// Vault whose collateral is wrapped by a yield adapter. The engine's own
    /// account drives the adapter, so the adapter must accept it as operator.
    pub fn with_adapter_collateral(
        config: VaultConfig,
        admin: AccountId,
        feed: Box<dyn PriceFeed>,
        token: Box<dyn CollateralToken>,
        adapter: Box<dyn CollateralAdapter>,
        stable: Box<dyn StableAsset>,
    ) -> Result<Self, EngineError> {
        let operator = config.engine.vault_account;
        Self::new(
            config,
            admin,
            feed,
            Box::new(AdapterCollateral::new(token, adapter, operator)),
            stable,
        )
    }

    /// Swaps in per-account rate lookups for the flat config rates.
    pub fn with_rate_policies(mut self, credit: Box<dyn RatePolicy>, liquidation: Box<dyn RatePolicy>) -> Self {
        self.oracle = self
            .oracle
            .with_credit_limit_rate(credit)
            .with_liquidation_limit_rate(liquidation);
        self
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, secs: u64) {
        self.current_time = self.current_time.plus_secs(secs);
    }

    pub fn vault_account(&self) -> AccountId {
        self.config.vault_account
    }

    /** 8.2: replaces the governance settings. interest up to now accrues at the old apr */
    pub fn update_settings(&mut self, caller: AccountId, settings: VaultSettings) -> Result<(), EngineError> {
        self.guarded("update_settings", |engine| {
            engine.access.ensure(caller, Role::Admin)?;
            settings.validate()?;

            engine.accrue_inner()?;
            engine.settings = settings.clone();

            info!(
                "settings updated by {}: apr {}, fee {}, cap {}, min borrow {}",
                caller,
                settings.debt_interest_apr,
                settings.organization_fee_rate,
                settings.borrow_amount_cap,
                settings.min_borrow_amount
            );
            engine.emit_event(EventPayload::SettingsUpdated(SettingsUpdatedEvent { by: caller, settings }));
            Ok(())
        })
    }

    pub fn grant_role(&mut self, caller: AccountId, account: AccountId, role: Role) -> Result<bool, EngineError> {
        self.guarded("grant_role", |engine| {
            engine.access.ensure(caller, Role::Admin)?;
            let added = engine.access.grant(account, role);
            if added {
                info!("role {:?} granted to {} by {}", role, account, caller);
                engine.emit_event(EventPayload::RoleGranted(RoleChangedEvent { by: caller, account, role }));
            }
            Ok(added)
        })
    }

    pub fn revoke_role(&mut self, caller: AccountId, account: AccountId, role: Role) -> Result<bool, EngineError> {
        self.guarded("revoke_role", |engine| {
            engine.access.ensure(caller, Role::Admin)?;
            let removed = engine.access.revoke(account, role);
            if removed {
                info!("role {:?} revoked from {} by {}", role, account, caller);
                engine.emit_event(EventPayload::RoleRevoked(RoleChangedEvent { by: caller, account, role }));
            }
            Ok(removed)
        })
    }

    pub fn has_role(&self, account: AccountId, role: Role) -> bool {
        self.access.has_role(account, role)
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Runs `op` as one all-or-nothing step. On error every change it made,
    /// token balances included, is discarded. Nested entry is rejected.
    pub(super) fn guarded<R>(
        &mut self,
        name: &'static str,
        op: impl FnOnce(&mut Self) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        if self.entered {
            return Err(EngineError::Reentrancy);
        }

        self.begin_call();
        self.entered = true;
        let result = op(self);
        self.entered = false;

        match result {
            Ok(value) => {
                self.commit_call();
                Ok(value)
            }
            Err(err) => {
                warn!("{} rolled back: {}", name, err);
                self.rollback_call();
                Err(err)
            }
        }
    }

    /// Saves a position's prior value before it is changed, created or removed.
    pub(super) fn touch_position(&mut self, account: AccountId) {
        self.journal.touch(&self.positions, account);
    }

    fn begin_call(&mut self) {
        self.savepoint = Some(Savepoint {
            ledger: self.ledger.clone(),
            settings: self.settings.clone(),
            next_event_id: self.next_event_id,
        });
        self.journal.begin();
        self.collateral.begin();
        self.stable.begin();
    }

    fn commit_call(&mut self) {
        self.savepoint = None;
        self.journal.commit();
        self.collateral.commit();
        self.stable.commit();
        self.commit_events();
    }

    fn rollback_call(&mut self) {
        self.stable.rollback();
        self.collateral.rollback();

        // a position exists exactly when its account is active
        for account in self.journal.rollback(&mut self.positions) {
            if self.positions.contains_key(&account) {
                self.active_accounts.insert(account);
            } else {
                self.active_accounts.remove(&account);
            }
        }

        if let Some(savepoint) = self.savepoint.take() {
            self.ledger = savepoint.ledger;
            self.settings = savepoint.settings;
            self.next_event_id = savepoint.next_event_id;
        }
        self.pending_events.clear();
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;
        self.pending_events.push(event);
    }

    fn commit_events(&mut self) {
        for event in self.pending_events.drain(..) {
            debug!("[Event {}] {:?}", event.id.0, event.payload);
            self.events.push(event);
        }

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price_feed::MockPriceFeed;
    use crate::token::TokenLedger;
    use crate::types::wad;
    use primitive_types::U256;

    const ADMIN: AccountId = AccountId(1);
    const ALICE: AccountId = AccountId(10);

    fn wad_of(n: u64) -> U256 {
        U256::from(n) * wad()
    }

    fn engine() -> Engine {
        // $1,000 per WETH
        let feed = MockPriceFeed::new(1_000_00000000, 8, Timestamp::from_secs(1));
        let weth = TokenLedger::with_balances("WETH", 18, &[(ALICE, wad_of(10))]).unwrap();
        let mut engine = Engine::with_plain_collateral(
            VaultConfig::testnet(),
            ADMIN,
            Box::new(feed),
            Box::new(weth),
            Box::new(TokenLedger::new("USDV", 18)),
        )
        .unwrap();
        engine.set_time(Timestamp::from_secs(1));
        engine
    }

    #[test]
    fn nested_entry_is_rejected_and_rolled_back() {
        let mut engine = engine();
        engine.add_collateral(ALICE, wad_of(2)).unwrap();
        let events = engine.events().len();

        let result = engine.guarded("outer", |e| {
            e.add_collateral_inner(ALICE, ALICE, wad_of(1))?;
            e.borrow(ALICE, wad_of(100))
        });

        assert!(matches!(result, Err(EngineError::Reentrancy)));
        assert!(!engine.entered);
        assert!(engine.savepoint.is_none());
        assert!(engine.pending_events.is_empty());
        assert_eq!(engine.events().len(), events);
        assert_eq!(engine.positions[&ALICE].collateral, wad_of(2));
        assert_eq!(engine.collateral.token().balance_of(ALICE), wad_of(8));

        // the guard is released once the outer call returns
        engine.borrow(ALICE, wad_of(100)).unwrap();
        assert_eq!(engine.stable.balance_of(ALICE), wad_of(100));
    }

    #[test]
    fn rollback_removes_positions_opened_by_the_call() {
        let mut engine = engine();

        let result = engine.guarded("open_then_fail", |e| {
            e.add_collateral_inner(ALICE, ALICE, wad_of(1))?;
            e.borrow_inner(ALICE, ALICE, wad_of(5_000))
        });

        assert!(matches!(result, Err(EngineError::CreditLimitExceeded { .. })));
        assert!(engine.positions.is_empty());
        assert!(engine.active_accounts.is_empty());
        assert_eq!(engine.collateral.token().balance_of(ALICE), wad_of(10));
        assert_eq!(engine.next_event_id, 1);
    }
}
