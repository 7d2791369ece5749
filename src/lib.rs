// vault-core: over-collateralized debt vault engine.
// accounts lock collateral, borrow a stable asset against it, pay simple
// interest through a shared debt pool, and get liquidated whole when under water.
// all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: AccountId, Amount (U256), Timestamp
//   2.x  rate.rs: exact numerator/denominator rates
//   3.x  debt.rs: global ledger, portion math, interest accrual
//   4.x  position.rs: per-account collateral, principal, portion
//   5.x  valuation.rs: oracle adapter, credit and liquidation limits
//   6.x  access.rs: roles (admin, liquidator, fee collector, operator)
//   7.x  config.rs: settings, oracle params, env presets
//   8.x  engine/: core engine: collateral, borrowing, liquidations, batches
//   9.x  price_feed.rs: round-based price feed + mock
//   9.1  token.rs: collateral token and stable asset interfaces + ledger
//   9.2  adapter.rs: yield-bearing collateral adapter (share vault)
//   9.3  collateral.rs: plain vs adapter collateral custody
//   9.4  journal.rs: per-call undo logs for rollback
//   10.x actions.rs: batch action codes and parameter blobs
//   11.x events.rs: state transition events for audit

// core vault modules
pub mod debt;
pub mod engine;
pub mod events;
pub mod position;
pub mod rate;
pub mod types;
pub mod valuation;

// policy modules
pub mod access;
pub mod actions;
pub mod config;

// integration modules
pub mod adapter;
pub mod collateral;
pub mod journal;
pub mod price_feed;
pub mod token;

// re exports for convenience
pub use access::*;
pub use actions::*;
pub use adapter::*;
pub use collateral::*;
pub use config::*;
pub use debt::*;
pub use engine::*;
pub use events::*;
pub use journal::*;
pub use position::*;
pub use price_feed::*;
pub use rate::*;
pub use token::*;
pub use types::*;
pub use valuation::*;
