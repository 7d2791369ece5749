// 8.0: vault engine. coordinates collateral custody, the shared debt pool,
// borrowing, repayment, liquidation and batched actions.
// deterministic: time is set by the caller, no external I/O.

mod batch;
mod borrowing;
mod collateral;
mod config;
mod core;
mod liquidations;
mod queries;
mod results;

pub use config::EngineConfig;
pub use core::Engine;
pub use results::{ActionOutcome, BorrowResult, EngineError, LiquidationResult, RepayResult, WithdrawResult};
