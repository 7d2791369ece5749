//! Debt Vault Simulation.
//!
//! Walks the vault through its lifecycle: deposits, borrowing, interest
//! accrual, fee collection, a price crash with liquidation, batched actions
//! and adapter-wrapped collateral. Run with RUST_LOG=debug to see every event.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use vault_core::*;

const ADMIN: AccountId = AccountId(1);
const ALICE: AccountId = AccountId(10);
const BOB: AccountId = AccountId(11);
const KEEPER: AccountId = AccountId(20);
const TREASURY: AccountId = AccountId(30);
const ADAPTER_CUSTODY: AccountId = AccountId(900);

// $2,000 with 8 feed decimals
const ETH_PRICE: i128 = 2_000_00000000;

fn main() {
    env_logger::init();

    println!("Debt Vault Engine Simulation");
    println!("Single Collateral, Shared Debt Pool, Full Lifecycle\n");

    scenario_1_borrow_and_repay();
    scenario_2_interest_and_fees();
    scenario_3_price_crash_liquidation();
    scenario_4_batched_actions();
    scenario_5_adapter_collateral();

    println!("\nAll simulations completed successfully.");
}

fn units(value: Decimal) -> Amount {
    amount_from_decimal(value, WAD_DECIMALS).unwrap()
}

fn show(amount: Amount) -> Decimal {
    amount_to_decimal(amount, WAD_DECIMALS).unwrap().round_dp(4)
}

fn setup(config: VaultConfig) -> (Engine, MockPriceFeed) {
    let start = Timestamp::now();
    let feed = MockPriceFeed::new(ETH_PRICE, 8, start);
    let weth = TokenLedger::with_balances("WETH", 18, &[(ALICE, units(dec!(10))), (BOB, units(dec!(25)))]).unwrap();
    let stable = TokenLedger::with_balances("USDV", 18, &[(KEEPER, units(dec!(50000)))]).unwrap();

    let mut engine =
        Engine::with_plain_collateral(config, ADMIN, Box::new(feed.clone()), Box::new(weth), Box::new(stable)).unwrap();
    engine.set_time(start);
    engine.grant_role(ADMIN, KEEPER, Role::Liquidator).unwrap();
    engine.grant_role(ADMIN, TREASURY, Role::FeeCollector).unwrap();
    (engine, feed)
}

/// Deposit, borrow against collateral, repay part of it and withdraw the slack.
fn scenario_1_borrow_and_repay() {
    println!("Scenario 1: Borrow and Repay\n");

    let (mut engine, _feed) = setup(VaultConfig::default());

    engine.add_collateral(ALICE, units(dec!(10))).unwrap();
    println!("  Alice deposits 10 WETH @ $2,000");
    println!("  Credit limit: ${}", show(engine.credit_limit(ALICE).unwrap()));
    println!("  Liquidation limit: ${}\n", show(engine.liquidation_limit(ALICE).unwrap()));

    let borrow = engine.borrow(ALICE, units(dec!(10000))).unwrap();
    println!("  Alice borrows $10,000");
    println!("  Fee: ${}, received: ${}", show(borrow.fee), show(borrow.minted));

    match engine.borrow(ALICE, units(dec!(6000))) {
        Err(e) => println!("  Second borrow of $6,000 rejected: {}\n", e),
        Ok(_) => println!("  Second borrow unexpectedly accepted\n"),
    }

    let debt = engine.current_debt(ALICE).unwrap();
    println!("  Alice owes ${}, holds ${}", show(debt.effective), show(engine.stable_asset().balance_of(ALICE)));

    let partial = engine.repay(ALICE, units(dec!(5000))).unwrap();
    println!("  Alice repays ${}", show(partial.repaid));
    let remaining = engine.current_debt(ALICE).unwrap();
    println!("  Remaining principal: ${}", show(remaining.principal));

    match engine.remove_collateral(ALICE, units(dec!(8))) {
        Err(e) => println!("  Withdrawing 8 WETH rejected: {}", e),
        Ok(_) => println!("  Withdrawing 8 WETH unexpectedly accepted"),
    }
    let withdrawn = engine.remove_collateral(ALICE, units(dec!(5))).unwrap();
    println!("  Alice withdraws {} WETH\n", show(withdrawn.transferred));
}

/// A year of interest on a shared pool, then fees go to the treasury.
fn scenario_2_interest_and_fees() {
    println!("Scenario 2: Interest Accrual and Fee Collection\n");

    let mut config = VaultConfig::default();
    config.settings.debt_interest_apr = Rate::from_decimal(dec!(0.10)).unwrap();
    config.settings.organization_fee_rate = Rate::zero();
    let (mut engine, feed) = setup(config);

    engine.add_collateral(ALICE, units(dec!(10))).unwrap();
    engine.add_collateral(BOB, units(dec!(25))).unwrap();
    engine.borrow(ALICE, units(dec!(1000))).unwrap();
    engine.borrow(BOB, units(dec!(3000))).unwrap();

    println!("  Alice borrows $1,000, Bob borrows $3,000 at 10% APR");

    engine.advance_time(SECONDS_PER_YEAR);
    feed.set_round(ETH_PRICE, engine.time());

    println!("  One year later:");
    println!("    Alice interest: ${}", show(engine.outstanding_interest(ALICE).unwrap()));
    println!("    Bob interest: ${}", show(engine.outstanding_interest(BOB).unwrap()));

    let collected = engine.collect_fees(TREASURY).unwrap();
    println!("  Treasury collects ${}", show(collected));
    println!("  Pool debt: ${}\n", show(engine.ledger().total_debt_amount));
}

/// Price falls 20%, the keeper repays the debt and takes all the collateral.
fn scenario_3_price_crash_liquidation() {
    println!("Scenario 3: Price Crash and Liquidation\n");

    let (mut engine, feed) = setup(VaultConfig::default());

    engine.add_collateral(ALICE, units(dec!(10))).unwrap();
    engine.borrow(ALICE, units(dec!(14000))).unwrap();
    println!("  Alice borrows $14,000 against $20,000 of WETH");
    println!("  Liquidatable: {}", engine.is_liquidatable(ALICE).unwrap());

    feed.set_answer(1_600_00000000);
    println!("  WETH drops to $1,600");
    println!("  Liquidation limit: ${}", show(engine.liquidation_limit(ALICE).unwrap()));
    println!("  Liquidatable: {}", engine.is_liquidatable(ALICE).unwrap());

    let result = engine.liquidate(KEEPER, ALICE, KEEPER).unwrap();
    println!("  Keeper burns ${} and receives {} WETH", show(result.debt_repaid), show(result.collateral_transferred));
    println!("  Alice's position closed: {}\n", engine.position(ALICE).is_none());
}

/// Deposit and borrow in one encoded batch; a failing batch leaves no trace.
fn scenario_4_batched_actions() {
    println!("Scenario 4: Batched Actions\n");

    let (mut engine, _feed) = setup(VaultConfig::default());

    let (codes, params) = encode_batch(&[
        Action::AddCollateral { amount: units(dec!(5)) },
        Action::Borrow { amount: units(dec!(5000)) },
    ]);
    let outcomes = engine.execute_encoded(BOB, BOB, &codes, &params).unwrap();
    println!("  Bob runs [add 5 WETH, borrow $5,000]: {} actions", outcomes.len());

    let events_before = engine.events().len();
    let (codes, params) = encode_batch(&[
        Action::AddCollateral { amount: units(dec!(5)) },
        Action::Borrow { amount: units(dec!(100000)) },
    ]);
    match engine.execute_encoded(BOB, BOB, &codes, &params) {
        Err(e) => println!("  Oversized batch rolled back: {}", e),
        Ok(_) => println!("  Oversized batch unexpectedly accepted"),
    }
    println!(
        "  Collateral still {} WETH, no new events: {}\n",
        show(engine.position(BOB).unwrap().collateral),
        engine.events().len() == events_before
    );
}

/// Collateral wrapped by a share vault; the position records shares.
fn scenario_5_adapter_collateral() {
    println!("Scenario 5: Adapter Collateral\n");

    let config = VaultConfig::default();
    let start = Timestamp::now();
    let feed = MockPriceFeed::new(ETH_PRICE, 8, start);
    let weth = TokenLedger::with_balances("WETH", 18, &[(ALICE, units(dec!(10)))]).unwrap();
    let adapter = ShareVault::new(config.engine.vault_account, ADAPTER_CUSTODY);

    let mut engine = Engine::with_adapter_collateral(
        config,
        ADMIN,
        Box::new(feed),
        Box::new(weth),
        Box::new(adapter),
        Box::new(TokenLedger::new("USDV", 18)),
    )
    .unwrap();
    engine.set_time(start);

    let shares = engine.add_collateral(ALICE, units(dec!(4))).unwrap();
    println!("  Alice deposits 4 WETH, recorded {} shares", show(shares));
    println!("  Backing: {} WETH", show(engine.collateral_amount(ALICE).unwrap()));
    println!(
        "  Held by adapter custody: {} WETH",
        show(engine.collateral_strategy().token().balance_of(ADAPTER_CUSTODY))
    );

    let withdrawn = engine.remove_collateral(ALICE, shares).unwrap();
    println!(
        "  Alice withdraws all shares for {} WETH, position closed: {}",
        show(withdrawn.transferred),
        withdrawn.position_closed
    );
}
