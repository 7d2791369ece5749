//! Property-based tests for the ledger math.
//!
//! These tests verify the portion, interest and rate invariants hold under
//! random inputs.

use primitive_types::U256;
use proptest::prelude::*;
use vault_core::*;

// Strategies for generating test data
fn amount_strategy() -> impl Strategy<Value = U256> {
    (1u128..1_000_000_000u128).prop_map(|x| U256::from(x) * U256::exp10(12)) // 1e-6 to 1e3 WAD
}

fn pool_strategy() -> impl Strategy<Value = (U256, U256)> {
    // (total portion, total debt), debt at or above portion as interest only grows it
    (1u128..1_000_000_000u128, 0u128..1_000_000u128).prop_map(|(portion, growth)| {
        let portion = U256::from(portion) * U256::exp10(15);
        let debt = portion + U256::from(growth) * U256::exp10(15);
        (portion, debt)
    })
}

fn rate_strategy() -> impl Strategy<Value = Rate> {
    (0u64..=10_000u64).prop_map(Rate::bps) // 0% to 100%
}

proptest! {
    /// Converting an amount to a portion and back never yields more than the amount
    #[test]
    fn portion_round_trip_floors(
        amount in amount_strategy(),
        (total_portion, total_debt) in pool_strategy(),
    ) {
        let portion = portion_for(amount, total_portion, total_debt).unwrap();
        let back = debt_for(portion, total_portion + portion, total_debt + amount).unwrap();
        prop_assert!(back <= amount, "round trip grew: {} -> {}", amount, back);
    }

    /// An empty pool hands out portions one to one
    #[test]
    fn empty_pool_bootstraps(amount in amount_strategy()) {
        prop_assert_eq!(portion_for(amount, U256::zero(), U256::zero()).unwrap(), amount);
        prop_assert_eq!(debt_for(amount, U256::zero(), U256::zero()).unwrap(), U256::zero());
    }

    /// Shares of a pool never sum past the pool
    #[test]
    fn shares_never_exceed_pool(
        parts in proptest::collection::vec(1u64..1_000_000u64, 1..20),
        growth in 0u64..1_000_000u64,
    ) {
        let portions: Vec<U256> = parts.iter().map(|p| U256::from(*p) * U256::exp10(12)).collect();
        let total_portion = portions.iter().fold(U256::zero(), |acc, p| acc + p);
        let total_debt = total_portion + U256::from(growth) * U256::exp10(12);

        let sum = portions
            .iter()
            .map(|p| debt_for(*p, total_portion, total_debt).unwrap())
            .fold(U256::zero(), |acc, d| acc + d);
        prop_assert!(sum <= total_debt);
        // each share loses less than one unit to flooring
        prop_assert!(total_debt - sum < U256::from(portions.len()));
    }

    /// Interest grows with elapsed time and is zero at a zero rate
    #[test]
    fn interest_monotonic_in_time(
        debt in amount_strategy(),
        rate in rate_strategy(),
        t1 in 0u64..SECONDS_PER_YEAR,
        dt in 0u64..SECONDS_PER_YEAR,
    ) {
        let early = accrued_interest(debt, &rate, t1).unwrap();
        let late = accrued_interest(debt, &rate, t1 + dt).unwrap();
        prop_assert!(late >= early);
        prop_assert_eq!(accrued_interest(debt, &Rate::zero(), t1).unwrap(), U256::zero());
    }

    /// A year at rate r adds at most r of the debt
    #[test]
    fn yearly_interest_bounded_by_rate(debt in amount_strategy(), rate in rate_strategy()) {
        let interest = accrued_interest(debt, &rate, SECONDS_PER_YEAR).unwrap();
        prop_assert!(interest <= rate.apply(debt).unwrap());
        prop_assert!(interest <= debt);
    }

    /// Accrual at the same instant changes nothing
    #[test]
    fn accrue_idempotent_within_instant(
        debt in amount_strategy(),
        rate in rate_strategy(),
        elapsed in 1u64..SECONDS_PER_YEAR,
    ) {
        let mut ledger = GlobalLedger::new(Timestamp::from_secs(1));
        ledger.total_debt_amount = debt;
        ledger.total_debt_portion = debt;

        let now = Timestamp::from_secs(1 + elapsed);
        let preview = ledger.preview(now, &rate).unwrap();
        let first = ledger.accrue(now, &rate).unwrap();
        prop_assert_eq!(&ledger, &preview);
        prop_assert_eq!(ledger.total_debt_amount, debt + first);
        prop_assert_eq!(ledger.total_fee_collected, first);

        let second = ledger.accrue(now, &rate).unwrap();
        prop_assert_eq!(second, U256::zero());
        prop_assert_eq!(&ledger, &preview);
    }

    /// Rates at or below one never scale an amount up
    #[test]
    fn rate_below_one_never_scales_up(amount in amount_strategy(), rate in rate_strategy()) {
        prop_assert!(rate.is_below_one());
        prop_assert!(rate.apply(amount).unwrap() <= amount);
    }

    /// Price normalization lands on 18 decimals from any common feed precision
    #[test]
    fn normalized_price_is_wad(whole in 1u64..1_000_000u64, decimals in 0u8..=18u8) {
        let answer = U256::from(whole) * U256::exp10(decimals as usize);
        let price = normalize_price(answer, decimals).unwrap();
        prop_assert_eq!(price, U256::from(whole) * wad());
    }
}

#[test]
fn test_interest_example() {
    // 1000 at 10% for one year
    let debt = U256::from(1000u64) * wad();
    let rate = Rate::new(1u64, 10u64).unwrap();
    assert_eq!(
        accrued_interest(debt, &rate, SECONDS_PER_YEAR).unwrap(),
        U256::from(100u64) * wad()
    );
}
