//! Fuzzing suite for the AMM engine
//!
//! Run with: cargo test --features fuzz
//! Increase cases: PROPTEST_CASES=1000 cargo test --features fuzz
//!
//! This suite implements:
//! - Snapshot-based "no mutation on error" checking
//! - Global invariants (token conservation, LP supply, constant product)
//! - Action-based state machine fuzzer

#![cfg(feature = "fuzz")]

use primitive_types::U256;
use proptest::prelude::*;
use riptide::*;

// ============================================================================
// SECTION 1: WORLD SETUP
// ============================================================================

struct World {
    exchange: Exchange,
    admin: Address,
    swapper: Address,
    token0: Address,
    token1: Address,
    pool: Address,
}

const SUPPLY: u64 = 1_000_000_000_000_000_000;
const SEED: u64 = 1_000_000_000_000;

fn world() -> World {
    let mut exchange = Exchange::new();
    let admin = exchange.admin();
    let swapper = exchange.deploy_account();
    let token0 = exchange.deploy_token("Token0", "TOK0", 18, U256::from(SUPPLY), admin);
    let token1 = exchange.deploy_token("Token1", "TOK1", 18, U256::from(SUPPLY), admin);
    let pool = exchange.deploy_pool(token0, token1).unwrap();
    exchange.whitelist_pool(admin, pool).unwrap();

    let router = exchange.router.address();
    exchange.approve(token0, admin, router, U256::from(SEED)).unwrap();
    exchange.approve(token1, admin, router, U256::from(SEED)).unwrap();
    exchange
        .init_liquidity(admin, admin, token0, token1, U256::from(SEED), U256::from(SEED))
        .unwrap();

    World {
        exchange,
        admin,
        swapper,
        token0,
        token1,
        pool,
    }
}

/// Every address that can hold a balance in these runs
fn holders(w: &World) -> [Address; 4] {
    [w.admin, w.swapper, w.pool, w.exchange.router.address()]
}

/// Token conservation: the sum over all holders equals the fixed supply
fn assert_conservation(w: &World) {
    for token in [w.token0, w.token1] {
        let mut sum = U256::zero();
        for holder in holders(w) {
            sum += w.exchange.balance_of(token, holder).unwrap();
        }
        assert_eq!(sum, U256::from(SUPPLY), "token supply must be conserved");
    }

    // LP supply equals the sum of LP balances over the same holders
    let mut lp_sum = U256::zero();
    for holder in holders(w) {
        lp_sum += w.exchange.lp_balance_of(w.pool, holder).unwrap();
    }
    assert_eq!(
        lp_sum,
        w.exchange.lp_total_supply(w.pool).unwrap(),
        "LP share ledger must sum to total supply"
    );
}

fn product(w: &World) -> U256 {
    let (r0, r1) = w.exchange.pool(w.pool).unwrap().get_reserves();
    r0 * r1
}

// ============================================================================
// SECTION 2: ACTIONS
// ============================================================================

#[derive(Clone, Debug)]
enum Action {
    /// Router add_liquidity with both desired amounts
    Add { amount0: u64, amount1: u64 },
    /// Router exact_input with a satisfiable minimum
    Swap { zero_for_one: bool, amount_in: u64 },
    /// Router exact_input with an unmeetable minimum (must roll back)
    SwapTooGreedy { zero_for_one: bool, amount_in: u64 },
    /// Router remove_liquidity for a fraction of the admin's shares
    Remove { fraction_bps: u16 },
    /// Router remove_liquidity with an unmeetable minimum (must roll back)
    RemoveTooGreedy { fraction_bps: u16 },
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (1u64..1_000_000_000, 1u64..1_000_000_000)
            .prop_map(|(amount0, amount1)| Action::Add { amount0, amount1 }),
        (any::<bool>(), 1u64..1_000_000_000)
            .prop_map(|(zero_for_one, amount_in)| Action::Swap { zero_for_one, amount_in }),
        (any::<bool>(), 1u64..1_000_000_000).prop_map(|(zero_for_one, amount_in)| {
            Action::SwapTooGreedy { zero_for_one, amount_in }
        }),
        (1u16..5000).prop_map(|fraction_bps| Action::Remove { fraction_bps }),
        (1u16..5000).prop_map(|fraction_bps| Action::RemoveTooGreedy { fraction_bps }),
    ]
}

/// Apply one action. Returns whether it succeeded.
fn apply(w: &mut World, action: &Action) -> bool {
    let router = w.exchange.router.address();
    match *action {
        Action::Add { amount0, amount1 } => {
            let amount0 = U256::from(amount0);
            let amount1 = U256::from(amount1);
            w.exchange.approve(w.token0, w.admin, router, amount0).unwrap();
            w.exchange.approve(w.token1, w.admin, router, amount1).unwrap();
            w.exchange
                .add_liquidity(w.admin, w.token0, w.token1, amount0, amount1)
                .is_ok()
        }
        Action::Swap { zero_for_one, amount_in } => {
            let (token_in, token_out) = if zero_for_one {
                (w.token0, w.token1)
            } else {
                (w.token1, w.token0)
            };
            let amount_in = U256::from(amount_in);
            w.exchange.approve(token_in, w.admin, router, amount_in).unwrap();
            w.exchange
                .exact_input(w.admin, token_in, token_out, amount_in, U256::zero())
                .is_ok()
        }
        Action::SwapTooGreedy { zero_for_one, amount_in } => {
            let (token_in, token_out) = if zero_for_one {
                (w.token0, w.token1)
            } else {
                (w.token1, w.token0)
            };
            let amount_in = U256::from(amount_in);
            w.exchange.approve(token_in, w.admin, router, amount_in).unwrap();
            let result = w.exchange.exact_input(
                w.admin,
                token_in,
                token_out,
                amount_in,
                U256::from(u128::MAX),
            );
            assert!(result.is_err(), "unmeetable minimum must fail");
            false
        }
        Action::Remove { fraction_bps } => {
            let shares = w.exchange.lp_balance_of(w.pool, w.admin).unwrap()
                * U256::from(fraction_bps)
                / U256::from(10_000u64);
            if shares.is_zero() {
                return false;
            }
            w.exchange.lp_approve(w.pool, w.admin, router, shares).unwrap();
            w.exchange
                .remove_liquidity(
                    w.admin,
                    w.token0,
                    w.token1,
                    shares,
                    U256::zero(),
                    U256::zero(),
                    w.admin,
                )
                .is_ok()
        }
        Action::RemoveTooGreedy { fraction_bps } => {
            let shares = w.exchange.lp_balance_of(w.pool, w.admin).unwrap()
                * U256::from(fraction_bps)
                / U256::from(10_000u64);
            if shares.is_zero() {
                return false;
            }
            w.exchange.lp_approve(w.pool, w.admin, router, shares).unwrap();
            let result = w.exchange.remove_liquidity(
                w.admin,
                w.token0,
                w.token1,
                shares,
                U256::from(u128::MAX),
                U256::zero(),
                w.admin,
            );
            assert!(result.is_err(), "unmeetable minimum must fail");
            false
        }
    }
}

// ============================================================================
// SECTION 3: PROPERTIES
// ============================================================================

proptest! {
    /// Failed operations leave the exchange bit-identical; successful ones
    /// keep both supplies conserved.
    #[test]
    fn fuzz_no_mutation_on_error(actions in prop::collection::vec(action_strategy(), 1..40)) {
        let mut w = world();

        for action in &actions {
            let before = w.exchange.clone();
            let changed = apply(&mut w, action);
            if !changed {
                // the action's approvals may stick; the failed operation
                // itself must not have. Replay just the approvals on the
                // snapshot and expect an exact match.
                let mut expected = before;
                apply_approvals_only(&mut expected, &w, action);
                prop_assert_eq!(&w.exchange, &expected);
            }
            assert_conservation(&w);
        }
    }

    /// The (unscaled) constant product never decreases across swaps and
    /// strictly increases when fee-bearing input lands.
    #[test]
    fn fuzz_product_monotonic_across_swaps(
        swaps in prop::collection::vec((any::<bool>(), 1u64..1_000_000_000), 1..30)
    ) {
        let mut w = world();
        let mut last = product(&w);

        for (zero_for_one, amount_in) in swaps {
            let changed = apply(&mut w, &Action::Swap { zero_for_one, amount_in });
            let now = product(&w);
            if changed {
                prop_assert!(now > last, "fee-bearing swap must grow the product");
            } else {
                prop_assert_eq!(now, last);
            }
            last = now;
        }
    }

    /// quote_in -> exact swap round-trip always covers the requested output
    #[test]
    fn fuzz_quote_round_trip(amount_out in 1u64..100_000_000) {
        let w = world();
        let amount_out = U256::from(amount_out);

        let amount_in = w
            .exchange
            .quote_amount_in(w.token0, w.token1, amount_out)
            .unwrap();
        let quoted_out = w
            .exchange
            .quote_amount_out(w.token0, w.token1, amount_in)
            .unwrap();
        prop_assert!(quoted_out >= amount_out);
    }
}

/// Replay just the approval side effects of an action onto a snapshot
fn apply_approvals_only(exchange: &mut Exchange, w: &World, action: &Action) {
    let router = exchange.router.address();
    match *action {
        Action::Add { amount0, amount1 } => {
            exchange
                .approve(w.token0, w.admin, router, U256::from(amount0))
                .unwrap();
            exchange
                .approve(w.token1, w.admin, router, U256::from(amount1))
                .unwrap();
        }
        Action::Swap { zero_for_one, amount_in }
        | Action::SwapTooGreedy { zero_for_one, amount_in } => {
            let token_in = if zero_for_one { w.token0 } else { w.token1 };
            exchange
                .approve(token_in, w.admin, router, U256::from(amount_in))
                .unwrap();
        }
        Action::Remove { fraction_bps } | Action::RemoveTooGreedy { fraction_bps } => {
            let shares = exchange.lp_balance_of(w.pool, w.admin).unwrap()
                * U256::from(fraction_bps)
                / U256::from(10_000u64);
            if !shares.is_zero() {
                exchange.lp_approve(w.pool, w.admin, router, shares).unwrap();
            }
        }
    }
}
