//! Checked 256-bit arithmetic and constant product formulas

use crate::{MathError, Result, FEE_NUMERATOR, FEE_SCALE};
use primitive_types::U256;

/// Checked addition over the full 256-bit range
#[inline]
pub fn add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

/// Checked subtraction, `a - b`
#[inline]
pub fn sub(a: U256, b: U256) -> Result<U256> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}

/// Checked multiplication over the full 256-bit range
#[inline]
pub fn mul(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

/// Checked division, truncating toward zero
#[inline]
pub fn div(a: U256, b: U256) -> Result<U256> {
    a.checked_div(b).ok_or(MathError::DivisionByZero)
}

/// `a * b / d` with the same failure taxonomy as the primitive ops
#[inline]
pub fn mul_div(a: U256, b: U256, d: U256) -> Result<U256> {
    div(mul(a, b)?, d)
}

/// Floor integer square root (Newton's method)
///
/// Total: never fails, never panics, bit-identical on every platform.
pub fn sqrt(y: U256) -> U256 {
    if y.is_zero() {
        return U256::zero();
    }
    if y < U256::from(4u64) {
        return U256::one();
    }

    let two = U256::from(2u64);
    let mut z = y;
    let mut x = y / two + U256::one();
    while x < z {
        z = x;
        // x stays below y/2 + 2, so y/x + x cannot overflow
        x = (y / x + x) / two;
    }
    z
}

/// Output amount for an exact input against (reserve_in, reserve_out)
///
/// `floor(amount_in*997*reserve_out / (reserve_in*1000 + amount_in*997))`
///
/// Callers must ensure both reserves are live (nonzero).
pub fn quote_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
    let amount_in_with_fee = mul(amount_in, U256::from(FEE_NUMERATOR))?;
    let numerator = mul(amount_in_with_fee, reserve_out)?;
    let denominator = add(mul(reserve_in, U256::from(FEE_SCALE))?, amount_in_with_fee)?;
    div(numerator, denominator)
}

/// Input amount required for an exact output against (reserve_in, reserve_out)
///
/// `floor(reserve_in*amount_out*1000 / ((reserve_out-amount_out)*997)) + 1`
///
/// Callers must ensure `amount_out < reserve_out`.
pub fn quote_in(amount_out: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
    let numerator = mul(mul(reserve_in, amount_out)?, U256::from(FEE_SCALE))?;
    let denominator = mul(sub(reserve_out, amount_out)?, U256::from(FEE_NUMERATOR))?;
    add(div(numerator, denominator)?, U256::one())
}

/// LP shares for the first deposit into an empty pool: `sqrt(amount0 * amount1)`
pub fn initial_shares(amount0: U256, amount1: U256) -> Result<U256> {
    Ok(sqrt(mul(amount0, amount1)?))
}

/// LP shares for a deposit into a live pool
///
/// `min(amount0*total_supply/reserve0, amount1*total_supply/reserve1)` -
/// the lesser proportional contribution, so an imbalanced deposit cannot
/// dilute existing holders.
pub fn proportional_shares(
    amount0: U256,
    amount1: U256,
    reserve0: U256,
    reserve1: U256,
    total_supply: U256,
) -> Result<U256> {
    let shares0 = mul_div(amount0, total_supply, reserve0)?;
    let shares1 = mul_div(amount1, total_supply, reserve1)?;
    Ok(shares0.min(shares1))
}

/// Fee-adjusted constant product check after a swap
///
/// `(balance0*1000 - amount0_in*3) * (balance1*1000 - amount1_in*3)
///   >= reserve0 * reserve1 * 1000^2`
///
/// Scaled integers only; the per-mille weighting keeps the 0.3% fee exact
/// without fractional arithmetic.
pub fn invariant_holds(
    balance0: U256,
    balance1: U256,
    amount0_in: U256,
    amount1_in: U256,
    reserve0: U256,
    reserve1: U256,
) -> Result<bool> {
    let scale = U256::from(FEE_SCALE);
    let fee = U256::from(FEE_SCALE - FEE_NUMERATOR);

    let adjusted0 = sub(mul(balance0, scale)?, mul(amount0_in, fee)?)?;
    let adjusted1 = sub(mul(balance1, scale)?, mul(amount1_in, fee)?)?;

    let lhs = mul(adjusted0, adjusted1)?;
    let rhs = mul(mul(reserve0, reserve1)?, mul(scale, scale)?)?;

    Ok(lhs >= rhs)
}


// ============================================================================
// KANI FORMAL VERIFICATION PROOFS
// ============================================================================

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// S1: sqrt returns the floor root: z^2 <= y < (z+1)^2
    #[kani::proof]
    #[kani::unwind(260)]
    fn s1_sqrt_is_floor_root() {
        let y_raw: u128 = kani::any();
        let y = U256::from(y_raw);

        let z = sqrt(y);

        assert!(z * z <= y, "S1: root squared must not exceed input");
        let next = z + U256::one();
        // (z+1)^2 fits easily: z <= 2^64 for u128 inputs
        assert!(next * next > y, "S1: next root squared must exceed input");
    }

    /// S2: checked add/sub round-trip
    #[kani::proof]
    fn s2_add_sub_round_trip() {
        let a = U256::from(kani::any::<u128>());
        let b = U256::from(kani::any::<u128>());

        let sum = add(a, b).unwrap();
        assert!(sub(sum, b) == Ok(a), "S2: (a + b) - b == a");
    }

    /// S3: quoted output never drains the out-side reserve
    #[kani::proof]
    fn s3_quote_out_bounded() {
        let amount_in: u64 = kani::any();
        let reserve_in: u64 = kani::any();
        let reserve_out: u64 = kani::any();

        kani::assume(amount_in > 0);
        kani::assume(reserve_in > 0);
        kani::assume(reserve_out > 0);

        let out = quote_out(
            U256::from(amount_in),
            U256::from(reserve_in),
            U256::from(reserve_out),
        )
        .unwrap();

        assert!(out < U256::from(reserve_out), "S3: output below reserve");
    }
}
