//! Router: pool resolution and slippage-guarded liquidity / swap orchestration
//!
//! The router owns the whitelist registry: an append-only set of canonical
//! pair -> pool bindings that only the router owner may extend. A binding,
//! once made, is immutable for the router's lifetime.
//!
//! Mutating operations pull tokens (or LP shares) from the caller through
//! the ledger allowances, hand them to the resolved pool, and enforce the
//! caller's slippage bounds before the surrounding transaction commits.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use swap_model as math;

use crate::ledger::{Address, TokenBank};
use crate::pool::PoolMap;
use crate::{AmmError, Result};

/// One whitelist entry: canonical pair key -> pool address
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairBinding {
    pub token0: Address,
    pub token1: Address,
    pub pool: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Router {
    address: Address,
    owner: Address,
    whitelist: Vec<PairBinding>,
}

impl Router {
    /// Deploy a router. The owner identity is fixed here and can never be
    /// reassigned.
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            whitelist: Vec::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn whitelist(&self) -> &[PairBinding] {
        &self.whitelist
    }

    /// Order an unordered token pair by ascending numeric address
    pub fn canonical_pair(token_a: Address, token_b: Address) -> Result<(Address, Address)> {
        if token_a == token_b {
            return Err(AmmError::IdenticalAddresses);
        }
        if token_a < token_b {
            Ok((token_a, token_b))
        } else {
            Ok((token_b, token_a))
        }
    }

    /// Bind a pool to its canonical pair key (owner only, once per pair)
    pub fn whitelist_pool(
        &mut self,
        caller: Address,
        pools: &PoolMap,
        pool_address: Address,
    ) -> Result<()> {
        if caller != self.owner {
            return Err(AmmError::Unauthorized);
        }
        let pool = pools.get(&pool_address).ok_or(AmmError::PoolNotFound)?;
        let (token0, token1) = Self::canonical_pair(pool.token0(), pool.token1())?;
        if self
            .whitelist
            .iter()
            .any(|binding| binding.token0 == token0 && binding.token1 == token1)
        {
            return Err(AmmError::PoolAlreadyWhitelisted);
        }
        self.whitelist.push(PairBinding {
            token0,
            token1,
            pool: pool_address,
        });
        log::info!("router {}: whitelisted pool {}", self.address, pool_address);
        Ok(())
    }

    /// Resolve the pool bound to an unordered token pair
    pub fn pool_address(&self, token_a: Address, token_b: Address) -> Result<Address> {
        let (token0, token1) = Self::canonical_pair(token_a, token_b)?;
        self.whitelist
            .iter()
            .find(|binding| binding.token0 == token0 && binding.token1 == token1)
            .map(|binding| binding.pool)
            .ok_or(AmmError::PoolNotFound)
    }

    /// Check that an address was registered as a pool in the whitelist
    pub fn verify_pool_is_whitelisted(&self, pool_address: Address) -> Result<()> {
        if self.whitelist.iter().any(|binding| binding.pool == pool_address) {
            Ok(())
        } else {
            Err(AmmError::UnknownPool)
        }
    }

    /// Seed a pool with its first liquidity: pull both amounts from the
    /// caller and mint the initial shares to `to`. This is the only entry
    /// point that works against an empty pool.
    #[allow(clippy::too_many_arguments)]
    pub fn init_liquidity(
        &self,
        bank: &mut TokenBank,
        pools: &mut PoolMap,
        caller: Address,
        to: Address,
        token_a: Address,
        token_b: Address,
        amount_a: U256,
        amount_b: U256,
    ) -> Result<U256> {
        let pool_address = self.pool_address(token_a, token_b)?;
        let pool = pools.get_mut(&pool_address).ok_or(AmmError::PoolNotFound)?;

        bank.transfer_from(token_a, self.address, caller, pool_address, amount_a)?;
        bank.transfer_from(token_b, self.address, caller, pool_address, amount_b)?;
        pool.mint(bank, to)
    }

    /// Add liquidity to a live pool at the current price
    ///
    /// The desired amounts are trimmed to the optimal pair: keep `amount_a`
    /// and pair it with `amount_a * reserve_b / reserve_a` when that fits
    /// under `amount_b`, otherwise keep `amount_b` and scale `amount_a` the
    /// same way. Prevents donating the excess of an off-price deposit.
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity(
        &self,
        bank: &mut TokenBank,
        pools: &mut PoolMap,
        caller: Address,
        token_a: Address,
        token_b: Address,
        amount_a_desired: U256,
        amount_b_desired: U256,
    ) -> Result<U256> {
        let pool_address = self.pool_address(token_a, token_b)?;
        let pool = pools.get_mut(&pool_address).ok_or(AmmError::PoolNotFound)?;
        if pool.total_supply().is_zero() {
            return Err(AmmError::PoolNotInitialized);
        }

        let (reserve_a, reserve_b) = oriented_reserves(pool.get_reserves(), token_a == pool.token0());
        let amount_b_optimal = math::mul_div(amount_a_desired, reserve_b, reserve_a)?;
        let (amount_a, amount_b) = if amount_b_optimal <= amount_b_desired {
            (amount_a_desired, amount_b_optimal)
        } else {
            let amount_a_optimal = math::mul_div(amount_b_desired, reserve_a, reserve_b)?;
            (amount_a_optimal, amount_b_desired)
        };

        bank.transfer_from(token_a, self.address, caller, pool_address, amount_a)?;
        bank.transfer_from(token_b, self.address, caller, pool_address, amount_b)?;
        pool.mint(bank, caller)
    }

    /// Redeem `liquidity` LP shares and enforce the caller's minimums
    ///
    /// The minimums are checked after the burn; a miss aborts the whole
    /// transaction, so no partial redemption can survive.
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity(
        &self,
        bank: &mut TokenBank,
        pools: &mut PoolMap,
        caller: Address,
        token_a: Address,
        token_b: Address,
        liquidity: U256,
        amount_a_min: U256,
        amount_b_min: U256,
        to: Address,
    ) -> Result<(U256, U256)> {
        let pool_address = self.pool_address(token_a, token_b)?;
        let pool = pools.get_mut(&pool_address).ok_or(AmmError::PoolNotFound)?;

        pool.transfer_shares_from(self.address, caller, pool_address, liquidity)?;
        let (amount0, amount1) = pool.burn(bank, to, pool_address)?;

        let (amount_a, amount_b) = if token_a == pool.token0() {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        if amount_a < amount_a_min {
            return Err(AmmError::InsufficientAAmount);
        }
        if amount_b < amount_b_min {
            return Err(AmmError::InsufficientBAmount);
        }
        Ok((amount_a, amount_b))
    }

    /// Quote the output for an exact input against current reserves
    pub fn quote_amount_out(
        &self,
        pools: &PoolMap,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256> {
        let pool_address = self.pool_address(token_in, token_out)?;
        let pool = pools.get(&pool_address).ok_or(AmmError::PoolNotFound)?;
        let (reserve_in, reserve_out) = oriented_reserves(pool.get_reserves(), token_in == pool.token0());
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        Ok(math::quote_out(amount_in, reserve_in, reserve_out)?)
    }

    /// Quote the input required for an exact output against current reserves
    pub fn quote_amount_in(
        &self,
        pools: &PoolMap,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
    ) -> Result<U256> {
        let pool_address = self.pool_address(token_in, token_out)?;
        let pool = pools.get(&pool_address).ok_or(AmmError::PoolNotFound)?;
        let (reserve_in, reserve_out) = oriented_reserves(pool.get_reserves(), token_in == pool.token0());
        if reserve_in.is_zero() || amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity);
        }
        Ok(math::quote_in(amount_out, reserve_in, reserve_out)?)
    }

    /// Swap an exact input for at least `amount_out_min` of the other token
    #[allow(clippy::too_many_arguments)]
    pub fn exact_input(
        &self,
        bank: &mut TokenBank,
        pools: &mut PoolMap,
        caller: Address,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        amount_out_min: U256,
    ) -> Result<U256> {
        let pool_address = self.pool_address(token_in, token_out)?;
        let pool = pools.get_mut(&pool_address).ok_or(AmmError::PoolNotFound)?;

        let input_is_token0 = token_in == pool.token0();
        let (reserve_in, reserve_out) = oriented_reserves(pool.get_reserves(), input_is_token0);
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        let amount_out = math::quote_out(amount_in, reserve_in, reserve_out)?;
        if amount_out < amount_out_min {
            return Err(AmmError::InsufficientOutputAmount);
        }

        bank.transfer_from(token_in, self.address, caller, pool_address, amount_in)?;
        let (amount0_out, amount1_out) = if input_is_token0 {
            (U256::zero(), amount_out)
        } else {
            (amount_out, U256::zero())
        };
        pool.swap(bank, amount0_out, amount1_out, caller)?;

        log::debug!(
            "router {}: exact_input {} {} -> {} {} for {}",
            self.address,
            amount_in,
            token_in,
            amount_out,
            token_out,
            caller
        );
        Ok(amount_out)
    }
}

/// Reserves as seen from the A/in side of the call
fn oriented_reserves(reserves: (U256, U256), a_is_token0: bool) -> (U256, U256) {
    let (reserve0, reserve1) = reserves;
    if a_is_token0 {
        (reserve0, reserve1)
    } else {
        (reserve1, reserve0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_pair_orders_ascending() {
        let low = Address::from(3);
        let high = Address::from(7);
        assert_eq!(Router::canonical_pair(low, high).unwrap(), (low, high));
        assert_eq!(Router::canonical_pair(high, low).unwrap(), (low, high));
        assert_eq!(
            Router::canonical_pair(low, low).unwrap_err(),
            AmmError::IdenticalAddresses
        );
    }
}
