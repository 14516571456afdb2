//! The deployed object graph and its atomic entry points
//!
//! An `Exchange` owns the token bank, the pools, and the router, and plays
//! the role of the host execution environment: addresses are allocated
//! sequentially as contracts are "deployed", and every mutating entry point
//! runs against a working copy of the state that is committed only on
//! success. A failed operation - including one that fails after tokens have
//! already moved, like a slippage miss after a burn - leaves the exchange
//! bit-identical to before the call.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::ledger::{Address, TokenBank, TokenLedger};
use crate::pool::{Pool, PoolMap};
use crate::router::Router;
use crate::{AmmError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub bank: TokenBank,
    pub pools: PoolMap,
    pub router: Router,
    next_address: u64,
}

impl Exchange {
    /// Deploy a fresh exchange: an admin account plus a router owned by it.
    /// The admin address is available as `router.owner()`.
    pub fn new() -> Self {
        let mut next_address = 1u64;
        let admin = Address::from(next_address);
        next_address += 1;
        let router_address = Address::from(next_address);
        next_address += 1;

        Self {
            bank: TokenBank::new(),
            pools: PoolMap::new(),
            router: Router::new(router_address, admin),
            next_address,
        }
    }

    pub fn admin(&self) -> Address {
        self.router.owner()
    }

    fn allocate_address(&mut self) -> Address {
        let address = Address::from(self.next_address);
        self.next_address += 1;
        address
    }

    /// Run a mutating operation all-or-nothing: apply it to a working copy
    /// and commit only on success.
    fn commit<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let mut working = self.clone();
        let value = op(&mut working)?;
        *self = working;
        Ok(value)
    }

    // ========================================================================
    // Deployment
    // ========================================================================

    /// Allocate a fresh externally-owned account address
    pub fn deploy_account(&mut self) -> Address {
        self.allocate_address()
    }

    /// Deploy a token with its full supply credited to `owner`
    pub fn deploy_token(
        &mut self,
        name: &str,
        symbol: &str,
        decimals: u8,
        supply: U256,
        owner: Address,
    ) -> Address {
        let address = self.allocate_address();
        self.bank
            .insert(address, TokenLedger::new(name, symbol, decimals, supply, owner));
        log::info!("deployed token {} ({}) at {}", name, symbol, address);
        address
    }

    /// Deploy an empty pool over two previously deployed tokens
    pub fn deploy_pool(&mut self, token0: Address, token1: Address) -> Result<Address> {
        if !self.bank.contains(token0) || !self.bank.contains(token1) {
            return Err(AmmError::UnknownToken);
        }
        let address = self.allocate_address();
        let pool = Pool::new(address, token0, token1)?;
        self.pools.insert(address, pool);
        log::info!("deployed pool {} over {} / {}", address, token0, token1);
        Ok(address)
    }

    pub fn pool(&self, address: Address) -> Result<&Pool> {
        self.pools.get(&address).ok_or(AmmError::PoolNotFound)
    }

    // ========================================================================
    // Token ledger entry points
    // ========================================================================

    pub fn balance_of(&self, token: Address, holder: Address) -> Result<U256> {
        self.bank.balance_of(token, holder)
    }

    pub fn transfer(
        &mut self,
        token: Address,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        self.commit(|ex| ex.bank.transfer(token, caller, to, amount))
    }

    pub fn approve(
        &mut self,
        token: Address,
        caller: Address,
        spender: Address,
        amount: U256,
    ) -> Result<()> {
        self.commit(|ex| ex.bank.approve(token, caller, spender, amount))
    }

    // ========================================================================
    // Pool entry points
    // ========================================================================

    pub fn pool_mint(&mut self, pool: Address, to: Address) -> Result<U256> {
        self.commit(|ex| {
            let pool = ex.pools.get_mut(&pool).ok_or(AmmError::PoolNotFound)?;
            pool.mint(&ex.bank, to)
        })
    }

    pub fn pool_burn(
        &mut self,
        pool: Address,
        to: Address,
        sender_of_shares: Address,
    ) -> Result<(U256, U256)> {
        self.commit(|ex| {
            let pool = ex.pools.get_mut(&pool).ok_or(AmmError::PoolNotFound)?;
            pool.burn(&mut ex.bank, to, sender_of_shares)
        })
    }

    pub fn pool_swap(
        &mut self,
        pool: Address,
        amount0_out: U256,
        amount1_out: U256,
        to: Address,
    ) -> Result<()> {
        self.commit(|ex| {
            let pool = ex.pools.get_mut(&pool).ok_or(AmmError::PoolNotFound)?;
            pool.swap(&mut ex.bank, amount0_out, amount1_out, to)
        })
    }

    pub fn lp_balance_of(&self, pool: Address, holder: Address) -> Result<U256> {
        Ok(self.pool(pool)?.balance_of(holder))
    }

    pub fn lp_total_supply(&self, pool: Address) -> Result<U256> {
        Ok(self.pool(pool)?.total_supply())
    }

    pub fn lp_transfer(
        &mut self,
        pool: Address,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        self.commit(|ex| {
            let pool = ex.pools.get_mut(&pool).ok_or(AmmError::PoolNotFound)?;
            pool.transfer_shares(caller, to, amount)
        })
    }

    pub fn lp_approve(
        &mut self,
        pool: Address,
        caller: Address,
        spender: Address,
        amount: U256,
    ) -> Result<()> {
        self.commit(|ex| {
            let pool = ex.pools.get_mut(&pool).ok_or(AmmError::PoolNotFound)?;
            pool.approve_shares(caller, spender, amount);
            Ok(())
        })
    }

    // ========================================================================
    // Router entry points
    // ========================================================================

    pub fn whitelist_pool(&mut self, caller: Address, pool: Address) -> Result<()> {
        self.commit(|ex| ex.router.whitelist_pool(caller, &ex.pools, pool))
    }

    pub fn pool_address(&self, token_a: Address, token_b: Address) -> Result<Address> {
        self.router.pool_address(token_a, token_b)
    }

    pub fn verify_pool_is_whitelisted(&self, pool: Address) -> Result<()> {
        self.router.verify_pool_is_whitelisted(pool)
    }

    pub fn init_liquidity(
        &mut self,
        caller: Address,
        to: Address,
        token_a: Address,
        token_b: Address,
        amount_a: U256,
        amount_b: U256,
    ) -> Result<U256> {
        self.commit(|ex| {
            ex.router.init_liquidity(
                &mut ex.bank,
                &mut ex.pools,
                caller,
                to,
                token_a,
                token_b,
                amount_a,
                amount_b,
            )
        })
    }

    pub fn add_liquidity(
        &mut self,
        caller: Address,
        token_a: Address,
        token_b: Address,
        amount_a_desired: U256,
        amount_b_desired: U256,
    ) -> Result<U256> {
        self.commit(|ex| {
            ex.router.add_liquidity(
                &mut ex.bank,
                &mut ex.pools,
                caller,
                token_a,
                token_b,
                amount_a_desired,
                amount_b_desired,
            )
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity(
        &mut self,
        caller: Address,
        token_a: Address,
        token_b: Address,
        liquidity: U256,
        amount_a_min: U256,
        amount_b_min: U256,
        to: Address,
    ) -> Result<(U256, U256)> {
        self.commit(|ex| {
            ex.router.remove_liquidity(
                &mut ex.bank,
                &mut ex.pools,
                caller,
                token_a,
                token_b,
                liquidity,
                amount_a_min,
                amount_b_min,
                to,
            )
        })
    }

    pub fn quote_amount_out(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256> {
        self.router
            .quote_amount_out(&self.pools, token_in, token_out, amount_in)
    }

    pub fn quote_amount_in(
        &self,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
    ) -> Result<U256> {
        self.router
            .quote_amount_in(&self.pools, token_in, token_out, amount_out)
    }

    pub fn exact_input(
        &mut self,
        caller: Address,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        amount_out_min: U256,
    ) -> Result<U256> {
        self.commit(|ex| {
            ex.router.exact_input(
                &mut ex.bank,
                &mut ex.pools,
                caller,
                token_in,
                token_out,
                amount_in,
                amount_out_min,
            )
        })
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}
