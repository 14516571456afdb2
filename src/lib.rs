//! Riptide - constant product AMM liquidity engine
//!
//! An in-process automated market maker: a fungible token ledger, constant
//! product pools with LP share accounting, and a router that resolves pools
//! from unordered token pairs and performs slippage-guarded liquidity and
//! swap operations.
//!
//! Core guarantees:
//! 1. The fee-adjusted constant product never decreases across a swap
//! 2. LP shares always represent a pro-rata claim on both reserves
//! 3. Every entry point commits fully or leaves the exchange untouched
//! 4. All arithmetic is exact 256-bit integer math - no floats anywhere
//!
//! The pure formulas live in the `swap_model` crate; this crate wires them
//! into pool and router state machines.

#![forbid(unsafe_code)]

pub mod exchange;
pub mod ledger;
pub mod pool;
pub mod router;

pub use exchange::Exchange;
pub use ledger::{Address, TokenBank, TokenLedger};
pub use pool::{Pool, PoolMap};
pub use router::{PairBinding, Router};

pub use primitive_types::U256;

use swap_model::MathError;

/// Failure taxonomy for the engine
///
/// Every failure aborts the surrounding operation atomically; nothing is
/// retried internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmmError {
    // Arithmetic
    #[error("arithmetic overflow")]
    Overflow,
    #[error("arithmetic underflow")]
    Underflow,
    #[error("division by zero")]
    DivisionByZero,

    // Liquidity
    #[error("insufficient initial liquidity")]
    InsufficientInitialLiquidity,
    #[error("insufficient liquidity minted")]
    InsufficientLiquidityMinted,
    #[error("insufficient liquidity burned")]
    InsufficientLiquidityBurned,

    // Swap
    #[error("insufficient output amount")]
    InsufficientOutputAmount,
    #[error("insufficient input amount")]
    InsufficientInputAmount,
    #[error("insufficient liquidity")]
    InsufficientLiquidity,
    #[error("constant product invariant violated")]
    InvariantViolation,

    // Registry
    #[error("identical token addresses")]
    IdenticalAddresses,
    #[error("pool already whitelisted")]
    PoolAlreadyWhitelisted,
    #[error("pool not found")]
    PoolNotFound,
    #[error("unknown pool")]
    UnknownPool,
    #[error("unauthorized")]
    Unauthorized,

    // Router slippage guards
    #[error("insufficient A amount")]
    InsufficientAAmount,
    #[error("insufficient B amount")]
    InsufficientBAmount,

    // Ledger collaborator
    #[error("unknown token")]
    UnknownToken,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("insufficient allowance")]
    InsufficientAllowance,

    // Pool lifecycle
    #[error("pool not initialized")]
    PoolNotInitialized,
}

impl From<MathError> for AmmError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::Overflow => AmmError::Overflow,
            MathError::Underflow => AmmError::Underflow,
            MathError::DivisionByZero => AmmError::DivisionByZero,
        }
    }
}

pub type Result<T> = core::result::Result<T, AmmError>;
