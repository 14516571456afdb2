//! Swap model - pure constant product math (x·y=k) over 256-bit amounts
//!
//! This crate contains the checked arithmetic and constant product formulas
//! extracted from the exchange engine for reuse and formal verification.
//!
//! **Zero Duplication**: the production engine imports and uses these
//! functions directly instead of carrying its own copies.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(kani)]
extern crate kani;

pub mod math;

pub use math::{
    add, div, initial_shares, invariant_holds, mul, mul_div, proportional_shares, quote_in,
    quote_out, sqrt, sub,
};

/// Fee scale: amounts are weighted per mille in the invariant check
pub const FEE_SCALE: u64 = 1000;

/// Input share kept after the 0.3% swap fee (997 of 1000)
pub const FEE_NUMERATOR: u64 = 997;

/// Error types for swap math
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Result exceeds 2^256 - 1
    Overflow,
    /// Subtraction below zero
    Underflow,
    /// Division by zero
    DivisionByZero,
}

pub type Result<T> = core::result::Result<T, MathError>;
