//! Liquidity provider operations

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::state;

pub fn init(
    path: &Path,
    token_a: &str,
    token_b: &str,
    amount_a: &str,
    amount_b: &str,
    caller: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let mut exchange = state::load(path)?;
    let token_a = state::parse_address(token_a)?;
    let token_b = state::parse_address(token_b)?;
    let amount_a = state::parse_amount(amount_a)?;
    let amount_b = state::parse_amount(amount_b)?;
    let caller = state::caller_or_admin(&exchange, caller)?;
    let to = match to {
        Some(value) => state::parse_address(value)?,
        None => caller,
    };

    let shares = exchange.init_liquidity(caller, to, token_a, token_b, amount_a, amount_b)?;
    state::save(path, &exchange)?;

    println!("{}", "=== Initial Liquidity ===".bright_green().bold());
    println!("{} {} / {}", "Deposited:".bright_cyan(), amount_a, amount_b);
    println!("{} {}", "LP shares:".bright_cyan(), shares);
    println!("{} {}", "Recipient:".bright_cyan(), to);
    Ok(())
}

pub fn add(
    path: &Path,
    token_a: &str,
    token_b: &str,
    amount_a: &str,
    amount_b: &str,
    caller: Option<&str>,
) -> Result<()> {
    let mut exchange = state::load(path)?;
    let token_a = state::parse_address(token_a)?;
    let token_b = state::parse_address(token_b)?;
    let amount_a = state::parse_amount(amount_a)?;
    let amount_b = state::parse_amount(amount_b)?;
    let caller = state::caller_or_admin(&exchange, caller)?;

    let shares = exchange.add_liquidity(caller, token_a, token_b, amount_a, amount_b)?;
    state::save(path, &exchange)?;

    println!("{}", "=== Add Liquidity ===".bright_green().bold());
    println!(
        "{} {} / {}",
        "Desired:".bright_cyan(),
        amount_a,
        amount_b
    );
    println!("{} {}", "LP shares:".bright_cyan(), shares);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn remove(
    path: &Path,
    token_a: &str,
    token_b: &str,
    liquidity: &str,
    min_a: &str,
    min_b: &str,
    caller: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let mut exchange = state::load(path)?;
    let token_a = state::parse_address(token_a)?;
    let token_b = state::parse_address(token_b)?;
    let liquidity = state::parse_amount(liquidity)?;
    let min_a = state::parse_amount(min_a)?;
    let min_b = state::parse_amount(min_b)?;
    let caller = state::caller_or_admin(&exchange, caller)?;
    let to = match to {
        Some(value) => state::parse_address(value)?,
        None => caller,
    };

    let (amount_a, amount_b) =
        exchange.remove_liquidity(caller, token_a, token_b, liquidity, min_a, min_b, to)?;
    state::save(path, &exchange)?;

    println!("{}", "=== Remove Liquidity ===".bright_green().bold());
    println!("{} {}", "Burned:".bright_cyan(), liquidity);
    println!("{} {} / {}", "Returned:".bright_cyan(), amount_a, amount_b);
    println!("{} {}", "Recipient:".bright_cyan(), to);
    Ok(())
}
